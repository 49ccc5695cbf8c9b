use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub src: String,
    pub poster: Option<String>,
    pub caption: Option<String>,
    pub link: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl MediaItem {
    /// Builds an item from gallery markup attributes. Anything that is not
    /// `video` is shown as an image; blank optional attributes are dropped.
    pub fn from_attrs(kind: &str, src: &str, poster: &str, caption: &str, link: &str) -> Self {
        let kind = if kind.eq_ignore_ascii_case("video") {
            MediaKind::Video
        } else {
            MediaKind::Image
        };
        Self {
            kind,
            src: src.to_string(),
            poster: non_empty(poster),
            caption: non_empty(caption),
            link: non_empty(link),
        }
    }

    pub fn alt_text(&self) -> &str {
        self.caption.as_deref().unwrap_or("")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Playing,
    Paused,
}

#[derive(Clone, Debug)]
pub struct ViewerState {
    pub items: Rc<[MediaItem]>,
    pub current_index: usize,
    pub elapsed_ratio: f64,
}

impl ViewerState {
    pub fn current(&self) -> &MediaItem {
        &self.items[self.current_index]
    }

    fn step(&mut self, delta: isize) {
        let count = self.items.len() as isize;
        self.current_index = ((self.current_index as isize + delta + count) % count) as usize;
        self.elapsed_ratio = 0.0;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Progressed,
    Advanced,
}

/// Timed playback over a list of media items.
///
/// Frame timestamps are fed in through [`StoryPlayer::tick`]; the first frame
/// after a (re)start anchors the display window so that any progress made
/// before a pause is carried over.
#[derive(Debug)]
pub struct StoryPlayer {
    view: Option<ViewerState>,
    paused: bool,
    anchor: Option<f64>,
    duration_ms: f64,
    loads: u64,
}

impl StoryPlayer {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            view: None,
            paused: false,
            anchor: None,
            duration_ms,
            loads: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.view, self.paused) {
            (None, _) => Phase::Closed,
            (Some(_), false) => Phase::Playing,
            (Some(_), true) => Phase::Paused,
        }
    }

    pub fn is_open(&self) -> bool {
        self.view.is_some()
    }

    pub fn view(&self) -> Option<&ViewerState> {
        self.view.as_ref()
    }

    /// Returns false when there is nothing to show.
    pub fn open(&mut self, items: Rc<[MediaItem]>, start_index: usize) -> bool {
        if items.is_empty() {
            return false;
        }
        let current_index = start_index % items.len();
        self.view = Some(ViewerState {
            items,
            current_index,
            elapsed_ratio: 0.0,
        });
        self.restart();
        true
    }

    pub fn close(&mut self) {
        self.view = None;
        self.paused = false;
        self.anchor = None;
    }

    pub fn next(&mut self) {
        self.navigate(1);
    }

    pub fn prev(&mut self) {
        self.navigate(-1);
    }

    fn navigate(&mut self, delta: isize) {
        if let Some(view) = self.view.as_mut() {
            view.step(delta);
            self.restart();
        }
    }

    fn restart(&mut self) {
        self.paused = false;
        self.anchor = None;
        self.loads += 1;
    }

    /// Bumped every time an item is (re)loaded, including wraps onto the
    /// same index.
    pub fn loads(&self) -> u64 {
        self.loads
    }

    pub fn pause(&mut self) {
        if self.phase() == Phase::Playing {
            self.paused = true;
            self.anchor = None;
        }
    }

    pub fn resume(&mut self) {
        if self.phase() == Phase::Paused {
            self.paused = false;
        }
    }

    pub fn tick(&mut self, now_ms: f64) -> Tick {
        if self.phase() != Phase::Playing {
            return Tick::Idle;
        }
        let duration = self.duration_ms;
        let Some(view) = self.view.as_mut() else {
            return Tick::Idle;
        };
        let anchor = *self
            .anchor
            .get_or_insert(now_ms - view.elapsed_ratio * duration);
        let ratio = ((now_ms - anchor) / duration).clamp(0.0, 1.0);
        view.elapsed_ratio = view.elapsed_ratio.max(ratio);
        if view.elapsed_ratio >= 1.0 {
            self.next();
            Tick::Advanced
        } else {
            Tick::Progressed
        }
    }

    /// Fill of one progress segment: full behind the active item, empty ahead.
    pub fn segment_fill(&self, index: usize) -> f64 {
        match &self.view {
            Some(view) if index < view.current_index => 1.0,
            Some(view) if index == view.current_index => view.elapsed_ratio.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Escape closes, arrows navigate. Keys are ignored while closed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if !self.is_open() {
            return false;
        }
        match key {
            "Escape" => self.close(),
            "ArrowLeft" => self.prev(),
            "ArrowRight" => self.next(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(count: usize) -> Rc<[MediaItem]> {
        (0..count)
            .map(|i| MediaItem::from_attrs("image", &format!("/img/{i}.jpg"), "", "", ""))
            .collect::<Vec<_>>()
            .into()
    }

    fn index(player: &StoryPlayer) -> usize {
        player.view().map(|v| v.current_index).unwrap()
    }

    #[test]
    fn prev_from_first_wraps_to_last() {
        let mut player = StoryPlayer::new(5000.0);
        assert!(player.open(items(3), 0));
        player.prev();
        assert_eq!(index(&player), 2);
        assert_eq!(player.loads(), 2);
    }

    #[test]
    fn navigation_stays_in_bounds_from_every_start() {
        for count in 1..6 {
            for start in 0..count {
                let mut player = StoryPlayer::new(5000.0);
                player.open(items(count), start);
                for _ in 0..(count * 2 + 1) {
                    player.next();
                    assert!(index(&player) < count);
                }
                for _ in 0..(count * 3) {
                    player.prev();
                    assert!(index(&player) < count);
                }
            }
        }
    }

    #[test]
    fn open_with_out_of_range_start_wraps() {
        let mut player = StoryPlayer::new(5000.0);
        player.open(items(3), 7);
        assert_eq!(index(&player), 1);
    }

    #[test]
    fn open_with_no_items_stays_closed() {
        let mut player = StoryPlayer::new(5000.0);
        assert!(!player.open(items(0), 0));
        assert_eq!(player.phase(), Phase::Closed);
        player.next();
        assert_eq!(player.tick(100.0), Tick::Idle);
    }

    #[test]
    fn progress_is_monotonic_and_resets_on_navigation() {
        let mut player = StoryPlayer::new(5000.0);
        player.open(items(3), 0);
        let mut last = 0.0;
        for now in [1000.0, 1500.0, 1400.0, 3000.0, 5500.0] {
            assert_eq!(player.tick(now), Tick::Progressed);
            let fill = player.segment_fill(0);
            assert!(fill >= last);
            last = fill;
        }
        assert!((player.segment_fill(0) - 0.9).abs() < 1e-9);

        player.next();
        assert_eq!(player.segment_fill(1), 0.0);
        assert_eq!(player.segment_fill(0), 1.0);
        assert_eq!(player.segment_fill(2), 0.0);
    }

    #[test]
    fn timer_advances_after_duration() {
        let mut player = StoryPlayer::new(5000.0);
        player.open(items(2), 1);
        player.tick(0.0);
        assert_eq!(player.tick(4999.0), Tick::Progressed);
        assert_eq!(player.tick(5000.0), Tick::Advanced);
        assert_eq!(index(&player), 0);
        assert_eq!(player.phase(), Phase::Playing);
        // The new window anchors on the next frame.
        player.tick(6000.0);
        assert_eq!(player.segment_fill(0), 0.0);
    }

    #[test]
    fn pause_keeps_progress_and_resume_continues() {
        let mut player = StoryPlayer::new(5000.0);
        player.open(items(2), 0);
        player.tick(0.0);
        player.tick(2500.0);
        player.pause();
        assert_eq!(player.phase(), Phase::Paused);
        assert_eq!(player.tick(60_000.0), Tick::Idle);
        assert_eq!(player.segment_fill(0), 0.5);

        player.resume();
        player.tick(100_000.0);
        assert_eq!(player.segment_fill(0), 0.5);
        assert_eq!(player.tick(102_499.0), Tick::Progressed);
        assert_eq!(player.tick(102_500.0), Tick::Advanced);
    }

    #[test]
    fn keys_only_act_while_open() {
        let mut player = StoryPlayer::new(5000.0);
        assert!(!player.handle_key("Escape"));
        player.open(items(3), 0);
        assert!(player.handle_key("ArrowRight"));
        assert_eq!(index(&player), 1);
        assert!(player.handle_key("ArrowLeft"));
        assert!(player.handle_key("ArrowLeft"));
        assert_eq!(index(&player), 2);
        assert!(!player.handle_key("Enter"));
        assert!(player.handle_key("Escape"));
        assert_eq!(player.phase(), Phase::Closed);
    }

    #[test]
    fn attributes_map_to_media_items() {
        let video = MediaItem::from_attrs("video", "/v.mp4", "/p.jpg", "Kitchen", "");
        assert_eq!(video.kind, MediaKind::Video);
        assert_eq!(video.poster.as_deref(), Some("/p.jpg"));
        assert_eq!(video.link, None);

        let other = MediaItem::from_attrs("", "/a.jpg", "", " ", "https://example.com");
        assert_eq!(other.kind, MediaKind::Image);
        assert_eq!(other.caption, None);
        assert_eq!(other.alt_text(), "");
        assert_eq!(other.link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn repeated_release_does_not_disturb_playback() {
        let mut player = StoryPlayer::new(5000.0);
        player.open(items(3), 0);
        player.tick(0.0);
        player.tick(1000.0);
        // A release without a press is ignored.
        player.resume();
        assert_eq!(player.tick(2000.0), Tick::Progressed);
        player.pause();
        player.resume();
        player.resume();
        assert_eq!(player.phase(), Phase::Playing);
        player.tick(10_000.0);
        player.tick(11_000.0);
        assert!((player.segment_fill(0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn every_shown_item_counts_as_a_fresh_load() {
        let mut player = StoryPlayer::new(1000.0);
        player.open(items(2), 0);
        assert_eq!(player.loads(), 1);
        player.tick(0.0);
        assert_eq!(player.tick(1000.0), Tick::Advanced);
        assert_eq!(player.loads(), 2);
        player.next();
        player.prev();
        assert_eq!(player.loads(), 4);
    }
}
