use std::collections::VecDeque;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EmbedDescriptor {
    pub src: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedStatus {
    Pending,
    Loading,
    Ready,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slide {
    pub id: u32,
    pub descriptor: usize,
    pub src: String,
    pub width: f64,
    pub status: EmbedStatus,
}

impl Slide {
    pub fn has_src(&self) -> bool {
        matches!(self.status, EmbedStatus::Loading | EmbedStatus::Ready)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragOrigin {
    pub x: f64,
    pub offset: f64,
    pub was_playing: bool,
}

/// Slides needed to keep two viewport widths covered, plus one spare so the
/// coverage holds while the lead slide is partially scrolled out.
pub fn slides_needed(viewport: f64, slide_width: f64) -> usize {
    if slide_width <= 0.0 || viewport <= 0.0 {
        return 0;
    }
    (2.0 * viewport / slide_width).ceil() as usize + 1
}

/// Infinite-looking strip built from a bounded number of slides.
///
/// `offset` is the horizontal translation of the track in px. Moving left is
/// negative; after every mutation it is normalised into `(-lead_width, 0]`
/// by moving slides between the two ends.
#[derive(Debug)]
pub struct CarouselState {
    slides: VecDeque<Slide>,
    offset: f64,
    speed: f64,
    playing: bool,
    drag: Option<DragOrigin>,
    recycled: u64,
    shut_down: bool,
}

impl CarouselState {
    pub fn new(speed: f64, prefers_reduced_motion: bool) -> Self {
        Self {
            slides: VecDeque::new(),
            offset: 0.0,
            speed,
            playing: !prefers_reduced_motion,
            drag: None,
            recycled: 0,
            shut_down: false,
        }
    }

    pub fn fill(&mut self, descriptors: &[EmbedDescriptor], viewport: f64, slide_width: f64) {
        self.slides.clear();
        self.offset = 0.0;
        if self.shut_down || descriptors.is_empty() {
            return;
        }
        let count = slides_needed(viewport, slide_width);
        self.slides = (0..count)
            .map(|i| {
                let descriptor = i % descriptors.len();
                Slide {
                    id: i as u32,
                    descriptor,
                    src: descriptors[descriptor].src.clone(),
                    width: slide_width,
                    status: EmbedStatus::Pending,
                }
            })
            .collect();
    }

    /// Empties the strip for good. Later fills are ignored.
    pub fn shut_down(&mut self) {
        self.shut_down = true;
        self.slides.clear();
        self.playing = false;
        self.drag = None;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn slides(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    pub fn total_width(&self) -> f64 {
        self.slides.iter().map(|s| s.width).sum()
    }

    /// Moves the track by `speed * dt` while playing and not dragged.
    pub fn advance(&mut self, dt_secs: f64) {
        if !self.playing || self.drag.is_some() || self.slides.is_empty() {
            return;
        }
        self.offset -= self.speed * dt_secs.max(0.0);
        self.normalize();
    }

    /// Returns the net correction applied to the offset.
    fn normalize(&mut self) -> f64 {
        if self.slides.is_empty() {
            let correction = -self.offset;
            self.offset = 0.0;
            return correction;
        }
        let mut correction = 0.0;
        while let Some(lead) = self.slides.front() {
            let width = lead.width;
            if width <= 0.0 || self.offset > -width {
                break;
            }
            if let Some(slide) = self.slides.pop_front() {
                self.slides.push_back(slide);
            }
            self.offset += width;
            correction += width;
            self.recycled += 1;
        }
        while self.offset > 0.0 {
            let Some(slide) = self.slides.pop_back() else {
                break;
            };
            let width = slide.width;
            self.slides.push_front(slide);
            if width <= 0.0 {
                break;
            }
            self.offset -= width;
            correction -= width;
            self.recycled += 1;
        }
        if let Some(drag) = self.drag.as_mut() {
            drag.offset += correction;
        }
        correction
    }

    /// Shifts by one slide; positive shows the next slide. Play state is kept.
    pub fn nudge(&mut self, direction: i32) {
        let Some(width) = self.slides.front().map(|s| s.width) else {
            return;
        };
        self.offset -= width * f64::from(direction.signum());
        self.normalize();
    }

    pub fn toggle(&mut self) -> bool {
        if self.shut_down {
            return false;
        }
        match self.drag.as_mut() {
            Some(drag) => {
                drag.was_playing = !drag.was_playing;
                drag.was_playing
            }
            None => {
                self.playing = !self.playing;
                self.playing
            }
        }
    }

    pub fn drag_start(&mut self, x: f64) {
        if self.slides.is_empty() || self.drag.is_some() {
            return;
        }
        self.drag = Some(DragOrigin {
            x,
            offset: self.offset,
            was_playing: self.playing,
        });
        self.playing = false;
    }

    pub fn drag_move(&mut self, x: f64) {
        let Some(origin) = self.drag else {
            return;
        };
        self.offset = origin.offset + (x - origin.x);
        self.normalize();
    }

    /// Ends a drag, restoring the play state it interrupted.
    pub fn drag_end(&mut self) -> bool {
        match self.drag.take() {
            Some(origin) => {
                self.playing = origin.was_playing;
                true
            }
            None => false,
        }
    }

    /// Starts loading every pending slide that overlaps the visible area
    /// widened by `margin` px on both sides. Returns the ids that switched to
    /// loading.
    pub fn begin_loading(&mut self, viewport: f64, margin: f64) -> Vec<u32> {
        let mut left = self.offset;
        let mut started = Vec::new();
        for slide in self.slides.iter_mut() {
            let right = left + slide.width;
            if slide.status == EmbedStatus::Pending && right >= -margin && left <= viewport + margin {
                slide.status = EmbedStatus::Loading;
                started.push(slide.id);
            }
            left = right;
        }
        started
    }

    pub fn mark_ready(&mut self, id: u32) {
        if let Some(slide) = self.slides.iter_mut().find(|s| s.id == id) {
            if slide.status == EmbedStatus::Loading {
                slide.status = EmbedStatus::Ready;
            }
        }
    }

    /// Gives up on an embed that is still loading. Returns true if it failed.
    pub fn expire(&mut self, id: u32) -> bool {
        match self.slides.iter_mut().find(|s| s.id == id) {
            Some(slide) if slide.status == EmbedStatus::Loading => {
                slide.status = EmbedStatus::Failed;
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "ArrowLeft" => self.nudge(-1),
            "ArrowRight" => self.nudge(1),
            " " | "Spacebar" => {
                self.toggle();
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    fn descriptors(count: usize) -> Vec<EmbedDescriptor> {
        (0..count)
            .map(|i| EmbedDescriptor {
                src: format!("https://reviews.example.com/embed/{i}"),
            })
            .collect()
    }

    fn filled(count: usize, viewport: f64, width: f64) -> CarouselState {
        let mut state = CarouselState::new(40.0, false);
        state.fill(&descriptors(count), viewport, width);
        state
    }

    #[test]
    fn short_descriptor_list_is_cycled() {
        let state = filled(2, 600.0, 300.0);
        let order: Vec<usize> = state.slides().map(|s| s.descriptor).collect();
        assert_eq!(order, vec![0, 1, 0, 1, 0]);
        assert!(state.slides().all(|s| s.status == EmbedStatus::Pending));
    }

    #[test]
    fn fill_with_nothing_leaves_empty_track() {
        let mut state = filled(0, 600.0, 300.0);
        assert!(state.is_empty());
        state.advance(1.0);
        state.nudge(1);
        state.drag_start(10.0);
        assert!(!state.is_dragging());
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn advance_recycles_lead_slide_and_corrects_offset() {
        let mut state = filled(3, 600.0, 300.0);
        let first = state.slides().next().map(|s| s.id);
        state.advance(5.0); // 200px
        assert_eq!(state.offset(), -200.0);
        assert_eq!(state.recycled(), 0);
        state.advance(5.0); // 400px total
        assert_eq!(state.recycled(), 1);
        assert_eq!(state.offset(), -100.0);
        assert_eq!(state.slides().last().map(|s| s.id), first);
    }

    #[test]
    fn offset_stays_bounded_across_many_recycles() {
        let mut state = filled(4, 1200.0, 350.0);
        let count = state.len();
        let mut travelled = 0.0;
        for _ in 0..10_000 {
            state.advance(0.016);
            travelled += 40.0 * 0.016;
            assert!(state.offset() <= 0.0 && state.offset() > -350.0);
            assert!(state.total_width() + state.offset() >= 2.0 * 1200.0);
        }
        let recycled_width = state.recycled() as f64 * 350.0;
        assert!((state.offset() - (recycled_width - travelled)).abs() < 1e-6);
        assert_eq!(state.len(), count);
    }

    #[test]
    fn nudge_moves_one_slide_and_keeps_play_state() {
        let mut state = filled(3, 600.0, 300.0);
        state.toggle();
        assert!(!state.is_playing());

        state.nudge(1);
        assert_eq!(state.offset(), 0.0);
        assert_eq!(state.slides().next().map(|s| s.id), Some(1));

        state.nudge(-1);
        state.nudge(-1);
        assert_eq!(state.offset(), 0.0);
        assert_eq!(state.slides().next().map(|s| s.id), Some(4));
        assert!(!state.is_playing());
    }

    #[test]
    fn drag_pauses_then_restores_play_state() {
        let mut state = filled(3, 600.0, 300.0);
        state.advance(2.5); // -100
        state.drag_start(500.0);
        assert!(!state.is_playing());
        state.advance(10.0);
        assert_eq!(state.offset(), -100.0);

        state.drag_move(450.0);
        assert_eq!(state.offset(), -150.0);
        state.drag_move(200.0); // -400 -> recycled to -100
        assert_eq!(state.offset(), -100.0);
        state.drag_move(250.0);
        assert_eq!(state.offset(), -50.0);

        assert!(state.drag_end());
        assert!(state.is_playing());
        assert!(!state.drag_end());
    }

    #[test]
    fn toggle_during_drag_sets_state_resumed_on_release() {
        let mut state = filled(2, 600.0, 300.0);
        state.drag_start(0.0);
        assert!(!state.toggle());
        state.drag_end();
        assert!(!state.is_playing());
    }

    #[test]
    fn fill_after_shut_down_is_ignored() {
        let mut state = CarouselState::new(40.0, false);
        state.shut_down();
        state.fill(&descriptors(3), 800.0, 300.0);
        assert!(state.is_empty());
        assert!(!state.is_playing());
        assert!(state.begin_loading(800.0, 200.0).is_empty());
        assert!(!state.toggle());
    }

    #[test]
    fn reduced_motion_starts_paused() {
        let mut state = CarouselState::new(40.0, true);
        state.fill(&descriptors(2), 600.0, 300.0);
        assert!(!state.is_playing());
        state.advance(1.0);
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn only_slides_near_viewport_start_loading() {
        let mut state = filled(2, 400.0, 100.0);
        assert_eq!(state.len(), 9);
        // [0, 400] widened by 50 touches slides 0..=4.
        let started = state.begin_loading(400.0, 50.0);
        assert_eq!(started, vec![0, 1, 2, 3, 4]);
        assert!(state.begin_loading(400.0, 50.0).is_empty());
        assert!(state.slides().nth(1).is_some_and(|s| s.has_src()));
        assert!(state.slides().nth(6).is_some_and(|s| !s.has_src()));
    }

    #[test]
    fn filled_track_defers_offscreen_embeds() {
        let width = config::CAROUSEL_SLIDE_WIDTH;
        for viewport in [375.0, 768.0, 1200.0, 1920.0] {
            let mut state = CarouselState::new(40.0, false);
            state.fill(&descriptors(3), viewport, width);
            let started = state.begin_loading(viewport, config::EMBED_PRELOAD_PX);
            let pending = state
                .slides()
                .filter(|s| s.status == EmbedStatus::Pending)
                .count();
            assert!(pending > 0, "viewport {viewport}: nothing deferred");
            assert_eq!(started.len() + pending, state.len());
        }
    }

    #[test]
    fn scrolling_brings_deferred_embeds_into_range() {
        let mut state = filled(2, 400.0, 100.0);
        state.begin_loading(400.0, 50.0);
        state.advance(5.0);
        let started = state.begin_loading(400.0, 50.0);
        assert!(!started.is_empty());
    }

    #[test]
    fn embeds_that_never_report_fail() {
        let mut state = filled(2, 300.0, 300.0);
        state.begin_loading(300.0, 300.0);
        state.mark_ready(0);
        assert!(!state.expire(0));
        assert!(state.expire(1));
        assert!(!state.expire(1));
        assert!(!state.expire(99));
        let statuses: Vec<EmbedStatus> = state.slides().map(|s| s.status).collect();
        assert_eq!(statuses[..2], [EmbedStatus::Ready, EmbedStatus::Failed]);
    }

    #[test]
    fn keyboard_controls() {
        let mut state = filled(3, 600.0, 300.0);
        assert!(state.handle_key(" "));
        assert!(!state.is_playing());
        assert!(state.handle_key("ArrowRight"));
        assert_eq!(state.slides().next().map(|s| s.id), Some(1));
        assert!(state.handle_key("ArrowLeft"));
        assert_eq!(state.slides().next().map(|s| s.id), Some(0));
        assert!(!state.handle_key("Enter"));
    }
}
