use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_render::{request_animation_frame, AnimationFrame};
use wasm_bindgen::JsCast;
use web_sys::{KeyboardEvent, MouseEvent, PointerEvent};
use yew::prelude::*;

use crate::components::gallery::mute_videos;
use crate::config;
use crate::story::{MediaItem, MediaKind, Phase, StoryPlayer, Tick};

/// A request to show `items` starting at `start`. `serial` makes reopening
/// the same item a distinct request.
#[derive(Clone, PartialEq)]
pub struct StorySession {
    pub items: Rc<[MediaItem]>,
    pub start: usize,
    pub serial: u32,
}

#[derive(Properties, PartialEq)]
pub struct StoryViewerProps {
    pub session: Option<StorySession>,
    pub on_close: Callback<()>,
}

fn lock_page_scroll(locked: bool) {
    let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    else {
        return;
    };
    let style = body.style();
    let result = if locked {
        style.set_property("overflow", "hidden")
    } else {
        style.remove_property("overflow").map(|_| ())
    };
    if result.is_err() {
        log::debug!("Could not toggle page scroll lock");
    }
}

struct StoryDriver {
    player: RefCell<StoryPlayer>,
    frame: RefCell<Option<AnimationFrame>>,
    redraw: UseForceUpdateHandle,
    on_close: RefCell<Callback<()>>,
}

impl StoryDriver {
    fn new(redraw: UseForceUpdateHandle) -> Rc<Self> {
        Rc::new(Self {
            player: RefCell::new(StoryPlayer::new(config::STORY_ITEM_MS)),
            frame: RefCell::new(None),
            redraw,
            on_close: RefCell::new(Callback::noop()),
        })
    }

    fn open(self: &Rc<Self>, session: &StorySession) {
        let opened = self
            .player
            .borrow_mut()
            .open(session.items.clone(), session.start);
        if !opened {
            log::warn!("Story viewer opened without items");
            return;
        }
        log::debug!("Story viewer opened at item {}", session.start);
        lock_page_scroll(true);
        self.ensure_frame();
        self.redraw.force_update();
    }

    fn close(&self) {
        self.player.borrow_mut().close();
        self.frame.borrow_mut().take();
        lock_page_scroll(false);
        self.redraw.force_update();
        let on_close = self.on_close.borrow().clone();
        on_close.emit(());
    }

    fn step(self: &Rc<Self>, forward: bool) {
        {
            let mut player = self.player.borrow_mut();
            if forward {
                player.next();
            } else {
                player.prev();
            }
        }
        self.ensure_frame();
        self.redraw.force_update();
    }

    fn pause(&self) {
        self.player.borrow_mut().pause();
        self.frame.borrow_mut().take();
    }

    fn resume(self: &Rc<Self>) {
        self.player.borrow_mut().resume();
        self.ensure_frame();
    }

    fn handle_key(self: &Rc<Self>, key: &str) {
        let handled = self.player.borrow_mut().handle_key(key);
        if !handled {
            return;
        }
        if self.player.borrow().phase() == Phase::Closed {
            self.close();
        } else {
            self.ensure_frame();
            self.redraw.force_update();
        }
    }

    fn ensure_frame(self: &Rc<Self>) {
        if self.frame.borrow().is_some() || self.player.borrow().phase() != Phase::Playing {
            return;
        }
        let driver = Rc::clone(self);
        let handle = request_animation_frame(move |timestamp| driver.on_frame(timestamp));
        *self.frame.borrow_mut() = Some(handle);
    }

    fn on_frame(self: &Rc<Self>, timestamp: f64) {
        self.frame.borrow_mut().take();
        let tick = self.player.borrow_mut().tick(timestamp);
        if tick == Tick::Idle {
            return;
        }
        self.redraw.force_update();
        self.ensure_frame();
    }

    fn teardown(&self) {
        self.frame.borrow_mut().take();
        if self.player.borrow().is_open() {
            self.player.borrow_mut().close();
            lock_page_scroll(false);
        }
    }
}

fn render_media(item: &MediaItem) -> Html {
    match item.kind {
        MediaKind::Video => html! {
            <video
                src={item.src.clone()}
                poster={item.poster.clone()}
                playsinline=true
                muted=true
                autoplay=true
            />
        },
        MediaKind::Image => html! {
            <img src={item.src.clone()} loading="lazy" alt={item.alt_text().to_string()} />
        },
    }
}

#[function_component(StoryViewer)]
pub fn story_viewer(props: &StoryViewerProps) -> Html {
    let redraw = use_force_update();
    let driver = use_memo(move |_| StoryDriver::new(redraw), ());
    *driver.on_close.borrow_mut() = props.on_close.clone();

    {
        let driver = (*driver).clone();
        use_effect_with_deps(
            move |session: &Option<StorySession>| {
                if let Some(session) = session {
                    driver.open(session);
                }
                || ()
            },
            props.session.clone(),
        );
    }

    let stage_ref = use_node_ref();
    {
        let stage_ref = stage_ref.clone();
        let loads = driver.player.borrow().loads();
        use_effect_with_deps(
            move |_| {
                mute_videos(&stage_ref);
                || ()
            },
            loads,
        );
    }

    {
        let driver = (*driver).clone();
        use_effect_with_deps(
            move |_| {
                let listener = web_sys::window()
                    .and_then(|w| w.document())
                    .map(|document| {
                        let driver = driver.clone();
                        EventListener::new(&document, "keydown", move |event| {
                            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                                driver.handle_key(&event.key());
                            }
                        })
                    });
                move || {
                    drop(listener);
                    driver.teardown();
                }
            },
            (),
        );
    }

    let player = driver.player.borrow();
    let Some(view) = player.view() else {
        return html! { <div class="story-viewer" hidden=true></div> };
    };
    let item = view.current();

    let on_prev = {
        let driver = (*driver).clone();
        Callback::from(move |_: MouseEvent| driver.step(false))
    };
    let on_next = {
        let driver = (*driver).clone();
        Callback::from(move |_: MouseEvent| driver.step(true))
    };
    let on_close = {
        let driver = (*driver).clone();
        Callback::from(move |_: MouseEvent| driver.close())
    };
    let on_pointer_down = {
        let driver = (*driver).clone();
        Callback::from(move |_: PointerEvent| driver.pause())
    };
    let on_pointer_release = {
        let driver = (*driver).clone();
        Callback::from(move |_: PointerEvent| driver.resume())
    };

    html! {
        <div
            class="story-viewer show"
            role="dialog"
            aria-modal="true"
            onpointerdown={on_pointer_down}
            onpointerup={on_pointer_release.clone()}
            onpointercancel={on_pointer_release.clone()}
            onpointerleave={on_pointer_release}
        >
            <style>
                {r#"
                    .story-viewer {
                        position: fixed;
                        inset: 0;
                        z-index: 1000;
                        background: rgba(0, 0, 0, 0.92);
                        display: flex;
                        flex-direction: column;
                        touch-action: none;
                    }
                    .story-viewer .progress {
                        display: flex;
                        gap: 4px;
                        padding: 12px 16px 0;
                    }
                    .story-viewer .seg {
                        flex: 1;
                        height: 3px;
                        background: rgba(255, 255, 255, 0.3);
                        border-radius: 2px;
                        overflow: hidden;
                    }
                    .story-viewer .seg.fill {
                        background: #fff;
                        transform-origin: left center;
                    }
                    .story-viewer .stage {
                        flex: 1;
                        display: flex;
                        align-items: center;
                        justify-content: center;
                        position: relative;
                    }
                    .story-viewer .frame img,
                    .story-viewer .frame video {
                        max-width: 100vw;
                        max-height: 80vh;
                        object-fit: contain;
                    }
                    .story-viewer .zone {
                        position: absolute;
                        top: 48px;
                        bottom: 80px;
                        width: 30%;
                        background: transparent;
                        border: none;
                        cursor: pointer;
                    }
                    .story-viewer .zone.prev { left: 0; }
                    .story-viewer .zone.next { right: 0; }
                    .story-viewer .close {
                        position: absolute;
                        top: 20px;
                        right: 16px;
                        font-size: 1.6rem;
                        color: #fff;
                        background: none;
                        border: none;
                        cursor: pointer;
                    }
                    .story-viewer .caption-row {
                        display: flex;
                        justify-content: space-between;
                        align-items: center;
                        padding: 12px 16px 24px;
                        color: #eee;
                    }
                    .story-viewer .ext { color: #f5b041; }
                "#}
            </style>
            <div class="progress">
                { for (0..view.items.len()).map(|i| html! {
                    <div class="seg">
                        <div
                            class="seg fill"
                            style={format!("transform: scaleX({:.4})", player.segment_fill(i))}
                        ></div>
                    </div>
                }) }
            </div>
            <div class="stage" ref={stage_ref}>
                <div class="frame" key={player.loads().to_string()}>
                    { render_media(item) }
                </div>
            </div>
            <button class="zone prev" aria-label="Previous" onclick={on_prev}></button>
            <button class="zone next" aria-label="Next" onclick={on_next}></button>
            <button class="close" aria-label="Close" onclick={on_close}>{"✕"}</button>
            <div class="caption-row">
                <span class="caption">{ item.caption.clone().unwrap_or_default() }</span>
                <a
                    class="ext"
                    href={item.link.clone()}
                    hidden={item.link.is_none()}
                    target="_blank"
                    rel="noopener noreferrer"
                >
                    {"View project"}
                </a>
            </div>
        </div>
    }
}
