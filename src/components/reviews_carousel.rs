use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_net::http::Request;
use gloo_render::{request_animation_frame, AnimationFrame};
use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, KeyboardEvent, MouseEvent, PointerEvent};
use yew::prelude::*;

use crate::carousel::{CarouselState, EmbedDescriptor, EmbedStatus, Slide};
use crate::config;

/// Longest frame gap fed into the animation, so a backgrounded tab does not
/// jump the strip when it comes back.
const MAX_FRAME_MS: f64 = 100.0;

fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

fn measure_viewport(node: &NodeRef) -> f64 {
    let width = node
        .cast::<Element>()
        .map(|el| f64::from(el.client_width()))
        .unwrap_or(0.0);
    if width > 0.0 {
        return width;
    }
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
        .unwrap_or(0.0)
}

struct CarouselDriver {
    state: RefCell<CarouselState>,
    frame: RefCell<Option<AnimationFrame>>,
    last_tick: Cell<Option<f64>>,
    embed_timers: RefCell<HashMap<u32, Timeout>>,
    viewport: Cell<f64>,
    redraw: UseForceUpdateHandle,
}

impl CarouselDriver {
    fn new(redraw: UseForceUpdateHandle, reduced_motion: bool) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(CarouselState::new(
                config::CAROUSEL_SPEED_PX_PER_SEC,
                reduced_motion,
            )),
            frame: RefCell::new(None),
            last_tick: Cell::new(None),
            embed_timers: RefCell::new(HashMap::new()),
            viewport: Cell::new(0.0),
            redraw,
        })
    }

    fn load(self: &Rc<Self>, descriptors: &[EmbedDescriptor], viewport: f64) {
        if self.state.borrow().is_shut_down() {
            log::debug!("Review embeds arrived after the carousel was removed");
            return;
        }
        self.viewport.set(viewport);
        self.state
            .borrow_mut()
            .fill(descriptors, viewport, config::CAROUSEL_SLIDE_WIDTH);
        {
            let state = self.state.borrow();
            log::info!(
                "Reviews carousel filled with {} slides ({}px) from {} embeds",
                state.len(),
                state.total_width(),
                descriptors.len()
            );
        }
        self.after_input();
    }

    /// Starts embeds that came near the viewport and redraws.
    fn refresh(self: &Rc<Self>) {
        let started = self
            .state
            .borrow_mut()
            .begin_loading(self.viewport.get(), config::EMBED_PRELOAD_PX);
        for id in started {
            let driver = Rc::clone(self);
            let timer = Timeout::new(config::EMBED_TIMEOUT_MS, move || driver.expire(id));
            self.embed_timers.borrow_mut().insert(id, timer);
        }
        self.redraw.force_update();
    }

    fn expire(&self, id: u32) {
        if self.state.borrow_mut().expire(id) {
            log::warn!("Review embed {} did not load in time", id);
            self.redraw.force_update();
        }
    }

    fn embed_loaded(&self, id: u32) {
        self.embed_timers.borrow_mut().remove(&id);
        self.state.borrow_mut().mark_ready(id);
        self.redraw.force_update();
    }

    fn ensure_frame(self: &Rc<Self>) {
        if self.frame.borrow().is_some() {
            return;
        }
        {
            let state = self.state.borrow();
            if !state.is_playing() || state.is_dragging() || state.is_empty() {
                return;
            }
        }
        let driver = Rc::clone(self);
        let handle = request_animation_frame(move |timestamp| driver.on_frame(timestamp));
        *self.frame.borrow_mut() = Some(handle);
    }

    fn on_frame(self: &Rc<Self>, timestamp: f64) {
        self.frame.borrow_mut().take();
        let dt_ms = match self.last_tick.get() {
            Some(prev) => (timestamp - prev).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_tick.set(Some(timestamp));
        self.state.borrow_mut().advance(dt_ms / 1000.0);
        self.refresh();
        self.ensure_frame();
    }

    fn stop_frames(&self) {
        self.frame.borrow_mut().take();
        self.last_tick.set(None);
    }

    fn after_input(self: &Rc<Self>) {
        let running = {
            let state = self.state.borrow();
            state.is_playing() && !state.is_dragging()
        };
        if running {
            self.ensure_frame();
        } else {
            self.stop_frames();
        }
        self.refresh();
    }

    fn toggle(self: &Rc<Self>) {
        let (playing, recycled) = {
            let mut state = self.state.borrow_mut();
            (state.toggle(), state.recycled())
        };
        log::debug!("Reviews carousel playing: {} ({} slides recycled)", playing, recycled);
        self.after_input();
    }

    fn nudge(self: &Rc<Self>, direction: i32) {
        self.state.borrow_mut().nudge(direction);
        self.after_input();
    }

    fn drag_start(self: &Rc<Self>, x: f64) {
        self.state.borrow_mut().drag_start(x);
        self.after_input();
    }

    fn drag_move(self: &Rc<Self>, x: f64) {
        if !self.state.borrow().is_dragging() {
            return;
        }
        self.state.borrow_mut().drag_move(x);
        self.refresh();
    }

    fn drag_end(self: &Rc<Self>) {
        if self.state.borrow_mut().drag_end() {
            self.after_input();
        }
    }

    fn handle_key(self: &Rc<Self>, key: &str) -> bool {
        let handled = self.state.borrow_mut().handle_key(key);
        if handled {
            self.after_input();
        }
        handled
    }

    fn teardown(&self) {
        self.state.borrow_mut().shut_down();
        self.stop_frames();
        self.embed_timers.borrow_mut().clear();
    }
}

fn render_slide(driver: &Rc<CarouselDriver>, slide: &Slide) -> Html {
    let body = if slide.status == EmbedStatus::Failed {
        html! {
            <div class="review-fallback">
                <p>{"This review couldn't load here."}</p>
                <a class="text-link" href={slide.src.clone()} target="_blank" rel="noopener noreferrer">
                    {"Open review"}
                </a>
            </div>
        }
    } else if slide.has_src() {
        let id = slide.id;
        let driver = Rc::clone(driver);
        let onload = Callback::from(move |_: Event| driver.embed_loaded(id));
        html! {
            <iframe
                src={slide.src.clone()}
                title="Customer review"
                {onload}
            ></iframe>
        }
    } else {
        html! { <div class="review-placeholder"></div> }
    };
    html! {
        <div
            class="review-slide"
            key={slide.id.to_string()}
            data-embed={slide.descriptor.to_string()}
            style={format!("width: {}px", slide.width)}
        >
            { body }
        </div>
    }
}

#[function_component(ReviewsCarousel)]
pub fn reviews_carousel() -> Html {
    let viewport_ref = use_node_ref();
    let redraw = use_force_update();
    let driver = use_memo(
        move |_| CarouselDriver::new(redraw, prefers_reduced_motion()),
        (),
    );

    {
        let driver = (*driver).clone();
        let viewport_ref = viewport_ref.clone();
        use_effect_with_deps(
            move |_| {
                {
                    let driver = driver.clone();
                    spawn_local(async move {
                        let descriptors = match Request::get(config::get_reviews_url()).send().await {
                            Ok(response) if response.ok() => {
                                match response.json::<Vec<EmbedDescriptor>>().await {
                                    Ok(descriptors) => descriptors,
                                    Err(e) => {
                                        log::warn!("Failed to parse review embeds: {}", e);
                                        return;
                                    }
                                }
                            }
                            Ok(response) => {
                                log::warn!("Review embeds request failed with status {}", response.status());
                                return;
                            }
                            Err(e) => {
                                log::warn!("Review embeds request failed: {}", e);
                                return;
                            }
                        };
                        driver.load(&descriptors, measure_viewport(&viewport_ref));
                    });
                }
                move || driver.teardown()
            },
            (),
        );
    }

    let on_prev = {
        let driver = (*driver).clone();
        Callback::from(move |_: MouseEvent| driver.nudge(-1))
    };
    let on_next = {
        let driver = (*driver).clone();
        Callback::from(move |_: MouseEvent| driver.nudge(1))
    };
    let on_toggle = {
        let driver = (*driver).clone();
        Callback::from(move |_: MouseEvent| driver.toggle())
    };
    let on_pointer_down = {
        let driver = (*driver).clone();
        Callback::from(move |e: PointerEvent| driver.drag_start(f64::from(e.client_x())))
    };
    let on_pointer_move = {
        let driver = (*driver).clone();
        Callback::from(move |e: PointerEvent| driver.drag_move(f64::from(e.client_x())))
    };
    let on_pointer_end = {
        let driver = (*driver).clone();
        Callback::from(move |_: PointerEvent| driver.drag_end())
    };
    let on_key_down = {
        let driver = (*driver).clone();
        Callback::from(move |e: KeyboardEvent| {
            if driver.handle_key(&e.key()) {
                e.prevent_default();
            }
        })
    };

    let state = driver.state.borrow();
    let track_style = format!("transform: translateX({:.2}px)", state.offset());
    let toggle_label = if state.is_playing() { "Pause reviews" } else { "Play reviews" };

    html! {
        <div class="reviews-carousel">
            <style>
                {r#"
                    .reviews-viewport {
                        overflow: hidden;
                        touch-action: pan-y;
                        cursor: grab;
                    }
                    .reviews-viewport:focus-visible {
                        outline: 2px solid #f5b041;
                    }
                    .reviews-track {
                        display: flex;
                        will-change: transform;
                    }
                    .reviews-track.dragging {
                        cursor: grabbing;
                    }
                    .reviews-track.dragging iframe {
                        pointer-events: none;
                    }
                    .review-slide {
                        flex: 0 0 auto;
                        box-sizing: border-box;
                        padding: 0 8px;
                        height: 420px;
                    }
                    .review-slide iframe,
                    .review-placeholder,
                    .review-fallback {
                        width: 100%;
                        height: 100%;
                        border: none;
                        border-radius: 12px;
                        background: #f4f1ec;
                    }
                    .review-fallback {
                        display: flex;
                        flex-direction: column;
                        align-items: center;
                        justify-content: center;
                        gap: 8px;
                    }
                    .reviews-controls {
                        display: flex;
                        justify-content: center;
                        gap: 12px;
                        margin-top: 12px;
                    }
                "#}
            </style>
            <div
                class="reviews-viewport"
                ref={viewport_ref}
                tabindex="0"
                role="region"
                aria-label="Customer reviews"
                onkeydown={on_key_down}
                onpointerdown={on_pointer_down}
                onpointermove={on_pointer_move}
                onpointerup={on_pointer_end.clone()}
                onpointercancel={on_pointer_end.clone()}
                onpointerleave={on_pointer_end}
            >
                <div
                    class={classes!("reviews-track", state.is_dragging().then(|| "dragging"))}
                    style={track_style}
                >
                    { for state.slides().map(|slide| render_slide(&driver, slide)) }
                </div>
            </div>
            <div class="reviews-controls">
                <button class="carousel-prev" aria-label="Previous review" onclick={on_prev}>{"‹"}</button>
                <button class="carousel-toggle" aria-label={toggle_label} onclick={on_toggle}>
                    { if state.is_playing() { "❚❚" } else { "▶" } }
                </button>
                <button class="carousel-next" aria-label="Next review" onclick={on_next}>{"›"}</button>
            </div>
        </div>
    }
}
