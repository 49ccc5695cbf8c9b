use std::rc::Rc;

use yew::prelude::*;

use crate::components::estimate_form::EstimateForm;
use crate::components::gallery::{media_items, Gallery, GalleryEntry};
use crate::components::reveal::Reveal;
use crate::components::reviews_carousel::ReviewsCarousel;
use crate::components::site_header::{SiteFooter, SiteHeader};
use crate::components::story_viewer::{StorySession, StoryViewer};

const GALLERY: &[GalleryEntry] = &[
    GalleryEntry {
        kind: "video",
        src: "/assets/work/kitchen-walkthrough.mp4",
        poster: "/assets/work/kitchen-walkthrough.jpg",
        caption: "Kitchen remodel walkthrough",
        link: "",
    },
    GalleryEntry {
        kind: "image",
        src: "/assets/work/bath-tile.jpg",
        poster: "",
        caption: "Walk-in shower with floor-to-ceiling tile",
        link: "",
    },
    GalleryEntry {
        kind: "image",
        src: "/assets/work/basement-finish.jpg",
        poster: "",
        caption: "Finished basement family room",
        link: "",
    },
    GalleryEntry {
        kind: "video",
        src: "/assets/work/deck-build.mp4",
        poster: "/assets/work/deck-build.jpg",
        caption: "Deck build, start to finish",
        link: "https://www.instagram.com/homeheroremodeling/",
    },
    GalleryEntry {
        kind: "image",
        src: "/assets/work/lvp-flooring.jpg",
        poster: "",
        caption: "Luxury vinyl plank throughout",
        link: "",
    },
];

#[function_component(Landing)]
pub fn landing() -> Html {
    let items = use_memo(|_| media_items(GALLERY), ());
    let session = use_state(|| None::<StorySession>);
    let serial = use_mut_ref(|| 0u32);

    let on_open = {
        let items = items.clone();
        let session = session.clone();
        Callback::from(move |start: usize| {
            let mut serial = serial.borrow_mut();
            *serial = serial.wrapping_add(1);
            session.set(Some(StorySession {
                items: Rc::clone(&*items),
                start,
                serial: *serial,
            }));
        })
    };
    let on_close = {
        let session = session.clone();
        Callback::from(move |_: ()| session.set(None))
    };

    html! {
        <div class="landing-page" id="top">
            <SiteHeader />

            <section class="hero">
                <h1>{"Remodeling done right, on schedule."}</h1>
                <p class="hero-subtitle">
                    {"Kitchens, bathrooms, basements and floors. Licensed, insured and local."}
                </p>
                <a class="hero-cta" href="#estimate">{"Get a free estimate"}</a>
            </section>

            <Reveal id="services" class="services">
                <h2>{"What we do"}</h2>
                <div class="features-grid">
                    <div class="feature-item">
                        <h3>{"Kitchens"}</h3>
                        <p>{"Cabinets, counters, backsplashes and full layout changes."}</p>
                    </div>
                    <div class="feature-item">
                        <h3>{"Bathrooms"}</h3>
                        <p>{"Tub-to-shower conversions, tile and vanities."}</p>
                    </div>
                    <div class="feature-item">
                        <h3>{"Basements"}</h3>
                        <p>{"Framing, drywall, egress and finishing."}</p>
                    </div>
                    <div class="feature-item">
                        <h3>{"Flooring"}</h3>
                        <p>{"Hardwood, tile and luxury vinyl plank."}</p>
                    </div>
                </div>
            </Reveal>

            <Reveal id="gallery" class="gallery">
                <h2>{"Recent work"}</h2>
                <p>{"Tap any project to watch the story."}</p>
                <Gallery items={(*items).clone()} {on_open} />
            </Reveal>

            <Reveal id="reviews" class="reviews">
                <h2>{"What neighbors say"}</h2>
                <ReviewsCarousel />
            </Reveal>

            <Reveal id="estimate" class="estimate">
                <h2>{"Request your free estimate"}</h2>
                <p>{"Tell us a little about the project and we'll call you back within one business day."}</p>
                <EstimateForm />
            </Reveal>

            <SiteFooter />

            <StoryViewer session={(*session).clone()} {on_close} />
        </div>
    }
}
