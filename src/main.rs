use log::{info, Level};
use yew::prelude::*;

mod carousel;
mod config;
mod estimate;
mod story;

mod components {
    pub mod estimate_form;
    pub mod gallery;
    pub mod reveal;
    pub mod reviews_carousel;
    pub mod site_header;
    pub mod story_viewer;
}
mod pages {
    pub mod landing;
}

use pages::landing::Landing;

/// GA4 hook. Stays a no-op until a measurement id is configured.
fn init_analytics(measurement_id: &str) {
    if measurement_id.is_empty() {
        return;
    }
    gloo_console::info!("GA init placeholder", measurement_id);
}

#[function_component]
fn App() -> Html {
    html! { <Landing /> }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    init_analytics(config::GA_MEASUREMENT_ID);

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
