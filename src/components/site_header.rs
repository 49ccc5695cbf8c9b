use chrono::Datelike;
use gloo_events::EventListener;
use yew::prelude::*;

use crate::config;

pub fn header_shrunk(scroll_y: f64) -> bool {
    scroll_y > config::HEADER_SHRINK_AT
}

#[function_component(SiteHeader)]
pub fn site_header() -> Html {
    let shrunk = use_state_eq(|| false);

    {
        let shrunk = shrunk.clone();
        use_effect_with_deps(
            move |_| {
                let listener = web_sys::window().map(|window| {
                    let update = {
                        let window = window.clone();
                        move || shrunk.set(header_shrunk(window.scroll_y().unwrap_or(0.0)))
                    };
                    update();
                    EventListener::new(&window, "scroll", move |_| update())
                });
                move || drop(listener)
            },
            (),
        );
    }

    html! {
        <header class={classes!("site-header", (*shrunk).then(|| "shrink"))}>
            <div class="header-content">
                <a class="logo" href="#top">{"Home Hero Remodeling"}</a>
                <nav class="header-nav">
                    <a href="#services">{"Services"}</a>
                    <a href="#gallery">{"Our Work"}</a>
                    <a href="#reviews">{"Reviews"}</a>
                    <a class="header-cta" href="#estimate">{"Free Estimate"}</a>
                </nav>
            </div>
        </header>
    }
}

#[function_component(SiteFooter)]
pub fn site_footer() -> Html {
    let year = chrono::Local::now().year();

    html! {
        <footer class="site-footer">
            <p>
                {"© "}<span id="year">{ year.to_string() }</span>{" Home Hero Remodeling LLC"}
            </p>
            <p>
                <a href={format!("mailto:{}", config::CONTACT_EMAIL)}>{ config::CONTACT_EMAIL }</a>
            </p>
        </footer>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_shrinks_past_threshold() {
        assert!(!header_shrunk(0.0));
        assert!(!header_shrunk(10.0));
        assert!(header_shrunk(10.5));
        assert!(header_shrunk(800.0));
    }
}
