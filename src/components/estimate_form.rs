use gloo_timers::callback::Timeout;
use wasm_bindgen_futures::spawn_local;
use web_sys::{FormData, HtmlFormElement};
use yew::prelude::*;

use crate::config;
use crate::estimate::{
    EstimateController, FormFields, Rejection, SubmitOutcome, SystemClock, WebhookSink,
};

#[derive(Clone, PartialEq)]
enum FormStatus {
    Notice(String),
    Delivered,
    Fallback(String),
}

fn read_fields(form: &HtmlFormElement) -> Option<FormFields> {
    let data = FormData::new_with_form(form).ok()?;
    let field = |name: &str| data.get(name).as_string().unwrap_or_default();
    Some(FormFields {
        name: field("name"),
        phone: field("phone"),
        email: field("email"),
        project_type: field("projectType"),
        message: field("message"),
        website: field("website"),
    })
}

fn page_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

#[function_component(EstimateForm)]
pub fn estimate_form() -> Html {
    let form_ref = use_node_ref();
    let status = use_state(|| None::<FormStatus>);
    let submit_enabled = use_state(|| false);
    let controller = use_memo(
        |_| EstimateController::new(WebhookSink::from_config(), SystemClock, page_query()),
        (),
    );

    // Unlock the button even if nothing else does.
    {
        let submit_enabled = submit_enabled.clone();
        use_effect_with_deps(
            move |_| {
                let unlock = Timeout::new(config::SUBMIT_UNLOCK_MS, move || {
                    submit_enabled.set(true);
                });
                move || drop(unlock)
            },
            (),
        );
    }

    let onsubmit = {
        let form_ref = form_ref.clone();
        let status = status.clone();
        let submit_enabled = submit_enabled.clone();
        let controller = controller.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            status.set(None);
            let Some(form) = form_ref.cast::<HtmlFormElement>() else {
                return;
            };
            let Some(fields) = read_fields(&form) else {
                log::warn!("Could not read estimate form");
                return;
            };
            if controller.check(&fields).is_ok() && !controller.is_submitting() {
                submit_enabled.set(false);
            }

            let status = status.clone();
            let submit_enabled = submit_enabled.clone();
            let controller = controller.clone();
            spawn_local(async move {
                match controller.submit(fields).await {
                    SubmitOutcome::Busy | SubmitOutcome::Rejected(Rejection::Honeypot) => {}
                    SubmitOutcome::Rejected(rejection) => {
                        status.set(Some(FormStatus::Notice(rejection.to_string())));
                    }
                    SubmitOutcome::Delivered => {
                        status.set(Some(FormStatus::Delivered));
                        form.reset();
                        submit_enabled.set(true);
                    }
                    SubmitOutcome::Fallback { mailto, error } => {
                        log::debug!("Showing mail fallback after: {}", error);
                        status.set(Some(FormStatus::Fallback(mailto)));
                        submit_enabled.set(true);
                    }
                }
            });
        })
    };

    let status_html = match &*status {
        None => html! {},
        Some(FormStatus::Notice(text)) => html! { { text.clone() } },
        Some(FormStatus::Delivered) => html! {
            <>
                {"Thanks! We'll be in touch shortly. "}
                <a class="text-link" href={config::THANK_YOU_URL}>{"Continue"}</a>
            </>
        },
        Some(FormStatus::Fallback(mailto)) => html! {
            <>
                {"There was a problem sending your request. You can email us directly: "}
                <a class="text-link" href={mailto.clone()}>{ config::CONTACT_EMAIL }</a>
            </>
        },
    };

    html! {
        <form id="estimate-form" ref={form_ref} {onsubmit} novalidate=true>
            <style>
                {r#"
                    #estimate-form {
                        display: grid;
                        gap: 12px;
                        max-width: 560px;
                    }
                    #estimate-form input,
                    #estimate-form select,
                    #estimate-form textarea {
                        padding: 0.75rem;
                        border-radius: 8px;
                        border: 1px solid #ccc;
                        font: inherit;
                    }
                    #estimate-form .hp {
                        position: absolute;
                        left: -10000px;
                        width: 1px;
                        height: 1px;
                        overflow: hidden;
                    }
                    #submitBtn:disabled {
                        opacity: 0.6;
                        cursor: not-allowed;
                    }
                    #form-status {
                        font-size: 0.95rem;
                    }
                "#}
            </style>
            <input name="name" type="text" placeholder="Your name" autocomplete="name" required=true />
            <input name="phone" type="tel" placeholder="Phone" autocomplete="tel" required=true />
            <input name="email" type="email" placeholder="Email (optional)" autocomplete="email" />
            <select name="projectType">
                <option value="Kitchen">{"Kitchen"}</option>
                <option value="Bathroom">{"Bathroom"}</option>
                <option value="Flooring">{"Flooring"}</option>
                <option value="Basement">{"Basement"}</option>
                <option value="Other">{"Other"}</option>
            </select>
            <textarea name="message" rows="4" placeholder="Tell us about your project"></textarea>
            <div class="hp" aria-hidden="true">
                <label>{"Website"}<input name="website" type="text" tabindex="-1" autocomplete="off" /></label>
            </div>
            <button id="submitBtn" type="submit" class="hero-cta" disabled={!*submit_enabled}>
                {"Get my free estimate"}
            </button>
            <p id="form-status" role="status" hidden={status.is_none()}>
                { status_html }
            </p>
        </form>
    }
}
