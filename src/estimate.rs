use std::cell::Cell;

use chrono::{DateTime, SecondsFormat, Utc};
use gloo_net::http::Request;
use serde::Serialize;
use thiserror::Error;

use crate::config;

pub const SUBMISSION_SOURCE: &str = "website-landing";

/// Raw values read from the estimate form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormFields {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub project_type: String,
    pub message: String,
    /// Honeypot, hidden from people.
    pub website: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Utm {
    pub source: String,
    pub medium: String,
    pub campaign: String,
}

impl Utm {
    /// Reads `utm_source`, `utm_medium` and `utm_campaign` from a query
    /// string, with or without its leading `?`.
    pub fn from_query(query: &str) -> Self {
        let mut found: [Option<String>; 3] = Default::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "utm_source" => &mut found[0],
                "utm_medium" => &mut found[1],
                "utm_campaign" => &mut found[2],
                _ => continue,
            };
            // The first occurrence wins, even when it is empty.
            slot.get_or_insert_with(|| value.into_owned());
        }
        let [source, medium, campaign] = found.map(Option::unwrap_or_default);
        Utm {
            source,
            medium,
            campaign,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub source: String,
    pub timestamp: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub project_type: String,
    pub message: String,
    pub utm: Utm,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("")]
    Honeypot,
    #[error("Please provide name and phone.")]
    MissingRequired,
    #[error("Please wait a moment before submitting.")]
    TooFast,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("webhook not configured")]
    NotConfigured,
    #[error("webhook responded with status {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Network(String),
    #[error("could not encode submission: {0}")]
    Encode(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// A submission is already in flight.
    Busy,
    Rejected(Rejection),
    Delivered,
    Fallback { mailto: String, error: SubmitError },
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[allow(async_fn_in_trait)]
pub trait LeadSink {
    async fn deliver(&self, submission: &FormSubmission) -> Result<(), SubmitError>;
}

pub fn webhook_configured(url: &str) -> bool {
    url.starts_with("http")
}

/// Posts submissions as JSON to the configured webhook.
pub struct WebhookSink {
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_config() -> Self {
        Self::new(config::get_webhook_url())
    }
}

impl LeadSink for WebhookSink {
    async fn deliver(&self, submission: &FormSubmission) -> Result<(), SubmitError> {
        if !webhook_configured(&self.url) {
            return Err(SubmitError::NotConfigured);
        }
        let response = Request::post(&self.url)
            .json(submission)
            .map_err(|e| SubmitError::Encode(e.to_string()))?
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;
        if response.ok() {
            Ok(())
        } else {
            Err(SubmitError::Status(response.status()))
        }
    }
}

/// Prefilled mail link used when the webhook can't take the request.
pub fn mailto_fallback(address: &str, fields: &FormFields) -> String {
    let body = format!(
        "Name: {}\nPhone: {}\nEmail: {}\nProject: {}\nMessage: {}",
        fields.name, fields.phone, fields.email, fields.project_type, fields.message
    );
    format!(
        "mailto:{}?subject=Estimate%20Request&body={}",
        address,
        urlencoding::encode(&body)
    )
}

pub struct EstimateController<S, C> {
    sink: S,
    clock: C,
    opened_at: DateTime<Utc>,
    page_query: String,
    in_flight: Cell<bool>,
}

impl<S: LeadSink, C: Clock> EstimateController<S, C> {
    /// The dwell time counts from construction.
    pub fn new(sink: S, clock: C, page_query: impl Into<String>) -> Self {
        let opened_at = clock.now();
        Self {
            sink,
            clock,
            opened_at,
            page_query: page_query.into(),
            in_flight: Cell::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.get()
    }

    /// Runs the gates in order and stops at the first one that fails.
    pub fn check(&self, fields: &FormFields) -> Result<(), Rejection> {
        if !fields.website.is_empty() {
            return Err(Rejection::Honeypot);
        }
        if fields.name.trim().is_empty() || fields.phone.trim().is_empty() {
            return Err(Rejection::MissingRequired);
        }
        let dwell = self.clock.now() - self.opened_at;
        if dwell.num_milliseconds() < config::FORM_DWELL_MS {
            return Err(Rejection::TooFast);
        }
        Ok(())
    }

    pub fn build_submission(&self, fields: &FormFields) -> FormSubmission {
        FormSubmission {
            source: SUBMISSION_SOURCE.to_string(),
            timestamp: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            name: fields.name.trim().to_string(),
            phone: fields.phone.trim().to_string(),
            email: fields.email.trim().to_string(),
            project_type: fields.project_type.clone(),
            message: fields.message.clone(),
            utm: Utm::from_query(&self.page_query),
        }
    }

    pub async fn submit(&self, fields: FormFields) -> SubmitOutcome {
        if self.in_flight.get() {
            return SubmitOutcome::Busy;
        }
        if let Err(rejection) = self.check(&fields) {
            return SubmitOutcome::Rejected(rejection);
        }

        let submission = self.build_submission(&fields);
        self.in_flight.set(true);
        let result = self.sink.deliver(&submission).await;
        self.in_flight.set(false);

        match result {
            Ok(()) => {
                log::info!("Estimate request delivered");
                SubmitOutcome::Delivered
            }
            Err(error) => {
                log::warn!("Submit failed: {}", error);
                let trimmed = FormFields {
                    name: submission.name,
                    phone: submission.phone,
                    email: submission.email,
                    ..fields
                };
                SubmitOutcome::Fallback {
                    mailto: mailto_fallback(config::CONTACT_EMAIL, &trimmed),
                    error,
                }
            }
        }
    }
}
