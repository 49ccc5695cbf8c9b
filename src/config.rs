/// Left in place until the n8n workflow is published.
pub const WEBHOOK_PLACEHOLDER: &str = "{N8N_WEBHOOK_URL}";

pub const CONTACT_EMAIL: &str = "homeheroremodelingllc@gmail.com";
pub const THANK_YOU_URL: &str = "/pages/thank-you.html";
pub const GA_MEASUREMENT_ID: &str = "";

pub const STORY_ITEM_MS: f64 = 5000.0;
pub const FORM_DWELL_MS: i64 = 3000;
pub const SUBMIT_UNLOCK_MS: u32 = 3000;
pub const EMBED_TIMEOUT_MS: u32 = 5000;
pub const HEADER_SHRINK_AT: f64 = 10.0;

pub const CAROUSEL_SPEED_PX_PER_SEC: f64 = 40.0;
pub const CAROUSEL_SLIDE_WIDTH: f64 = 360.0;
/// Embeds start loading once their slide is this close to the viewport.
pub const EMBED_PRELOAD_PX: f64 = 200.0;

pub fn get_webhook_url() -> &'static str {
    option_env!("ESTIMATE_WEBHOOK_URL").unwrap_or(WEBHOOK_PLACEHOLDER)
}

/// Served next to the app by trunk, so one path covers every build profile.
pub fn get_reviews_url() -> &'static str {
    "/reviews.json"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reviews_are_fetched_from_the_page_origin() {
        assert!(get_reviews_url().starts_with('/'));
        assert!(!get_reviews_url().contains("://"));
    }
}
