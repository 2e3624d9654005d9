//! Environment configuration
//!
//! Read once at startup and never mutated. Every variable is optional: a gap
//! only disables the widget that needs it.

/// Model used when `GEMINI_MODEL` is not set
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const SITE_URL: &str = "FOLIO_SITE_URL";

/// Secrets and settings passed to the generated pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// Canonical base URL without a trailing slash
    pub site_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            site_url: None,
        }
    }
}

impl SiteConfig {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup; blank values count as absent
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            gemini_api_key: get(GEMINI_API_KEY),
            gemini_model: get(GEMINI_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            telegram_bot_token: get(TELEGRAM_BOT_TOKEN),
            telegram_chat_id: get(TELEGRAM_CHAT_ID),
            site_url: get(SITE_URL).map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    pub fn chat_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn contact_enabled(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    /// Required variables that are not set
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.gemini_api_key.is_none() {
            missing.push(GEMINI_API_KEY);
        }
        if self.telegram_bot_token.is_none() {
            missing.push(TELEGRAM_BOT_TOKEN);
        }
        if self.telegram_chat_id.is_none() {
            missing.push(TELEGRAM_CHAT_ID);
        }
        missing
    }

    /// Warn about every gap; generation continues regardless
    pub fn log_gaps(&self) {
        for variable in self.missing() {
            let widget = if variable == GEMINI_API_KEY {
                "chat"
            } else {
                "contact form"
            };
            tracing::warn!(
                variable,
                "{variable} is not set; the {widget} will show a notice instead"
            );
        }
    }
}
