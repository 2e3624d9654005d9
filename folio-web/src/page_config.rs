//! Runtime configuration embedded in generated pages
//!
//! These types mirror `folio::page_config` but are defined here to keep the
//! native site generator's dependencies out of the WASM build.

use serde::{Deserialize, Serialize};

use crate::gemini::DEFAULT_MODEL;
use crate::session::DEFAULT_GREETING;

/// Id of the `<script type="application/json">` element holding the config
pub const CONFIG_ELEMENT_ID: &str = "folio-config";

/// Everything the browser widgets need at runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Context the session is seeded with
    #[serde(default)]
    pub preamble: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            preamble: String::new(),
            greeting: default_greeting(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
