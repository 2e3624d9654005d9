//! Runtime configuration handed to the browser widgets
//!
//! Serialized into every page as `<script type="application/json"
//! id="folio-config">`; the `folio-web` crate reads the same shape back.

use serde::Serialize;

use crate::chat_context::assemble_preamble;
use crate::config::SiteConfig;
use crate::content::SiteContent;

pub const CONFIG_ELEMENT_ID: &str = "folio-config";

/// First assistant turn shown in the chat widget
pub const DEFAULT_GREETING: &str = "Hi! I'm here to help you learn about this portfolio. Ask me anything about skills, projects, or experience!";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageConfig {
    pub chat: ChatConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub preamble: String,
    pub greeting: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl PageConfig {
    pub fn new(config: &SiteConfig, content: &SiteContent) -> Self {
        Self {
            chat: ChatConfig {
                api_key: config.gemini_api_key.clone(),
                model: config.gemini_model.clone(),
                preamble: assemble_preamble(content),
                greeting: DEFAULT_GREETING.to_string(),
            },
            contact: ContactConfig {
                bot_token: config.telegram_bot_token.clone(),
                chat_id: config.telegram_chat_id.clone(),
            },
        }
    }

    /// JSON safe to place inside a `<script>` element
    ///
    /// `<`, `>` and `&` are written as unicode escapes so no value can close
    /// the element early.
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(json
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026"))
    }
}
