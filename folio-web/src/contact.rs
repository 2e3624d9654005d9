//! Contact form delivery through a Telegram bot

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::{HttpResponse, Transport};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub const NOT_CONFIGURED: &str = "Telegram is not configured. Please contact via email.";

const CHAT_NOT_FOUND_GUIDANCE: &str = "Chat not found. Please:\n1. Open Telegram and find your bot\n2. Click START or send a message to your bot\n3. Verify your Chat ID is correct";

const UNAUTHORIZED_GUIDANCE: &str =
    "Invalid bot token. Please check TELEGRAM_BOT_TOKEN in the site environment";

/// Failures surfaced to the person submitting the form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Telegram is not configured. Please contact via email.")]
    NotConfigured,

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),
}

/// What the visitor typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Trim every field and check that all are present and the email is plausible
    pub fn validate(&self) -> Result<ContactForm, ContactError> {
        let form = ContactForm::new(self.name.trim(), self.email.trim(), self.message.trim());

        if form.name.is_empty() {
            return Err(ContactError::Invalid("Please enter your name.".into()));
        }
        if form.email.is_empty() {
            return Err(ContactError::Invalid("Please enter your email address.".into()));
        }
        if !looks_like_email(&form.email) {
            return Err(ContactError::Invalid(
                "Please enter a valid email address.".into(),
            ));
        }
        if form.message.is_empty() {
            return Err(ContactError::Invalid("Please enter a message.".into()));
        }
        Ok(form)
    }
}

/// `local@domain.tld` with no whitespace
pub fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Backslash-escape characters Telegram treats as markup
pub fn escape_markdown(text: &str) -> String {
    const SPECIAL: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Notification text for a validated form
pub fn format_notification(form: &ContactForm) -> String {
    format!(
        "🔔 *New Contact Form Submission*\n\n\
         👤 *Name:* {}\n\
         📧 *Email:* {}\n\n\
         💬 *Message:*\n{}\n\n\
         ━━━━━━━━━━━━━━━━━━━━\n\
         _Sent from Portfolio Contact Form_",
        escape_markdown(&form.name),
        escape_markdown(&form.email),
        escape_markdown(&form.message),
    )
}

/// `sendMessage` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: String,
    pub parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    ok: bool,
    description: Option<String>,
}

/// Map the bot API response to success or a descriptive error
pub fn interpret_response(response: &HttpResponse) -> Result<(), ContactError> {
    let parsed = serde_json::from_str::<TelegramResponse>(&response.body).ok();
    let ok = parsed.as_ref().is_some_and(|reply| reply.ok);
    if response.is_success() && ok {
        return Ok(());
    }

    let description = parsed
        .and_then(|response| response.description)
        .unwrap_or_else(|| "Failed to send message to Telegram".to_string());

    let message = if description.contains("chat not found") {
        CHAT_NOT_FOUND_GUIDANCE.to_string()
    } else if description.contains("Unauthorized") {
        UNAUTHORIZED_GUIDANCE.to_string()
    } else {
        description
    };
    Err(ContactError::Rejected(message))
}

struct Credentials {
    bot_token: String,
    chat_id: String,
}

/// Sends contact form submissions to a Telegram chat
pub struct ContactClient<T> {
    credentials: Option<Credentials>,
    transport: T,
}

impl<T: Transport> ContactClient<T> {
    /// Both the bot token and the chat id are required; blanks count as absent
    pub fn new(bot_token: Option<String>, chat_id: Option<String>, transport: T) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let credentials = match (present(bot_token), present(chat_id)) {
            (Some(bot_token), Some(chat_id)) => Some(Credentials { bot_token, chat_id }),
            _ => None,
        };
        Self {
            credentials,
            transport,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Validate and deliver the form
    ///
    /// Failures are logged here; the caller only shows the returned error.
    pub async fn submit(&self, form: &ContactForm) -> Result<(), ContactError> {
        let result = self.deliver(form).await;
        if let Err(err) = &result {
            match err {
                ContactError::Invalid(_) => tracing::debug!(error = %err, "contact form rejected"),
                _ => tracing::error!(error = %err, "failed to deliver contact form"),
            }
        }
        result
    }

    async fn deliver(&self, form: &ContactForm) -> Result<(), ContactError> {
        let form = form.validate()?;
        let credentials = self.credentials.as_ref().ok_or(ContactError::NotConfigured)?;

        let request = SendMessageRequest {
            chat_id: &credentials.chat_id,
            text: format_notification(&form),
            parse_mode: "Markdown",
        };
        let body =
            serde_json::to_string(&request).map_err(|e| ContactError::Transport(e.to_string()))?;
        let url = format!("{TELEGRAM_API_BASE}/bot{}/sendMessage", credentials.bot_token);

        let response = self
            .transport
            .post_json(&url, &[], body)
            .await
            .map_err(|e| ContactError::Transport(e.0))?;
        interpret_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pollster::block_on;

    use super::*;
    use crate::http::TransportError;

    fn reply(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[derive(Clone)]
    struct Canned {
        response: Result<HttpResponse, TransportError>,
        calls: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Self {
            Self {
                response: Ok(reply(status, body)),
                calls: Rc::default(),
            }
        }
    }

    impl Transport for Canned {
        async fn post_json(
            &self,
            url: &str,
            _headers: &[(&str, &str)],
            body: String,
        ) -> Result<HttpResponse, TransportError> {
            self.calls.borrow_mut().push((url.to_string(), body));
            self.response.clone()
        }
    }

    fn form() -> ContactForm {
        ContactForm::new("Ada", "ada@example.com", "Hello!")
    }

    #[test]
    fn validation_trims_and_requires_fields() {
        let valid = ContactForm::new("  Ada ", " ada@example.com ", " hi ").validate().unwrap();
        assert_eq!(valid, ContactForm::new("Ada", "ada@example.com", "hi"));

        for form in [
            ContactForm::new(" ", "ada@example.com", "hi"),
            ContactForm::new("Ada", "", "hi"),
            ContactForm::new("Ada", "ada@example.com", "   "),
            ContactForm::new("Ada", "not-an-email", "hi"),
        ] {
            assert!(matches!(form.validate(), Err(ContactError::Invalid(_))));
        }
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("a@b.co"));
        assert!(looks_like_email("first.last@sub.example.org"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a@.co"));
        assert!(!looks_like_email("a@b."));
        assert!(!looks_like_email("a b@c.de"));
        assert!(!looks_like_email("a@b@c.de"));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_markdown("plain text"), "plain text");
        assert_eq!(escape_markdown("*bold* _it_"), "\\*bold\\* \\_it\\_");
        assert_eq!(escape_markdown("a.b!"), "a\\.b\\!");
        assert_eq!(escape_markdown("[x](y)"), "\\[x\\]\\(y\\)");
    }

    #[test]
    fn notification_layout() {
        let text = format_notification(&ContactForm::new("Ada L.", "ada@example.com", "Hi!"));
        assert!(text.starts_with("🔔 *New Contact Form Submission*\n\n👤 *Name:* Ada L\\.\n"));
        assert!(text.contains("📧 *Email:* ada@example\\.com\n\n"));
        assert!(text.contains("💬 *Message:*\nHi\\!\n\n"));
        assert!(text.ends_with("_Sent from Portfolio Contact Form_"));
    }

    #[test]
    fn response_interpretation() {
        let accepted = reply(200, r#"{"ok":true,"result":{}}"#);
        assert_eq!(interpret_response(&accepted), Ok(()));

        let throttled = reply(200, r#"{"ok":false,"description":"Too Many Requests"}"#);
        assert_eq!(
            interpret_response(&throttled),
            Err(ContactError::Rejected("Too Many Requests".into()))
        );

        let wrong_chat = reply(400, r#"{"ok":false,"description":"Bad Request: chat not found"}"#);
        assert_eq!(
            interpret_response(&wrong_chat),
            Err(ContactError::Rejected(CHAT_NOT_FOUND_GUIDANCE.into()))
        );

        let bad_token = reply(401, r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#);
        assert_eq!(
            interpret_response(&bad_token),
            Err(ContactError::Rejected(UNAUTHORIZED_GUIDANCE.into()))
        );

        assert_eq!(
            interpret_response(&reply(502, "Bad Gateway")),
            Err(ContactError::Rejected("Failed to send message to Telegram".into()))
        );

        // A 5xx that still claims ok is not a delivery
        let gateway = reply(503, r#"{"ok":true}"#);
        assert!(interpret_response(&gateway).is_err());
    }

    #[test]
    fn unconfigured_client_never_sends() {
        let transport = Canned::new(200, r#"{"ok":true}"#);
        let client = ContactClient::new(Some("token".into()), None, transport.clone());
        assert!(!client.is_configured());

        let err = block_on(client.submit(&form())).unwrap_err();
        assert_eq!(err, ContactError::NotConfigured);
        assert_eq!(err.to_string(), NOT_CONFIGURED);
        assert!(transport.calls.borrow().is_empty());
    }

    #[test]
    fn invalid_form_is_rejected_before_sending() {
        let transport = Canned::new(200, r#"{"ok":true}"#);
        let client = ContactClient::new(Some("token".into()), Some("42".into()), transport.clone());

        let err = block_on(client.submit(&ContactForm::default())).unwrap_err();
        assert!(matches!(err, ContactError::Invalid(_)));
        assert!(transport.calls.borrow().is_empty());
    }

    #[test]
    fn submit_posts_envelope() {
        let transport = Canned::new(200, r#"{"ok":true}"#);
        let client =
            ContactClient::new(Some("123:abc".into()), Some("42".into()), transport.clone());

        block_on(client.submit(&form())).unwrap();

        let calls = transport.calls.borrow();
        let (url, body) = &calls[0];
        assert_eq!(url, "https://api.telegram.org/bot123:abc/sendMessage");

        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["parse_mode"], "Markdown");
        assert!(json["text"].as_str().unwrap().contains("*Name:* Ada"));
    }

    #[test]
    fn transport_failure_is_reported() {
        let transport = Canned {
            response: Err(TransportError("Failed to fetch".into())),
            calls: Rc::default(),
        };
        let client = ContactClient::new(Some("t".into()), Some("1".into()), transport);
        assert_eq!(
            block_on(client.submit(&form())),
            Err(ContactError::Transport("Failed to fetch".into()))
        );
    }
}
