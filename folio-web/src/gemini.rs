//! Client for the Gemini `generateContent` REST endpoint

use serde::{Deserialize, Serialize};

use crate::http::{HttpResponse, Transport};
use crate::session::{ChatError, CompletionRequest, LanguageModel, ModelConnector};
use crate::transcript::Speaker;

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// `generateContent` request body
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub role: &'static str,
    pub parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct Part<'a> {
    pub text: &'a str,
}

impl<'a> Content<'a> {
    fn new(speaker: Speaker, text: &'a str) -> Self {
        let role = match speaker {
            Speaker::User => "user",
            Speaker::Assistant => "model",
        };
        Self {
            role,
            parts: [Part { text }],
        }
    }
}

impl<'a> From<CompletionRequest<'a>> for GenerateContentRequest<'a> {
    fn from(request: CompletionRequest<'a>) -> Self {
        let mut contents: Vec<Content<'a>> = request
            .history
            .iter()
            .map(|turn| Content::new(turn.speaker, &turn.text))
            .collect();
        contents.push(Content::new(Speaker::User, request.user_text));
        Self { contents }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Map an HTTP status and body to the reply text or a [`ChatError`]
///
/// Errors mentioning the API key are configuration problems; everything else
/// is a remote failure carrying the provider's message.
pub fn parse_response(response: &HttpResponse) -> Result<String, ChatError> {
    let body = response.body.as_str();
    if !response.is_success() {
        let status = response.status;
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));

        if message.contains("API key") || message.contains("API_KEY") {
            return Err(ChatError::Configuration(message));
        }
        return Err(ChatError::remote(message));
    }

    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::remote(format!("malformed response: {e}")))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);
        return Err(match reason {
            Some(reason) => ChatError::remote(format!("the request was blocked ({reason})")),
            None => ChatError::remote("the model returned no candidates"),
        });
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(ChatError::remote(format!(
            "the model returned no text (finish reason {reason})"
        )));
    }
    Ok(text)
}

/// A Gemini model reachable through `transport`
#[derive(Debug, Clone)]
pub struct GeminiModel<T> {
    api_key: String,
    model: String,
    transport: T,
}

impl<T> GeminiModel<T> {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, transport: T) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            transport,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }
}

impl<T: Transport> LanguageModel for GeminiModel<T> {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ChatError> {
        let body = serde_json::to_string(&GenerateContentRequest::from(request))
            .map_err(|e| ChatError::remote(e.to_string()))?;

        let response = self
            .transport
            .post_json(
                &self.endpoint(),
                &[("x-goog-api-key", self.api_key.as_str())],
                body,
            )
            .await
            .map_err(|e| ChatError::remote(e.0))?;

        parse_response(&response)
    }
}

/// Builds [`GeminiModel`]s from optional credentials
#[derive(Debug, Clone)]
pub struct GeminiConnector<T> {
    api_key: Option<String>,
    model: String,
    transport: T,
}

impl<T> GeminiConnector<T> {
    /// Blank keys count as absent; a blank model name falls back to [`DEFAULT_MODEL`]
    pub fn new(api_key: Option<String>, model: Option<String>, transport: T) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model
                .filter(|model| !model.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            transport,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl<T: Transport + Clone> ModelConnector for GeminiConnector<T> {
    type Model = GeminiModel<T>;

    fn connect(&self) -> Result<GeminiModel<T>, ChatError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ChatError::Configuration("GEMINI_API_KEY is not set".to_string())
        })?;
        Ok(GeminiModel::new(api_key, &self.model, self.transport.clone()))
    }
}
