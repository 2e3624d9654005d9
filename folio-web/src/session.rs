//! Conversational session management for the chat widget
//!
//! A [`SessionManager`] owns at most one [`ConversationSession`] with a remote
//! language model. The session is opened lazily on the first message, seeded
//! with a context preamble, and discarded only on an explicit reset.
//!
//! [`ChatWidget`] ties the manager to the [`Transcript`]: it guards against
//! empty and concurrent submissions, appends the user turn immediately and
//! turns every failure into an assistant turn.
//!
//! The remote call is split out of the widget ([`ChatWidget::begin_send`] →
//! [`PendingSend::run`] → [`ChatWidget::finish_send`]) so a browser caller can
//! await it without holding a borrow of the widget.

use thiserror::Error;

use crate::transcript::{ChatTurn, Transcript};

/// Common prefix of every apology shown in place of a reply
pub const APOLOGY: &str = "Sorry, I encountered";

/// Assistant turn shown when the remote call failed without details
pub const GENERIC_APOLOGY: &str =
    "Sorry, I encountered an unexpected error. Please try again later.";

/// Assistant turn shown when no model credentials are available
pub const NOT_CONFIGURED_MESSAGE: &str = "Sorry, the chatbot is not configured properly. Please add your Gemini API key to the environment variables.";

/// First turn of every transcript
pub const DEFAULT_GREETING: &str = "Hi! I'm here to help you learn about this portfolio. Ask me anything about skills, projects, or experience!";

/// Model side of the seeded turn pair
pub const PREAMBLE_ACK: &str =
    "Understood. I'll answer questions about this portfolio using that information.";

/// Failures of the conversational layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Credentials are missing or were rejected; permanent for the page
    #[error("chat is not configured: {0}")]
    Configuration(String),

    /// Network, quota or response failure; safe to retry on the next message
    #[error("remote model call failed{}", .0.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Remote(Option<String>),

    /// The session is already serving a request
    #[error("a reply is already pending")]
    Busy,
}

impl ChatError {
    pub fn remote(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if detail.trim().is_empty() {
            ChatError::Remote(None)
        } else {
            ChatError::Remote(Some(detail))
        }
    }

    /// Text shown to the visitor in place of a reply
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Configuration(_) => NOT_CONFIGURED_MESSAGE.to_string(),
            ChatError::Remote(Some(detail)) => {
                format!("{APOLOGY} an error: {detail}. Please try again.")
            }
            ChatError::Remote(None) => GENERIC_APOLOGY.to_string(),
            ChatError::Busy => "Please wait for the current reply to finish.".to_string(),
        }
    }
}

/// Rejections from the UI guard; these never reach the session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("a reply is already pending")]
    Busy,
}

/// One call to the model: prior history plus the new user text
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub history: &'a [ChatTurn],
    pub user_text: &'a str,
}

/// A remote multi-turn text completion endpoint
#[allow(async_fn_in_trait)]
pub trait LanguageModel {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ChatError>;
}

/// Acquires credentials and builds a model client
pub trait ModelConnector {
    type Model: LanguageModel;

    /// Fails with [`ChatError::Configuration`] when credentials are absent
    fn connect(&self) -> Result<Self::Model, ChatError>;
}

/// A dialogue with the model, seeded with the context preamble
#[derive(Debug)]
pub struct ConversationSession<M> {
    model: M,
    history: Vec<ChatTurn>,
}

impl<M: LanguageModel> ConversationSession<M> {
    pub fn open(model: M, preamble: &str) -> Self {
        Self {
            model,
            history: vec![ChatTurn::user(preamble), ChatTurn::assistant(PREAMBLE_ACK)],
        }
    }

    /// Turns the model has seen, preamble pair first
    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Forward `text` with the accumulated history
    ///
    /// History only grows when the model answered; a failed exchange leaves
    /// the session as it was.
    pub async fn send(&mut self, text: &str) -> Result<String, ChatError> {
        let reply = self
            .model
            .complete(CompletionRequest {
                history: &self.history,
                user_text: text,
            })
            .await?;

        if reply.trim().is_empty() {
            return Err(ChatError::remote("the model returned an empty response"));
        }

        self.history.push(ChatTurn::user(text));
        self.history.push(ChatTurn::assistant(reply.clone()));
        Ok(reply)
    }
}

/// Observable state of the session slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Uninitialized,
    Ready,
    InFlight,
}

#[derive(Debug)]
enum Slot<M> {
    Uninitialized,
    Ready(ConversationSession<M>),
    InFlight,
}

/// A session checked out of the manager for one request
#[derive(Debug)]
pub struct Lease<M> {
    session: ConversationSession<M>,
    generation: u64,
}

impl<M: LanguageModel> Lease<M> {
    pub async fn send(&mut self, text: &str) -> Result<String, ChatError> {
        self.session.send(text).await
    }
}

/// Owns the single active conversation
pub struct SessionManager<C: ModelConnector> {
    connector: C,
    preamble: String,
    slot: Slot<C::Model>,
    generation: u64,
}

impl<C: ModelConnector> SessionManager<C> {
    pub fn new(connector: C, preamble: impl Into<String>) -> Self {
        Self {
            connector,
            preamble: preamble.into(),
            slot: Slot::Uninitialized,
            generation: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        match self.slot {
            Slot::Uninitialized => SessionStatus::Uninitialized,
            Slot::Ready(_) => SessionStatus::Ready,
            Slot::InFlight => SessionStatus::InFlight,
        }
    }

    /// Take the session out for a request, opening it if needed
    ///
    /// A connection failure leaves the manager uninitialized so the next
    /// message tries again.
    pub fn checkout(&mut self) -> Result<Lease<C::Model>, ChatError> {
        let session = match std::mem::replace(&mut self.slot, Slot::InFlight) {
            Slot::Ready(session) => session,
            Slot::Uninitialized => match self.connector.connect() {
                Ok(model) => {
                    tracing::debug!("opening chat session");
                    ConversationSession::open(model, &self.preamble)
                }
                Err(err) => {
                    self.slot = Slot::Uninitialized;
                    return Err(err);
                }
            },
            Slot::InFlight => return Err(ChatError::Busy),
        };
        Ok(Lease {
            session,
            generation: self.generation,
        })
    }

    /// Return a leased session
    ///
    /// Leases taken before a [`reset`](Self::reset) are dropped.
    pub fn restore(&mut self, lease: Lease<C::Model>) {
        if lease.generation == self.generation && matches!(self.slot, Slot::InFlight) {
            self.slot = Slot::Ready(lease.session);
        }
    }

    /// Discard the current session; the next message opens a fresh one
    pub fn reset(&mut self) {
        self.generation += 1;
        self.slot = Slot::Uninitialized;
    }

    /// Send one message through the active session
    pub async fn send_message(&mut self, text: &str) -> Result<String, ChatError> {
        let mut lease = self.checkout()?;
        let result = lease.send(text).await;
        self.restore(lease);
        result
    }
}

/// Remote half of a send, detached from the widget
#[must_use = "a pending send does nothing until run"]
pub struct PendingSend<M> {
    text: String,
    lease: Result<Lease<M>, ChatError>,
}

impl<M: LanguageModel> PendingSend<M> {
    pub async fn run(self) -> SendOutcome<M> {
        match self.lease {
            Ok(mut lease) => {
                let result = lease.send(&self.text).await;
                SendOutcome {
                    lease: Some(lease),
                    result,
                }
            }
            Err(err) => SendOutcome {
                lease: None,
                result: Err(err),
            },
        }
    }
}

/// Result of a remote call, to be handed back to [`ChatWidget::finish_send`]
pub struct SendOutcome<M> {
    lease: Option<Lease<M>>,
    result: Result<String, ChatError>,
}

impl<M> SendOutcome<M> {
    pub fn result(&self) -> &Result<String, ChatError> {
        &self.result
    }
}

/// Transcript, session manager and the single in-flight guard
pub struct ChatWidget<C: ModelConnector> {
    transcript: Transcript,
    sessions: SessionManager<C>,
    in_flight: bool,
}

impl<C: ModelConnector> ChatWidget<C> {
    pub fn new(sessions: SessionManager<C>, greeting: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::with_greeting(greeting),
            sessions,
            in_flight: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn sessions(&self) -> &SessionManager<C> {
        &self.sessions
    }

    /// Whether a reply is pending; the input stays disabled meanwhile
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Whether the submit control should be enabled for `input`
    pub fn can_submit(&self, input: &str) -> bool {
        !self.in_flight && !input.trim().is_empty()
    }

    /// Validate input, append the user turn and check out the session
    pub fn begin_send(&mut self, input: &str) -> Result<PendingSend<C::Model>, SubmitError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.in_flight {
            return Err(SubmitError::Busy);
        }

        self.transcript.push(ChatTurn::user(text));
        self.in_flight = true;
        Ok(PendingSend {
            text: text.to_string(),
            lease: self.sessions.checkout(),
        })
    }

    /// Append the reply, or an apology, and release the input
    pub fn finish_send(&mut self, outcome: SendOutcome<C::Model>) -> &ChatTurn {
        if let Some(lease) = outcome.lease {
            self.sessions.restore(lease);
        }
        self.in_flight = false;

        let text = match outcome.result {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = %err, "chat request failed");
                err.user_message()
            }
        };
        self.transcript.push(ChatTurn::assistant(text))
    }

    /// All three phases in one call
    pub async fn send_message(&mut self, input: &str) -> Result<&ChatTurn, SubmitError> {
        let pending = self.begin_send(input)?;
        let outcome = pending.run().await;
        Ok(self.finish_send(outcome))
    }

    /// Drop the remote session; the transcript is kept
    pub fn reset(&mut self) {
        self.sessions.reset();
    }
}
