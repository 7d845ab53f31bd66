//! Chat session controller
//!
//! Owns the ordered message history, the active response mode, and the
//! in-flight request state. The history is append-only and exposed to the
//! rendering layer as a read-only slice; it is replaced wholesale only by
//! an explicit reset. At most one exchange may be outstanding per
//! controller instance; concurrent submissions would interleave into the
//! shared ordered history, so the second one is rejected rather than
//! queued.

use crate::{AppError, AppResult};
use finsight_client::ResearchBackend;
use finsight_core::{
    validation_error, Capabilities, ChatMode, ChatSettings, FinsightError, Message,
    MessageMetadata, SystemStatus,
};
use serde_json::Value;
use tracing::{debug, info, warn};

const WELCOME_NOTICE: &str =
    "Welcome to FinSight. Upload a document or ask a question about the markets.";
const RESET_NOTICE: &str = "Conversation cleared. The uploaded documents remain indexed.";

/// Ticket for an exchange that has been submitted but not yet completed
///
/// Carries the mode snapshot taken at submission time; switching modes
/// afterwards affects only the next submission, never this one.
#[derive(Debug)]
pub struct PendingExchange {
    epoch: u64,
    input: String,
    mode: ChatMode,
    context_data: Option<Value>,
}

impl PendingExchange {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn context_data(&self) -> Option<&Value> {
        self.context_data.as_ref()
    }
}

/// What happened when an exchange outcome was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The assistant message was appended to history
    Applied,
    /// A failure notice was appended to history
    FailureRecorded,
    /// The outcome belonged to a superseded exchange and was dropped
    Discarded,
}

/// Controller for one chat session
pub struct ChatController {
    messages: Vec<Message>,
    mode: ChatMode,
    capabilities: Capabilities,
    settings: ChatSettings,
    awaiting_response: bool,
    /// Bumped on every submission and every reset; outcomes carrying an
    /// older epoch are stale and must not touch history.
    epoch: u64,
    /// Opaque context forwarded with the next chat request
    context_data: Option<Value>,
}

impl ChatController {
    /// Create a controller for a backend with the given advertised status
    pub fn new(status: &SystemStatus, settings: ChatSettings) -> Self {
        Self {
            messages: vec![Message::assistant(WELCOME_NOTICE, None)],
            mode: ChatMode::Standard,
            capabilities: status.capabilities,
            settings,
            awaiting_response: false,
            epoch: 0,
            context_data: None,
        }
    }

    /// Read-only snapshot of the session history
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Currently selected response mode
    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Whether an exchange is outstanding
    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Capabilities the backend advertised at session start
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Select the response mode for subsequent submissions.
    ///
    /// Selecting a mode the backend did not advertise is a rejected no-op;
    /// the active mode is left unchanged and `false` is returned. An
    /// in-flight exchange is never affected.
    pub fn set_mode(&mut self, mode: ChatMode) -> bool {
        if !self.capabilities.supports_mode(mode) {
            warn!("Rejected {} mode: capability not advertised", mode);
            return false;
        }
        self.mode = mode;
        true
    }

    /// Attach opaque context data forwarded with subsequent chat requests
    pub fn set_context_data(&mut self, context_data: Option<Value>) {
        self.context_data = context_data;
    }

    /// Start an exchange: validate, append the user message, mark awaiting.
    ///
    /// Rejects blank input and concurrent submissions without touching
    /// history or issuing any transport call.
    pub fn begin_submission(&mut self, input: &str) -> AppResult<PendingExchange> {
        if self.awaiting_response {
            return Err(AppError::RequestInFlight { operation: "chat" });
        }

        let input = input.trim();
        if input.is_empty() {
            return Err(validation_error!(
                "Message must not be blank",
                "message",
                "chat_controller"
            )
            .into());
        }

        self.epoch += 1;
        self.awaiting_response = true;
        self.push_message(Message::user(input));

        debug!(epoch = self.epoch, mode = %self.mode, "Chat exchange started");

        Ok(PendingExchange {
            epoch: self.epoch,
            input: input.to_string(),
            mode: self.mode,
            context_data: self.context_data.clone(),
        })
    }

    /// Apply the outcome of an exchange.
    ///
    /// A stale outcome (the history was cleared, or a newer exchange has
    /// started since) is discarded silently; it represents a superseded
    /// request, not a user-facing failure. Failures append an error-flagged
    /// assistant notice. Either way the controller is idle afterwards and
    /// accepts new input immediately.
    pub fn complete_submission(
        &mut self,
        pending: PendingExchange,
        outcome: Result<Message, FinsightError>,
    ) -> Completion {
        if pending.epoch != self.epoch {
            debug!(
                stale_epoch = pending.epoch,
                current_epoch = self.epoch,
                "Discarding response to superseded exchange"
            );
            return Completion::Discarded;
        }

        self.awaiting_response = false;

        match outcome {
            Ok(message) => {
                self.push_message(message);
                Completion::Applied
            }
            Err(error) => {
                error.log();
                let notice = failure_notice(&error, pending.mode);
                self.push_message(Message::assistant(
                    notice,
                    Some(MessageMetadata::error_notice(pending.mode)),
                ));
                Completion::FailureRecorded
            }
        }
    }

    /// Submit one turn against the given backend.
    ///
    /// Convenience composition of [`begin_submission`] and
    /// [`complete_submission`]; the appended message (assistant response or
    /// failure notice) is the last entry of [`messages`] afterwards.
    ///
    /// [`begin_submission`]: Self::begin_submission
    /// [`complete_submission`]: Self::complete_submission
    /// [`messages`]: Self::messages
    pub async fn send_message<B: ResearchBackend + ?Sized>(
        &mut self,
        backend: &B,
        input: &str,
    ) -> AppResult<Completion> {
        let pending = self.begin_submission(input)?;

        let outcome = backend
            .chat(&pending.input, pending.mode, pending.context_data.as_ref())
            .await;

        Ok(self.complete_submission(pending, outcome))
    }

    /// Reset the session: the whole history is replaced with a single
    /// notice, and any in-flight exchange is invalidated.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.awaiting_response = false;
        self.messages = vec![Message::assistant(RESET_NOTICE, None)];
        info!("Chat session cleared");
    }

    fn push_message(&mut self, message: Message) {
        self.messages.push(message);

        // Cap never fires below one full exchange, so short histories keep
        // their user/assistant pairing intact.
        let cap = self.settings.max_history_messages.max(2);
        if self.messages.len() > cap {
            let excess = self.messages.len() - cap;
            self.messages.drain(0..excess);
        }
    }
}

/// Human-readable notice for a failed exchange.
///
/// Agentic timeouts get distinct guidance because the remedy differs:
/// switching modes or simplifying the query, not just retrying.
fn failure_notice(error: &FinsightError, mode: ChatMode) -> String {
    match error {
        FinsightError::Timeout { .. } if mode == ChatMode::Agentic => {
            "The agentic analysis timed out. Try switching to standard mode or asking a \
             simpler question."
                .to_string()
        }
        FinsightError::Timeout { .. } => {
            "The request timed out. Please try again.".to_string()
        }
        FinsightError::Network { .. } => {
            "Cannot reach the analysis server. Check that the backend is running.".to_string()
        }
        FinsightError::Server { status, .. } => {
            format!("The server returned an error (HTTP {}). Please try again.", status)
        }
        FinsightError::Backend { message, .. } => {
            format!("The server reported a problem: {}", message)
        }
        FinsightError::Protocol { .. } => {
            "Received an unreadable response from the server.".to_string()
        }
        other => format!("Something went wrong: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_core::{ApiStatus, ErrorContext};

    fn status(agentic: bool) -> SystemStatus {
        SystemStatus {
            api_status: ApiStatus::Healthy,
            capabilities: Capabilities {
                llm_chat: true,
                retrieval_pipeline: true,
                agentic_reasoning: agentic,
            },
        }
    }

    fn controller(agentic: bool) -> ChatController {
        ChatController::new(&status(agentic), ChatSettings::default())
    }

    #[test]
    fn starts_idle_with_welcome_notice_in_standard_mode() {
        let controller = controller(true);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.mode(), ChatMode::Standard);
        assert!(!controller.is_awaiting_response());
    }

    #[test]
    fn agentic_mode_is_gated_by_capability() {
        let mut gated = controller(false);
        assert!(!gated.set_mode(ChatMode::Agentic));
        assert_eq!(gated.mode(), ChatMode::Standard);

        let mut open = controller(true);
        assert!(open.set_mode(ChatMode::Agentic));
        assert_eq!(open.mode(), ChatMode::Agentic);
    }

    #[test]
    fn blank_input_is_rejected_without_touching_history() {
        let mut controller = controller(true);
        let before = controller.messages().len();
        assert!(controller.begin_submission("   ").is_err());
        assert_eq!(controller.messages().len(), before);
        assert!(!controller.is_awaiting_response());
    }

    #[test]
    fn timeout_notice_differs_between_agentic_and_standard() {
        let timeout = || FinsightError::Timeout {
            operation: "chat".to_string(),
            duration_ms: 120_000,
            context: ErrorContext::new("transport"),
        };
        let agentic = failure_notice(&timeout(), ChatMode::Agentic);
        let standard = failure_notice(&timeout(), ChatMode::Standard);
        assert_ne!(agentic, standard);
        assert!(agentic.contains("standard mode"));
    }

    #[test]
    fn clear_resets_to_exactly_one_notice() {
        let mut controller = controller(true);
        for _ in 0..3 {
            let pending = controller.begin_submission("hello").unwrap();
            controller.complete_submission(pending, Ok(Message::assistant("hi", None)));
        }
        assert!(controller.messages().len() > 1);

        controller.clear();
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].content, RESET_NOTICE);

        // Clearing an already-reset session still leaves exactly one notice.
        controller.clear();
        assert_eq!(controller.messages().len(), 1);
    }

    #[test]
    fn history_cap_drops_oldest_messages() {
        let settings = ChatSettings {
            max_history_messages: 4,
            ..Default::default()
        };
        let mut controller = ChatController::new(&status(true), settings);

        for turn in 0..4 {
            let pending = controller
                .begin_submission(&format!("question {}", turn))
                .unwrap();
            controller.complete_submission(pending, Ok(Message::assistant("answer", None)));
        }

        assert_eq!(controller.messages().len(), 4);
        // The welcome notice and the earliest turns were trimmed.
        assert_eq!(controller.messages()[0].content, "question 2");
    }
}
