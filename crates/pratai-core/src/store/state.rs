//! Conversation state and in-flight turn tracking.

use pratai_types::chat::{ReplyMetadata, SessionId, Turn, UiSnapshot};
use pratai_types::delivery::DeliveryMode;
use serde::Serialize;

use crate::format::format_reply;

/// Everything the UI renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationState {
    pub session_id: SessionId,
    /// Pending, not yet submitted input.
    pub input: String,
    /// Prompt of the displayed turn.
    pub recent_prompt: String,
    /// Every prompt submitted in this process, oldest first.
    pub prev_prompts: Vec<String>,
    /// Formatted HTML of the displayed response.
    pub result_data: String,
    /// Raw text of the displayed response.
    pub raw_response: String,
    pub show_result: bool,
    pub loading: bool,
    pub streaming: bool,
    /// User-visible validation error.
    pub error: Option<String>,
    pub history: Vec<Turn>,
    pub history_loaded: bool,
    /// Index into `history` of the displayed turn, if it is a stored one.
    pub displayed_turn: Option<usize>,
    /// Metadata of the displayed response.
    pub metadata: ReplyMetadata,
    /// Correlation id returned with the last reply, sent with the next prompt.
    pub conversation_id: Option<String>,
    /// Strategy that produced the last reply.
    pub last_mode: Option<DeliveryMode>,
    /// Whether the last finished turn failed to deliver a reply.
    pub last_failed: bool,
}

impl ConversationState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            input: String::new(),
            recent_prompt: String::new(),
            prev_prompts: Vec::new(),
            result_data: String::new(),
            raw_response: String::new(),
            show_result: false,
            loading: false,
            streaming: false,
            error: None,
            history: Vec::new(),
            history_loaded: false,
            displayed_turn: None,
            metadata: ReplyMetadata::default(),
            conversation_id: None,
            last_mode: None,
            last_failed: false,
        }
    }

    pub fn snapshot(&self) -> UiSnapshot {
        UiSnapshot {
            show_result: self.show_result,
            recent_prompt: self.recent_prompt.clone(),
            result_data: self.result_data.clone(),
        }
    }

    pub(crate) fn restore_snapshot(&mut self, snapshot: UiSnapshot) {
        self.show_result = snapshot.show_result;
        self.recent_prompt = snapshot.recent_prompt;
        self.result_data = snapshot.result_data;
    }

    pub(crate) fn set_response(&mut self, raw: &str) {
        self.raw_response = raw.to_string();
        self.result_data = format_reply(raw);
    }

    pub(crate) fn display_turn(&mut self, index: usize) {
        let Some(turn) = self.history.get(index) else {
            return;
        };
        let prompt = turn.user_message.clone();
        let response = turn.bot_response.clone();
        let metadata = turn.metadata.clone();
        self.recent_prompt = prompt;
        self.set_response(&response);
        self.metadata = metadata;
        self.show_result = true;
        self.displayed_turn = Some(index);
    }

    /// Clear the displayed turn and pending input. History is kept.
    pub(crate) fn clear_display(&mut self) {
        self.input.clear();
        self.recent_prompt.clear();
        self.raw_response.clear();
        self.result_data.clear();
        self.error = None;
        self.show_result = false;
        self.last_failed = false;
        self.displayed_turn = None;
        self.metadata = ReplyMetadata::default();
    }
}

/// Ticket for one in-flight turn.
///
/// Progress and completion are only applied while the ticket is current: a
/// reset, a new session, or a newer turn makes it stale.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingTurn {
    pub(crate) session_id: SessionId,
    pub(crate) epoch: u64,
    pub(crate) prompt: String,
    pub(crate) attachment: Option<String>,
}

impl PendingTurn {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }
}

/// State plus the epoch counter guarding it.
#[derive(Debug)]
pub(crate) struct Tracked {
    pub(crate) state: ConversationState,
    pub(crate) epoch: u64,
}

impl Tracked {
    pub(crate) fn is_current(&self, ticket: &PendingTurn) -> bool {
        ticket.epoch == self.epoch && ticket.session_id == self.state.session_id
    }

    /// Invalidate every outstanding ticket.
    pub(crate) fn advance(&mut self) {
        self.epoch += 1;
    }

    pub(crate) fn apply_progress(&mut self, ticket: &PendingTurn, accumulated: &str) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(epoch = ticket.epoch, "Ignoring progress for stale turn");
            return false;
        }
        self.state.set_response(accumulated);
        true
    }
}
