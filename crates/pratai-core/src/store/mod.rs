//! Conversation state store.
//!
//! [`ConversationStore`] is the single writer of the conversation state: the
//! session identity, the turn history, and the in-flight turn. The UI reads
//! [`ConversationState`] and calls the store's operations; it never mutates
//! the state itself.
//!
//! A turn runs in three phases: [`ConversationStore::begin_turn`] hands out a
//! [`PendingTurn`] ticket, [`ConversationStore::apply_progress`] renders
//! increments, and [`ConversationStore::finish_turn`] records the outcome.
//! Both later phases are ignored once the ticket is stale, so a reply that
//! resolves after a reset cannot resurrect the cleared conversation.
//! [`ConversationStore::submit`] runs all three with the configured delivery
//! strategy.

mod state;

pub use state::{ConversationState, PendingTurn};

use pratai_types::backend::{ChatRequest, ResetReceipt};
use pratai_types::chat::{Turn, UiSnapshot};
use pratai_types::delivery::DeliveryMode;
use pratai_types::error::{ClientError, SubmitError};
use tracing::{debug, info, warn};

use crate::backend::client::ChatBackend;
use crate::delivery::{Delivered, DeliveryStrategy};
use crate::session;
use crate::storage::kv_store::KvStore;
use state::Tracked;

/// Response shown when a reply could not be obtained.
pub const FALLBACK_MESSAGE: &str =
    "Unable to connect to Prat.AI server. Please ensure the backend is running.";

/// Default number of history turns fetched on initialize.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

pub struct ConversationStore<B: ChatBackend, K: KvStore> {
    backend: B,
    kv: K,
    strategy: DeliveryStrategy,
    history_limit: u32,
    tracked: Tracked,
}

impl<B: ChatBackend, K: KvStore> ConversationStore<B, K> {
    /// Restore the session id and the cached UI snapshot. No network calls.
    pub async fn open(backend: B, kv: K, strategy: DeliveryStrategy) -> Self {
        let session_id = session::restore_session_id(&kv).await;
        let mut state = ConversationState::new(session_id);
        if let Some(snapshot) = session::load_snapshot(&kv).await {
            state.restore_snapshot(snapshot);
        }
        Self {
            backend,
            kv,
            strategy,
            history_limit: DEFAULT_HISTORY_LIMIT,
            tracked: Tracked { state, epoch: 0 },
        }
    }

    /// Open the store and load the session's history from the backend.
    pub async fn initialize(backend: B, kv: K, strategy: DeliveryStrategy) -> Self {
        let mut store = Self::open(backend, kv, strategy).await;
        store.load_history().await;
        store
    }

    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    /// Replace the in-memory history with the backend's.
    ///
    /// A failure is logged and leaves the restored snapshot in place. Either
    /// way the history counts as loaded afterwards.
    pub async fn load_history(&mut self) {
        let session_id = self.tracked.state.session_id.clone();
        match self
            .backend
            .fetch_history(&session_id, self.history_limit)
            .await
        {
            Ok(turns) => {
                debug!(session_id = %session_id, turns = turns.len(), "History loaded");
                let state = &mut self.tracked.state;
                state.history = turns;
                if !state.loading && !state.history.is_empty() {
                    let last = state.history.len() - 1;
                    state.display_turn(last);
                }
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to load history");
            }
        }
        self.tracked.state.history_loaded = true;
    }

    pub fn state(&self) -> &ConversationState {
        &self.tracked.state
    }

    pub fn snapshot(&self) -> UiSnapshot {
        self.tracked.state.snapshot()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn strategy(&self) -> &DeliveryStrategy {
        &self.strategy
    }

    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        self.strategy.mode = mode;
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.tracked.state.input = text.into();
    }

    /// Submit a prompt and drive its reply to completion.
    ///
    /// `observer` sees the state after the turn begins, after each increment,
    /// and after the turn finishes. Delivery failures are absorbed into the
    /// state; only validation and busy errors are returned.
    pub async fn submit<F>(
        &mut self,
        prompt: &str,
        attachment: Option<&str>,
        mut observer: F,
    ) -> Result<(), SubmitError>
    where
        F: FnMut(&ConversationState),
    {
        let ticket = self.begin_turn(prompt, attachment)?;
        observer(&self.tracked.state);

        let mut request = ChatRequest::new(ticket.prompt(), ticket.session_id().clone())
            .with_pdf_content(ticket.attachment());
        request.conversation_id = self.tracked.state.conversation_id.clone();

        let tracked = &mut self.tracked;
        let outcome = self
            .strategy
            .deliver(&self.backend, request, |accumulated| {
                if tracked.apply_progress(&ticket, accumulated) {
                    observer(&tracked.state);
                }
            })
            .await;

        self.finish_turn(ticket, outcome).await;
        observer(&self.tracked.state);
        Ok(())
    }

    /// Validate the prompt and move the state into the in-flight phase.
    pub fn begin_turn(
        &mut self,
        prompt: &str,
        attachment: Option<&str>,
    ) -> Result<PendingTurn, SubmitError> {
        let prompt = prompt.trim();
        let state = &mut self.tracked.state;
        if prompt.is_empty() {
            state.error = Some(SubmitError::EmptyPrompt.to_string());
            return Err(SubmitError::EmptyPrompt);
        }
        if state.loading {
            return Err(SubmitError::Busy);
        }

        state.error = None;
        state.last_failed = false;
        state.raw_response.clear();
        state.result_data.clear();
        state.metadata = Default::default();
        state.displayed_turn = None;
        state.loading = true;
        state.streaming = true;
        state.show_result = true;
        state.recent_prompt = prompt.to_string();
        state.prev_prompts.push(prompt.to_string());

        self.tracked.advance();
        info!(
            session_id = %self.tracked.state.session_id,
            mode = %self.strategy.mode,
            "Turn started"
        );
        Ok(PendingTurn {
            session_id: self.tracked.state.session_id.clone(),
            epoch: self.tracked.epoch,
            prompt: prompt.to_string(),
            attachment: attachment.map(str::to_string),
        })
    }

    /// Render the accumulated reply text of an in-flight turn.
    ///
    /// Returns `false` and changes nothing when the ticket is stale.
    pub fn apply_progress(&mut self, ticket: &PendingTurn, accumulated: &str) -> bool {
        self.tracked.apply_progress(ticket, accumulated)
    }

    /// Record the outcome of an in-flight turn.
    ///
    /// On success the turn is appended to history and the snapshot persisted.
    /// On failure the fallback message is shown. Returns `false` and changes
    /// nothing when the ticket is stale.
    pub async fn finish_turn(
        &mut self,
        ticket: PendingTurn,
        outcome: Result<Delivered, ClientError>,
    ) -> bool {
        if !self.tracked.is_current(&ticket) {
            debug!(epoch = ticket.epoch, "Ignoring completion for stale turn");
            return false;
        }

        let state = &mut self.tracked.state;
        match outcome {
            Ok(delivered) => {
                if delivered.fell_back {
                    info!(session_id = %state.session_id, "Reply delivered after fallback");
                }
                state.set_response(&delivered.text);
                state.metadata = delivered.metadata.clone();
                if delivered.conversation_id.is_some() {
                    state.conversation_id = delivered.conversation_id.clone();
                }
                state.last_mode = Some(delivered.mode_used);
                state.history.push(Turn::completed(
                    ticket.prompt,
                    delivered.text,
                    delivered.conversation_id,
                    delivered.metadata,
                ));
                state.displayed_turn = Some(state.history.len() - 1);
                state.loading = false;
                state.streaming = false;
                state.input.clear();

                let snapshot = state.snapshot();
                session::save_snapshot(&self.kv, &snapshot).await;
            }
            Err(e) => {
                warn!(session_id = %state.session_id, error = %e, "Reply delivery failed");
                state.set_response(FALLBACK_MESSAGE);
                state.last_failed = true;
                state.loading = false;
                state.streaming = false;
            }
        }
        true
    }

    /// Show a stored turn, matched by exact prompt. The first match wins.
    pub fn select_turn(&mut self, user_message: &str) -> bool {
        let state = &mut self.tracked.state;
        match state
            .history
            .iter()
            .position(|turn| turn.user_message == user_message)
        {
            Some(index) => {
                state.display_turn(index);
                true
            }
            None => false,
        }
    }

    /// Clear the displayed turn and input, keeping history.
    pub async fn start_new_turn(&mut self) {
        self.tracked.state.clear_display();
        let snapshot = self.tracked.state.snapshot();
        session::save_snapshot(&self.kv, &snapshot).await;
    }

    /// Delete the session's history on the backend and locally.
    ///
    /// Local state is cleared and any in-flight turn invalidated even when
    /// the backend call fails; its result is returned for reporting.
    pub async fn reset_session(&mut self) -> Result<ResetReceipt, ClientError> {
        self.tracked.advance();
        let session_id = self.tracked.state.session_id.clone();
        let result = self.backend.reset_history(&session_id).await;
        match &result {
            Ok(_) => info!(session_id = %session_id, "Session history reset"),
            Err(e) => warn!(session_id = %session_id, error = %e, "Backend reset failed"),
        }

        let state = &mut self.tracked.state;
        state.clear_display();
        state.history.clear();
        state.conversation_id = None;
        state.loading = false;
        state.streaming = false;
        session::clear_snapshot(&self.kv).await;
        result
    }

    /// Rotate to a fresh session. The old session's server history is kept.
    pub async fn begin_new_session(&mut self) {
        self.tracked.advance();
        let session_id = session::rotate_session_id(&self.kv).await;
        info!(session_id = %session_id, "New session started");

        let mut state = ConversationState::new(session_id);
        state.history_loaded = true;
        state.prev_prompts = std::mem::take(&mut self.tracked.state.prev_prompts);
        self.tracked.state = state;
        session::clear_snapshot(&self.kv).await;
    }
}
