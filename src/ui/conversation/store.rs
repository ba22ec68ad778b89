//! Conversation state machine
//!
//! Owns the message log, the draft and the single outstanding generation
//! call. Each submission runs `Idle -> Pending -> Idle`; a second submission
//! is only accepted once the first has been resolved.

use crate::client::ResponseClient;
use crate::error::TransportError;
use crate::events::{APOLOGY_TEXT, Message, Phase};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, error, info};

type Outcome = Result<String, TransportError>;

pub struct ConversationStore {
    history: Vec<Message>,
    draft: String,
    in_flight: Option<oneshot::Receiver<Outcome>>,
    client: Arc<dyn ResponseClient>,
}

impl ConversationStore {
    /// Start a conversation seeded with one bot greeting
    pub fn new(client: Arc<dyn ResponseClient>, greeting: impl Into<String>) -> Self {
        Self {
            history: vec![Message::bot(greeting)],
            draft: String::new(),
            in_flight: None,
            client,
        }
    }

    /// Replace the draft. Allowed at any time, including while pending.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Send the draft.
    ///
    /// Returns `false` without touching any state when the draft is blank or
    /// a reply is still outstanding. Otherwise the user message is appended,
    /// the draft cleared and the store marked pending before the request is
    /// handed to a background task.
    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            debug!(pending = self.is_pending(), "submission rejected");
            return false;
        }

        let prompt = std::mem::take(&mut self.draft);
        self.history.push(Message::user(prompt.clone()));

        let (tx, rx) = oneshot::channel();
        self.in_flight = Some(rx);

        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            let outcome = client.generate(&prompt).await;
            // The store may have been dropped with the session
            let _ = tx.send(outcome);
        });

        info!(history_len = self.history.len(), "submission accepted");
        true
    }

    /// Apply the outstanding reply if it has arrived. Never blocks.
    ///
    /// Returns whether the conversation changed.
    pub fn poll_reply(&mut self) -> bool {
        let Some(rx) = self.in_flight.as_mut() else {
            return false;
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => Err(Self::lost_reply()),
        };

        self.in_flight = None;
        self.resolve(outcome);
        true
    }

    /// Wait for the outstanding reply, if any, and apply it.
    ///
    /// Cancel-safe: dropping this future leaves the call outstanding.
    pub async fn settle(&mut self) -> bool {
        let outcome = match self.in_flight.as_mut() {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(Self::lost_reply())),
            None => return false,
        };

        self.in_flight = None;
        self.resolve(outcome);
        true
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_pending() {
            Phase::Pending
        } else {
            Phase::Idle
        }
    }

    /// Whether `submit` would currently be accepted
    pub fn can_submit(&self) -> bool {
        !self.is_pending() && !self.draft.trim().is_empty()
    }

    fn resolve(&mut self, outcome: Outcome) {
        let reply = match outcome {
            Ok(text) => Message::bot(text),
            Err(e) => {
                error!(detail = e.detail(), "Failed to fetch reply from backend");
                Message::bot(APOLOGY_TEXT)
            }
        };
        self.history.push(reply);
        info!(history_len = self.history.len(), "reply recorded");
    }

    fn lost_reply() -> TransportError {
        TransportError::new("generation task ended without a reply")
    }
}
