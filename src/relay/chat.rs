//! One chat turn: record the user message, ask the model, record the reply.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::{CompletionProvider, CompletionRequest};
use crate::relay::error::{RelayError, RelayResult};
use crate::session::{Role, SessionId, SessionStore};

/// Result of a successful chat turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    /// Assistant reply text.
    pub reply: String,
    /// Session the turn was recorded in (generated if the caller sent none).
    pub session_id: SessionId,
}

/// Orchestrates chat turns against the session store and a completion provider.
pub struct ChatRelay {
    store: Arc<SessionStore>,
    provider: Arc<dyn CompletionProvider>,
}

impl ChatRelay {
    /// Create a relay.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { store, provider }
    }

    /// Session store backing this relay.
    #[must_use]
    pub const fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Run one chat turn.
    ///
    /// The session stays locked from the user append to the trim, so turns on
    /// the same session never interleave. A failed provider call leaves the
    /// user turn in the transcript.
    ///
    /// # Errors
    /// - [`RelayError::InvalidInput`] for an empty or blank message.
    /// - [`RelayError::Configuration`] when the provider has no credential.
    /// - [`RelayError::Upstream`] for any other provider failure.
    pub async fn handle(
        &self,
        message: &str,
        session_id: Option<SessionId>,
    ) -> RelayResult<ChatReply> {
        if message.trim().is_empty() {
            return Err(RelayError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        let (session_id, handle) = self.store.get_or_create(session_id);
        let mut session = handle.lock().await;
        session.append_turn(Role::User, message);

        let reply = match self
            .provider
            .complete(&CompletionRequest::chat(session.transcript()))
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    status = ?err.status(),
                    error = %err,
                    "Completion failed"
                );
                return Err(err.into());
            }
        };

        session.append_turn(Role::Assistant, reply.as_str());
        session.trim();
        info!(session_id = %session_id, turns = session.len(), "Chat turn completed");

        Ok(ChatReply { reply, session_id })
    }
}
