//! In-memory session store with a sliding transcript window.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;
use tracing::debug;

use crate::session::ids::SessionId;
use crate::session::turn::{Role, Turn};

/// Conversational turns retained after the system turn.
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Instruction that opens every conversation.
pub const THERAPIST_PROMPT: &str = "You are a compassionate, professional AI therapist. Your role is to:
    - Listen actively and empathetically
    - Ask thoughtful, open-ended questions
    - Provide supportive and non-judgmental responses
    - Help users explore their thoughts and feelings
    - Offer coping strategies when appropriate
    - Maintain professional boundaries
    - Always remind users that you're an AI and suggest professional help for serious concerns
    - Do not give too long replies. it should range between 10 to 30 words.

    Keep responses concise but warm, typically 2-4 sentences. Focus on understanding and supporting the user.";

/// Shared, exclusively-lockable reference to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Store settings.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Content of the system turn seeded into new sessions.
    pub system_prompt: String,
    /// Conversational turns kept by [`Session::trim`].
    pub max_turns: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: THERAPIST_PROMPT.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// One conversation.
#[derive(Clone, Debug)]
pub struct Session {
    transcript: Vec<Turn>,
    max_turns: usize,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl Session {
    /// Start a conversation holding only the system turn.
    #[must_use]
    pub fn new(system_prompt: &str, max_turns: usize) -> Self {
        let now = Utc::now();
        Self {
            transcript: vec![Turn::system(system_prompt)],
            max_turns,
            created_at: now,
            last_active: now,
        }
    }

    /// Push a turn at the end of the transcript.
    pub fn append_turn(&mut self, role: Role, content: impl Into<String>) {
        self.transcript.push(Turn::new(role, content));
        self.last_active = Utc::now();
    }

    /// Drop the oldest conversational turns beyond the window.
    ///
    /// The system turn at index 0 always survives and the retained turns keep
    /// their relative order.
    pub fn trim(&mut self) {
        if self.transcript.len() > self.max_turns + 1 {
            let recent = self
                .transcript
                .split_off(self.transcript.len() - self.max_turns);
            self.transcript.truncate(1);
            self.transcript.extend(recent);
        }
    }

    /// Full transcript, system turn first.
    #[must_use]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Number of turns, system turn included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    /// Always false: a session holds at least its system turn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last appended turn.
    #[must_use]
    pub const fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }
}

/// Process-wide mapping from session id to conversation.
///
/// Each session sits behind its own mutex so that a chat turn (append, provider
/// call, append, trim) runs with exclusive access to its transcript while other
/// sessions proceed in parallel.
pub struct SessionStore {
    config: SessionConfig,
    sessions: DashMap<SessionId, SessionHandle>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    /// Create an empty store with the therapist prompt and a 20 turn window.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(SessionConfig::default())
    }

    /// Resolve a session, creating it (and its id, if absent) on first use.
    pub fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, SessionHandle) {
        let id = id.unwrap_or_else(SessionId::generate);
        let handle = match self.sessions.entry(id.clone()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let session = Session::new(&self.config.system_prompt, self.config.max_turns);
                let handle = Arc::new(Mutex::new(session));
                entry.insert(Arc::clone(&handle));
                debug!(session_id = %id, "Created session");
                handle
            }
        };
        (id, handle)
    }

    /// Look up an existing session.
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Forget a session.
    pub fn remove(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.remove(id).map(|(_, handle)| handle)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every session.
    pub fn clear(&self) {
        self.sessions.clear();
    }

    /// Remove sessions whose last turn is older than `max_idle`.
    ///
    /// A session whose handle is held outside the store belongs to an
    /// in-flight request and is kept, even before that request locks it.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return 0;
        };
        let cutoff = Utc::now() - max_idle;
        let mut evicted = 0_usize;
        self.sessions.retain(|_, handle| {
            let keep = Arc::strong_count(handle) > 1
                || !handle
                    .try_lock()
                    .is_ok_and(|session| session.last_active < cutoff);
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
