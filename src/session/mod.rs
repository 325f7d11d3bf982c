//! Conversation state: identifiers, turns, the bounded session store and its
//! optional idle sweeper.

pub mod ids;
pub mod store;
pub mod sweeper;
pub mod turn;

pub use ids::SessionId;
pub use store::{
    DEFAULT_MAX_TURNS, Session, SessionConfig, SessionHandle, SessionStore, THERAPIST_PROMPT,
};
pub use sweeper::{SessionSweeper, SweeperConfig};
pub use turn::{Role, Turn};
