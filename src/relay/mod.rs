//! Request orchestration between clients, the session store and the providers.

pub mod chat;
pub mod error;
pub mod speech;

pub use chat::{ChatRelay, ChatReply};
pub use error::{RelayError, RelayResult};
pub use speech::SpeechRelay;
