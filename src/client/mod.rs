//! Chat client: session store and a streaming consumer of `POST /api/chat`

mod http;
mod store;

pub use http::{ChatClient, default_sessions_path};
pub use store::{ChatSession, ChatStore, Message, SessionFile};

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Chat session {0} not found")]
    NotFound(Uuid),

    #[error("Message {0} not found")]
    MessageNotFound(Uuid),

    /// A reply is still streaming into this session
    #[error("Chat session {0} is busy with another reply")]
    SessionBusy(Uuid),

    #[error(transparent)]
    Persist(#[from] StoreError),
}
