//! The chat client contract and its HTTP implementation.
//!
//! The shell only talks to [`ChatClient`]; [`HttpChatbot`] is the
//! implementation the binary wires in.

mod error;
pub mod http;
mod stream;
pub mod threads;

use async_trait::async_trait;

use crate::core::config::Config;
use crate::core::conversation::ConversationRef;

pub use error::ClientError;
pub use http::HttpChatbot;

/// A completed chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskResponse {
    pub message: String,
    /// Conversation the turn was recorded in.
    pub conversation_id: String,
    /// Id of the reply; pass it as the parent of the next turn to continue here.
    pub parent_id: String,
}

impl AskResponse {
    /// The position right after this turn.
    pub fn next_ref(&self) -> ConversationRef {
        ConversationRef::new(self.conversation_id.clone(), Some(self.parent_id.clone()))
    }
}

#[async_trait]
pub trait ChatClient: Send {
    /// Send `prompt` as a new message attached at `thread`.
    async fn ask(
        &mut self,
        prompt: &str,
        thread: &ConversationRef,
    ) -> Result<AskResponse, ClientError>;

    /// Forget any conversation context held by the client.
    async fn reset_chat(&mut self) -> Result<(), ClientError>;

    /// Re-establish credentials from `config` without restarting.
    async fn refresh_session(&mut self, config: &Config) -> Result<(), ClientError>;

    /// Drop the last `count` turns and return the position to resume from.
    async fn rollback_conversation(
        &mut self,
        count: usize,
    ) -> Result<ConversationRef, ClientError>;
}
