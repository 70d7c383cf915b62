use std::fmt;

/// Where in a server-side thread the next message attaches.
///
/// Both halves are optional: no conversation id starts a new thread, and no
/// parent id continues from the thread's latest reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationRef {
    pub conversation_id: Option<String>,
    pub parent_id: Option<String>,
}

impl ConversationRef {
    pub fn new(conversation_id: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
            parent_id,
        }
    }
}

impl fmt::Display for ConversationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            self.conversation_id.as_deref().unwrap_or("<new>"),
            self.parent_id.as_deref().unwrap_or("<latest>")
        )
    }
}
