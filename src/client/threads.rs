//! Client-side conversation threading.
//!
//! The completion endpoint is stateless, so conversations live here: each
//! conversation is a tree of turns keyed by reply id, and a request's history
//! is the path from the root to the turn it replies to.

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use crate::api::{ChatMessage, ROLE_ASSISTANT, ROLE_USER};
use crate::client::error::ClientError;
use crate::core::conversation::ConversationRef;

#[derive(Debug, Clone)]
struct Turn {
    parent: Option<String>,
    prompt: String,
    reply: String,
}

#[derive(Debug, Default)]
struct Conversation {
    turns: HashMap<String, Turn>,
    latest: Option<String>,
}

impl Conversation {
    fn history(&self, leaf: Option<&str>) -> Vec<ChatMessage> {
        let mut chain = Vec::new();
        let mut cursor = leaf.map(str::to_string);
        while let Some(id) = cursor {
            let Some(turn) = self.turns.get(&id) else {
                break;
            };
            chain.push(turn);
            cursor = turn.parent.clone();
        }

        chain
            .into_iter()
            .rev()
            .flat_map(|turn| {
                [
                    ChatMessage::new(ROLE_USER, turn.prompt.clone()),
                    ChatMessage::new(ROLE_ASSISTANT, turn.reply.clone()),
                ]
            })
            .collect()
    }
}

/// A resolved request position: which conversation, which parent, and the
/// messages leading up to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTurn {
    pub conversation_id: String,
    pub parent_id: Option<String>,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Default)]
pub struct ThreadStore {
    conversations: HashMap<String, Conversation>,
    /// Resolved positions each recorded turn attached to, oldest first.
    previous: Vec<ConversationRef>,
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Work out where a turn asked at `thread` attaches.
    ///
    /// Nothing is recorded until [`ThreadStore::record`] runs, so a failed
    /// request leaves the store untouched.
    pub fn prepare(&self, thread: &ConversationRef) -> PreparedTurn {
        let Some(conversation_id) = thread.conversation_id.clone() else {
            return PreparedTurn {
                conversation_id: Uuid::new_v4().to_string(),
                parent_id: None,
                history: Vec::new(),
            };
        };

        let Some(conversation) = self.conversations.get(&conversation_id) else {
            warn!(
                conversation = %conversation_id,
                "Unknown conversation; starting it with an empty history"
            );
            return PreparedTurn {
                conversation_id,
                parent_id: None,
                history: Vec::new(),
            };
        };

        let parent_id = match &thread.parent_id {
            Some(parent) if conversation.turns.contains_key(parent) => Some(parent.clone()),
            Some(parent) => {
                warn!(
                    conversation = %conversation_id,
                    parent = %parent,
                    "Unknown parent message; starting from the conversation root"
                );
                None
            }
            None => conversation.latest.clone(),
        };
        let history = conversation.history(parent_id.as_deref());

        PreparedTurn {
            conversation_id,
            parent_id,
            history,
        }
    }

    /// Store a completed turn and return the id of its reply.
    ///
    /// The rollback stack keeps the resolved position, so a parentless ask
    /// that continued from the latest reply rolls back to that reply.
    pub fn record(&mut self, prepared: &PreparedTurn, prompt: &str, reply: &str) -> String {
        let reply_id = Uuid::new_v4().to_string();
        let conversation = self
            .conversations
            .entry(prepared.conversation_id.clone())
            .or_default();
        conversation.turns.insert(
            reply_id.clone(),
            Turn {
                parent: prepared.parent_id.clone(),
                prompt: prompt.to_string(),
                reply: reply.to_string(),
            },
        );
        conversation.latest = Some(reply_id.clone());
        self.previous.push(ConversationRef::new(
            prepared.conversation_id.clone(),
            prepared.parent_id.clone(),
        ));
        reply_id
    }

    /// Undo the last `count` recorded turns' positions.
    ///
    /// Returns the position the oldest undone turn attached to. Stored
    /// turns stay addressable by id; only the resume position moves.
    pub fn rollback(&mut self, count: usize) -> Result<ConversationRef, ClientError> {
        if count == 0 || count > self.previous.len() {
            return Err(ClientError::InvalidRequest(format!(
                "Cannot roll back {count} messages; {} available",
                self.previous.len()
            )));
        }

        let keep = self.previous.len() - count;
        let restored = self.previous.drain(keep..).next().unwrap_or_default();
        self.restore_latest(&restored);
        Ok(restored)
    }

    /// Point a conversation's latest marker back at `position` so a
    /// parentless ask resumes there.
    fn restore_latest(&mut self, position: &ConversationRef) {
        if let Some(id) = &position.conversation_id {
            if let Some(conversation) = self.conversations.get_mut(id) {
                conversation.latest = position
                    .parent_id
                    .clone()
                    .filter(|parent| conversation.turns.contains_key(parent));
            }
        }
    }

    pub fn rollback_depth(&self) -> usize {
        self.previous.len()
    }

    pub fn reset(&mut self) {
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(store: &mut ThreadStore, thread: &ConversationRef, prompt: &str) -> ConversationRef {
        let prepared = store.prepare(thread);
        let reply_id = store.record(&prepared, prompt, &format!("re: {prompt}"));
        ConversationRef::new(prepared.conversation_id, Some(reply_id))
    }

    #[test]
    fn new_thread_gets_fresh_conversation_and_no_history() {
        let store = ThreadStore::new();
        let first = store.prepare(&ConversationRef::default());
        let second = store.prepare(&ConversationRef::default());

        assert!(first.history.is_empty());
        assert_eq!(first.parent_id, None);
        assert_ne!(first.conversation_id, second.conversation_id);
    }

    #[test]
    fn history_follows_parent_chain() {
        let mut store = ThreadStore::new();
        let after_one = ask(&mut store, &ConversationRef::default(), "one");
        let after_two = ask(&mut store, &after_one, "two");

        let prepared = store.prepare(&after_two);
        let contents: Vec<_> = prepared.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "re: one", "two", "re: two"]);
        assert_eq!(prepared.history[0].role, ROLE_USER);
        assert_eq!(prepared.history[1].role, ROLE_ASSISTANT);
    }

    #[test]
    fn branching_from_an_earlier_parent_excludes_later_turns() {
        let mut store = ThreadStore::new();
        let after_one = ask(&mut store, &ConversationRef::default(), "one");
        ask(&mut store, &after_one, "two");

        let prepared = store.prepare(&after_one);
        assert_eq!(prepared.history.len(), 2);
        assert_eq!(prepared.parent_id, after_one.parent_id);
    }

    #[test]
    fn missing_parent_continues_from_latest_reply() {
        let mut store = ThreadStore::new();
        let after_one = ask(&mut store, &ConversationRef::default(), "one");
        let conversation_only = ConversationRef {
            conversation_id: after_one.conversation_id.clone(),
            parent_id: None,
        };

        let prepared = store.prepare(&conversation_only);
        assert_eq!(prepared.parent_id, after_one.parent_id);
        assert_eq!(prepared.history.len(), 2);
    }

    #[test]
    fn unknown_conversation_keeps_its_id_with_empty_history() {
        let store = ThreadStore::new();
        let prepared = store.prepare(&ConversationRef::new("from-another-session", None));
        assert_eq!(prepared.conversation_id, "from-another-session");
        assert!(prepared.history.is_empty());
    }

    #[test]
    fn unknown_parent_starts_from_root() {
        let mut store = ThreadStore::new();
        let after_one = ask(&mut store, &ConversationRef::default(), "one");
        let bogus = ConversationRef {
            conversation_id: after_one.conversation_id.clone(),
            parent_id: Some("nope".to_string()),
        };

        let prepared = store.prepare(&bogus);
        assert_eq!(prepared.parent_id, None);
        assert!(prepared.history.is_empty());
    }

    #[test]
    fn rollback_returns_position_before_undone_turns() {
        let mut store = ThreadStore::new();
        let start = ConversationRef::default();
        let after_one = ask(&mut store, &start, "one");
        let after_two = ask(&mut store, &after_one, "two");
        ask(&mut store, &after_two, "three");

        assert_eq!(store.rollback(2).unwrap(), after_one);
        assert_eq!(store.rollback_depth(), 1);

        // A parentless ask now resumes right after "one".
        let resumed = store.prepare(&ConversationRef {
            conversation_id: after_one.conversation_id.clone(),
            parent_id: None,
        });
        assert_eq!(resumed.history.len(), 2);

        let restored = store.rollback(1).unwrap();
        assert_eq!(restored.conversation_id, after_one.conversation_id);
        assert_eq!(restored.parent_id, None);
        assert!(store.prepare(&restored).history.is_empty());
    }

    #[test]
    fn rollback_after_parentless_ask_keeps_earlier_context() {
        let mut store = ThreadStore::new();
        let after_one = ask(&mut store, &ConversationRef::default(), "one");
        let switched = ConversationRef {
            conversation_id: after_one.conversation_id.clone(),
            parent_id: None,
        };
        ask(&mut store, &switched, "two");

        let restored = store.rollback(1).unwrap();
        assert_eq!(restored, after_one);

        let resumed = store.prepare(&restored);
        let contents: Vec<_> = resumed.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "re: one"]);

        let parentless = store.prepare(&switched);
        assert_eq!(parentless.history.len(), 2);
    }

    #[test]
    fn rollback_past_history_fails_without_changes() {
        let mut store = ThreadStore::new();
        ask(&mut store, &ConversationRef::default(), "one");

        let err = store.rollback(2).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
        assert_eq!(store.rollback_depth(), 1);
        assert!(store.rollback(0).is_err());
    }

    #[test]
    fn reset_forgets_rollback_positions() {
        let mut store = ThreadStore::new();
        ask(&mut store, &ConversationRef::default(), "one");
        store.reset();
        assert_eq!(store.rollback_depth(), 0);
        assert!(store.rollback(1).is_err());
    }
}
