use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::core::conversation::ConversationRef;

/// Key holding the active conversation identifier.
pub const CONVERSATION_KEY: &str = "conversation";
/// Key holding the message the next turn replies to.
pub const PARENT_ID_KEY: &str = "parent_id";

/// The parsed configuration file.
///
/// Only `conversation` and `parent_id` carry meaning for the shell; every
/// other key is opaque and handed through to the chat client untouched.
/// Key order from the file is preserved so `!config` echoes it back faithfully.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(transparent)]
pub struct Config {
    values: Map<String, Value>,
}

impl Config {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a key as a non-empty string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    pub fn conversation(&self) -> Option<&str> {
        self.get_str(CONVERSATION_KEY)
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.get_str(PARENT_ID_KEY)
    }

    /// Point the next turn at another conversation.
    ///
    /// Parent ids are scoped to a conversation, so any previous `parent_id`
    /// is dropped and the next ask continues from the new conversation's
    /// latest reply.
    pub fn set_conversation(&mut self, conversation_id: impl Into<String>) {
        self.set(CONVERSATION_KEY, Value::String(conversation_id.into()));
        self.remove(PARENT_ID_KEY);
    }

    /// Snapshot the thread position the next ask should attach to.
    pub fn conversation_ref(&self) -> ConversationRef {
        ConversationRef {
            conversation_id: self.conversation().map(str::to_string),
            parent_id: self.parent_id().map(str::to_string),
        }
    }

    /// Record a thread position, removing keys for absent ids.
    pub fn apply_conversation_ref(&mut self, thread: &ConversationRef) {
        match &thread.conversation_id {
            Some(id) => self.set(CONVERSATION_KEY, Value::String(id.clone())),
            None => {
                self.remove(CONVERSATION_KEY);
            }
        }
        match &thread.parent_id {
            Some(id) => self.set(PARENT_ID_KEY, Value::String(id.clone())),
            None => {
                self.remove(PARENT_ID_KEY);
            }
        }
    }

    pub fn clear_conversation(&mut self) {
        self.remove(CONVERSATION_KEY);
        self.remove(PARENT_ID_KEY);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/revChatGPT/config.json` → `~/.config/revChatGPT/config.json`
/// - Windows: paths are shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
