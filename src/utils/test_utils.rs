use crate::client::{AskResponse, ChatClient, ClientError};
use crate::core::config::Config;
use crate::core::conversation::ConversationRef;
use crate::shell::Shell;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    Ask {
        prompt: String,
        thread: ConversationRef,
    },
    Reset,
    Refresh,
    Rollback(usize),
}

/// A scripted stand-in for the chat service.
///
/// Asks pop queued results; once the queue is empty they succeed with an
/// echo reply in conversation `conv-1`.
#[derive(Default)]
pub struct MockClient {
    pub calls: Vec<ClientCall>,
    pub ask_results: VecDeque<Result<AskResponse, ClientError>>,
    pub rollback_result: Option<ConversationRef>,
    pub fail_refresh: bool,
    replies: usize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ask_result(mut self, result: Result<AskResponse, ClientError>) -> Self {
        self.ask_results.push_back(result);
        self
    }

    pub fn asks(&self) -> Vec<&ConversationRef> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ClientCall::Ask { thread, .. } => Some(thread),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn ask(
        &mut self,
        prompt: &str,
        thread: &ConversationRef,
    ) -> Result<AskResponse, ClientError> {
        self.calls.push(ClientCall::Ask {
            prompt: prompt.to_string(),
            thread: thread.clone(),
        });
        if let Some(result) = self.ask_results.pop_front() {
            return result;
        }
        self.replies += 1;
        Ok(AskResponse {
            message: format!("echo: {prompt}"),
            conversation_id: thread
                .conversation_id
                .clone()
                .unwrap_or_else(|| "conv-1".to_string()),
            parent_id: format!("reply-{}", self.replies),
        })
    }

    async fn reset_chat(&mut self) -> Result<(), ClientError> {
        self.calls.push(ClientCall::Reset);
        Ok(())
    }

    async fn refresh_session(&mut self, _config: &Config) -> Result<(), ClientError> {
        self.calls.push(ClientCall::Refresh);
        if self.fail_refresh {
            return Err(ClientError::Auth("token expired".to_string()));
        }
        Ok(())
    }

    async fn rollback_conversation(
        &mut self,
        count: usize,
    ) -> Result<ConversationRef, ClientError> {
        self.calls.push(ClientCall::Rollback(count));
        Ok(self.rollback_result.clone().unwrap_or_default())
    }
}

pub fn create_test_config(json: &str) -> Config {
    Config::parse(json).expect("test config must be valid JSON")
}

pub fn create_test_shell(config_json: &str) -> Shell<MockClient> {
    Shell::new(MockClient::new(), create_test_config(config_json))
}

/// Feed `input` through `shell.run` and return everything written to stdout.
pub async fn run_script(shell: &mut Shell<MockClient>, input: &str) -> (String, Cursor<String>) {
    let mut reader = Cursor::new(input.to_string());
    let mut output = Vec::new();
    shell
        .run(&mut reader, &mut output)
        .await
        .expect("in-memory I/O cannot fail");
    (String::from_utf8(output).unwrap(), reader)
}
