//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::api::{ChatMessage, ChatRequest, ROLE_SYSTEM, ROLE_USER};
use crate::client::stream::collect_reply;
use crate::client::threads::ThreadStore;
use crate::client::{AskResponse, ChatClient, ClientError};
use crate::core::config::Config;
use crate::core::conversation::ConversationRef;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Join the completions endpoint onto a base URL, tolerating stray slashes.
fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Connection settings read from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub proxy: Option<String>,
    pub system_prompt: Option<String>,
    pub timeout: Duration,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::from_config_with_env(config, |key| std::env::var(key).ok())
    }

    /// `api_key` wins over `access_token`, which wins over `$OPENAI_API_KEY`.
    pub fn from_config_with_env<F>(config: &Config, lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = config
            .get_str("api_key")
            .or_else(|| config.get_str("access_token"))
            .map(str::to_string)
            .or_else(|| lookup(API_KEY_ENV).filter(|key| !key.is_empty()))
            .ok_or_else(|| {
                ClientError::Auth(format!(
                    "no API key; set \"api_key\" in the config file or {API_KEY_ENV}"
                ))
            })?;

        let timeout_secs = config
            .get("timeout_secs")
            .and_then(serde_json::Value::as_u64)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_key,
            base_url: config
                .get_str("base_url")
                .unwrap_or(DEFAULT_BASE_URL)
                .to_string(),
            model: config.get_str("model").unwrap_or(DEFAULT_MODEL).to_string(),
            proxy: config.get_str("proxy").map(str::to_string),
            system_prompt: config.get_str("system_prompt").map(str::to_string),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    fn build_client(&self) -> Result<reqwest::Client, ClientError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| ClientError::InvalidRequest(format!("Invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }
        Ok(builder.build()?)
    }

    /// Messages for one request: optional system prompt, history, then the prompt.
    pub fn request_messages(&self, history: Vec<ChatMessage>, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system_prompt) = &self.system_prompt {
            messages.push(ChatMessage::new(ROLE_SYSTEM, system_prompt.clone()));
        }
        messages.extend(history);
        messages.push(ChatMessage::new(ROLE_USER, prompt));
        messages
    }
}

pub struct HttpChatbot {
    client: reqwest::Client,
    settings: SessionSettings,
    threads: ThreadStore,
}

impl HttpChatbot {
    /// Resolve credentials from `config` and prepare an HTTP session.
    pub fn login(config: &Config) -> Result<Self, ClientError> {
        let settings = SessionSettings::from_config(config)?;
        let client = settings.build_client()?;
        info!(base_url = %settings.base_url, model = %settings.model, "Session ready");
        Ok(Self {
            client,
            settings,
            threads: ThreadStore::new(),
        })
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, ClientError> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages,
            stream: true,
        };

        let chat_url = chat_completions_url(&self.settings.base_url);
        let response = self
            .client
            .post(chat_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ClientError::api(status.as_u16(), &error_text));
        }

        collect_reply(response).await
    }
}

#[async_trait]
impl ChatClient for HttpChatbot {
    async fn ask(
        &mut self,
        prompt: &str,
        thread: &ConversationRef,
    ) -> Result<AskResponse, ClientError> {
        let prepared = self.threads.prepare(thread);
        debug!(
            conversation = %prepared.conversation_id,
            history = prepared.history.len(),
            "Sending chat turn"
        );

        let messages = self
            .settings
            .request_messages(prepared.history.clone(), prompt);
        let message = self.complete(messages).await?;
        let parent_id = self.threads.record(&prepared, prompt, &message);

        Ok(AskResponse {
            message,
            conversation_id: prepared.conversation_id,
            parent_id,
        })
    }

    async fn reset_chat(&mut self) -> Result<(), ClientError> {
        self.threads.reset();
        Ok(())
    }

    async fn refresh_session(&mut self, config: &Config) -> Result<(), ClientError> {
        let settings = SessionSettings::from_config(config)?;
        self.client = settings.build_client()?;
        self.settings = settings;
        info!("Session refreshed");
        Ok(())
    }

    async fn rollback_conversation(
        &mut self,
        count: usize,
    ) -> Result<ConversationRef, ClientError> {
        let position = self.threads.rollback(count)?;
        debug!(
            remaining = self.threads.rollback_depth(),
            "Rolled back {count} turns to {position}"
        );
        Ok(position)
    }
}
