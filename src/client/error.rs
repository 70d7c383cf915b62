use std::error::Error as StdError;
use std::fmt;

/// Failures surfaced by a [`ChatClient`](super::ChatClient).
///
/// The shell reports all of these the same way; the split exists so callers
/// can tell retryable failures from permanent ones.
#[derive(Debug)]
pub enum ClientError {
    /// The request never completed: connection refused, DNS, timeout.
    Transport(reqwest::Error),

    /// The service answered with a non-success status.
    Api {
        status: u16,
        message: String,
    },

    /// The response could not be understood.
    Protocol(String),

    /// No usable credentials.
    Auth(String),

    /// The operation makes no sense in the current state.
    InvalidRequest(String),
}

impl ClientError {
    /// Whether repeating the same call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Api { status, .. } => *status == 429 || *status >= 500,
            ClientError::Protocol(_) | ClientError::Auth(_) | ClientError::InvalidRequest(_) => {
                false
            }
        }
    }

    pub fn api(status: u16, body: &str) -> Self {
        ClientError::Api {
            status,
            message: summarize_api_error(body),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(err) => write!(f, "Request failed: {err}"),
            ClientError::Api { status, message } => {
                write!(f, "API Error ({status}): {message}")
            }
            ClientError::Protocol(message) => write!(f, "Unexpected response: {message}"),
            ClientError::Auth(message) => write!(f, "Authentication error: {message}"),
            ClientError::InvalidRequest(message) => f.write_str(message),
        }
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ClientError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err)
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .or_else(|| value.get("detail"))
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Reduce an error body to one readable line.
pub(crate) fn summarize_api_error(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value).filter(|s| !s.is_empty()) {
            return summary;
        }
        return json_value.to_string();
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}
