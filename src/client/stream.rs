//! Server-sent-event handling for streamed chat completions.

use futures_util::StreamExt;
use memchr::memchr;

use crate::api::ChatResponse;
use crate::client::error::{summarize_api_error, ClientError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StreamEvent {
    Chunk(String),
    Error(String),
    End,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn handle_data_payload(payload: &str) -> Option<StreamEvent> {
    if payload == "[DONE]" {
        return Some(StreamEvent::End);
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
            .map(StreamEvent::Chunk),
        Err(_) => {
            if payload.trim().is_empty() {
                return None;
            }
            Some(StreamEvent::Error(summarize_api_error(payload)))
        }
    }
}

/// Interpret one SSE line; comments, blank lines and other fields yield nothing.
pub(crate) fn process_sse_line(line: &str) -> Option<StreamEvent> {
    extract_data_payload(line).and_then(handle_data_payload)
}

/// Accumulates streamed deltas into the full reply text.
#[derive(Default)]
pub(crate) struct ReplyCollector {
    buffer: Vec<u8>,
    reply: String,
    finished: bool,
}

impl ReplyCollector {
    /// Feed raw bytes from the wire. Returns `true` once the stream is done.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<bool, ClientError> {
        if self.finished {
            return Ok(true);
        }
        self.buffer.extend_from_slice(bytes);

        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            let event = match std::str::from_utf8(&self.buffer[..newline_pos]) {
                Ok(line) => process_sse_line(line.trim()),
                Err(e) => {
                    self.buffer.drain(..=newline_pos);
                    return Err(ClientError::Protocol(format!(
                        "invalid UTF-8 in stream: {e}"
                    )));
                }
            };
            self.buffer.drain(..=newline_pos);

            match event {
                Some(StreamEvent::Chunk(content)) => self.reply.push_str(&content),
                Some(StreamEvent::Error(message)) => {
                    self.finished = true;
                    return Err(ClientError::Protocol(message));
                }
                Some(StreamEvent::End) => {
                    self.finished = true;
                    return Ok(true);
                }
                None => {}
            }
        }

        Ok(false)
    }

    /// Finish the stream, flushing a final unterminated line.
    pub(crate) fn finish(mut self) -> Result<String, ClientError> {
        if !self.finished && !self.buffer.is_empty() {
            self.push(b"\n")?;
        }
        Ok(self.reply)
    }
}

/// Drain a streaming response body into the complete reply.
pub(crate) async fn collect_reply(response: reqwest::Response) -> Result<String, ClientError> {
    let mut collector = ReplyCollector::default();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if collector.push(&chunk)? {
            break;
        }
    }

    collector.finish()
}
