//! The interactive read-eval-print loop.
//!
//! Each turn reads one multi-line input, parses it into a [`Command`] and
//! handles it. The configuration is owned here; the conversation position is
//! snapshotted from it before every ask, so `!setconversation` and prior
//! replies take effect on the next turn.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::client::ChatClient;
use crate::commands::{help_text, matching_commands, parse_input, Command, COMMAND_PREFIX};
use crate::core::config::Config;
use crate::utils::input::prompt_multiline;

pub const USER_PROMPT: &str = "\nYou:\n";
pub const ASSISTANT_LABEL: &str = "Chatbot: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    AwaitingInput,
    Terminated,
}

pub struct Shell<C: ChatClient> {
    client: C,
    config: Config,
    state: ShellState,
}

impl<C: ChatClient> Shell<C> {
    pub fn new(client: C, config: Config) -> Self {
        Self {
            client,
            config,
            state: ShellState::AwaitingInput,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    /// Run until `!exit` or end of input.
    ///
    /// Only I/O errors on the terminal itself end the loop early; client
    /// failures are reported and the loop carries on.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> io::Result<()> {
        while self.state == ShellState::AwaitingInput {
            let Some(input) = prompt_multiline(USER_PROMPT, reader, writer)? else {
                debug!("Input closed");
                self.state = ShellState::Terminated;
                break;
            };
            self.handle(parse_input(&input), writer).await?;
        }
        writer.flush()
    }

    pub async fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        match command {
            Command::Help => {
                writeln!(out, "\n{}\n", help_text())?;
            }
            Command::Reset => match self.client.reset_chat().await {
                Ok(()) => {
                    self.config.clear_conversation();
                    writeln!(out, "Chat session successfully reset.")?;
                }
                Err(err) => report_failure(out, "Failed to reset chat", &err)?,
            },
            Command::Refresh => match self.client.refresh_session(&self.config).await {
                Ok(()) => writeln!(out, "Session successfully refreshed.\n")?,
                Err(err) => report_failure(out, "Failed to refresh session", &err)?,
            },
            Command::ShowConfig => match self.config.to_pretty_json() {
                Ok(json) => writeln!(out, "{json}")?,
                Err(err) => report_failure(out, "Failed to render configuration", &err)?,
            },
            Command::Rollback(count) => match self.client.rollback_conversation(count).await {
                Ok(position) => {
                    self.config.apply_conversation_ref(&position);
                    writeln!(out, "Rolled back {count} messages.")?;
                }
                Err(err) => report_failure(out, "Failed to roll back", &err)?,
            },
            Command::SetConversation(id) => {
                self.config.set_conversation(id);
                writeln!(out, "Conversation has been changed")?;
            }
            Command::Exit => {
                self.state = ShellState::Terminated;
            }
            Command::Chat(prompt) => self.chat(&prompt, out).await?,
            Command::Empty => {}
            Command::Invalid(message) => writeln!(out, "{message}")?,
            Command::Unknown(name) => {
                write!(out, "Unknown command: {COMMAND_PREFIX}{name}.")?;
                let suggestions: Vec<String> = matching_commands(&name)
                    .iter()
                    .map(|command| format!("{COMMAND_PREFIX}{}", command.name))
                    .collect();
                if !suggestions.is_empty() {
                    write!(out, " Did you mean {}?", suggestions.join(" or "))?;
                }
                writeln!(out, " Type '!help' to show a full list of commands")?;
            }
        }
        Ok(())
    }

    async fn chat<W: Write>(&mut self, prompt: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "{ASSISTANT_LABEL}")?;
        out.flush()?;

        let thread = self.config.conversation_ref();
        debug!(%thread, "Asking");
        match self.client.ask(prompt, &thread).await {
            Ok(response) => {
                self.config.apply_conversation_ref(&response.next_ref());
                writeln!(out, "{}", response.message)?;
            }
            Err(err) => {
                warn!(transient = err.is_transient(), "Ask failed: {err}");
                writeln!(out, "Something went wrong!")?;
                writeln!(out, "{err}")?;
            }
        }
        Ok(())
    }
}

fn report_failure<W: Write>(
    out: &mut W,
    context: &str,
    err: &dyn std::error::Error,
) -> io::Result<()> {
    warn!("{context}: {err}");
    writeln!(out, "{context}: {err}")
}
