//! Parsing of shell input into typed commands.
//!
//! Every logical input (one or more lines submitted together) becomes exactly
//! one [`Command`]. Inputs that start with `!` are commands; a `!` word that
//! names no known command is [`Command::Unknown`] rather than chat text, so a
//! typo never leaks to the remote service.

mod registry;

pub use registry::{
    all_commands, find_command, help_text, matching_commands, CommandKind, CommandSpec,
    COMMAND_PREFIX,
};

/// Message printed for `!setconversation` without an id.
pub const SET_CONVERSATION_USAGE: &str = "Please include conversation UUID in command";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Reset,
    Refresh,
    ShowConfig,
    Rollback(usize),
    SetConversation(String),
    Exit,
    /// Free text for the chat service, passed through verbatim.
    Chat(String),
    /// Nothing was typed before submitting.
    Empty,
    /// A known command with a malformed argument; carries the message to show.
    Invalid(String),
    /// `!name` that matches no command.
    Unknown(String),
}

pub fn parse_input(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let Some(body) = trimmed.strip_prefix(COMMAND_PREFIX) else {
        return Command::Chat(input.to_string());
    };

    let mut parts = body.split_whitespace();
    let name = match parts.next() {
        // `!name` must be glued together; a bare `!` or `! text` is chat.
        Some(name) if body.starts_with(name) => name,
        _ => return Command::Chat(input.to_string()),
    };
    let arg = parts.next();

    let Some(spec) = find_command(name) else {
        return Command::Unknown(name.to_string());
    };

    match spec.kind {
        CommandKind::Help => Command::Help,
        CommandKind::Reset => Command::Reset,
        CommandKind::Refresh => Command::Refresh,
        CommandKind::Config => Command::ShowConfig,
        CommandKind::Exit => Command::Exit,
        CommandKind::Rollback => parse_rollback(spec, arg),
        CommandKind::SetConversation => match arg {
            Some(id) => Command::SetConversation(id.to_string()),
            None => Command::Invalid(SET_CONVERSATION_USAGE.to_string()),
        },
    }
}

fn parse_rollback(spec: &CommandSpec, arg: Option<&str>) -> Command {
    let Some(raw) = arg else {
        return Command::Rollback(1);
    };
    match raw.parse::<usize>() {
        Ok(count) if count > 0 => Command::Rollback(count),
        _ => Command::Invalid(format!(
            "Invalid rollback count '{raw}'. Usage: {}",
            spec.usage
        )),
    }
}
