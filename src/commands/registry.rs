/// Prefix that marks a line of input as a shell command.
pub const COMMAND_PREFIX: char = '!';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Reset,
    Refresh,
    Config,
    Rollback,
    SetConversation,
    Exit,
}

pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub kind: CommandKind,
}

pub fn all_commands() -> &'static [CommandSpec] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for "did you mean" hints.
pub fn matching_commands(prefix: &str) -> Vec<&'static CommandSpec> {
    let prefix = prefix.to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(|command| !prefix.is_empty() && command.name.starts_with(prefix.as_str()))
        .collect()
}

/// The `!help` listing, one command per line.
pub fn help_text() -> String {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    all_commands()
        .iter()
        .map(|command| format!("{:<width$} - {}", command.usage, command.help))
        .collect::<Vec<_>>()
        .join("\n")
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        usage: "!help",
        help: "Show this message",
        kind: CommandKind::Help,
    },
    CommandSpec {
        name: "reset",
        usage: "!reset",
        help: "Forget the current conversation",
        kind: CommandKind::Reset,
    },
    CommandSpec {
        name: "refresh",
        usage: "!refresh",
        help: "Refresh the session authentication",
        kind: CommandKind::Refresh,
    },
    CommandSpec {
        name: "config",
        usage: "!config",
        help: "Show the current configuration",
        kind: CommandKind::Config,
    },
    CommandSpec {
        name: "rollback",
        usage: "!rollback [x]",
        help: "Rollback the conversation (x being the number of messages to rollback, default 1)",
        kind: CommandKind::Rollback,
    },
    CommandSpec {
        name: "setconversation",
        usage: "!setconversation <id>",
        help: "Switch to another conversation",
        kind: CommandKind::SetConversation,
    },
    CommandSpec {
        name: "exit",
        usage: "!exit",
        help: "Exit this program",
        kind: CommandKind::Exit,
    },
];
