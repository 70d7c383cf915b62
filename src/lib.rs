//! revchat is a line-oriented shell for talking to a remote chat-completion
//! service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the configuration file (discovery, parsing, in-memory
//!   edits) and the conversation position type.
//! - [`commands`] parses each submitted input into a typed command.
//! - [`shell`] runs the read-eval-print loop and dispatches commands.
//! - [`client`] defines the chat client contract and the HTTP implementation.
//! - [`api`] defines the chat-completion payloads sent over the wire.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`], which loads
//! configuration, logs in, and starts the shell on stdin/stdout.

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod core;
pub mod shell;
pub mod utils;
