pub mod config;
pub mod conversation;
