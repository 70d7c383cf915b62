//! Command-line interface parsing and startup
//!
//! Loads the configuration, logs in, and hands control to the interactive
//! shell on stdin/stdout.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::client::HttpChatbot;
use crate::core::config::ConfigSearch;
use crate::shell::Shell;
use crate::utils::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "revchat")]
#[command(version)]
#[command(about = "An interactive command-line chat with a remote chat-completion service")]
#[command(
    long_about = "revchat reads a JSON configuration, logs in to a chat-completion service \
and runs an interactive prompt. Type your message and press enter twice to submit it.\n\n\
Configuration search order:\n\
  ./config.json\n\
  $XDG_CONFIG_HOME/revChatGPT/config.json\n\
  $HOME/.config/revChatGPT/config.json\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    API key used when the config has no \"api_key\"\n\
  REVCHAT_LOG       Diagnostic log filter (e.g. debug), written to stderr\n\n\
Commands:\n\
  !help             Show the list of commands\n\
  !exit             Exit the program"
)]
pub struct Args {
    /// Use this config file instead of searching the default locations
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn config_search(&self) -> ConfigSearch {
        match &self.config {
            Some(path) => ConfigSearch::explicit(path.clone()),
            None => ConfigSearch::from_env(),
        }
    }
}

pub const BANNER: &str = "
        revchat - A command-line interface to chat-completion services
        ";

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    println!("{BANNER}");
    println!("Type '!help' to show a full list of commands");
    println!("Press enter twice to submit your question.\n");

    let (path, config) = match args.config_search().load() {
        Ok(found) => found,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };
    info!(path = %path.display(), "Configuration loaded");

    println!("Logging in...");
    let chatbot = match HttpChatbot::login(&config) {
        Ok(chatbot) => chatbot,
        Err(err) => {
            eprintln!("❌ Login failed: {err}");
            std::process::exit(1);
        }
    };

    let mut shell = Shell::new(chatbot, config);
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    shell.run(&mut reader, &mut writer).await?;
    Ok(())
}
