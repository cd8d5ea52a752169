use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MESSAGES_FILE: &str = "messages.json";
pub const DEFAULT_STORAGE_DIR: &str = ".coolichat";

#[derive(Debug, Parser)]
#[command(
    name = "coolichat",
    version,
    about = "Anonymous chat: REST server and local client"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the chat page and the message API
    Serve(ServeArgs),
    /// Compose a message into the local message list
    Send {
        #[command(flatten)]
        local: LocalArgs,
        /// Message text
        text: Option<String>,
        /// File to attach (10 MB at most)
        #[arg(long, value_name = "FILE")]
        attach: Option<PathBuf>,
    },
    /// Print the local message list
    Show {
        #[command(flatten)]
        local: LocalArgs,
    },
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// JSON file the messages are persisted to
    #[arg(long, env = "MESSAGES_FILE", default_value = DEFAULT_MESSAGES_FILE, value_name = "FILE")]
    pub messages_file: PathBuf,
    #[arg(long, default_value = "templates", value_name = "DIR")]
    pub templates: PathBuf,
    #[arg(long, default_value = "static", value_name = "DIR")]
    pub static_dir: PathBuf,
}

#[derive(Debug, Args)]
pub struct LocalArgs {
    /// Directory holding the local message list
    #[arg(long, env = "COOLICHAT_STORAGE", default_value = DEFAULT_STORAGE_DIR, value_name = "DIR")]
    pub storage_dir: PathBuf,
}
