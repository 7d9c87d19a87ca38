// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;
pub mod launcher;
pub mod list;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scribe", about = "The Scribe: compliance co-pilot", version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick a model or a saved session, then start a chat (default)
    Launch,
    /// Run the chat host for one session
    Chat {
        /// Ollama model identifier, e.g. llama3:8b
        #[arg(long)]
        model: String,
        /// Session log to continue
        #[arg(long)]
        resume: Option<PathBuf>,
    },
    /// List selectable Ollama models
    Models,
    /// List resumable session logs, newest first
    Sessions,
}
