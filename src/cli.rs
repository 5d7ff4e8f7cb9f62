use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "fluent-english", version, about = "Intermediate English lessons with spoken examples")]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lesson catalog to use instead of the built-in one
    #[arg(long, global = true)]
    pub lessons: Option<PathBuf>,

    /// Lesson id to open first
    #[arg(long)]
    pub lesson: Option<u32>,

    /// Log debug output to stderr (warnings only otherwise)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Speak one text and exit once playback has finished
    Speak { text: String },
    /// Synthesize a text into a WAV file
    Export {
        text: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// List the available lessons
    Lessons,
    /// Write the default settings file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
