use std::path::PathBuf;

use clap::Parser;

/// Parley chat client
#[derive(Debug, Parser)]
#[command(name = "parley", about = "Stream a chat completion from Gemini")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "parley.toml", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Sampling temperature
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Override the configured model, e.g. `models/gemini-2.5-pro`
    #[arg(short, long, env = "PARLEY_MODEL")]
    pub model: Option<String>,

    /// Log filter in `RUST_LOG` syntax
    #[arg(long, default_value = "warn", env = "PARLEY_LOG")]
    pub log: String,

    /// Prompt to send
    #[arg(required = true)]
    pub prompt: Vec<String>,
}

impl Args {
    /// Prompt words joined with spaces
    pub fn prompt(&self) -> String {
        self.prompt.join(" ")
    }
}
