use clap::Parser;
use std::io;

use crate::client::GeminiClient;
use crate::config::Config;
use crate::credential::RealFs;
use crate::error::AppError;
use crate::runner::{self, Options};

#[derive(Parser)]
#[command(name = "gemini", version)]
#[command(about = "gemini-cli - CLI tool for Google Gemini assistant", long_about = None)]
pub struct Cli {
    /// Add "Keep your answer short" to sent prompt
    #[arg(short, long)]
    pub short: bool,

    /// Keep prompt and answer in a text file under ~/.gemini_logs
    #[arg(short, long)]
    pub keep: bool,

    /// Print debug diagnostics. Will print your token to console! Use with care!
    #[arg(short, long)]
    pub debug: bool,

    /// Suppress non-fatal warnings (ignored with --debug)
    #[arg(short, long)]
    pub quiet: bool,

    /// API endpoint URL (overrides config)
    #[arg(long, env = "GEMINI_API_URL")]
    pub api_url: Option<String>,

    /// Prompt to send
    pub prompt: String,
}

impl Cli {
    pub fn options(&self) -> Options {
        Options::new(
            self.prompt.clone(),
            self.short,
            self.keep,
            self.debug,
            self.quiet,
        )
    }

    pub async fn run(self) -> Result<(), AppError> {
        let mut config = Config::load()?;
        if let Some(api_url) = &self.api_url {
            config.set_api_url(api_url)?;
        }

        let client = GeminiClient::new(&config)?;
        let options = self.options();
        let mut out = io::stdout().lock();

        runner::run(&options, &config, &client, &RealFs, &mut out).await
    }
}
