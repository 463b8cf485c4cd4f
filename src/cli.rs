//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, ResolveOptions};
use crate::llm::LlmProvider;

/// Ask business questions over the deals and work-orders boards.
#[derive(Parser, Debug)]
#[command(name = "analyst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Question to answer once; without it, questions are read from stdin
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// LLM provider to use (openai or mock), overriding the config file
    #[arg(long, value_name = "PROVIDER")]
    pub llm: Option<LlmProvider>,

    /// JSON file mapping board id to a raw board response, used instead of the API
    #[arg(long, value_name = "PATH")]
    pub fixtures: Option<PathBuf>,

    /// Print the generated plan with each answer
    #[arg(long)]
    pub show_snippet: bool,

    /// Write logs to the state directory instead of stderr
    #[arg(long)]
    pub log_file: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Credential requirements implied by the flags.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            provider: self.llm,
            offline_source: self.fixtures.is_some(),
        }
    }
}
