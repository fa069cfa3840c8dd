//! Command Line Interface module
//!
//! Startup argument parsing for the console binary.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "conmux")]
#[command(about = "Interactive operator console for multi-session remote control")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, default_value = "config.toml")]
    pub config_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Adjust log level based on verbose flag
    pub fn effective_log_level(&self) -> String {
        if self.verbose {
            "debug".to_string()
        } else {
            self.log_level.clone()
        }
    }
}
