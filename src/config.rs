//! Server configuration, parsed from command-line arguments.

use clap::Parser;

use crate::{DEFAULT_HOST, DEFAULT_PORT};

/// Command-line options for the server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "redis-lite")]
#[command(version)]
#[command(about = "A minimal in-memory key-value server", long_about = None)]
pub struct Config {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
