//! CLI argument definitions for the Memora binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Memora: semantic memory over an external embedding service.
#[derive(Parser, Debug)]
#[command(name = "memora", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Embed the given memories, then search them for QUERY.
    Search {
        /// Text to search for.
        query: String,

        /// A memory to embed before searching (repeatable).
        #[arg(short = 'm', long = "memory")]
        memories: Vec<String>,

        /// Maximum number of results (capped by search.max_limit).
        #[arg(short = 'k', long = "limit")]
        limit: Option<usize>,
    },
    /// List registered skills.
    Skills,
    /// Run one skill with the given input.
    Skill {
        /// Skill name.
        name: String,
        /// Input passed to the skill.
        input: String,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MEMORA_CONFIG env var > ~/.memora/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MEMORA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".memora").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".memora").join("config.toml");
    }
    PathBuf::from("config.toml")
}
