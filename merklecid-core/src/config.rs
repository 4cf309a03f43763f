//! Configuration management for merklecid
//!
//! Handles CLI argument parsing, config file loading, and defaults.

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Parser, Debug)]
#[command(name = "merklecid")]
#[command(about = "Length-carrying merkle CIDs for chunked content", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file; CLI flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Threads used to hash chunks
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hash a file and print its CID
    Hash(HashCommand),
    /// Rebuild a CID from a manifest JSON file
    FromManifest(FromManifestCommand),
    /// Print the content length encoded in a CID
    ParseLength(ParseLengthCommand),
    /// Check that a file hashes to the given CID
    Verify(VerifyCommand),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct HashCommand {
    /// File to hash
    pub file: PathBuf,

    /// Write the leaf hash manifest as JSON to this path
    #[arg(long)]
    pub manifest_out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct FromManifestCommand {
    /// Manifest JSON file
    pub manifest: PathBuf,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ParseLengthCommand {
    /// CID in text form
    pub cid: String,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct VerifyCommand {
    /// File to hash
    pub file: PathBuf,

    /// Expected CID in text form
    pub cid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// A parsed command line: resolved config plus the command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config: Config,
    pub command: Command,
}

impl Config {
    /// Parse process arguments, exiting with usage on error
    pub fn from_cli() -> Result<Invocation, ConfigError> {
        Self::resolve(Cli::parse())
    }

    /// Parse an explicit argument list
    pub fn from_args<I, T>(args: I) -> Result<Invocation, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Self::resolve(cli)
    }

    fn resolve(cli: Cli) -> Result<Invocation, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };

        if let Some(level) = cli.log_level {
            config.log_level = level;
        }
        if let Some(workers) = cli.workers {
            config.workers = workers;
        }

        config.validate()?;

        Ok(Invocation {
            config,
            command: cli.command,
        })
    }

    /// Load config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            workers: default_workers(),
        }
    }
}
