//! Command execution for the CLI
//!
//! Each command runs in its own forked context. Hashing itself happens on a
//! blocking thread so large files do not stall the async runtime.

use std::path::Path;
use thiserror::Error;
use tracing::Instrument;

use crate::cid_merkle::{parse_cid_str, parse_length_str};
use crate::config::{Command, Config, HashCommand, Invocation};
use crate::context::{Context, TracingContext};
use crate::error::HashError;
use crate::hasher::{hash_content_with, hash_reader, ContentHash};
use crate::manifest::Manifest;
use crate::registry::register_merkle_tree_hash;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hashing task failed: {0}")]
    Task(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> RuntimeError + '_ {
    move |source| RuntimeError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Run a parsed command and return the text to print
pub async fn run(invocation: Invocation, ctx: &TracingContext) -> Result<String, RuntimeError> {
    register_merkle_tree_hash()?;

    let Invocation { config, command } = invocation;
    let ctx = ctx.fork();
    let span = ctx.span();

    dispatch(&config, command, &ctx).instrument(span).await
}

async fn dispatch(
    config: &Config,
    command: Command,
    ctx: &TracingContext,
) -> Result<String, RuntimeError> {
    match command {
        Command::Hash(cmd) => run_hash(config, &cmd, &ctx.at("hash")).await,
        Command::FromManifest(cmd) => {
            let ctx = ctx.at("from-manifest");
            ctx.debug(&format!("Reading manifest {}", cmd.manifest.display()));

            let json = tokio::fs::read_to_string(&cmd.manifest)
                .await
                .map_err(io_error(&cmd.manifest))?;
            let manifest = Manifest::from_json(&json)?;
            let rebuilt = manifest.cid()?;

            ctx.info(&format!(
                "Rebuilt {} from {} leaf hashes",
                rebuilt.cid,
                manifest.leaf_hashes().len()
            ));
            Ok(format!(
                "cid: {}\nroot: {}\nsize: {}",
                rebuilt.cid,
                hex::encode(rebuilt.root),
                manifest.size()
            ))
        }
        Command::ParseLength(cmd) => {
            let length = parse_length_str(&cmd.cid)?;
            ctx.at("parse-length")
                .debug(&format!("{} encodes {} bytes", cmd.cid, length));
            Ok(length.to_string())
        }
        Command::Verify(cmd) => {
            let ctx = ctx.at("verify");
            let expected = parse_cid_str(&cmd.cid)?;
            let hashed = hash_file(config, &cmd.file, &ctx).await?;

            if hashed.cid != expected {
                ctx.warn(&format!("{} does not match {}", cmd.file.display(), expected));
                return Err(HashError::HashMismatch {
                    expected: expected.to_string(),
                    actual: hashed.cid.to_string(),
                }
                .into());
            }

            Ok(format!("ok: {}", hashed.cid))
        }
    }
}

async fn run_hash(
    config: &Config,
    cmd: &HashCommand,
    ctx: &TracingContext,
) -> Result<String, RuntimeError> {
    let hashed = hash_file(config, &cmd.file, ctx).await?;

    if let Some(out) = &cmd.manifest_out {
        let json = hashed.manifest().to_json()?;
        tokio::fs::write(out, json).await.map_err(io_error(out))?;
        ctx.info(&format!("Wrote manifest to {}", out.display()));
    }

    Ok(format!(
        "cid: {}\nroot: {}\nsize: {}\nchunks: {}",
        hashed.cid,
        hex::encode(hashed.root),
        hashed.size,
        hashed.leaf_hashes.len()
    ))
}

/// Hash a file on disk
///
/// A single worker streams the file one chunk at a time. More workers need
/// the whole content in memory so chunks can be hashed in parallel.
async fn hash_file(
    config: &Config,
    path: &Path,
    ctx: &TracingContext,
) -> Result<ContentHash, RuntimeError> {
    let ctx = ctx.with_value("file", &path.display().to_string());

    let hashed = if config.workers == 1 {
        let file = tokio::fs::File::open(path).await.map_err(io_error(path))?;
        ctx.debug("Streaming file on a single worker");
        hash_reader(file).await?
    } else {
        let data = tokio::fs::read(path).await.map_err(io_error(path))?;
        ctx.debug(&format!(
            "Hashing {} bytes on {} workers",
            data.len(),
            config.workers
        ));

        let workers = config.workers;
        tokio::task::spawn_blocking(move || hash_content_with(&data, workers))
            .await
            .map_err(|e| RuntimeError::Task(e.to_string()))??
    };

    ctx.info(&format!(
        "{} -> {} ({} chunks)",
        ctx.get("file").unwrap_or_default(),
        hashed.cid,
        hashed.leaf_hashes.len()
    ));
    Ok(hashed)
}
