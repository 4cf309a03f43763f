//! Merklecid - length-carrying merkle CIDs from the command line

use merklecid_core::{run, Config, TracingContext};
use std::error::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse CLI arguments and build config
    let invocation = Config::from_cli()?;

    // Initialize logging
    init_logging(&invocation.config.log_level);

    let ctx = TracingContext::named("merklecid");
    match run(invocation, &ctx).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(level: &str) {
    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
