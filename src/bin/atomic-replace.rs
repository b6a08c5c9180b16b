//! atomic-replace -- replace a file with stdin, all or nothing.
//!
//! Usage: some-command | atomic-replace <destination>

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is left alone.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let destination = std::env::args()
        .nth(1)
        .context("usage: atomic-replace <destination>")?;

    atomic_replace::atomic_replace(&destination, std::io::stdin().lock())
        .with_context(|| format!("failed to replace {destination}"))?;

    Ok(())
}
