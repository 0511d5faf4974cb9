use std::time::Instant;

use anyhow::{bail, Context};
use ev_data::MetaRunConfig;
use ev_optimizer::MetaRunner;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Some(config_path) = std::env::args().nth(1) else {
        bail!("usage: meta-runner <config-file>");
    };

    let started = Instant::now();
    let config = MetaRunConfig::from_file(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path}"))?;
    let result = MetaRunner::new(config)?.run()?;

    for path in &result.output_files {
        info!(file = %path.display(), "Wrote result file");
    }
    info!(
        evaluations = result.records.len(),
        solutions = result.solutions.len(),
        "Total computing time: {} ms",
        started.elapsed().as_millis()
    );
    Ok(())
}
