use anyhow::{Context, Result};
use clap::Parser;
use refactor_eval::{cli::Cli, pipeline};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; stderr only so stdout keeps the file list
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = args
        .resolve_config()
        .context("Failed to build analysis configuration")?;
    tracing::debug!(?config, "resolved configuration");

    let report = pipeline::run(&config).with_context(|| {
        format!(
            "Analysis failed (metrics: {}, profiles: {})",
            config.metrics_path.display(),
            config.profile_path.display()
        )
    })?;

    tracing::info!(
        participants = report.participants,
        files = report.written_files.len(),
        "analysis complete"
    );
    Ok(())
}
