//! quake-alert — Binary Entrypoint
//! Parses flags/env, starts the poller and notifier, and waits for Ctrl-C.

use clap::Parser;
use quake_alert::config::{AppConfig, Args, LogFormat};
use quake_alert::Pipeline;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins; otherwise our own crate at info and everything else at warn.
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quake_alert=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer().compact()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.log_format);

    let cfg = match AppConfig::from_args(args) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        interval_ms = cfg.poll_interval.as_millis() as u64,
        feed = %cfg.feed_base,
        insecure_tls = cfg.accept_invalid_certs,
        time_zone = %cfg.time_zone,
        "starting"
    );

    let cancel = CancellationToken::new();
    let pipeline = Pipeline::from_config(&cfg, cancel)?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("interrupt received, exiting...");

    if !pipeline.shutdown(cfg.shutdown_grace).await {
        tracing::debug!("exiting without waiting for in-flight work");
    }
    Ok(())
}
