//! dotoi binary entry point.
//!
//! ```bash
//! DOTOI_TICK_SECS=5 cargo run -p dotoi-cli -- --demo -v
//! ```

use std::sync::Arc;

use clap::Parser;
use dotoi_cli::{demo, Cli, EventReporter};
use dotoi_models::DataEvent;
use dotoi_runtime::Engine;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env.local or .env if present
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = cli.scheduler_config();
    tracing::info!(
        period_secs = config.period.as_secs(),
        shutdown_timeout_secs = config.shutdown_timeout.as_secs(),
        "starting dotoi"
    );

    let mut engine = Engine::new(config)?;
    engine
        .bus()
        .subscribe(Arc::new(EventReporter::stdout(cli.format)));

    if cli.demo {
        let tasks = demo::sample_tasks(dotoi_models::now())?;
        tracing::info!(count = tasks.len(), "seeding demo tasks");
        for event in demo::seed_events(&tasks) {
            engine.publish(event);
        }
        engine.publish(DataEvent::RequestTasks);
    }

    engine.start()?;
    println!("dotoi running, press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    let report = engine.shutdown().await?;
    if report.graceful {
        tracing::info!("dotoi stopped");
    } else {
        tracing::warn!(abandoned = report.abandoned, "dotoi stopped with pending work");
    }

    Ok(())
}
