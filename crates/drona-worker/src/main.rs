//! Worker entry point: `WORKER_TYPE` selects the submission or grading loop.
//! Exits 0 on clean shutdown, 1 on fatal initialization failure.

use anyhow::Context;
use drona_config::{Settings, WorkerType};
use drona_kv::Kv;
use drona_store::Store;
use drona_worker::{GradingWorker, SubmissionWorker};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    drona_config::init_tracing("info");
    if let Err(err) = run().await {
        tracing::error!("worker failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("loading settings")?;
    let worker_type = Settings::worker_type().context("reading WORKER_TYPE")?;
    let worker_id = std::process::id().to_string();

    let kv = Kv::connect(&settings.redis_url)
        .await
        .context("connecting to redis")?;
    let store = Store::connect(&settings.database_url, settings.db_pool_size)
        .await
        .context("connecting to postgres")?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received, finishing in-flight work");
            shutdown.cancel();
        }
    });

    match worker_type {
        WorkerType::Submission => {
            tracing::info!(worker_id = %worker_id, "starting submission worker");
            SubmissionWorker::new(
                worker_id,
                kv,
                store,
                settings.poll_interval,
                settings.blocking_timeout,
            )
            .run(shutdown)
            .await;
        }
        WorkerType::Grading => {
            tracing::info!(worker_id = %worker_id, "starting grading worker");
            GradingWorker::new(
                worker_id,
                kv,
                store,
                settings.check_interval,
                settings.empty_threshold,
            )
            .run(shutdown)
            .await;
        }
    }

    tracing::info!("worker exiting cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
