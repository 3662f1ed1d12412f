//! API server entry point: builds the shared handles, applies migrations and
//! serves the axum router until a shutdown signal arrives.

use anyhow::Context;
use drona_api::AppState;
use drona_auth::{AuthFlows, Authorizer, TokenSigner};
use drona_config::Settings;
use drona_kv::Kv;
use drona_store::Store;

#[tokio::main]
async fn main() {
    drona_config::init_tracing("info,tower_http=debug");
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("loading settings")?;

    let kv = Kv::connect(&settings.redis_url)
        .await
        .context("connecting to redis")?;
    let store = Store::connect(&settings.database_url, settings.db_pool_size)
        .await
        .context("connecting to postgres")?;
    store.migrate().await.context("applying migrations")?;

    let signer = TokenSigner::new(
        &settings.jwt_secret,
        settings.access_token_ttl,
        settings.refresh_token_ttl,
    );
    let state = AppState {
        flows: AuthFlows::new(
            store.clone(),
            kv.clone(),
            signer.clone(),
            settings.refresh_token_ttl,
        ),
        authorizer: Authorizer::new(store.clone(), kv.clone(), signer),
        store,
        kv,
    };

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    tracing::info!(addr = %settings.bind_addr, "api server listening");

    axum::serve(listener, drona_api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    tracing::info!("server exiting cleanly");
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
