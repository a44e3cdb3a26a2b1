use aidge_client::{ConcurrencyLimiter, TaskClient};
use aidge_orchestrator::{BatchOrchestrator, BatchStore, ServerConfig, create_router};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aidge_orchestrator=info,aidge_client=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Aidge Orchestrator...");

    let config = ServerConfig::from_env().context("Invalid configuration")?;

    tracing::info!(
        "Using API domain {} (max concurrent: {}, trial: {})",
        config.api.api_domain,
        config.max_concurrent,
        config.api.use_trial_resource
    );
    tracing::info!(
        "Polling up to {} times per task (worst case {:?})",
        config.poll_policy.max_retries,
        config.poll_policy.worst_case_wait()
    );

    let client = TaskClient::new(config.api.clone())
        .context("Failed to create task client")?
        .with_limit(config.max_concurrent)
        .with_timeout(config.request_timeout);

    let orchestrator = BatchOrchestrator::new(client, config.poll_policy, BatchStore::new());

    // Build router with all API endpoints
    let limiter = orchestrator.client().limiter().clone();
    let app = create_router(orchestrator);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    // Setup graceful shutdown on SIGTERM/SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(limiter))
        .await
        .context("Failed to start server")?;

    Ok(())
}

/// Wait for a shutdown signal, then close the shared limiter so queued remote
/// calls fail instead of starting
async fn shutdown_signal(limiter: ConcurrencyLimiter) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!(
        "Shutting down; closing limiter with {} call(s) in flight",
        limiter.in_flight()
    );
    limiter.close();
}
