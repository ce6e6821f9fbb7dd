//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, the rate limiter sweeper, and the
//! Axum server lifecycle including graceful shutdown.

use crate::config::Config;
use crate::infrastructure::mailer::LogMailer;
use crate::infrastructure::persistence::{
    PgMovieRepository, PgPermissionRepository, PgTokenRepository, PgUserRepository,
};
use crate::infrastructure::rate_limit::RateLimiter;
use crate::routes::app_router;
use crate::state::{AppState, Stores};

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Rate limiter and its eviction sweeper
/// - Axum HTTP server
///
/// On SIGINT or SIGTERM the server stops accepting connections and gives
/// in-flight requests the configured grace period before the pool is closed.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    let pool_arc = Arc::new(pool.clone());
    let timeout = config.store_timeout();
    let stores = Stores {
        movies: Arc::new(PgMovieRepository::new(pool_arc.clone(), timeout)),
        users: Arc::new(PgUserRepository::new(pool_arc.clone(), timeout)),
        tokens: Arc::new(PgTokenRepository::new(pool_arc.clone(), timeout)),
        permissions: Arc::new(PgPermissionRepository::new(pool_arc, timeout)),
        mailer: Arc::new(LogMailer),
    };

    let state = AppState::new(
        stores,
        config.token_signing_secret.clone(),
        config.token_ttl(),
        config.environment.clone(),
    );

    let settings = config.rate_limit_settings();
    let (limiter, sweeper) = if settings.enabled {
        let limiter = Arc::new(RateLimiter::new(settings)?);
        let sweeper = limiter.spawn_sweeper();
        tracing::info!("Rate limiter sweeper started");
        (Some(limiter), Some(sweeper))
    } else {
        tracing::info!("Rate limiter disabled");
        (None, None)
    };

    let app = app_router(
        state,
        limiter,
        &config.cors_trusted_origins,
        config.request_timeout(),
    );

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(env = %config.environment, "Listening on http://{addr}");

    // axum::serve has no read or idle timeouts; the router enforces a
    // per-request deadline instead.
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = stop_rx.await;
        })
        .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("Server task failed")??;
        }
        _ = shutdown_signal() => {
            let _ = stop_tx.send(());
            let grace = config.shutdown_grace_period();
            tracing::info!(grace_secs = grace.as_secs(), "Shutting down, draining in-flight requests");

            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result.context("Server task failed")??,
                Err(_) => {
                    tracing::warn!("Grace period elapsed, abandoning remaining connections");
                    server.abort();
                }
            }
        }
    }

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
        _ = terminate => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
    }
}
