use std::error::Error;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use keystone_api::app::{build_router, AppState};
use keystone_api::application::users::{self, Registration};
use keystone_api::config::AppConfig;
use keystone_api::domain::user::{Email, Password, Username};
use keystone_api::infrastructure::database;
use keystone_api::infrastructure::repositories::{
    PostgresResourceRepository, PostgresUserRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let state = match config.database_url.clone() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = database::connect(&database_url, config.database_max_connections).await?;
            tracing::info!("Database connected successfully");

            if config.run_migrations {
                database::migrate(&pool).await?;
                tracing::info!("Migrations applied");
            }

            AppState::new(
                config,
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresResourceRepository::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            AppState::in_memory(config)
        }
    };

    bootstrap_admin(&state).await?;

    let addr = state.config.bind_addr;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Creates the configured administrator unless the username is taken
async fn bootstrap_admin(state: &AppState) -> Result<(), Box<dyn Error>> {
    let Some(admin) = state.config.admin.clone() else {
        return Ok(());
    };

    let registration = Registration {
        username: Username::new(&admin.username)?,
        email: Email::new(&admin.email)?,
        password: Password::new(admin.password)?,
    };

    if users::ensure_admin(state.users.as_ref(), &state.hasher, registration).await? {
        tracing::info!(username = %admin.username, "admin account created");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
