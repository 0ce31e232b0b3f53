use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use stockroom_api::config::{init_tracing, load_config, AppConfig};
use stockroom_api::events::{process_events, EventSender};
use stockroom_api::{app, db, AppState};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json);

    info!(
        environment = %config.environment,
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let pool = db::establish_connection_from_app_config(&config)
        .await
        .context("Failed to connect to database")?;

    if config.auto_migrate {
        db::run_migrations(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    tokio::spawn(process_events(rx));
    let event_sender = EventSender::new(tx);

    let config = Arc::new(config);
    let state = AppState::new(Arc::new(pool), config.clone(), event_sender);
    let router = app(state).layer(cors_layer(&config));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None if config.is_development() => CorsLayer::permissive(),
        None => {
            warn!("No CORS origins configured; cross-origin requests will be rejected");
            CorsLayer::new()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    } else {
        info!("Shutdown signal received");
    }
}
