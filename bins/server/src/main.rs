//! DebtTracker API Server
//!
//! Main entry point for the DebtTracker backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use debttracker_api::{AppState, create_router};
use debttracker_core::assistant::{AssistantService, GeminiClient};
use debttracker_core::notify::WebhookNotifier;
use debttracker_db::{DebtorRepository, connect_with};
use debttracker_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debttracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(&config.jwt);

    let notifier = WebhookNotifier::new(&config.notifications)
        .context("failed to build notification client")?;
    info!(
        timeout_secs = config.notifications.timeout_secs,
        "Notification webhooks configured"
    );

    let assistant = match GeminiClient::from_config(&config.assistant)
        .context("failed to build assistant client")?
    {
        Some(client) => {
            info!(model = %config.assistant.model, "AI assistant enabled");
            Some(Arc::new(AssistantService::new(
                Arc::new(client),
                config.assistant.language.clone(),
            )))
        }
        None => {
            warn!("No assistant API key configured, AI assistant disabled");
            None
        }
    };

    if config.admin.email.is_none() {
        warn!("No admin email configured, admin dashboard disabled");
    }

    let state = AppState {
        ledger_store: Arc::new(DebtorRepository::new(db.clone())),
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        notifier: Arc::new(notifier),
        assistant,
        admin_email: config.admin.email.clone(),
        frontend_url: config.server.frontend_url.clone(),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
