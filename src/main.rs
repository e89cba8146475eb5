//! glp1-tracker billing service entry point.

use std::sync::Arc;

use anyhow::Result;
use glp1_tracker::adapters::http::{app_router, BillingAppState};
use glp1_tracker::adapters::{InMemorySubscriptionStore, PostgresSubscriptionStore};
use glp1_tracker::adapters::{StripeConfig, StripePaymentAdapter};
use glp1_tracker::application::{HandleStripeWebhookHandler, SubscriptionPremiumGate};
use glp1_tracker::config::{AppConfig, DatabaseConfig};
use glp1_tracker::domain::subscription::StripeWebhookVerifier;
use glp1_tracker::ports::{PaymentProvider, SubscriptionStore};
use glp1_tracker::telemetry;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("glp1-tracker exited with error: {:#}", error);
        eprintln!("glp1-tracker exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.server)?;
    config.validate()?;
    info!(environment = ?config.server.environment, "Configuration loaded");

    let store = connect_store(&config.database).await?;
    let state = build_state(&config, store);

    let addr = config.server.socket_addr()?;
    let app = app_router(state, &config.server);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn connect_store(database: &DatabaseConfig) -> Result<Arc<dyn SubscriptionStore>> {
    let Some(url) = database.url() else {
        warn!("No database URL configured; subscription records are kept in memory");
        return Ok(Arc::new(InMemorySubscriptionStore::new()));
    };

    let pool = PgPoolOptions::new()
        .min_connections(database.min_connections)
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .idle_timeout(database.idle_timeout())
        .max_lifetime(database.max_lifetime())
        .connect(url)
        .await?;
    info!("Postgres connection pool established");

    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    Ok(Arc::new(PostgresSubscriptionStore::new(pool)))
}

fn build_state(config: &AppConfig, store: Arc<dyn SubscriptionStore>) -> BillingAppState {
    let payment = &config.payment;

    let provider: Option<Arc<dyn PaymentProvider>> = match payment.api_key() {
        Some(key) => {
            let stripe = StripeConfig::new(key.clone())
                .with_base_url(payment.stripe_api_base_url.clone())
                .with_api_version(payment.stripe_api_version.clone());
            Some(Arc::new(StripePaymentAdapter::new(stripe)))
        }
        None => {
            warn!("Stripe API key is not configured; webhook deliveries will be refused");
            None
        }
    };

    let verifier = match payment.webhook_secret() {
        Some(secret) => Some(
            StripeWebhookVerifier::new(secret.clone())
                .with_require_livemode(payment.require_livemode),
        ),
        None => {
            warn!("Stripe webhook secret is not configured; webhook deliveries will be refused");
            None
        }
    };

    if payment.is_test_mode() {
        info!("Stripe client running in test mode");
    }

    BillingAppState {
        webhook_handler: Arc::new(HandleStripeWebhookHandler::new(
            store.clone(),
            provider,
            verifier,
        )),
        premium_gate: Arc::new(SubscriptionPremiumGate::new(store)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
