use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdant_api::{app, state::AuthConfig, AppState};
use verdant_core::PaymentGateway;
use verdant_gateway::{StripeConfig, StripeGateway};
use verdant_order::{OrderManager, ReconciliationHandler};
use verdant_store::{DbClient, SqlCatalogReader, SqlOrderStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdant_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = verdant_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Verdant API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let store = Arc::new(SqlOrderStore::new(db.pool.clone()));
    let catalog = Arc::new(SqlCatalogReader::new(db.pool.clone()));

    let gateway: Arc<dyn PaymentGateway> = Arc::new(
        StripeGateway::new(StripeConfig {
            api_base: config.gateway.api_base.clone(),
            secret_key: config.gateway.secret_key.clone(),
            webhook_secret: config.gateway.webhook_secret.clone(),
            success_url: config.gateway.success_url.clone(),
            cancel_url: config.gateway.cancel_url.clone(),
            currency: config.gateway.currency.clone(),
            timeout_seconds: config.gateway.timeout_seconds,
        })
        .expect("Failed to build gateway client"),
    );

    let manager = Arc::new(OrderManager::new(
        store,
        catalog,
        gateway.clone(),
        config.business_rules.tax_basis_points,
        config.gateway.session_attempts,
    ));
    let reconciler = Arc::new(ReconciliationHandler::new(manager.clone()));

    let app_state = AppState {
        manager,
        reconciler,
        gateway,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
