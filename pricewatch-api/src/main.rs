use std::net::SocketAddr;
use std::sync::Arc;

use pricewatch_api::{app, AppState};
use pricewatch_core::{LookbackWindow, PriceResolver};
use pricewatch_store::{app_config::Config, ingest, PriceSnapshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pricewatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting pricewatch API on port {}", config.server.port);

    // One-shot data load; the snapshot is immutable for the process
    // lifetime and shared read-only with every request handler.
    let selling = ingest::load_selling_prices(&config.data.selling_prices_file)
        .expect("Failed to load selling prices");
    let promotions =
        ingest::load_promotions(&config.data.promotions_file).expect("Failed to load promotions");

    let snapshot = Arc::new(PriceSnapshot::new(selling, promotions));
    tracing::info!(
        selling = snapshot.selling_count(),
        promotions = snapshot.promotion_count(),
        "price snapshot ready"
    );

    let resolver = PriceResolver::new(
        snapshot,
        LookbackWindow::new(config.pricing.lookback_days),
    );

    let app_state = AppState {
        resolver: Arc::new(resolver),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
