use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use campus_events_server::config::Config;
use campus_events_server::routes::create_routes;
use campus_events_server::state::AppState;
use campus_events_server::store::{MemoryStore, PgStore};
use campus_events_server::uploads::ImageStorage;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("campus_events_server=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env();

    if config.jwt.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    let images = ImageStorage::new(config.upload_dir.clone());

    let state = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections)
                .await
                .expect("Failed to initialise database");
            AppState::new(Arc::new(store), config.jwt.clone(), images)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; events are kept in memory only");
            AppState::new(Arc::new(MemoryStore::new()), config.jwt.clone(), images)
        }
    };

    let app = create_routes(state, &config);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.expect("Server failed");
}
