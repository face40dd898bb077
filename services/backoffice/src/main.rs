use sea_orm::Database;
use tracing::info;

use caisse_backoffice::config::BackofficeConfig;
use caisse_backoffice::router::build_router;
use caisse_backoffice::state::AppState;

#[tokio::main]
async fn main() {
    caisse_core::tracing::init_tracing();

    let config = BackofficeConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState { db };
    let router = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("backoffice service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
