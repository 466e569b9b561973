use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::info;

use common::utils::logging::init_logging;
use configs::AppConfig;

use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router over an already-connected (and migrated) database.
pub fn build_app(db: DatabaseConnection, cfg: &AppConfig) -> Router {
    let state = ServerState::new(db, cfg);
    routes::build_router(state, build_cors())
}

/// Public entry: load config, then serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    init_logging(&cfg.logging.format);
    serve(cfg, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Connect, migrate when configured, and serve until `shutdown` resolves.
/// In-flight requests are drained before returning.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.auto_migrate {
        models::db::run_migrations(&db).await?;
    }

    let app = build_app(db, &cfg);
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "auto shop server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("shutdown requested, draining connections");
        })
        .await?;
    Ok(())
}
