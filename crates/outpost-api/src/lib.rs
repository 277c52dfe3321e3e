pub mod handlers;

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(handlers::handle_status))
        .route("/agents", get(handlers::handle_agents))
        .route(
            "/updates/clear/{download_id}",
            get(handlers::handle_clear_download),
        )
        .route(
            "/updates/download/{platform}/{download_id}",
            get(handlers::handle_download_package),
        )
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

pub async fn serve(state: ApiState, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!(port, "API listening on 127.0.0.1");
    serve_listener(state, listener).await
}

/// Serve on an already-bound listener. Used by tests to bind port 0.
pub async fn serve_listener(
    state: ApiState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let app = router(state);
    // Download handlers need the peer address for the ban check.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
