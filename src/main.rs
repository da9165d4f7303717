use axum::{http::HeaderValue, routing::get, Router};
use mafia_server::{
    room, websockets::websocket_handler, AppState, InMemoryConnectionManager, ServerConfig,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mafia_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(?config, "Starting Mafia game server");

    let cors = match config.client_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!(client_url = %config.client_url, "Invalid CLIENT_URL, allowing any origin");
            CorsLayer::permissive()
        }
    };

    let listen_addr = config.listen_addr();
    let app_state = AppState::new(Arc::new(InMemoryConnectionManager::new()), config);

    let app = Router::new()
        .route("/", get(room::health))
        .route("/api/rooms", get(room::list_rooms))
        .route("/api/rooms/:room_id", get(room::get_room))
        .route("/api/roles", get(room::list_roles))
        .route("/api/keywords", get(room::list_keyword_categories))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .expect("failed to bind listen address");
    info!("Server running on http://{}", listen_addr);
    axum::serve(listener, app).await.expect("server error");
}
