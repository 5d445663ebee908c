//! Secret Manito 서버

mod assignment;
mod auth;
mod config;
mod error;
mod handlers;
mod identity;
mod models;
mod protocol;
mod results;
mod state;
mod store;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::HeaderValue,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use config::Config;
use futures::{SinkExt, StreamExt};
use protocol::{ClientMessage, ServerMessage};
use state::AppState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = Arc::new(AppState::new(config.clone()));
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("🎁 Secret Manito server started");
    tracing::info!("Address: {}", addr);
    tracing::info!("WebSocket: ws://{}/ws", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/api/results/:token", get(handlers::result_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// CORS 설정
fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn index_handler() -> Html<&'static str> {
    Html("<h1>Secret Manito Server</h1><p>WebSocket endpoint: /ws</p>")
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "server": "manito-server-rs",
        "rooms": state.store.len(),
        "timestamp": std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // 연결 처리
    let peer_id = handlers::handle_connection(state.clone(), tx.clone()).await;

    // 송신 태스크
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
        }
    });

    // 수신 처리
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(&state, &peer_id, &tx, msg).await,
                Err(e) => {
                    tracing::debug!(peer_id = %peer_id, error = %e, "Malformed client message");
                    let _ = tx.send(ServerMessage::Error {
                        code: "MALFORMED_MESSAGE".to_string(),
                        message: e.to_string(),
                    });
                }
            },
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    // 연결 해제
    handlers::handle_disconnect(state, &peer_id).await;
    send_task.abort();
}

async fn handle_client_message(
    state: &Arc<AppState>,
    peer_id: &str,
    sender: &mpsc::UnboundedSender<ServerMessage>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::Heartbeat => {
            handlers::handle_heartbeat(sender);
        }
        ClientMessage::SignIn { resume } => {
            handlers::handle_sign_in(state.clone(), peer_id, resume.as_deref()).await;
        }
        ClientMessage::SignOut => {
            handlers::handle_sign_out(state.clone(), peer_id).await;
        }
        ClientMessage::CreateRoom {
            room_name,
            admin_name,
        } => {
            handlers::handle_create_room(state.clone(), peer_id, &room_name, &admin_name).await;
        }
        ClientMessage::WatchRoom { room_id } => {
            handlers::handle_watch_room(state.clone(), peer_id, &room_id).await;
        }
        ClientMessage::AddMember { room_id, name } => {
            handlers::handle_add_member(state.clone(), peer_id, &room_id, &name).await;
        }
        ClientMessage::DeleteMember { room_id, member_id } => {
            handlers::handle_delete_member(state.clone(), peer_id, &room_id, &member_id).await;
        }
        ClientMessage::RunMatching { room_id } => {
            handlers::handle_run_matching(state.clone(), peer_id, &room_id).await;
        }
        ClientMessage::Unwatch => {
            handlers::handle_unwatch(state.clone(), peer_id).await;
        }
        ClientMessage::CheckResult { token } => {
            handlers::handle_check_result(state.clone(), peer_id, &token).await;
        }
    }
}
