use crate::agent::LegalAgent;
use crate::models::chat::{ ChatTurnRequest, ChatTurnResponse, Conversation };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ Path, State },
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn };

#[derive(Serialize)]
struct ResetResponse {
    ok: bool,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<LegalAgent>,
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<LegalAgent>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app_state = AppState { agent };

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = Router::new()
        .route("/chat", post(chat_handler))
        .route("/conversations/{id}", get(get_conversation_handler))
        .route("/conversations/{id}/reset", post(reset_conversation_handler))
        .layer(cors)
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatTurnRequest>
) -> Json<ChatTurnResponse> {
    Json(state.agent.chat_turn(request).await)
}

async fn get_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> impl IntoResponse {
    let messages = match state.agent.history_store().get(&id).await {
        Ok(messages) => messages,
        Err(e) => {
            warn!("History read failed for '{}': {}", id, e);
            Vec::new()
        }
    };
    Json(Conversation { id, messages })
}

async fn reset_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> impl IntoResponse {
    let ok = match state.agent.history_store().reset(&id).await {
        Ok(()) => true,
        Err(e) => {
            warn!("History reset failed for '{}': {}", id, e);
            false
        }
    };
    Json(ResetResponse { ok })
}
