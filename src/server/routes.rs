//! HTTP route handlers for the relay API.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::{ServeDir, ServeFile};

use crate::session::SessionId;
use crate::speech::elevenlabs::AUDIO_MPEG;

use super::error::ApiError;
use super::state::AppState;

/// Attachment header sent with synthesized audio.
const SPEECH_DISPOSITION: &str = "attachment; filename=speech.mp3";

/// Create the API router with all routes.
///
/// `GET /` serves `index.html` from the static root and any other unmatched
/// path is looked up as a file in that root.
#[must_use]
pub fn create_router(state: Arc<AppState>) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/chat", post(chat))
        .route("/text-to-speech", post(text_to_speech))
        .route_service("/", index)
        .fallback_service(assets)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    #[serde(default)]
    pub message: String,
    /// Session to continue; a new one is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// The assistant's reply.
    pub response: String,
    /// Session the turn was recorded in.
    pub session_id: String,
}

/// Handle one chat turn.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let session_id = SessionId::from_client(request.session_id.as_deref());

    let reply = state.chat.handle(&request.message, session_id).await?;

    Ok(Json(ChatResponse {
        response: reply.reply,
        session_id: reply.session_id.into_string(),
    }))
}

/// Text-to-speech request.
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    /// Text to synthesize.
    #[serde(default)]
    pub text: String,
}

/// Synthesize speech and return it as an MP3 attachment.
async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let audio = state.speech.synthesize(&request.text).await?;

    Ok((
        [
            (header::CONTENT_TYPE, AUDIO_MPEG),
            (header::CONTENT_DISPOSITION, SPEECH_DISPOSITION),
        ],
        audio,
    )
        .into_response())
}
