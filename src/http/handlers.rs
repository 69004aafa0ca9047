use super::state::AppState;
use crate::protocol::{Request, RequestEnvelope, SkillResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

/// POST /skill/invoke
/// Run one voice-platform turn to completion.
///
/// The platform serializes turns per session, so taking the session state
/// out of the map for the duration of the turn is safe; it is reinserted
/// unless the turn ended the session.
pub async fn invoke_skill(
    State(state): State<AppState>,
    Json(envelope): Json<RequestEnvelope>,
) -> impl IntoResponse {
    let session_id = envelope.session_id.clone();

    let mut session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id).unwrap_or_default()
    };

    let response: SkillResponse = state.composer.handle_turn(&envelope, &mut session).await;

    let session_over = matches!(envelope.request, Request::SessionEnded(_))
        || response.should_end_session == Some(true);

    if session_over {
        info!("Session {} is over, dropping its state", session_id);
    } else {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id, session);
    }

    (StatusCode::OK, Json(response))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
