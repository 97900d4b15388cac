use axum::{Json, extract::State, response::IntoResponse};

use crate::AppState;

/// List display names currently joined to the chat room.
pub async fn list_participants(State(state): State<AppState>) -> impl IntoResponse {
    let participants = state.room.participant_names().await;
    Json(serde_json::json!({
        "success": true,
        "participants": participants,
    }))
}
