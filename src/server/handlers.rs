use super::AppState;
use super::error::{ApiError, MISSING_FIELDS_MESSAGE};
use crate::history::HistoryEntry;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

pub const HEALTH_MESSAGE: &str = "Service Health is Good";
pub const ROOT_MESSAGE: &str = "Hello from genrelay";

/// Every response body, success or failure, is `{"message": ...}`.
#[derive(Debug, Serialize)]
pub struct MessageBody<T> {
    pub message: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub user_query: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
}

impl QueryRequest {
    /// Both fields, or `None` if either is absent, null or empty.
    fn into_parts(self) -> Option<(String, String)> {
        let user_query = self.user_query.filter(|q| !q.is_empty())?;
        let model_type = self.model_type.filter(|m| !m.is_empty())?;
        Some((user_query, model_type))
    }
}

pub async fn query_response(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageBody<String>>, ApiError> {
    // Content-Type is not required
    let request: QueryRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::Validation(e.to_string()))?;
    let (user_query, model_type) = request
        .into_parts()
        .ok_or_else(|| ApiError::Validation(MISSING_FIELDS_MESSAGE.to_string()))?;

    let text = state.dispatcher.dispatch(&model_type, &user_query).await?;
    Ok(Json(MessageBody { message: text }))
}

pub async fn session_history(
    State(state): State<AppState>,
) -> Result<Json<MessageBody<Vec<HistoryEntry>>>, ApiError> {
    let entries = state.dispatcher.recent(state.history_limit).await?;
    Ok(Json(MessageBody { message: entries }))
}

pub async fn health() -> Json<MessageBody<&'static str>> {
    Json(MessageBody {
        message: HEALTH_MESSAGE,
    })
}

pub async fn root() -> Json<MessageBody<&'static str>> {
    Json(MessageBody {
        message: ROOT_MESSAGE,
    })
}
