use super::{ApiError, AppState, AuthUser};
use crate::storage::AnalysisRecord;
use crate::verdict::EmailSample;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub email_content: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub sender: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user_id: String,
    pub message: String,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mode": state.scorer.mode().as_str(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::MissingCredentials)?;
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::MissingCredentials);
    }

    // Password hashing is deliberately slow; keep it off the async workers.
    let users = state.users.clone();
    let email = request.email.clone();
    let user = tokio::task::spawn_blocking(move || users.verify(&email, &request.password))
        .await
        .map_err(|e| ApiError::LoginFailed(e.into()))?
        .map_err(ApiError::LoginFailed)?
        .ok_or(ApiError::InvalidCredentials)?;

    let token = state
        .tokens
        .issue(&user.id, &user.email)
        .map_err(|e| ApiError::LoginFailed(e.into()))?;

    log::info!("User {} logged in successfully", user.email);

    Ok(Json(LoginResponse {
        success: true,
        token,
        user_id: user.id,
        message: "Login successful".to_string(),
    }))
}

pub async fn analyze(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if request.email_content.trim().is_empty() {
        return Err(ApiError::BadRequest("Email content is required".to_string()));
    }

    let user_id = request
        .user_id
        .filter(|id| !id.is_empty())
        .unwrap_or(claims.user_id);

    let sample = EmailSample::new(request.email_content, request.subject, request.sender);
    let verdict = state.scorer.predict(&sample);
    let record = AnalysisRecord::new(verdict, &sample.subject, &sample.sender, &user_id, Utc::now());

    log::info!(
        "Analysis complete: isFake={}, confidence={}",
        record.verdict.is_fake,
        record.verdict.confidence
    );

    Ok(Json(record))
}

pub async fn list_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<AnalysisRecord>>, ApiError> {
    Ok(Json(state.history.list(&claims.user_id)?))
}

/// Stores an analysis for the caller. The record's `userId` is always the caller's.
pub async fn save_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<AnalysisRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalysisRecord>), ApiError> {
    let Json(mut record) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if record.id.is_empty() {
        return Err(ApiError::BadRequest("Analysis id is required".to_string()));
    }
    if !(0.0..=1.0).contains(&record.verdict.confidence) {
        return Err(ApiError::BadRequest(
            "confidence must be between 0 and 1".to_string(),
        ));
    }
    // Stored timestamps are compared as text, so keep them in one UTC format.
    let at = DateTime::parse_from_rfc3339(&record.analysis_timestamp).map_err(|_| {
        ApiError::BadRequest("analysisTimestamp must be an RFC 3339 timestamp".to_string())
    })?;
    record.analysis_timestamp = at
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    record.user_id = claims.user_id;

    state.history.save(&record)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<AnalysisRecord>, ApiError> {
    state
        .history
        .get(&claims.user_id, &id)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn delete_history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.history.delete(&claims.user_id, &id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
