use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
struct IssueRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    success: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jwt", post(issue_token))
        .route("/logout", post(logout))
}

async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let Json(req) = body?;
    let identity = req.email.trim();
    if identity.is_empty() {
        return Err(AppError::ValidationError("email is required".to_string()));
    }

    let token = state
        .sessions
        .issue(identity)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;
    tracing::info!(identity, "session issued");

    Ok((jar.add(state.sessions.session_cookie(token)), Json(AuthResponse { success: true })))
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<AuthResponse>) {
    (state.sessions.revoke(jar), Json(AuthResponse { success: true }))
}
