use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use cozystay_core::authorize;

use crate::error::AppError;
use crate::session::SessionClaims;
use crate::state::AppState;

// ============================================================================
// Session Middleware
// ============================================================================

pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Validate the cookie credential
    let claims = state.sessions.authenticate(&jar)?;

    // 2. Inject claims for handlers
    tracing::debug!(identity = %claims.email, "session accepted");
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// ============================================================================
// Ownership Check
// ============================================================================

pub fn ensure_owner(owner: &str, session: &SessionClaims) -> Result<(), AppError> {
    if authorize(owner, &session.email).is_allowed() {
        Ok(())
    } else {
        Err(AppError::AuthorizationError("forbidden access".to_string()))
    }
}
