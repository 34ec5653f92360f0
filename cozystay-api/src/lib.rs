use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::str::FromStr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub mod auth;
pub mod bookings;
pub mod error;
pub mod middleware;
pub mod reviews;
pub mod rooms;
pub mod session;
pub mod state;

pub use error::AppError;
pub use session::{SessionAuthenticator, SessionClaims};
pub use state::{AppState, HttpConfig};

pub fn app(state: AppState) -> Router {
    // Credentialed CORS needs explicit origins
    let origins: Vec<HeaderValue> = state
        .http
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let timeout = TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, state.http.request_timeout);

    Router::new()
        .route("/", get(|| async { "hotel booking server is running" }))
        .merge(auth::routes())
        .merge(rooms::routes())
        .merge(bookings::routes(state.clone()))
        .merge(reviews::routes())
        .layer(timeout)
        .layer(map_response(timeout_as_error))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The timeout layer answers with an empty 408; give it the usual error body.
async fn timeout_as_error(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("request exceeded its deadline");
        return AppError::Timeout.into_response();
    }
    response
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError(format!("invalid id: {raw}")))
}

/// Optional numeric query bound; empty counts as absent.
pub(crate) fn parse_bound<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::ValidationError(format!("{name} must be a number"))),
    }
}
