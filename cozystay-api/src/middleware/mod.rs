pub mod auth;

pub use auth::{ensure_owner, session_middleware};
