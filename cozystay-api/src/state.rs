use std::sync::Arc;
use std::time::Duration;

use cozystay_booking::{BookingManager, CancellationWorkflow};
use cozystay_core::{BookingRepository, ReviewRepository, RoomRepository};

use crate::session::SessionAuthenticator;

#[derive(Clone)]
pub struct HttpConfig {
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<dyn RoomRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub manager: Arc<BookingManager>,
    pub cancellation: Arc<CancellationWorkflow>,
    pub sessions: SessionAuthenticator,
    pub http: HttpConfig,
}

impl AppState {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        bookings: Arc<dyn BookingRepository>,
        reviews: Arc<dyn ReviewRepository>,
        sessions: SessionAuthenticator,
        http: HttpConfig,
    ) -> Self {
        Self {
            manager: Arc::new(BookingManager::new(bookings.clone())),
            cancellation: Arc::new(CancellationWorkflow::new(bookings.clone())),
            rooms,
            bookings,
            reviews,
            sessions,
            http,
        }
    }

    /// State over a single store implementing every repository.
    pub fn from_store<S>(store: Arc<S>, sessions: SessionAuthenticator, http: HttpConfig) -> Self
    where
        S: RoomRepository + BookingRepository + ReviewRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store, sessions, http)
    }
}
