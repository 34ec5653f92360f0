pub mod cancellation;
pub mod manager;
pub mod policy;

pub use cancellation::{CancellationError, CancellationWorkflow, CanceledBooking};
pub use manager::{BookingError, BookingManager, BookingSeed, UpsertOutcome};
pub use policy::{cancellation_deadline, evaluate_cancellation, Rejection};
