//! Timing rules deciding whether a booking may still be cancelled.
//!
//! Two rules run in order:
//! 1. the cancellation deadline is one day before check-in; cancelling any
//!    instant after it is rejected with [`Rejection::DeadlinePassed`];
//! 2. the whole hours left until check-in (truncated toward zero) must be
//!    strictly more than 24, otherwise [`Rejection::TooCloseToCheckIn`].
//!
//! With a day-based deadline the second rule only bites in the sub-hour window
//! right at the deadline (e.g. check-in exactly 24h or 24h30m away). Both
//! rules are kept so callers see the same reasons at the same boundaries.
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Cancellation deadline has passed")]
    DeadlinePassed,
    #[error("Check-in date is less than or equal to 24 hours away")]
    TooCloseToCheckIn,
}

impl Rejection {
    /// Stable machine-readable code.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::DeadlinePassed => "deadline_passed",
            Rejection::TooCloseToCheckIn => "too_close_to_check_in",
        }
    }
}

const MIN_HOURS_BEFORE_CHECK_IN: i64 = 24;

pub fn cancellation_deadline(check_in: DateTime<Utc>) -> DateTime<Utc> {
    check_in - Duration::days(1)
}

pub fn evaluate_cancellation(check_in: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), Rejection> {
    if now > cancellation_deadline(check_in) {
        return Err(Rejection::DeadlinePassed);
    }
    if (check_in - now).num_hours() <= MIN_HOURS_BEFORE_CHECK_IN {
        return Err(Rejection::TooCloseToCheckIn);
    }
    Ok(())
}
