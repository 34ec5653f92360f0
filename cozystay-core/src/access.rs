//! Ownership check for booking access.
//!
//! A caller may only see or touch bookings recorded under the identity carried
//! by their session. Identities are compared exactly; no case folding.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        matches!(self, Access::Allow)
    }
}

/// Decide whether `session` may act on data owned by `requested`.
pub fn authorize(requested: &str, session: &str) -> Access {
    if requested == session {
        Access::Allow
    } else {
        tracing::debug!(requested, session, "ownership mismatch");
        Access::Deny
    }
}
