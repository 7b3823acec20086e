//! Verification code proving control of an account's email address.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque verification token together with the moment it was issued.
///
/// The code and its issue time always travel together, so a user either has
/// both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// The opaque token sent in verification links
    pub code: String,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Issues a fresh random code at `now`
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            code: Uuid::new_v4().to_string(),
            issued_at: now,
        }
    }

    /// Restores a stored code
    pub fn new(code: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            issued_at,
        }
    }

    /// Earliest issue time a code may have to still be redeemable at `now`.
    /// Codes must be issued strictly after this instant.
    pub fn freshness_boundary(now: DateTime<Utc>, validity: Duration) -> DateTime<Utc> {
        now - validity
    }

    /// Whether the code can still be redeemed at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, validity: Duration) -> bool {
        self.issued_at > Self::freshness_boundary(now, validity)
    }

    /// The instant from which the code is no longer accepted
    pub fn expires_at(&self, validity: Duration) -> DateTime<Utc> {
        self.issued_at + validity
    }
}
