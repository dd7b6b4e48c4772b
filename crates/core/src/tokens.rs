//! Rules for single-use activation, email-confirmation and reset tokens.

use sha2::{Digest, Sha256};

use crate::enums::TokenStatus;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Default number of whole days a token stays valid.
pub const DEFAULT_TOKEN_MAX_AGE_DAYS: i64 = 1;

/// A token is expired once its age in whole days exceeds `max_age_days`.
pub fn is_expired(created_at: Timestamp, now: Timestamp, max_age_days: i64) -> bool {
    (now - created_at).num_days() > max_age_days
}

/// What a stored token row needs to expose to be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken<'a> {
    pub employee_id: DbId,
    pub email: &'a str,
    pub status: TokenStatus,
    pub created_at: Timestamp,
}

/// The employee the token is being redeemed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redeemer<'a> {
    pub employee_id: DbId,
    pub email: &'a str,
}

/// Check ownership, status and age, in that order.
pub fn verify_issued_token(
    token: &IssuedToken<'_>,
    redeemer: Redeemer<'_>,
    now: Timestamp,
    max_age_days: i64,
) -> Result<(), CoreError> {
    if token.employee_id != redeemer.employee_id || token.email != redeemer.email {
        return Err(CoreError::Validation("Invalid Token".to_string()));
    }
    if token.status == TokenStatus::Used {
        return Err(CoreError::Validation("Token already used".to_string()));
    }
    if is_expired(token.created_at, now, max_age_days) {
        return Err(CoreError::Validation("Token expired".to_string()));
    }
    Ok(())
}

/// SHA-256 hex digest of a bearer token, as stored in the blacklist.
pub fn fingerprint(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
