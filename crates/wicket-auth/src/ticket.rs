use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::envelope;
use crate::errors::{AuthError, AuthResult};
use crate::key::SecretKey;

/// Reserved principal name for anti-forgery tickets. Never resolves to a
/// configured identity; the loader refuses to accept it.
pub const CSRF_PRINCIPAL: &str = "CSRFTOKEN";

/// Anti-forgery tickets stay valid for fifteen minutes.
pub const CSRF_TTL_SECS: i64 = 900;

/// Proof that a caller completed a login as `principal`, bounded by `expiry`
/// in seconds since the Unix epoch.
///
/// ```
/// use wicket_auth::{SecretKey, Ticket};
///
/// let key = SecretKey::generate();
/// let token = Ticket::new("alice", 4_102_444_800).to_token(&key).expect("token");
/// let decoded = Ticket::from_token(&token, &key);
/// assert_eq!(decoded.principal, "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub principal: String,
    pub expiry: i64,
}

impl Ticket {
    pub fn new(principal: impl Into<String>, expiry: i64) -> Self {
        Self {
            principal: principal.into(),
            expiry,
        }
    }

    /// The never-valid ticket that every failed decode collapses to.
    pub fn invalid() -> Self {
        Self {
            principal: String::new(),
            expiry: 0,
        }
    }

    /// Mint the short-lived anti-forgery ticket bound to a login form render.
    pub fn csrf(now: i64) -> Self {
        Self::new(CSRF_PRINCIPAL, now + CSRF_TTL_SECS)
    }

    /// A ticket proves anything only while its principal is non-empty and its
    /// expiry is strictly in the future.
    pub fn is_valid(&self, now: i64) -> bool {
        !self.principal.is_empty() && self.expiry > now
    }

    /// Serialize the ticket, seal it, and render the envelope as a
    /// transport-safe token string.
    pub fn to_token(&self, key: &SecretKey) -> AuthResult<String> {
        let payload = serde_json::to_vec(self).expect("ticket payload serializes");
        let blob = envelope::seal(&payload, key)?;
        Ok(URL_SAFE_NO_PAD.encode(blob))
    }

    /// Decode a token, collapsing every failure into [`Ticket::invalid`].
    ///
    /// Bad text encoding, a tampered or truncated envelope, a wrong key, and
    /// a malformed payload are indistinguishable to the caller: validity is
    /// checked through [`Ticket::is_valid`], never by branching on a decode
    /// error.
    pub fn from_token(token: &str, key: &SecretKey) -> Self {
        Self::decode(token, key).unwrap_or_else(|_| Self::invalid())
    }

    fn decode(token: &str, key: &SecretKey) -> AuthResult<Self> {
        let blob = URL_SAFE_NO_PAD
            .decode(token.as_bytes())
            .map_err(|_| AuthError::MalformedEnvelope(token.len()))?;
        let payload = envelope::open(&blob, key)?;
        serde_json::from_slice(&payload).map_err(|_| AuthError::DecodeFailed)
    }
}

/// Seconds since the Unix epoch, the clock every expiry check runs against.
pub fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}
