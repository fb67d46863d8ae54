use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::{AuthError, AuthResult};
use crate::ticket::CSRF_PRINCIPAL;

/// Resource entry granting access to every path.
pub const ALL_RESOURCES: &str = "ALL";

/// A configured identity: a login name, the hex SHA-256 of its password,
/// and the resource prefixes it may reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    pub hash: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Principal {
    /// Literal-prefix authorization: the request must start with one of the
    /// configured entries, matched byte for byte from index zero, so
    /// `private/x` also authorizes `private/xyz`. The `ALL` sentinel
    /// authorizes unconditionally. There is no deny rule and no ordering
    /// between entries.
    pub fn is_authorized(&self, requested_path: &str) -> bool {
        self.resources
            .iter()
            .any(|entry| entry == ALL_RESOURCES || requested_path.starts_with(entry.as_str()))
    }
}

/// Hash a submitted password into the form stored in configuration.
pub fn password_hash(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// The principal table, loaded once at startup and immutable afterwards.
///
/// Construction drops entries with an empty name and entries claiming the
/// reserved anti-forgery name, so neither can ever authenticate or
/// authorize.
#[derive(Debug, Clone, Default)]
pub struct PrincipalSet {
    principals: Vec<Principal>,
}

impl PrincipalSet {
    pub fn new(principals: Vec<Principal>) -> Self {
        let principals = principals
            .into_iter()
            .filter(|principal| {
                !principal.name.is_empty() && principal.name != CSRF_PRINCIPAL
            })
            .collect();
        Self { principals }
    }

    pub fn get(&self, name: &str) -> Option<&Principal> {
        self.principals
            .iter()
            .find(|principal| principal.name == name)
    }

    fn require(&self, name: &str) -> AuthResult<&Principal> {
        self.get(name)
            .ok_or_else(|| AuthError::PrincipalNotFound(name.to_string()))
    }

    /// Compare a submitted password hash against the stored hash for `name`.
    /// An unknown principal is an error, never a success.
    ///
    /// A length mismatch is rejected outright before any bytes are compared;
    /// the comparison itself is constant time over equal-length inputs.
    pub fn authenticate_hash(&self, name: &str, submitted: &str) -> AuthResult<bool> {
        let principal = self.require(name)?;
        let stored = principal.hash.as_bytes();
        let submitted = submitted.as_bytes();
        if stored.len() != submitted.len() {
            return Ok(false);
        }
        Ok(bool::from(stored.ct_eq(submitted)))
    }

    /// Verify a raw password for `name`, collapsing lookup failures into a
    /// refusal.
    pub fn authenticate(&self, name: &str, password: &str) -> bool {
        self.authenticate_hash(name, &password_hash(password))
            .unwrap_or(false)
    }

    /// Whether the named principal may access `requested_path`. Unknown
    /// principals are denied.
    pub fn is_authorized(&self, name: &str, requested_path: &str) -> bool {
        self.get(name)
            .map(|principal| principal.is_authorized(requested_path))
            .unwrap_or(false)
    }
}
