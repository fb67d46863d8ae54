//! Ticket primitives for a reverse-proxy-delegated authentication gate.
//!
//! # Purpose
//! Issues and verifies the signed, encrypted, self-contained ticket that
//! proves a caller authenticated as a principal, and decides whether that
//! principal may reach a requested resource path.
//!
//! # How it fits
//! The gate service mints a ticket on login and stores it client-side; on
//! every proxied request it reopens the ticket and consults the principal
//! table. Nothing here performs I/O beyond reading the random nonce, and
//! nothing holds mutable state: the secret key and principal table are
//! built once at startup and borrowed read-only afterwards.
//!
//! # Key invariants
//! - An envelope is verified before any ciphertext is decrypted or trusted.
//! - A ticket that fails to decode for any reason is the invalid ticket,
//!   never partially-populated data; failure causes are indistinguishable
//!   to callers.
//! - The reserved name `CSRFTOKEN` never names a configured principal.
//!
//! # Examples
//! ```
//! use wicket_auth::{PrincipalSet, SecretKey, Ticket};
//!
//! let key = SecretKey::generate();
//! let token = Ticket::new("alice", 4_102_444_800).to_token(&key).expect("token");
//! let ticket = Ticket::from_token(&token, &key);
//! assert!(ticket.is_valid(0));
//! assert!(!PrincipalSet::default().is_authorized(&ticket.principal, "/"));
//! ```

pub mod envelope;
mod errors;
mod key;
pub mod keystream;
mod principal;
mod ticket;
pub mod xor;

pub use errors::{AuthError, AuthResult};
pub use key::{SecretKey, KEY_LEN};
pub use principal::{password_hash, Principal, PrincipalSet, ALL_RESOURCES};
pub use ticket::{now_epoch_seconds, Ticket, CSRF_PRINCIPAL, CSRF_TTL_SECS};
