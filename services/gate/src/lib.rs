//! Delegated authentication gate service library.
//!
//! # Purpose
//! Exposes the HTTP application, configuration loading, and tracing setup
//! for use by the gate binary and integration tests.
//!
//! # Notes
//! The reverse proxy forwards protected requests to `/_auth` and sends
//! browsers to `/login`; everything interesting lives in `wicket-auth`.
pub mod app;
pub mod config;
pub mod observability;
