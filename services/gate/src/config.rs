use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use wicket_auth::{Principal, PrincipalSet, SecretKey, CSRF_PRINCIPAL};

/// Gate configuration, built once at startup and immutable afterwards.
/// Every request handler borrows it read-only through shared state.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub secret_key: SecretKey,
    pub expire_secs: i64,
    pub port: u16,
    pub principals: PrincipalSet,
}

// Raw shape of the JSON config file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    secret_key: String,
    #[serde(default)]
    expire_hours: i64,
    #[serde(default)]
    port: u16,
    #[serde(default)]
    principals: Vec<Principal>,
}

impl GateConfig {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read config file: {path}"))?;
        let raw: RawConfig =
            serde_json::from_str(&contents).with_context(|| format!("parse config: {path}"))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let secret_key = if raw.secret_key.is_empty() {
            // Secure by default, although not persistent: tickets minted
            // before a restart will not verify after one.
            tracing::warn!("no secret key configured; using a random one for this process");
            SecretKey::generate()
        } else {
            SecretKey::from_slice(raw.secret_key.as_bytes())
                .context("secret_key must be exactly 16 bytes")?
        };

        let expire_hours = if raw.expire_hours > 0 { raw.expire_hours } else { 1 };
        let port = if raw.port > 0 { raw.port } else { 8080 };

        let mut kept = Vec::with_capacity(raw.principals.len());
        for (index, principal) in raw.principals.into_iter().enumerate() {
            if principal.name.is_empty() {
                tracing::warn!(index, "principal has no name, skipped");
                continue;
            }
            if principal.name == CSRF_PRINCIPAL {
                tracing::warn!(index, name = %principal.name, "principal name is reserved, skipped");
                continue;
            }
            kept.push(principal);
        }

        Ok(Self {
            secret_key,
            expire_secs: expire_hours * 3600,
            port,
            principals: PrincipalSet::new(kept),
        })
    }
}
