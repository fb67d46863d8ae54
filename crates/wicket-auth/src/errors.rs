use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("envelope too short to carry mac and nonce ({0} bytes)")]
    MalformedEnvelope(usize),
    #[error("envelope authentication failed")]
    AuthenticationFailed,
    #[error("ticket payload did not parse")]
    DecodeFailed,
    #[error("requested principal `{0}` does not exist")]
    PrincipalNotFound(String),
    #[error("mismatched buffer lengths for xor ({0}, {1})")]
    LengthMismatch(usize, usize),
    #[error("secret key must be {expected} bytes, got {got}")]
    KeyLength { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            AuthError::MalformedEnvelope(12),
            AuthError::AuthenticationFailed,
            AuthError::DecodeFailed,
            AuthError::PrincipalNotFound("ghost".to_string()),
            AuthError::LengthMismatch(3, 4),
            AuthError::KeyLength {
                expected: 16,
                got: 7,
            },
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }
}
