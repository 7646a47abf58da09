use axum::http::HeaderMap;
use thiserror::Error;

/// Headers Pay2S may carry the shared secret in, checked in this order.
pub const WEBHOOK_KEY_HEADERS: [&str; 3] = ["x-api-key", "apikey", "authorization"];

const CREDENTIAL_SCHEMES: [&str; 2] = ["Bearer ", "Apikey "];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing webhook credentials")]
    MissingCredentials,
    #[error("invalid webhook credentials")]
    InvalidCredentials,
}

/// Checks the shared webhook secret. An unset secret accepts every caller.
pub fn authorize_webhook(headers: &HeaderMap, secret: Option<&str>) -> Result<(), AuthError> {
    let Some(secret) = secret.filter(|secret| !secret.is_empty()) else {
        return Ok(());
    };

    let mut presented = false;
    for name in WEBHOOK_KEY_HEADERS {
        for value in headers.get_all(name) {
            let Ok(raw) = value.to_str() else {
                continue;
            };
            presented = true;
            if constant_time_eq(credential(raw).as_bytes(), secret.as_bytes()) {
                return Ok(());
            }
        }
    }

    if presented {
        Err(AuthError::InvalidCredentials)
    } else {
        Err(AuthError::MissingCredentials)
    }
}

fn credential(raw: &str) -> &str {
    let trimmed = raw.trim();
    for scheme in CREDENTIAL_SCHEMES {
        if let Some(prefix) = trimmed.get(..scheme.len()) {
            if prefix.eq_ignore_ascii_case(scheme) {
                return trimmed[scheme.len()..].trim();
            }
        }
    }
    trimmed
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |diff, (l, r)| diff | (l ^ r))
        == 0
}

#[cfg(test)]
mod tests;
