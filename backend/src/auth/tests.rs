use super::*;
use axum::http::{HeaderMap, HeaderValue};

const SECRET: &str = "pay2s-shared-secret";

fn headers_with(name: &'static str, value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(name, HeaderValue::from_str(value).unwrap());
    headers
}

#[test]
fn test_unconfigured_secret_accepts_any_caller() {
    assert_eq!(authorize_webhook(&HeaderMap::new(), None), Ok(()));
    assert_eq!(authorize_webhook(&HeaderMap::new(), Some("")), Ok(()));
}

#[test]
fn test_secret_accepted_in_each_supported_header() {
    for name in WEBHOOK_KEY_HEADERS {
        let headers = headers_with(name, SECRET);
        assert_eq!(authorize_webhook(&headers, Some(SECRET)), Ok(()), "{name}");
    }
}

#[test]
fn test_secret_accepted_after_scheme_prefix() {
    let bearer = headers_with("authorization", &format!("Bearer {SECRET}"));
    let apikey = headers_with("authorization", &format!("apikey {SECRET}"));

    assert_eq!(authorize_webhook(&bearer, Some(SECRET)), Ok(()));
    assert_eq!(authorize_webhook(&apikey, Some(SECRET)), Ok(()));
}

#[test]
fn test_missing_header_is_rejected() {
    assert_eq!(
        authorize_webhook(&HeaderMap::new(), Some(SECRET)),
        Err(AuthError::MissingCredentials)
    );
}

#[test]
fn test_wrong_secret_is_rejected() {
    let headers = headers_with("x-api-key", "not-the-secret");
    assert_eq!(
        authorize_webhook(&headers, Some(SECRET)),
        Err(AuthError::InvalidCredentials)
    );

    let prefix_only = headers_with("x-api-key", &SECRET[..5]);
    assert_eq!(
        authorize_webhook(&prefix_only, Some(SECRET)),
        Err(AuthError::InvalidCredentials)
    );
}
