use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};
use url::Url;

use super::config_model::{
    BackendServer, Database, DotEnvyConfig, EmailFunction, OnePay, Pay2s,
};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_EMAIL_FUNCTION_TIMEOUT_SECS: u64 = 5;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required_parsed("SERVER_PORT_BACKEND")?,
        body_limit: required_parsed("SERVER_BODY_LIMIT")?,
        timeout: required_parsed("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional_parsed("DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
    };

    let pay2s = Pay2s {
        webhook_secret: optional("PAY2S_WEBHOOK_SECRET"),
        booking_code_prefix: optional("PAY2S_BOOKING_CODE_PREFIX"),
    };

    let onepay = OnePay {
        merchant_id: required("ONEPAY_MERCHANT_ID")?,
        hash_key: required("ONEPAY_HASH_KEY")?,
    };

    let email_function = EmailFunction {
        url: Url::parse(&required("EMAIL_FUNCTION_URL")?)
            .context("EMAIL_FUNCTION_URL is invalid")?,
        api_key: optional("EMAIL_FUNCTION_API_KEY"),
        timeout: Duration::from_secs(
            optional_parsed("EMAIL_FUNCTION_TIMEOUT")?
                .unwrap_or(DEFAULT_EMAIL_FUNCTION_TIMEOUT_SECS),
        ),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        pay2s,
        onepay,
        email_function,
    })
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{} is not set", key))
}

fn required_parsed<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .parse::<T>()
        .with_context(|| format!("{} is invalid", key))
}

fn optional_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional(key)
        .map(|value| {
            value
                .parse::<T>()
                .with_context(|| format!("{} is invalid", key))
        })
        .transpose()
}
