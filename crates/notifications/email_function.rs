use super::dispatcher::EmailProvider;
use crate::domain::value_objects::notifications::BookingConfirmationEmail;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use url::Url;

/// Client for the separately deployed booking email function.
pub struct EmailFunctionClient {
    endpoint: Url,
    api_key: Option<String>,
    client: Client,
}

impl EmailFunctionClient {
    pub fn new(endpoint: Url, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl EmailProvider for EmailFunctionClient {
    async fn send(&self, email: &BookingConfirmationEmail) -> Result<()> {
        let mut request = self.client.post(self.endpoint.clone()).json(email);
        if let Some(api_key) = self.api_key.as_deref() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", api_key));
        }

        let response = request.send().await.map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "email function returned non-success status: {}",
            response.status()
        ))
    }

    fn provider_name(&self) -> &'static str {
        "email_function"
    }
}

// reqwest errors embed the URL, which may carry a function key.
fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("email function request timed out");
    }
    if error.is_connect() {
        return anyhow!("email function connection failed");
    }
    anyhow!("email function request failed")
}
