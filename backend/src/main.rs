use anyhow::Result;
use backend::axum_http::http_serve;
use backend::config::config_loader;
use crates::infra::db::postgres::postgres_connection;
use crates::notifications::{EmailFunctionClient, EmailProvider, NotificationDispatcher};
use crates::payments::onepay::OnePaySigner;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    if dotenvy_env.pay2s.webhook_secret.is_none() {
        warn!("PAY2S_WEBHOOK_SECRET is not set, Pay2S webhook requests are not authenticated");
    }

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?;
    info!("Postgres connection has been established");

    let email_function = EmailFunctionClient::new(
        dotenvy_env.email_function.url.clone(),
        dotenvy_env.email_function.api_key.clone(),
        dotenvy_env.email_function.timeout,
    )?;
    let providers: Vec<Arc<dyn EmailProvider>> = vec![Arc::new(email_function)];
    let notifier = NotificationDispatcher::new(providers);

    let onepay_signer =
        OnePaySigner::new(dotenvy_env.onepay.merchant_id.clone(), &dotenvy_env.onepay.hash_key)?;

    http_serve::start(
        Arc::new(dotenvy_env),
        Arc::new(postgres_pool),
        Arc::new(notifier),
        Arc::new(onepay_signer),
    )
    .await?;

    Ok(())
}
