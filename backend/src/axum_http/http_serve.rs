use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::{
        onepay::OnePayUseCase, pay2s_webhook::Pay2sWebhookUseCase,
        payment_reconciliation::PaymentReconciler,
    },
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    domain::repositories::booking_notifier::BookingNotifier,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{bookings::BookingPostgres, payment_logs::PaymentLogPostgres},
    },
    payments::onepay::OnePaySigner,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub async fn start<N>(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    notifier: Arc<N>,
    onepay_signer: Arc<OnePaySigner>,
) -> Result<()>
where
    N: BookingNotifier + 'static,
{
    let payment_log_repository = PaymentLogPostgres::new(Arc::clone(&db_pool));
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let reconciler = Arc::new(PaymentReconciler::new(
        Arc::new(payment_log_repository),
        Arc::new(booking_repository),
        notifier,
    ));

    let pay2s_webhook_usecase = Pay2sWebhookUseCase::new(Arc::clone(&reconciler), &config.pay2s);
    let onepay_usecase = OnePayUseCase::new(Arc::clone(&reconciler), onepay_signer);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .merge(routers::pay2s_webhook::routes(Arc::new(pay2s_webhook_usecase)))
        .merge(routers::onepay::routes(Arc::new(onepay_usecase)))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            config.backend_server.body_limit_bytes()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    HeaderName::from_static("x-api-key"),
                    HeaderName::from_static("apikey"),
                ])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
