use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use crates::domain::{
    repositories::{
        booking_notifier::BookingNotifier, bookings::BookingRepository,
        payment_logs::PaymentLogRepository,
    },
    value_objects::pay2s::{Pay2sPayloadError, Pay2sWebhookResponse, parse_webhook_body},
};
use tracing::warn;

use crate::{
    auth::authorize_webhook, axum_http::error_responses::AppError,
    usecases::pay2s_webhook::Pay2sWebhookUseCase,
};

pub fn routes<L, B, N>(pay2s_webhook_usecase: Arc<Pay2sWebhookUseCase<L, B, N>>) -> Router
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    Router::new()
        .route("/pay2s-webhook", post(receive::<L, B, N>))
        .with_state(pay2s_webhook_usecase)
}

pub async fn receive<L, B, N>(
    State(pay2s_webhook_usecase): State<Arc<Pay2sWebhookUseCase<L, B, N>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Pay2sWebhookResponse>, AppError>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    authorize_webhook(&headers, pay2s_webhook_usecase.webhook_secret()).map_err(|err| {
        warn!(error = %err, "pay2s_webhook: rejected request");
        AppError::Unauthorized
    })?;

    let transactions = parse_webhook_body(&body).map_err(|err| {
        warn!(error = %err, "pay2s_webhook: rejected payload");
        match err {
            Pay2sPayloadError::EmptyBatch => AppError::bad_request("No transactions provided"),
            Pay2sPayloadError::InvalidJson(details) => {
                AppError::bad_request_with_details("Invalid payload", details)
            }
        }
    })?;

    let results = pay2s_webhook_usecase.process_batch(transactions).await;

    Ok(Json(Pay2sWebhookResponse {
        success: true,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_model::Pay2s;
    use crate::usecases::payment_reconciliation::PaymentReconciler;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use crates::domain::repositories::{
        booking_notifier::MockBookingNotifier, bookings::MockBookingRepository,
        payment_logs::MockPaymentLogRepository,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(log_repo: MockPaymentLogRepository, secret: Option<&str>) -> Router {
        let mut booking_repo = MockBookingRepository::new();
        booking_repo.expect_find_active_by_code().never();

        let reconciler = PaymentReconciler::new(
            Arc::new(log_repo),
            Arc::new(booking_repo),
            Arc::new(MockBookingNotifier::new()),
        );
        let usecase = Pay2sWebhookUseCase::new(
            Arc::new(reconciler),
            &Pay2s {
                webhook_secret: secret.map(str::to_string),
                booking_code_prefix: None,
            },
        );
        routes(Arc::new(usecase))
    }

    fn post_webhook(body: impl Into<Body>, api_key: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/pay2s-webhook")
            .header("content-type", "application/json");
        if let Some(api_key) = api_key {
            builder = builder.header("x-api-key", api_key);
        }
        builder.body(body.into()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let mut log_repo = MockPaymentLogRepository::new();
        log_repo.expect_find_by_transaction_id().never();

        let response = app(log_repo, Some("s3cret"))
            .oneshot(post_webhook(r#"{"transactions":[{"id":"1"}]}"#, Some("wrong")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn empty_batch_is_bad_request() {
        let response = app(MockPaymentLogRepository::new(), Some("s3cret"))
            .oneshot(post_webhook(r#"{"transactions":[]}"#, Some("s3cret")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "No transactions provided" })
        );
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request_with_details() {
        let response = app(MockPaymentLogRepository::new(), None)
            .oneshot(post_webhook("{not json", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid payload");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn out_transaction_is_reported_in_results() {
        let mut log_repo = MockPaymentLogRepository::new();
        log_repo
            .expect_find_by_transaction_id()
            .returning(|_| Ok(None));
        log_repo.expect_upsert().times(1).returning(|_| Ok(true));
        log_repo
            .expect_update_by_transaction_id()
            .times(1)
            .returning(|_, _| Ok(()));

        let payload = json!({
            "transactions": [{
                "id": 42,
                "gateway": "MBBank",
                "content": "YH12345",
                "transferType": "OUT",
                "transferAmount": 1500000
            }]
        });

        let response = app(log_repo, Some("s3cret"))
            .oneshot(post_webhook(
                serde_json::to_vec(&payload).unwrap(),
                Some("Bearer s3cret"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "success": true,
                "results": [{
                    "transaction_id": "42",
                    "status": "skipped",
                    "reason": "OUT transaction"
                }]
            })
        );
    }
}
