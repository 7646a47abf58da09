use std::{collections::HashMap, sync::Arc};

use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::repositories::{
        booking_notifier::BookingNotifier, bookings::BookingRepository,
        payment_logs::PaymentLogRepository,
    },
    payments::onepay::OnePayError,
};
use serde_json::Value;
use tracing::{error, warn};

use crate::{
    axum_http::error_responses::AppError,
    usecases::onepay::{OnePayReturnResult, OnePayUseCase, OnePayUseCaseError},
};

pub fn routes<L, B, N>(onepay_usecase: Arc<OnePayUseCase<L, B, N>>) -> Router
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    Router::new()
        .route("/api/onepay/verify-return", post(verify_return::<L, B, N>))
        .route(
            "/api/webhooks/onepay",
            get(ipn_query::<L, B, N>).post(ipn_form::<L, B, N>),
        )
        .with_state(onepay_usecase)
}

pub async fn verify_return<L, B, N>(
    State(onepay_usecase): State<Arc<OnePayUseCase<L, B, N>>>,
    body: Bytes,
) -> Result<Json<OnePayReturnResult>, AppError>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    let params = return_params(&body)?;

    match onepay_usecase.verify_return(params).await {
        Ok(result) => Ok(Json(result)),
        Err(OnePayUseCaseError::Gateway(
            OnePayError::MissingSecureHash
            | OnePayError::InvalidSignature
            | OnePayError::MerchantMismatch,
        )) => Err(AppError::bad_request("Invalid signature")),
        Err(OnePayUseCaseError::Gateway(err)) => Err(AppError::bad_request_with_details(
            "Invalid payload",
            err.to_string(),
        )),
        Err(OnePayUseCaseError::LogStore(err)) => {
            error!(db_error = ?err, "onepay: return could not be recorded");
            Err(AppError::Internal(err))
        }
    }
}

pub async fn ipn_query<L, B, N>(
    State(onepay_usecase): State<Arc<OnePayUseCase<L, B, N>>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    (StatusCode::OK, onepay_usecase.handle_ipn(params).await)
}

pub async fn ipn_form<L, B, N>(
    State(onepay_usecase): State<Arc<OnePayUseCase<L, B, N>>>,
    Form(params): Form<HashMap<String, String>>,
) -> impl IntoResponse
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    (StatusCode::OK, onepay_usecase.handle_ipn(params).await)
}

/// The return page forwards OnePay's query string as a JSON object; scalar
/// values are accepted and stringified.
fn return_params(body: &[u8]) -> Result<HashMap<String, String>, AppError> {
    let raw: HashMap<String, Value> = serde_json::from_slice(body).map_err(|err| {
        warn!(error = %err, "onepay: rejected return payload");
        AppError::bad_request_with_details("Invalid payload", err.to_string())
    })?;

    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(value) => Some((key, value)),
            Value::Number(value) => Some((key, value.to_string())),
            Value::Bool(value) => Some((key, value.to_string())),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::payment_reconciliation::PaymentReconciler;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use crates::{
        domain::repositories::{
            booking_notifier::MockBookingNotifier, bookings::MockBookingRepository,
            payment_logs::MockPaymentLogRepository,
        },
        payments::onepay::{IPN_ACK_FAIL, OnePaySigner},
    };
    use serde_json::json;
    use tower::ServiceExt;

    fn app(log_repo: MockPaymentLogRepository) -> Router {
        let reconciler = PaymentReconciler::new(
            Arc::new(log_repo),
            Arc::new(MockBookingRepository::new()),
            Arc::new(MockBookingNotifier::new()),
        );
        let signer = OnePaySigner::new("TESTONEPAY", "6D0870CDE5F24F34F3915FB0045120DB").unwrap();
        routes(Arc::new(OnePayUseCase::new(
            Arc::new(reconciler),
            Arc::new(signer),
        )))
    }

    fn untouched_log_repo() -> MockPaymentLogRepository {
        let mut log_repo = MockPaymentLogRepository::new();
        log_repo.expect_find_by_transaction_id().never();
        log_repo.expect_upsert().never();
        log_repo
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn forged_return_is_invalid_signature() {
        let payload = json!({
            "vpc_Amount": 150000000,
            "vpc_MerchTxnRef": "YH12345-1",
            "vpc_TxnResponseCode": "0",
            "vpc_SecureHash": "00FF",
        });

        let response = app(untouched_log_repo())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/onepay/verify-return")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, r#"{"error":"Invalid signature"}"#);
    }

    #[tokio::test]
    async fn unsigned_ipn_gets_fail_ack() {
        let response = app(untouched_log_repo())
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/webhooks/onepay?vpc_MerchTxnRef=YH12345-1&vpc_TxnResponseCode=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, IPN_ACK_FAIL);
    }

    #[tokio::test]
    async fn form_ipn_with_bad_hash_gets_fail_ack() {
        let response = app(untouched_log_repo())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/onepay")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "vpc_MerchTxnRef=YH12345-1&vpc_Amount=100&vpc_TxnResponseCode=0&vpc_SecureHash=ABCD",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_text(response).await, IPN_ACK_FAIL);
    }

    #[test]
    fn return_params_stringifies_scalars() {
        let params = return_params(br#"{"vpc_Amount":150000000,"vpc_OrderInfo":"YH1","extra":null}"#)
            .unwrap();

        assert_eq!(params.get("vpc_Amount").map(String::as_str), Some("150000000"));
        assert_eq!(params.get("vpc_OrderInfo").map(String::as_str), Some("YH1"));
        assert!(!params.contains_key("extra"));
    }
}
