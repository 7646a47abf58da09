use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use crates::{
    domain::{
        entities::payment_logs::UpsertPaymentLogEntity,
        repositories::{
            booking_notifier::BookingNotifier, bookings::BookingRepository,
            payment_logs::PaymentLogRepository,
        },
        value_objects::{
            enums::{payment_channels::PaymentChannel, payment_log_statuses::PaymentLogStatus},
            transaction_outcomes::TransactionOutcome,
        },
    },
    payments::onepay::{IPN_ACK_FAIL, IPN_ACK_SUCCESS, OnePayError, OnePayResponse, OnePaySigner},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::usecases::payment_reconciliation::{PaymentReconciler, ReconcileRequest};

const ONEPAY_BANK_CODE: &str = "ONEPAY";

#[derive(Debug, Error)]
pub enum OnePayUseCaseError {
    #[error(transparent)]
    Gateway(#[from] OnePayError),
    #[error("failed to record OnePay transaction")]
    LogStore(#[source] anyhow::Error),
}

/// What the browser return page is told about the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnePayReturnResult {
    pub success: bool,
    pub booking_code: String,
    pub status: PaymentLogStatus,
    pub message: String,
    pub response_code: String,
}

pub struct OnePayUseCase<L, B, N>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    reconciler: Arc<PaymentReconciler<L, B, N>>,
    signer: Arc<OnePaySigner>,
}

impl<L, B, N> OnePayUseCase<L, B, N>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    pub fn new(reconciler: Arc<PaymentReconciler<L, B, N>>, signer: Arc<OnePaySigner>) -> Self {
        Self { reconciler, signer }
    }

    pub async fn verify_return(
        &self,
        params: HashMap<String, String>,
    ) -> Result<OnePayReturnResult, OnePayUseCaseError> {
        let (response, outcome) = self.process(params).await?;

        let settled = response.is_approved()
            && matches!(
                outcome.status,
                PaymentLogStatus::Success | PaymentLogStatus::Skipped
            );
        let message = match (&outcome.reason, settled) {
            (None, true) => "Payment confirmed".to_string(),
            (Some(reason), _) => reason.clone(),
            (None, false) => "Payment not completed".to_string(),
        };

        Ok(OnePayReturnResult {
            success: settled,
            booking_code: response.booking_code().to_string(),
            status: outcome.status,
            message,
            response_code: response.response_code,
        })
    }

    /// Acknowledges every IPN whose hash verifies, whatever the payment outcome,
    /// so OnePay only retries deliveries that were not recorded.
    pub async fn handle_ipn(&self, params: HashMap<String, String>) -> &'static str {
        match self.process(params).await {
            Ok((response, outcome)) => {
                info!(
                    merchant_txn_ref = %response.merchant_txn_ref,
                    status = %outcome.status,
                    "onepay: ipn acknowledged"
                );
                IPN_ACK_SUCCESS
            }
            Err(OnePayUseCaseError::Gateway(err)) => {
                warn!(error = %err, "onepay: ipn rejected");
                IPN_ACK_FAIL
            }
            Err(OnePayUseCaseError::LogStore(_)) => IPN_ACK_FAIL,
        }
    }

    async fn process(
        &self,
        params: HashMap<String, String>,
    ) -> Result<(OnePayResponse, TransactionOutcome), OnePayUseCaseError> {
        let response = self.signer.verify(&params).inspect_err(|err| {
            warn!(
                merchant_txn_ref = ?params.get("vpc_MerchTxnRef"),
                error = %err,
                "onepay: response failed verification"
            );
        })?;

        let transaction_id = response.log_transaction_id();
        let entry = UpsertPaymentLogEntity {
            transaction_id: transaction_id.clone(),
            amount: response.received_amount(),
            content: response.booking_code().to_string(),
            bank_code: Some(ONEPAY_BANK_CODE.to_string()),
            status: PaymentLogStatus::Processing.to_string(),
            reason: None,
            booking_id: None,
            booking_code: None,
            raw_payload: raw_payload(&params),
            updated_at: Utc::now(),
        };

        if let Some(outcome) = self
            .reconciler
            .open_log(entry)
            .await
            .map_err(OnePayUseCaseError::LogStore)?
        {
            return Ok((response, outcome));
        }

        let request = ReconcileRequest {
            transaction_id,
            booking_code: response.booking_code().to_string(),
            received_amount: response.received_amount(),
            channel: PaymentChannel::OnePay,
        };

        let outcome = if response.is_approved() {
            self.reconciler.reconcile(request).await
        } else {
            info!(
                merchant_txn_ref = %response.merchant_txn_ref,
                response_code = %response.response_code,
                "onepay: payment declined by gateway"
            );
            let reason = format!("OnePay declined: code {}", response.response_code);
            self.reconciler.decline(request, reason).await
        };

        Ok((response, outcome))
    }
}

fn raw_payload(params: &HashMap<String, String>) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}
