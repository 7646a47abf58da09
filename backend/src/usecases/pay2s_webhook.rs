use chrono::Utc;
use crates::domain::{
    entities::payment_logs::UpsertPaymentLogEntity,
    repositories::{
        booking_notifier::BookingNotifier, bookings::BookingRepository,
        payment_logs::PaymentLogRepository,
    },
    value_objects::{
        booking_code::BookingCodeMatcher,
        enums::{
            payment_channels::PaymentChannel, payment_log_statuses::PaymentLogStatus,
            transfer_types::TransferType,
        },
        pay2s::{Pay2sTransaction, transaction_id_hint},
        transaction_outcomes::{
            REASON_INVALID_AMOUNT, REASON_INVALID_TRANSACTION, REASON_LOG_WRITE_FAILED,
            REASON_MISSING_CONTENT,
            REASON_NO_BOOKING_CODE, REASON_OUT_TRANSACTION, REASON_UNSUPPORTED_TRANSFER_TYPE,
            TransactionOutcome,
        },
    },
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    config::config_model::Pay2s,
    usecases::payment_reconciliation::{PaymentReconciler, ReconcileRequest},
};

pub struct Pay2sWebhookUseCase<L, B, N>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    reconciler: Arc<PaymentReconciler<L, B, N>>,
    matcher: BookingCodeMatcher,
    webhook_secret: Option<String>,
}

impl<L, B, N> Pay2sWebhookUseCase<L, B, N>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    pub fn new(reconciler: Arc<PaymentReconciler<L, B, N>>, config: &Pay2s) -> Self {
        Self {
            reconciler,
            matcher: BookingCodeMatcher::from_prefix(config.booking_code_prefix.as_deref()),
            webhook_secret: config.webhook_secret.clone(),
        }
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }

    /// Processes each transaction on its own; one failure never aborts the batch.
    pub async fn process_batch(&self, transactions: Vec<Value>) -> Vec<TransactionOutcome> {
        info!(
            transaction_count = transactions.len(),
            "pay2s_webhook: processing batch"
        );

        let mut results = Vec::with_capacity(transactions.len());
        for raw in transactions {
            results.push(self.process_transaction(raw).await);
        }

        let settled = results
            .iter()
            .filter(|outcome| outcome.status == PaymentLogStatus::Success)
            .count();
        info!(
            transaction_count = results.len(),
            settled, "pay2s_webhook: batch processed"
        );

        results
    }

    async fn process_transaction(&self, raw: Value) -> TransactionOutcome {
        // Without an id there is no log row to key the item on.
        let transaction = match Pay2sTransaction::from_value(&raw) {
            Ok(transaction) => transaction,
            Err(err) => {
                let transaction_id = transaction_id_hint(&raw);
                warn!(
                    %transaction_id,
                    error = %err,
                    "pay2s_webhook: transaction has no usable id"
                );
                return TransactionOutcome::new(transaction_id, PaymentLogStatus::Error)
                    .with_reason(REASON_INVALID_TRANSACTION);
            }
        };

        let transaction_id = transaction.id.clone();
        let content = transaction.trimmed_content().to_string();

        let entry = UpsertPaymentLogEntity {
            transaction_id: transaction_id.clone(),
            amount: transaction.transfer_amount.unwrap_or_default(),
            content: content.clone(),
            bank_code: transaction.gateway.clone(),
            status: PaymentLogStatus::Processing.to_string(),
            reason: None,
            booking_id: None,
            booking_code: None,
            raw_payload: raw,
            updated_at: Utc::now(),
        };

        match self.reconciler.open_log(entry).await {
            Ok(None) => {}
            Ok(Some(outcome)) => return outcome,
            Err(_) => {
                return TransactionOutcome::new(transaction_id, PaymentLogStatus::Error)
                    .with_reason(REASON_LOG_WRITE_FAILED);
            }
        }

        match transaction.transfer_type() {
            Some(TransferType::In) => {}
            Some(TransferType::Out) => {
                return self
                    .reconciler
                    .finish(
                        TransactionOutcome::new(transaction_id, PaymentLogStatus::Skipped)
                            .with_reason(REASON_OUT_TRANSACTION),
                    )
                    .await;
            }
            None => {
                return self
                    .reconciler
                    .finish(
                        TransactionOutcome::new(transaction_id, PaymentLogStatus::Skipped)
                            .with_reason(REASON_UNSUPPORTED_TRANSFER_TYPE),
                    )
                    .await;
            }
        }

        let Some(received_amount) = transaction.transfer_amount else {
            return self
                .reconciler
                .finish(
                    TransactionOutcome::new(transaction_id, PaymentLogStatus::Error)
                        .with_reason(REASON_INVALID_AMOUNT),
                )
                .await;
        };

        if content.is_empty() {
            return self
                .reconciler
                .finish(
                    TransactionOutcome::new(transaction_id, PaymentLogStatus::Error)
                        .with_reason(REASON_MISSING_CONTENT),
                )
                .await;
        }

        let Some(booking_code) = self.matcher.extract(&content) else {
            return self
                .reconciler
                .finish(
                    TransactionOutcome::new(transaction_id, PaymentLogStatus::Error)
                        .with_reason(REASON_NO_BOOKING_CODE),
                )
                .await;
        };

        self.reconciler
            .reconcile(ReconcileRequest {
                transaction_id,
                booking_code,
                received_amount,
                channel: PaymentChannel::Pay2s,
            })
            .await
    }
}
