use anyhow::Result;
use chrono::Utc;
use crates::domain::{
    entities::{bookings::BookingEntity, payment_logs::UpsertPaymentLogEntity},
    repositories::{
        booking_notifier::BookingNotifier, bookings::BookingRepository,
        payment_logs::PaymentLogRepository,
    },
    value_objects::{
        amounts::{AmountCheck, reconcile_amount},
        bookings::{ConfirmOutcome, ConfirmPaymentModel},
        enums::{payment_channels::PaymentChannel, payment_log_statuses::PaymentLogStatus},
        notifications::BookingConfirmationEmail,
        transaction_outcomes::{
            REASON_ALREADY_CONFIRMED, REASON_ALREADY_PROCESSED, REASON_BOOKING_LOOKUP_FAILED,
            REASON_BOOKING_NOT_FOUND, REASON_CONFIRMATION_FAILED, TransactionOutcome,
        },
    },
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A payment that has been attributed to a booking code and is ready to be settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileRequest {
    pub transaction_id: String,
    pub booking_code: String,
    pub received_amount: i64,
    pub channel: PaymentChannel,
}

/// Settles payment notifications against bookings: amount check, conditional
/// confirmation, log outcome and confirmation email. Shared by every gateway.
pub struct PaymentReconciler<L, B, N>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    payment_log_repository: Arc<L>,
    booking_repository: Arc<B>,
    notifier: Arc<N>,
}

impl<L, B, N> PaymentReconciler<L, B, N>
where
    L: PaymentLogRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    N: BookingNotifier + 'static,
{
    pub fn new(payment_log_repository: Arc<L>, booking_repository: Arc<B>, notifier: Arc<N>) -> Self {
        Self {
            payment_log_repository,
            booking_repository,
            notifier,
        }
    }

    /// Records first sight of a notification.
    ///
    /// Returns `Some(outcome)` when processing must stop here: the transaction
    /// already reached `success` and must not be replayed.
    pub async fn open_log(&self, entry: UpsertPaymentLogEntity) -> Result<Option<TransactionOutcome>> {
        let transaction_id = entry.transaction_id.clone();

        let existing = self
            .payment_log_repository
            .find_by_transaction_id(&transaction_id)
            .await
            .map_err(|err| {
                error!(
                    %transaction_id,
                    db_error = ?err,
                    "reconciliation: failed to load payment log"
                );
                err
            })?;

        if let Some(existing) = existing {
            if existing.log_status() == Some(PaymentLogStatus::Success) {
                info!(
                    %transaction_id,
                    booking_code = ?existing.booking_code,
                    "reconciliation: transaction already succeeded, skipping replay"
                );
                let mut outcome = TransactionOutcome::new(transaction_id, PaymentLogStatus::Skipped)
                    .with_reason(REASON_ALREADY_PROCESSED);
                outcome.booking_id = existing.booking_id;
                outcome.booking_code = existing.booking_code;
                return Ok(Some(outcome));
            }
            debug!(
                %transaction_id,
                previous_status = %existing.status,
                "reconciliation: reprocessing redelivered transaction"
            );
        }

        let opened = self
            .payment_log_repository
            .upsert(entry)
            .await
            .map_err(|err| {
                error!(
                    %transaction_id,
                    db_error = ?err,
                    "reconciliation: failed to upsert payment log"
                );
                err
            })?;

        if !opened {
            info!(
                %transaction_id,
                "reconciliation: concurrent delivery already succeeded, skipping replay"
            );
            return Ok(Some(
                TransactionOutcome::new(transaction_id, PaymentLogStatus::Skipped)
                    .with_reason(REASON_ALREADY_PROCESSED),
            ));
        }

        Ok(None)
    }

    /// Writes the outcome onto the log row. A failed write is logged, never raised.
    pub async fn finish(&self, outcome: TransactionOutcome) -> TransactionOutcome {
        if let Err(err) = self
            .payment_log_repository
            .update_by_transaction_id(&outcome.transaction_id, outcome.to_update_entity(Utc::now()))
            .await
        {
            error!(
                transaction_id = %outcome.transaction_id,
                status = %outcome.status,
                db_error = ?err,
                "reconciliation: failed to record transaction outcome"
            );
        }

        match outcome.status {
            PaymentLogStatus::Success => info!(
                transaction_id = %outcome.transaction_id,
                booking_code = ?outcome.booking_code,
                "reconciliation: transaction settled"
            ),
            PaymentLogStatus::Error | PaymentLogStatus::Underpaid => warn!(
                transaction_id = %outcome.transaction_id,
                status = %outcome.status,
                reason = ?outcome.reason,
                booking_code = ?outcome.booking_code,
                "reconciliation: transaction not settled"
            ),
            PaymentLogStatus::Skipped | PaymentLogStatus::Processing => info!(
                transaction_id = %outcome.transaction_id,
                status = %outcome.status,
                reason = ?outcome.reason,
                "reconciliation: transaction skipped"
            ),
        }

        outcome
    }

    pub async fn reconcile(&self, request: ReconcileRequest) -> TransactionOutcome {
        let booking = match self.find_booking(&request).await {
            Ok(booking) => booking,
            Err(outcome) => return self.finish(outcome).await,
        };

        let outcome = self.settle(&request, &booking).await;
        let confirmed = outcome.status == PaymentLogStatus::Success;
        let outcome = self.finish(outcome).await;

        if confirmed {
            self.dispatch_confirmation_email(booking.id, request.received_amount, request.channel)
                .await;
        }

        outcome
    }

    /// Records a gateway-declined payment against its booking, when one matches.
    pub async fn decline(&self, request: ReconcileRequest, reason: String) -> TransactionOutcome {
        let booking = match self.find_booking(&request).await {
            Ok(booking) => booking,
            Err(_) => {
                return self
                    .finish(
                        TransactionOutcome::new(request.transaction_id, PaymentLogStatus::Error)
                            .with_reason(reason)
                            .with_booking_code(request.booking_code),
                    )
                    .await;
            }
        };

        match self
            .booking_repository
            .mark_payment_failed(booking.id, &request.transaction_id)
            .await
        {
            Ok(updated) => debug!(
                booking_id = %booking.id,
                updated,
                "reconciliation: pending payments marked failed"
            ),
            Err(err) => error!(
                booking_id = %booking.id,
                db_error = ?err,
                "reconciliation: failed to mark payments failed"
            ),
        }

        self.finish(
            TransactionOutcome::new(request.transaction_id, PaymentLogStatus::Error)
                .with_reason(reason)
                .with_booking(booking.id, booking.booking_code),
        )
        .await
    }

    async fn find_booking(
        &self,
        request: &ReconcileRequest,
    ) -> std::result::Result<BookingEntity, TransactionOutcome> {
        let not_settled = |reason: &str| {
            TransactionOutcome::new(request.transaction_id.clone(), PaymentLogStatus::Error)
                .with_reason(reason)
                .with_booking_code(request.booking_code.clone())
        };

        match self
            .booking_repository
            .find_active_by_code(&request.booking_code)
            .await
        {
            Ok(Some(booking)) => Ok(booking),
            Ok(None) => {
                warn!(
                    transaction_id = %request.transaction_id,
                    booking_code = %request.booking_code,
                    "reconciliation: no active booking matches code"
                );
                Err(not_settled(REASON_BOOKING_NOT_FOUND))
            }
            Err(err) => {
                error!(
                    transaction_id = %request.transaction_id,
                    booking_code = %request.booking_code,
                    db_error = ?err,
                    "reconciliation: failed to look up booking"
                );
                Err(not_settled(REASON_BOOKING_LOOKUP_FAILED))
            }
        }
    }

    async fn settle(&self, request: &ReconcileRequest, booking: &BookingEntity) -> TransactionOutcome {
        let outcome = |status: PaymentLogStatus| {
            TransactionOutcome::new(request.transaction_id.clone(), status)
                .with_booking(booking.id, booking.booking_code.clone())
        };

        match reconcile_amount(request.received_amount, booking.total_amount) {
            AmountCheck::Underpaid { shortfall } => {
                return outcome(PaymentLogStatus::Underpaid).with_reason(format!(
                    "Underpaid: received {}, expected {}, shortfall {}",
                    request.received_amount, booking.total_amount, shortfall
                ));
            }
            AmountCheck::Overpaid { excess } => {
                warn!(
                    transaction_id = %request.transaction_id,
                    booking_id = %booking.id,
                    received = request.received_amount,
                    expected = booking.total_amount,
                    excess,
                    "reconciliation: booking overpaid, accepting"
                );
            }
            AmountCheck::Exact => {}
        }

        let Some(status) = booking.booking_status() else {
            return outcome(PaymentLogStatus::Error)
                .with_reason(format!("Booking has unknown status {}", booking.status));
        };

        if status.is_confirmed_or_later() {
            return outcome(PaymentLogStatus::Skipped).with_reason(REASON_ALREADY_CONFIRMED);
        }
        if !status.is_awaiting_confirmation() {
            return outcome(PaymentLogStatus::Error).with_reason(format!("Booking is {}", status));
        }

        let model = ConfirmPaymentModel {
            booking_id: booking.id,
            amount: request.received_amount,
            payment_method: request.channel.payment_method(),
            transaction_ref: request.transaction_id.clone(),
            paid_at: Utc::now(),
        };

        match self.booking_repository.confirm_payment(model).await {
            Ok(ConfirmOutcome::Confirmed) => outcome(PaymentLogStatus::Success),
            Ok(ConfirmOutcome::AlreadyHandled) => {
                info!(
                    transaction_id = %request.transaction_id,
                    booking_id = %booking.id,
                    "reconciliation: booking confirmed by a concurrent delivery"
                );
                outcome(PaymentLogStatus::Skipped).with_reason(REASON_ALREADY_CONFIRMED)
            }
            Err(err) => {
                error!(
                    transaction_id = %request.transaction_id,
                    booking_id = %booking.id,
                    db_error = ?err,
                    "reconciliation: booking confirmation failed"
                );
                outcome(PaymentLogStatus::Error).with_reason(REASON_CONFIRMATION_FAILED)
            }
        }
    }

    async fn dispatch_confirmation_email(
        &self,
        booking_id: Uuid,
        paid_amount: i64,
        channel: PaymentChannel,
    ) {
        match self
            .booking_repository
            .find_confirmation_details(booking_id)
            .await
        {
            Ok(Some(details)) => {
                self.notifier
                    .notify_booking_confirmed(BookingConfirmationEmail::from_details(
                        details,
                        paid_amount,
                        channel,
                    ));
            }
            Ok(None) => warn!(
                %booking_id,
                "reconciliation: confirmation details missing, email not sent"
            ),
            Err(err) => warn!(
                %booking_id,
                db_error = ?err,
                "reconciliation: failed to load confirmation details, email not sent"
            ),
        }
    }
}
