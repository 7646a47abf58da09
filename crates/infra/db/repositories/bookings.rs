use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    RunQueryDsl, insert_into, pg::Pg, prelude::*, query_builder::QueryFragment,
    query_dsl::methods::ExecuteDsl, update,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{bookings, customers, payments, rooms},
    },
};
use domain::{
    entities::{bookings::BookingEntity, payments::InsertPaymentEntity},
    repositories::bookings::BookingRepository,
    value_objects::{
        bookings::{BookingConfirmationDetails, ConfirmOutcome, ConfirmPaymentModel},
        enums::{booking_statuses::BookingStatus, payment_statuses::PaymentStatus},
    },
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

type ConfirmationRow = (
    BookingEntity,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
);

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn find_active_by_code(&self, booking_code: &str) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut results = bookings::table
            .filter(bookings::booking_code.eq(booking_code))
            .filter(bookings::deleted_at.is_null())
            .select(BookingEntity::as_select())
            .limit(2)
            .load::<BookingEntity>(&mut conn)?;

        if results.len() > 1 {
            warn!(
                booking_code,
                "bookings: booking code matches more than one active booking"
            );
            return Ok(None);
        }

        Ok(results.pop())
    }

    async fn find_confirmation_details(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<BookingConfirmationDetails>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = bookings::table
            .inner_join(customers::table)
            .inner_join(rooms::table)
            .filter(bookings::id.eq(booking_id))
            .select((
                BookingEntity::as_select(),
                customers::full_name,
                customers::email,
                customers::phone,
                rooms::name,
                rooms::room_type,
            ))
            .first::<ConfirmationRow>(&mut conn)
            .optional()?;

        Ok(row.map(
            |(booking, customer_name, customer_email, customer_phone, room_name, room_type)| {
                BookingConfirmationDetails {
                    booking,
                    customer_name,
                    customer_email,
                    customer_phone,
                    room_name,
                    room_type,
                }
            },
        ))
    }

    async fn confirm_payment(&self, model: ConfirmPaymentModel) -> Result<ConfirmOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<ConfirmOutcome, diesel::result::Error, _>(|tx| {
            // The status filter is the lock: a concurrent delivery matches zero rows.
            let confirmed =
                confirm_booking_statement(model.booking_id, model.paid_at).execute(tx)?;
            if confirmed == 0 {
                return Ok(ConfirmOutcome::AlreadyHandled);
            }

            let settled = settle_pending_payments_statement(&model).execute(tx)?;
            if settled == 0 {
                insert_into(payments::table)
                    .values(&paid_payment(&model))
                    .execute(tx)?;
            }

            Ok(ConfirmOutcome::Confirmed)
        })?;

        Ok(outcome)
    }

    async fn mark_payment_failed(&self, booking_id: Uuid, transaction_ref: &str) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = fail_pending_payments_statement(booking_id, transaction_ref, Utc::now())
            .execute(&mut conn)?;

        Ok(updated)
    }
}

fn confirm_booking_statement(
    booking_id: Uuid,
    confirmed_at: DateTime<Utc>,
) -> impl RunQueryDsl<PgConnection> + ExecuteDsl<PgConnection> + QueryFragment<Pg> {
    let awaiting = BookingStatus::AWAITING_CONFIRMATION
        .iter()
        .map(|status| status.to_string())
        .collect::<Vec<_>>();

    update(bookings::table)
        .filter(bookings::id.eq(booking_id))
        .filter(bookings::deleted_at.is_null())
        .filter(bookings::status.eq_any(awaiting))
        .set((
            bookings::status.eq(BookingStatus::Confirmed.to_string()),
            bookings::updated_at.eq(confirmed_at),
        ))
}

/// Pending rows keep their invoiced amount; only settlement fields change.
fn settle_pending_payments_statement(
    model: &ConfirmPaymentModel,
) -> impl RunQueryDsl<PgConnection> + ExecuteDsl<PgConnection> + QueryFragment<Pg> + use<> {
    update(payments::table)
        .filter(payments::booking_id.eq(model.booking_id))
        .filter(payments::payment_status.eq(PaymentStatus::Pending.to_string()))
        .set((
            payments::payment_status.eq(PaymentStatus::Paid.to_string()),
            payments::payment_method.eq(model.payment_method.to_string()),
            payments::transaction_ref.eq(Some(model.transaction_ref.clone())),
            payments::paid_at.eq(Some(model.paid_at)),
            payments::updated_at.eq(model.paid_at),
        ))
}

fn fail_pending_payments_statement(
    booking_id: Uuid,
    transaction_ref: &str,
    failed_at: DateTime<Utc>,
) -> impl RunQueryDsl<PgConnection> + ExecuteDsl<PgConnection> + QueryFragment<Pg> + use<> {
    update(payments::table)
        .filter(payments::booking_id.eq(booking_id))
        .filter(payments::payment_status.eq(PaymentStatus::Pending.to_string()))
        .set((
            payments::payment_status.eq(PaymentStatus::Failed.to_string()),
            payments::transaction_ref.eq(Some(transaction_ref.to_string())),
            payments::updated_at.eq(failed_at),
        ))
}

fn paid_payment(model: &ConfirmPaymentModel) -> InsertPaymentEntity {
    InsertPaymentEntity {
        booking_id: model.booking_id,
        amount: model.amount,
        payment_method: model.payment_method.to_string(),
        payment_status: PaymentStatus::Paid.to_string(),
        transaction_ref: Some(model.transaction_ref.clone()),
        paid_at: Some(model.paid_at),
    }
}
