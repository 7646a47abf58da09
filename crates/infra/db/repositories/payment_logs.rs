use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    RunQueryDsl, insert_into, pg::Pg, prelude::*, query_builder::QueryFragment,
    query_dsl::methods::ExecuteDsl, update,
};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::payment_logs},
};
use domain::{
    entities::payment_logs::{PaymentLogEntity, UpdatePaymentLogEntity, UpsertPaymentLogEntity},
    repositories::payment_logs::PaymentLogRepository,
    value_objects::enums::payment_log_statuses::PaymentLogStatus,
};

pub struct PaymentLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentLogRepository for PaymentLogPostgres {
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentLogEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = payment_logs::table
            .filter(payment_logs::transaction_id.eq(transaction_id))
            .select(PaymentLogEntity::as_select())
            .first::<PaymentLogEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn upsert(&self, entry: UpsertPaymentLogEntity) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = upsert_statement(&entry).execute(&mut conn)?;

        Ok(affected > 0)
    }

    async fn update_by_transaction_id(
        &self,
        transaction_id: &str,
        changes: UpdatePaymentLogEntity,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(payment_logs::table)
            .filter(payment_logs::transaction_id.eq(transaction_id))
            .set(&changes)
            .execute(&mut conn)?;

        if updated == 0 {
            anyhow::bail!("payment log not found for transaction {}", transaction_id);
        }

        Ok(())
    }
}

/// A row already in `success` fails the conflict predicate and is left as is.
fn upsert_statement(
    entry: &UpsertPaymentLogEntity,
) -> impl RunQueryDsl<PgConnection> + ExecuteDsl<PgConnection> + QueryFragment<Pg> + '_ {
    use diesel::query_dsl::methods::FilterDsl;

    insert_into(payment_logs::table)
        .values(entry)
        .on_conflict(payment_logs::transaction_id)
        .do_update()
        .set(entry)
        .filter(payment_logs::status.ne(PaymentLogStatus::Success.as_str()))
}
