use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::payment_logs::{
    PaymentLogEntity, UpdatePaymentLogEntity, UpsertPaymentLogEntity,
};

#[automock]
#[async_trait]
pub trait PaymentLogRepository {
    async fn find_by_transaction_id(&self, transaction_id: &str)
    -> Result<Option<PaymentLogEntity>>;

    /// Inserts the log row, or resets the existing row for the same transaction id.
    ///
    /// Returns `false` when the existing row is already `success`; it is left untouched.
    async fn upsert(&self, entry: UpsertPaymentLogEntity) -> Result<bool>;

    async fn update_by_transaction_id(
        &self,
        transaction_id: &str,
        changes: UpdatePaymentLogEntity,
    ) -> Result<()>;
}
