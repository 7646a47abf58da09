use crate::domain::{
    repositories::booking_notifier::BookingNotifier,
    value_objects::notifications::BookingConfirmationEmail,
};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

const QUEUE_CAPACITY: usize = 256;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &BookingConfirmationEmail) -> Result<()>;
    fn provider_name(&self) -> &'static str;
}

/// Queues confirmation emails and delivers them from a background task.
///
/// Delivery failures are logged and dropped; a confirmed payment never waits on email.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<BookingConfirmationEmail>,
}

impl NotificationDispatcher {
    /// Must be called inside a tokio runtime.
    pub fn new(providers: Vec<Arc<dyn EmailProvider>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<BookingConfirmationEmail>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(email) = rx.recv().await {
                for provider in &providers {
                    match provider.send(&email).await {
                        Ok(()) => info!(
                            provider = provider.provider_name(),
                            booking_id = %email.booking_id,
                            booking_code = %email.booking_code,
                            "notifications: confirmation email sent"
                        ),
                        Err(error) => warn!(
                            provider = provider.provider_name(),
                            booking_id = %email.booking_id,
                            booking_code = %email.booking_code,
                            error = %error,
                            "notifications: confirmation email failed"
                        ),
                    }
                }
            }
        });

        Self { tx }
    }
}

impl BookingNotifier for NotificationDispatcher {
    fn notify_booking_confirmed(&self, email: BookingConfirmationEmail) {
        match self.tx.try_send(email) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(email)) => {
                warn!(
                    booking_id = %email.booking_id,
                    "notifications: queue full; dropping confirmation email"
                );
            }
            Err(mpsc::error::TrySendError::Closed(email)) => {
                warn!(
                    booking_id = %email.booking_id,
                    "notifications: queue closed; dropping confirmation email"
                );
            }
        }
    }
}
