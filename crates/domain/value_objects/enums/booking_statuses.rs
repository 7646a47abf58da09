use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    AwaitingPayment,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Completed,
    Cancelled,
    NoShow,
    Refunded,
}

impl BookingStatus {
    /// Statuses a payment confirmation is allowed to move to `Confirmed`.
    pub const AWAITING_CONFIRMATION: [BookingStatus; 2] =
        [BookingStatus::Pending, BookingStatus::AwaitingPayment];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::AwaitingPayment => "awaiting_payment",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
            BookingStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "awaiting_payment" => Some(BookingStatus::AwaitingPayment),
            "confirmed" => Some(BookingStatus::Confirmed),
            "checked_in" => Some(BookingStatus::CheckedIn),
            "checked_out" => Some(BookingStatus::CheckedOut),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "no_show" => Some(BookingStatus::NoShow),
            "refunded" => Some(BookingStatus::Refunded),
            _ => None,
        }
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        Self::AWAITING_CONFIRMATION.contains(self)
    }

    pub fn is_confirmed_or_later(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed
                | BookingStatus::CheckedIn
                | BookingStatus::CheckedOut
                | BookingStatus::Completed
        )
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_database_value() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::AwaitingPayment,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
            BookingStatus::Refunded,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::from_str("archived"), None);
    }

    #[test]
    fn only_pending_states_can_be_confirmed() {
        assert!(BookingStatus::Pending.is_awaiting_confirmation());
        assert!(BookingStatus::AwaitingPayment.is_awaiting_confirmation());
        assert!(!BookingStatus::Confirmed.is_awaiting_confirmation());
        assert!(!BookingStatus::Cancelled.is_awaiting_confirmation());

        assert!(BookingStatus::CheckedIn.is_confirmed_or_later());
        assert!(!BookingStatus::NoShow.is_confirmed_or_later());
    }
}
