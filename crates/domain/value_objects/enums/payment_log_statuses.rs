use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lifecycle of an inbound payment notification in `payment_logs`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentLogStatus {
    Processing,
    Skipped,
    Error,
    Underpaid,
    Success,
}

impl PaymentLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentLogStatus::Processing => "processing",
            PaymentLogStatus::Skipped => "skipped",
            PaymentLogStatus::Error => "error",
            PaymentLogStatus::Underpaid => "underpaid",
            PaymentLogStatus::Success => "success",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "processing" => Some(PaymentLogStatus::Processing),
            "skipped" => Some(PaymentLogStatus::Skipped),
            "error" => Some(PaymentLogStatus::Error),
            "underpaid" => Some(PaymentLogStatus::Underpaid),
            "success" => Some(PaymentLogStatus::Success),
            _ => None,
        }
    }
}

impl Display for PaymentLogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
