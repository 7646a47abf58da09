use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::payment_methods::PaymentMethod;

/// Where a payment notification came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    Pay2s,
    #[serde(rename = "onepay")]
    OnePay,
}

impl PaymentChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentChannel::Pay2s => "pay2s",
            PaymentChannel::OnePay => "onepay",
        }
    }

    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            PaymentChannel::Pay2s => PaymentMethod::BankTransfer,
            PaymentChannel::OnePay => PaymentMethod::OnePay,
        }
    }
}

impl Display for PaymentChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
