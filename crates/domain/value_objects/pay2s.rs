use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use thiserror::Error;

use crate::domain::value_objects::{
    enums::transfer_types::TransferType, transaction_outcomes::TransactionOutcome,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Pay2sPayloadError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),
    #[error("no transactions provided")]
    EmptyBatch,
}

#[derive(Debug, Deserialize)]
struct Pay2sWebhookPayload {
    #[serde(default)]
    transactions: Option<Vec<Value>>,
}

/// Splits a webhook body into raw transaction objects.
///
/// Items are kept as raw JSON so one malformed transaction cannot reject the batch.
pub fn parse_webhook_body(body: &[u8]) -> Result<Vec<Value>, Pay2sPayloadError> {
    let payload: Pay2sWebhookPayload = serde_json::from_slice(body)
        .map_err(|err| Pay2sPayloadError::InvalidJson(err.to_string()))?;

    match payload.transactions {
        Some(transactions) if !transactions.is_empty() => Ok(transactions),
        _ => Err(Pay2sPayloadError::EmptyBatch),
    }
}

/// One Pay2S transaction, read leniently.
///
/// Only `id` is mandatory so every identifiable item can be logged; a field of
/// the wrong shape reads as absent and is judged by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pay2sTransaction {
    #[serde(deserialize_with = "transaction_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gateway: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transfer_type: Option<String>,
    /// `None` when missing, fractional or not a plain integer.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub transfer_amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub checksum: Option<String>,
}

impl Pay2sTransaction {
    pub fn from_value(raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }

    pub fn transfer_type(&self) -> Option<TransferType> {
        self.transfer_type.as_deref().and_then(TransferType::from_str)
    }

    pub fn trimmed_content(&self) -> &str {
        self.content.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// Best-effort id of a transaction that failed to parse, for the result array.
pub fn transaction_id_hint(raw: &Value) -> String {
    match raw.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => "unknown".to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pay2sWebhookResponse {
    pub success: bool,
    pub results: Vec<TransactionOutcome>,
}

fn transaction_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) if !value.trim().is_empty() => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(de::Error::custom(format!("invalid transaction id {other}"))),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(value) => value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|amount| amount.is_finite() && amount.fract() == 0.0)
                .map(|amount| amount as i64)
        }),
        Value::String(value) => value.trim().parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_missing_or_empty_batches() {
        assert_eq!(
            parse_webhook_body(br#"{"transactions": []}"#),
            Err(Pay2sPayloadError::EmptyBatch)
        );
        assert_eq!(parse_webhook_body(b"{}"), Err(Pay2sPayloadError::EmptyBatch));
        assert!(matches!(
            parse_webhook_body(b"not json"),
            Err(Pay2sPayloadError::InvalidJson(_))
        ));
    }

    #[test]
    fn parses_numeric_ids_and_amounts() {
        let raw = json!({
            "id": 99123,
            "gateway": "MBBank",
            "transactionDate": "2024-05-01 10:00:00",
            "transactionNumber": 556677,
            "accountNumber": "0123456789",
            "content": "  YH12345  ",
            "transferType": "IN",
            "transferAmount": "1500000",
            "checksum": "abc"
        });

        let transaction = Pay2sTransaction::from_value(&raw).unwrap();

        assert_eq!(transaction.id, "99123");
        assert_eq!(transaction.transaction_number.as_deref(), Some("556677"));
        assert_eq!(transaction.transfer_amount, Some(1_500_000));
        assert_eq!(transaction.transfer_type(), Some(TransferType::In));
        assert_eq!(transaction.trimmed_content(), "YH12345");
    }

    #[test]
    fn malformed_fields_read_as_absent() {
        for amount in [json!(1500.5), json!("1,500,000"), json!(null), json!({})] {
            let raw = json!({
                "id": "TX-1",
                "transferType": "OUT",
                "content": 12345,
                "gateway": ["MBBank"],
                "transferAmount": amount
            });

            let transaction = Pay2sTransaction::from_value(&raw).unwrap();

            assert_eq!(transaction.transfer_amount, None);
            assert_eq!(transaction.transfer_type(), Some(TransferType::Out));
            assert_eq!(transaction.trimmed_content(), "12345");
            assert_eq!(transaction.gateway, None);
        }

        let missing = json!({ "id": "TX-2", "transferType": "IN" });
        assert_eq!(
            Pay2sTransaction::from_value(&missing).unwrap().transfer_amount,
            None
        );
    }

    #[test]
    fn transaction_without_id_is_invalid() {
        for raw in [json!({ "transferType": "IN" }), json!({ "id": "  " }), json!("TX-1")] {
            assert!(Pay2sTransaction::from_value(&raw).is_err());
            assert_eq!(transaction_id_hint(&raw), "unknown");
        }
        assert_eq!(transaction_id_hint(&json!({ "id": 7 })), "7");
    }
}
