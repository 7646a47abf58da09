use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result, bail};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SECURE_HASH_PARAM: &str = "vpc_SecureHash";
pub const SECURE_HASH_TYPE_PARAM: &str = "vpc_SecureHashType";
pub const MERCHANT_PARAM: &str = "vpc_Merchant";
pub const APPROVED_RESPONSE_CODE: &str = "0";

/// Plain-text bodies OnePay expects back from the IPN endpoint.
pub const IPN_ACK_SUCCESS: &str = "responsecode=1&desc=confirm-success";
pub const IPN_ACK_FAIL: &str = "responsecode=0&desc=confirm-fail";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OnePayError {
    #[error("missing secure hash")]
    MissingSecureHash,
    #[error("invalid secure hash")]
    InvalidSignature,
    #[error("merchant does not match configured merchant id")]
    MerchantMismatch,
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}

/// Gateway response fields the reconciler needs, read after the hash checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePayResponse {
    pub merchant_txn_ref: String,
    pub order_info: Option<String>,
    pub amount_minor: i64,
    pub response_code: String,
    pub transaction_no: Option<String>,
}

impl OnePayResponse {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, OnePayError> {
        let merchant_txn_ref = required(params, "vpc_MerchTxnRef")?;
        let response_code = required(params, "vpc_TxnResponseCode")?;
        let raw_amount = required(params, "vpc_Amount")?;
        let amount_minor = raw_amount
            .parse::<i64>()
            .ok()
            .filter(|amount| *amount >= 0)
            .ok_or(OnePayError::InvalidAmount(raw_amount))?;

        Ok(Self {
            merchant_txn_ref,
            order_info: optional(params, "vpc_OrderInfo"),
            amount_minor,
            response_code,
            transaction_no: optional(params, "vpc_TransactionNo"),
        })
    }

    pub fn is_approved(&self) -> bool {
        self.response_code == APPROVED_RESPONSE_CODE
    }

    /// Booking code sent as order info, falling back to the merchant reference.
    pub fn booking_code(&self) -> &str {
        self.order_info
            .as_deref()
            .unwrap_or(self.merchant_txn_ref.as_str())
    }

    /// `vpc_Amount` carries two implied decimals; VND has none.
    pub fn received_amount(&self) -> i64 {
        self.amount_minor / 100
    }

    /// Shared by the browser return and the IPN so both land on one log row.
    pub fn log_transaction_id(&self) -> String {
        format!("ONEPAY-{}", self.merchant_txn_ref)
    }
}

pub struct OnePaySigner {
    merchant_id: String,
    mac: HmacSha256,
}

impl OnePaySigner {
    pub fn new(merchant_id: impl Into<String>, hash_key_hex: &str) -> Result<Self> {
        let hash_key = hex::decode(hash_key_hex.trim()).context("OnePay hash key must be hex")?;
        if hash_key.is_empty() {
            bail!("OnePay hash key is empty");
        }
        let mac = HmacSha256::new_from_slice(&hash_key)
            .map_err(|err| anyhow::anyhow!("invalid OnePay hash key: {err}"))?;

        Ok(Self {
            merchant_id: merchant_id.into(),
            mac,
        })
    }

    /// `vpc_`/`user_` params with values, minus the hash fields, sorted and joined as `k=v&k=v`.
    pub fn signing_string(params: &HashMap<String, String>) -> String {
        let signed = params
            .iter()
            .filter(|(key, value)| {
                (key.starts_with("vpc_") || key.starts_with("user_"))
                    && key.as_str() != SECURE_HASH_PARAM
                    && key.as_str() != SECURE_HASH_TYPE_PARAM
                    && !value.is_empty()
            })
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect::<BTreeMap<_, _>>();

        signed
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn sign(&self, params: &HashMap<String, String>) -> String {
        let mut mac = self.mac.clone();
        mac.update(Self::signing_string(params).as_bytes());
        hex::encode_upper(mac.finalize().into_bytes())
    }

    pub fn verify(&self, params: &HashMap<String, String>) -> Result<OnePayResponse, OnePayError> {
        let provided = params
            .get(SECURE_HASH_PARAM)
            .map(|hash| hash.trim())
            .filter(|hash| !hash.is_empty())
            .ok_or(OnePayError::MissingSecureHash)?;
        let provided = hex::decode(provided).map_err(|_| OnePayError::InvalidSignature)?;

        let mut mac = self.mac.clone();
        mac.update(Self::signing_string(params).as_bytes());
        mac.verify_slice(&provided)
            .map_err(|_| OnePayError::InvalidSignature)?;

        if let Some(merchant) = params.get(MERCHANT_PARAM) {
            if merchant != &self.merchant_id {
                return Err(OnePayError::MerchantMismatch);
            }
        }

        OnePayResponse::from_params(params)
    }
}

fn required(params: &HashMap<String, String>, key: &'static str) -> Result<String, OnePayError> {
    optional(params, key).ok_or(OnePayError::MissingField(key))
}

fn optional(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
