pub mod onepay;
pub mod pay2s_webhook;
pub mod payment_reconciliation;

#[cfg(test)]
pub(crate) mod test_support;
