pub mod onepay;
pub mod pay2s_webhook;
