pub mod onepay;
