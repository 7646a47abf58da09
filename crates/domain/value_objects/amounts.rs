/// Received vs. expected amount, both in VND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountCheck {
    Underpaid { shortfall: i64 },
    Exact,
    Overpaid { excess: i64 },
}

pub fn reconcile_amount(received: i64, expected: i64) -> AmountCheck {
    if received < expected {
        AmountCheck::Underpaid {
            shortfall: expected.saturating_sub(received),
        }
    } else if received > expected {
        AmountCheck::Overpaid {
            excess: received.saturating_sub(expected),
        }
    } else {
        AmountCheck::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_shortfall_and_excess() {
        assert_eq!(
            reconcile_amount(1_000_000, 1_500_000),
            AmountCheck::Underpaid { shortfall: 500_000 }
        );
        assert_eq!(reconcile_amount(1_500_000, 1_500_000), AmountCheck::Exact);
        assert_eq!(
            reconcile_amount(1_600_000, 1_500_000),
            AmountCheck::Overpaid { excess: 100_000 }
        );
    }
}
