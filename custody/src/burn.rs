//! Best-effort burns.

use crate::ValueCustody;
use serde::{Deserialize, Serialize};
use valset_types::{Address, Amount};

/// Sends value to the burn sink and keeps the running total of what was destroyed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnLedger {
    sink: Address,
    total_burned: Amount,
}

impl BurnLedger {
    pub fn new(sink: Address) -> Self {
        Self {
            sink,
            total_burned: 0,
        }
    }

    /// Restore a ledger with a previously persisted total.
    pub fn with_total(sink: Address, total_burned: Amount) -> Self {
        Self { sink, total_burned }
    }

    pub fn sink(&self) -> &Address {
        &self.sink
    }

    pub fn total_burned(&self) -> Amount {
        self.total_burned
    }

    /// Transfer `amount` to the sink.
    ///
    /// A failed transfer is logged and otherwise ignored: the total is only credited
    /// on success, and the caller's operation proceeds either way.
    pub fn burn(&mut self, custody: &mut dyn ValueCustody, amount: Amount) -> bool {
        if amount == 0 {
            return true;
        }
        if custody.transfer(&self.sink, amount) {
            self.total_burned = self.total_burned.saturating_add(amount);
            tracing::debug!(amount, total = self.total_burned, "burned");
            true
        } else {
            tracing::warn!(amount, sink = %self.sink, "burn transfer failed; amount not accounted");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal custody that succeeds or fails every transfer.
    struct FixedCustody {
        succeed: bool,
        sent: Vec<(Address, Amount)>,
    }

    impl ValueCustody for FixedCustody {
        fn deposit(&mut self, _from: &Address, _amount: Amount) {}

        fn transfer(&mut self, to: &Address, amount: Amount) -> bool {
            if self.succeed {
                self.sent.push((*to, amount));
            }
            self.succeed
        }
    }

    #[test]
    fn successful_burn_is_counted() {
        let sink = Address::from_low_u64(0xdead);
        let mut ledger = BurnLedger::new(sink);
        let mut custody = FixedCustody { succeed: true, sent: vec![] };

        assert!(ledger.burn(&mut custody, 500));
        assert!(ledger.burn(&mut custody, 250));
        assert_eq!(ledger.total_burned(), 750);
        assert_eq!(custody.sent, vec![(sink, 500), (sink, 250)]);
    }

    #[test]
    fn failed_burn_is_absorbed_and_not_counted() {
        let mut ledger = BurnLedger::new(Address::from_low_u64(0xdead));
        let mut custody = FixedCustody { succeed: false, sent: vec![] };

        assert!(!ledger.burn(&mut custody, 500));
        assert_eq!(ledger.total_burned(), 0);
    }

    #[test]
    fn zero_burn_skips_transfer() {
        let mut ledger = BurnLedger::new(Address::from_low_u64(0xdead));
        let mut custody = FixedCustody { succeed: false, sent: vec![] };
        assert!(ledger.burn(&mut custody, 0));
        assert_eq!(ledger.total_burned(), 0);
    }
}
