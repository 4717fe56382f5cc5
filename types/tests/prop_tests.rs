use proptest::prelude::*;

use valset_types::{Address, Timestamp, ValidatorParams};

proptest! {
    /// Display output always parses back to the same address.
    #[test]
    fn address_text_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Address::is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        prop_assert_eq!(Address::new(bytes).is_zero(), bytes == [0u8; 20]);
    }

    /// Address bincode serialization roundtrip.
    #[test]
    fn address_bincode_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let encoded = bincode::serialize(&addr).unwrap();
        let decoded: Address = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, addr);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// The slash never exceeds the stake it is taken from.
    #[test]
    fn slash_amount_bounded_by_stake(stake in 1u128..u64::MAX as u128, bps in 0u32..=10_000) {
        let params = ValidatorParams { stake_amount: stake, slash_bps: bps, ..ValidatorParams::default() };
        prop_assert!(params.slash_amount() <= stake);
    }

    /// Quorum is monotonic in the number of votes.
    #[test]
    fn quorum_monotonic(snapshot in 1u32..1000, votes in 0u32..1000) {
        let params = ValidatorParams::default();
        if params.quorum_reached(votes, snapshot) {
            prop_assert!(params.quorum_reached(votes + 1, snapshot));
        }
    }
}
