//! Serde helpers for raw amounts.
//!
//! Amounts are `u128`, which TOML cannot represent. Config files therefore carry
//! them as decimal strings. Plain integers are still accepted on input so small
//! test values can be written naturally.

use crate::Amount;

/// `#[serde(with = "valset_types::amount::decimal")]` for an [`Amount`] field.
pub mod decimal {
    use super::Amount;
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a non-negative integer or a decimal string")
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Amount, E> {
                s.trim()
                    .replace('_', "")
                    .parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(s), &self))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(v as Amount)
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                Amount::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }
        }

        deserializer.deserialize_str(AmountVisitor)
    }
}
