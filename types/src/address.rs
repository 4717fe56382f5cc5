//! Opaque 20-byte identity used for signers, stakers, proposers, and the burn sink.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An account identity, rendered as `0x`-prefixed lowercase hex.
///
/// The all-zero address is the null identity and is never a valid signer or staker.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    /// The null identity.
    pub const ZERO: Self = Self([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// An address whose bytes are all `byte`. Handy for fixtures and well-known sinks.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// An address carrying `n` in its low eight bytes (big-endian).
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Failure to parse an [`Address`] from text.
#[derive(Debug, thiserror::Error)]
pub enum AddressParseError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must be {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressParseError::MissingPrefix)?;
        let raw = hex::decode(body)?;
        let bytes: [u8; 20] = raw
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::WrongLength {
                expected: Self::LEN,
                got: raw.len(),
            })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}
