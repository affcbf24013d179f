//! Identifier types used across the registry
//!
//! Fixed-width byte identifiers render as lowercase `0x`-prefixed hex, the
//! same form the indexer uses for entity ids. They serialize as hex strings so
//! that config files and stored records stay human readable.

use crate::errors::HpvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn parse_fixed<const N: usize>(kind: &str, s: &str) -> Result<[u8; N], HpvError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(trimmed)
        .map_err(|e| HpvError::serialization(format!("invalid {kind} hex '{s}': {e}")))?;
    bytes.try_into().map_err(|raw: Vec<u8>| {
        HpvError::serialization(format!(
            "invalid {kind} length: expected {N} bytes, got {}",
            raw.len()
        ))
    })
}

macro_rules! fixed_bytes_id {
    ($(#[$meta:meta])* $name:ident, $len:expr, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Byte width of this identifier
            pub const LEN: usize = $len;

            /// Create from raw bytes
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Create an identifier with every byte set to `byte`
            pub const fn repeat(byte: u8) -> Self {
                Self([byte; $len])
            }

            /// Raw bytes
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase `0x`-prefixed hex form
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = HpvError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed::<$len>($kind, s).map(Self)
            }
        }

        impl TryFrom<String> for $name {
            type Error = HpvError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_hex()
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }
    };
}

fixed_bytes_id!(
    /// Account identifier (20 bytes).
    ///
    /// Clinic addresses are derived from their ed25519 verifying key; see
    /// `crypto::address_from_verifying_key`.
    Address,
    20,
    "address"
);

fixed_bytes_id!(
    /// Opaque identifier of a physical vaccination chip (32-byte hash)
    ChipId,
    32,
    "chip id"
);

fixed_bytes_id!(
    /// Forum post identifier (32-byte hash)
    PostId,
    32,
    "post id"
);

impl ChipId {
    /// Derive a chip id by hashing a tag read from the chip
    pub fn from_tag(tag: &[u8]) -> Self {
        Self(crate::crypto::hash(tag))
    }
}

impl PostId {
    /// Derive a post id by hashing an application-level label
    pub fn from_label(label: &str) -> Self {
        Self(crate::crypto::hash(label.as_bytes()))
    }
}

/// Guardian credential token identifier. Issued from 1 upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u64);

impl TokenId {
    /// First token id ever issued
    pub const FIRST: TokenId = TokenId(1);

    /// Inner value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount of native currency in its smallest unit
pub type Amount = u128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::repeat(0xab);
        let text = addr.to_string();
        assert_eq!(text, format!("0x{}", "ab".repeat(20)));
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_without_prefix() {
        let chip: ChipId = "aa".repeat(32).parse().unwrap();
        assert_eq!(chip, ChipId::repeat(0xaa));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert!(matches!(err, HpvError::Serialization { .. }));
    }

    #[test]
    fn test_chip_id_from_tag_is_deterministic() {
        assert_eq!(ChipId::from_tag(b"test-chip-1"), ChipId::from_tag(b"test-chip-1"));
        assert_ne!(ChipId::from_tag(b"test-chip-1"), ChipId::from_tag(b"test-chip-2"));
    }
}
