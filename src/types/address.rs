use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RegistryKey;
use crate::error::{RegistryError, Result};

/// A 20-byte account address, the key type of oracle and vote lists.
///
/// The all-zero address is the NULL sentinel.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Length of an address in bytes.
    pub const LEN: usize = 20;

    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Builds an address whose trailing eight bytes hold `value` big-endian.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl RegistryKey for Address {
    const NULL: Self = Address::ZERO;
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| RegistryError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| RegistryError::InvalidAddress(s.to_string()))?;
        Ok(Address(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}
