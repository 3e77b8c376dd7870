use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{VaultClientError, VaultResult};

/// Longest base-58 text a 32-byte value can encode to.
const MAX_BASE58_LEN: usize = 44;

/// A 32-byte account or program identifier.
///
/// Equality is byte equality. The text form is base-58, which is what users
/// paste and what explorers display.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 32]);

impl Address {
    pub const LEN: usize = 32;

    pub const fn new_from_array(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    pub const fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub const fn as_array(&self) -> &[u8; 32] {
        &self.0
    }

    /// Abbreviated text form, `HGtc…2yft`.
    pub fn short(&self) -> String {
        let text = self.to_string();
        if text.len() <= 8 {
            return text;
        }
        format!("{}…{}", &text[..4], &text[text.len() - 4..])
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = VaultClientError;

    fn try_from(bytes: &[u8]) -> VaultResult<Self> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            VaultClientError::InvalidAddressText(format!(
                "expected {} bytes, got {}",
                Self::LEN,
                bytes.len()
            ))
        })?;
        Ok(Address(array))
    }
}

impl FromStr for Address {
    type Err = VaultClientError;

    fn from_str(text: &str) -> VaultResult<Self> {
        if text.is_empty() || text.len() > MAX_BASE58_LEN {
            return Err(VaultClientError::InvalidAddressText(format!(
                "{text:?} has invalid length {}",
                text.len()
            )));
        }
        let decoded = bs58::decode(text)
            .into_vec()
            .map_err(|e| VaultClientError::InvalidAddressText(format!("{text:?}: {e}")))?;
        Address::try_from(decoded.as_slice())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse user-entered address text.
pub fn parse_address(text: &str) -> VaultResult<Address> {
    text.trim().parse()
}

/// Parse a comma separated list of addresses, e.g. the initial member field.
///
/// Blank entries are skipped; the first invalid entry fails the whole list.
pub fn parse_address_list(text: &str) -> VaultResult<Vec<Address>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse)
        .collect()
}
