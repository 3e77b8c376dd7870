use core::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{VaultClientError, VaultResult};
use crate::VAULT_PROGRAM_ID;

pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// How settled a block or transaction must be before it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        })
    }
}

/// Settings handed to transport adapters and the vault client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub program_id: Address,
    pub cluster_url: String,
    /// Level `send` waits for after submission.
    pub commitment: Commitment,
    /// Level the recent blockhash is fetched at.
    pub blockhash_commitment: Commitment,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            program_id: VAULT_PROGRAM_ID,
            cluster_url: DEVNET_URL.to_string(),
            commitment: Commitment::Confirmed,
            blockhash_commitment: Commitment::Finalized,
        }
    }
}

impl ClientConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(text: &str) -> VaultResult<Self> {
        let config: ClientConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> VaultResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| VaultClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> VaultResult<()> {
        if !(self.cluster_url.starts_with("http://") || self.cluster_url.starts_with("https://")) {
            return Err(VaultClientError::Config(format!(
                "cluster_url {:?} is not an http(s) url",
                self.cluster_url
            )));
        }
        Ok(())
    }
}
