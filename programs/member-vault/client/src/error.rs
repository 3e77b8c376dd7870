use thiserror::Error;

/// Result alias used across the crate.
pub type VaultResult<T> = Result<T, VaultClientError>;

/// Failure kinds surfaced by the vault client.
///
/// Variants only classify; rendering for users is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultClientError {
    #[error("invalid address text: {0}")]
    InvalidAddressText(String),
    #[error("read of {needed} bytes at offset {offset} exceeds buffer length {len}")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("record is {len} bytes, shorter than the {min} byte header")]
    MalformedRecord { len: usize, min: usize },
    #[error("unexpected record kind: expected discriminator {expected:02x?}, found {found:02x?}")]
    UnexpectedRecordKind { expected: [u8; 8], found: [u8; 8] },
    #[error("no bump in 0..=255 produced an off-curve address")]
    DerivationExhausted,
    #[error("invalid seeds: {0}")]
    InvalidSeeds(&'static str),
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("signing error: {0}")]
    Signing(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("transaction references {0} accounts, more than a message can index")]
    TooManyAccounts(usize),
    #[error("length {0} does not fit in a compact-u16 prefix")]
    LengthOverflow(usize),
    #[error("sequence items must be at least one byte wide")]
    ZeroItemSize,
}

impl From<serde_json::Error> for VaultClientError {
    fn from(err: serde_json::Error) -> Self {
        VaultClientError::Config(err.to_string())
    }
}
