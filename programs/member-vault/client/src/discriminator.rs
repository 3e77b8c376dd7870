use core::fmt;

use sha2::{Digest, Sha256};

/// Namespace for instruction tags, `global:<snake_case_name>`.
pub const INSTRUCTION_NAMESPACE: &str = "global";

/// Namespace for account tags, `account:<TypeName>`.
pub const ACCOUNT_NAMESPACE: &str = "account";

/// 8-byte tag prefixed to instruction data and account data so the program
/// can tell kinds apart.
///
/// Derived as the first 8 bytes of `sha256("<namespace>:<name>")`. The
/// program performs the same computation, so namespace and name spelling
/// are part of the wire contract.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Discriminator([u8; 8]);

impl Discriminator {
    pub const LEN: usize = 8;

    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Discriminator(bytes)
    }

    pub const fn to_bytes(&self) -> [u8; 8] {
        self.0
    }

    /// Tag for an instruction handler, e.g. `"add_member"`.
    pub fn instruction(name: &str) -> Self {
        derive_discriminator(INSTRUCTION_NAMESPACE, name)
    }

    /// Tag for an account type, e.g. `"Vault"`.
    pub fn account(name: &str) -> Self {
        derive_discriminator(ACCOUNT_NAMESPACE, name)
    }
}

impl AsRef<[u8]> for Discriminator {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discriminator({:02x?})", self.0)
    }
}

pub fn derive_discriminator(namespace: &str, name: &str) -> Discriminator {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();

    let mut tag = [0u8; 8];
    tag.copy_from_slice(&hash[..8]);
    Discriminator(tag)
}
