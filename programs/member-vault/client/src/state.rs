use log::debug;

use crate::address::Address;
use crate::codec::{
    concat, decode_address, decode_sequence, decode_u8, encode_address, encode_sequence,
};
use crate::discriminator::Discriminator;
use crate::error::{VaultClientError, VaultResult};

/// Account type name the program tags vault accounts with.
pub const VAULT_ACCOUNT_NAME: &str = "Vault";

/// Decoded vault account.
///
/// Layout in account data:
/// - Bytes 0-7: Discriminator, `sha256("account:Vault")[..8]`
/// - Bytes 8-39: Owner (32 bytes)
/// - Bytes 40-43: Member count (u32 LE)
/// - Next 32 * count bytes: Members, in insertion order
/// - Next byte: Bump of the vault PDA
///
/// Duplicate members are kept as-is; the program does not forbid them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecord {
    pub owner: Address,
    pub members: Vec<Address>,
    pub bump: u8,
}

impl VaultRecord {
    /// Discriminator + owner + member count prefix + bump.
    pub const HEADER_LEN: usize = 8 + 32 + 4 + 1;

    pub fn discriminator() -> Discriminator {
        Discriminator::account(VAULT_ACCOUNT_NAME)
    }

    /// Account space needed to hold `member_count` members.
    pub const fn space(member_count: usize) -> usize {
        Self::HEADER_LEN + 32 * member_count
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.owner == *address
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// Owners and members may withdraw.
    pub fn can_withdraw(&self, address: &Address) -> bool {
        self.is_owner(address) || self.is_member(address)
    }
}

/// Decode a raw vault account snapshot.
///
/// Trailing bytes after the bump are account padding and are ignored.
pub fn decode_vault_record(raw: &[u8]) -> VaultResult<VaultRecord> {
    if raw.len() < Discriminator::LEN {
        return Err(VaultClientError::MalformedRecord {
            len: raw.len(),
            min: Discriminator::LEN,
        });
    }

    let mut found = [0u8; 8];
    found.copy_from_slice(&raw[..Discriminator::LEN]);
    let expected = VaultRecord::discriminator().to_bytes();
    if found != expected {
        return Err(VaultClientError::UnexpectedRecordKind { expected, found });
    }

    let offset = Discriminator::LEN;
    let (owner, offset) = decode_address(raw, offset)?;
    let (members, offset) = decode_sequence(raw, offset, Address::LEN, decode_address)?;
    let (bump, _) = decode_u8(raw, offset)?;

    debug!("decoded vault owned by {owner} with {} members", members.len());
    Ok(VaultRecord {
        owner,
        members,
        bump,
    })
}

/// Build the account bytes the program would store for `record`.
pub fn encode_vault_record(record: &VaultRecord) -> Vec<u8> {
    let discriminator = VaultRecord::discriminator();
    let owner = encode_address(&record.owner);
    let members = encode_sequence(&record.members, encode_address);
    let bump = [record.bump];
    let chunks: [&[u8]; 4] = [discriminator.as_ref(), &owner, &members, &bump];
    concat(&chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(members: usize) -> VaultRecord {
        VaultRecord {
            owner: Address::new_from_array([1; 32]),
            members: (0..members)
                .map(|i| Address::new_from_array([i as u8 + 2; 32]))
                .collect(),
            bump: 253,
        }
    }

    #[test]
    fn empty_vault() {
        let raw = encode_vault_record(&sample(0));
        assert_eq!(raw.len(), 8 + 32 + 4 + 0 + 1);
        let record = decode_vault_record(&raw).unwrap();
        assert!(record.members.is_empty());
        assert_eq!(record.bump, 253);
        assert_eq!(record.owner, Address::new_from_array([1; 32]));
    }

    #[test]
    fn layout_offsets() {
        let raw = encode_vault_record(&sample(2));
        assert_eq!(raw.len(), VaultRecord::space(2));
        assert_eq!(&raw[..8], &[211, 8, 232, 43, 2, 152, 117, 119]);
        assert_eq!(&raw[40..44], &[2, 0, 0, 0]);
        assert_eq!(raw[44], 2);
        assert_eq!(raw[76], 3);
        assert_eq!(raw[108], 253);
    }

    #[test]
    fn keeps_member_order_and_duplicates() {
        let mut record = sample(2);
        record.members.push(record.members[0]);
        let decoded = decode_vault_record(&encode_vault_record(&record)).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn ignores_trailing_padding() {
        let record = sample(3);
        let mut raw = encode_vault_record(&record);
        raw.resize(VaultRecord::space(10), 0);
        assert_eq!(decode_vault_record(&raw).unwrap(), record);
    }

    #[test]
    fn short_buffer_is_malformed() {
        let err = decode_vault_record(&[211, 8, 232]).unwrap_err();
        assert_eq!(err, VaultClientError::MalformedRecord { len: 3, min: 8 });
    }

    #[test]
    fn other_record_kind_rejected() {
        let mut raw = encode_vault_record(&sample(1));
        raw[..8].copy_from_slice(&Discriminator::account("Config").to_bytes());
        assert!(matches!(
            decode_vault_record(&raw),
            Err(VaultClientError::UnexpectedRecordKind { .. })
        ));
    }

    #[test]
    fn inflated_member_count_is_out_of_bounds() {
        let mut raw = encode_vault_record(&sample(1));
        raw[40..44].copy_from_slice(&5u32.to_le_bytes());
        assert!(matches!(
            decode_vault_record(&raw),
            Err(VaultClientError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn missing_bump_is_out_of_bounds() {
        let mut raw = encode_vault_record(&sample(1));
        raw.pop();
        assert!(matches!(
            decode_vault_record(&raw),
            Err(VaultClientError::OutOfBounds { needed: 1, .. })
        ));
    }

    #[test]
    fn permissions() {
        let record = sample(1);
        let owner = Address::new_from_array([1; 32]);
        let member = Address::new_from_array([2; 32]);
        let stranger = Address::new_from_array([9; 32]);

        assert!(record.is_owner(&owner) && !record.is_member(&owner));
        assert!(record.is_member(&member) && !record.is_owner(&member));
        assert!(record.can_withdraw(&owner));
        assert!(record.can_withdraw(&member));
        assert!(!record.can_withdraw(&stranger));
    }
}
