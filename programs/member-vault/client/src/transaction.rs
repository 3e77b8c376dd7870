//! Legacy transaction message compilation.
//!
//! Message layout:
//! - Header: required signatures, readonly signed, readonly unsigned (u8 each)
//! - Account keys: compact-u16 count, then 32 bytes each
//! - Recent blockhash: 32 bytes
//! - Instructions: compact-u16 count, then per instruction the program id
//!   index (u8), compact-u16 account index list, compact-u16 data
//!
//! Keys are ordered fee payer first, then writable signers, readonly
//! signers, writable non-signers and readonly non-signers. Within a group
//! keys sort by their bytes.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use log::debug;

use crate::address::Address;
use crate::error::{VaultClientError, VaultResult};
use crate::instructions::Message;

/// Account indices are a single byte.
pub const MAX_ACCOUNT_KEYS: usize = 256;

fn decode_base58<const N: usize>(text: &str) -> VaultResult<[u8; N]> {
    let decoded = bs58::decode(text)
        .into_vec()
        .map_err(|e| VaultClientError::InvalidAddressText(format!("{text:?}: {e}")))?;
    decoded.as_slice().try_into().map_err(|_| {
        VaultClientError::InvalidAddressText(format!("expected {N} bytes, got {}", decoded.len()))
    })
}

/// Recent blockhash a transaction is anchored to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Blockhash(pub [u8; 32]);

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({self})")
    }
}

impl FromStr for Blockhash {
    type Err = VaultClientError;

    fn from_str(text: &str) -> VaultResult<Self> {
        decode_base58(text).map(Blockhash)
    }
}

/// Ed25519 signature, also used as the transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

impl Default for Signature {
    fn default() -> Self {
        Signature([0; 64])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl FromStr for Signature {
    type Err = VaultClientError;

    fn from_str(text: &str) -> VaultResult<Self> {
        decode_base58(text).map(Signature)
    }
}

pub fn encode_compact_u16(len: usize, out: &mut Vec<u8>) -> VaultResult<()> {
    let mut rem = u16::try_from(len).map_err(|_| VaultClientError::LengthOverflow(len))?;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return Ok(());
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Decode a compact-u16 at `offset`, rejecting overlong and overflowing forms.
pub fn decode_compact_u16(buf: &[u8], offset: usize) -> VaultResult<(u16, usize)> {
    let mut value: u32 = 0;
    for i in 0..3 {
        let byte = *buf.get(offset + i).ok_or(VaultClientError::OutOfBounds {
            offset: offset + i,
            needed: 1,
            len: buf.len(),
        })?;
        // A zero continuation byte means the value had a shorter encoding.
        if i > 0 && byte == 0 {
            return Err(VaultClientError::LengthOverflow(value as usize));
        }
        value |= u32::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            let value =
                u16::try_from(value).map_err(|_| VaultClientError::LengthOverflow(value as usize))?;
            return Ok((value, offset + i + 1));
        }
    }
    Err(VaultClientError::LengthOverflow(value as usize))
}

#[derive(Debug, Clone, Copy, Default)]
struct KeyFlags {
    is_signer: bool,
    is_writable: bool,
}

/// Instruction with accounts replaced by indices into the key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled legacy transaction message.
///
/// Built only by [`Transaction::compile`], which keeps the header counts
/// consistent with `account_keys`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    num_required_signatures: u8,
    num_readonly_signed: u8,
    num_readonly_unsigned: u8,
    account_keys: Vec<Address>,
    recent_blockhash: Blockhash,
    instructions: Vec<CompiledInstruction>,
}

impl Transaction {
    pub fn compile(
        fee_payer: &Address,
        messages: &[Message],
        recent_blockhash: Blockhash,
    ) -> VaultResult<Self> {
        let mut flags: BTreeMap<Address, KeyFlags> = BTreeMap::new();
        for message in messages {
            flags.entry(*message.program_id()).or_default();
            for meta in message.accounts() {
                let entry = flags.entry(meta.address).or_default();
                entry.is_signer |= meta.is_signer;
                entry.is_writable |= meta.is_writable;
            }
        }
        flags.remove(fee_payer);

        let group = |signer: bool, writable: bool| -> Vec<Address> {
            flags
                .iter()
                .filter(|(_, f)| f.is_signer == signer && f.is_writable == writable)
                .map(|(address, _)| *address)
                .collect()
        };
        let writable_signers = group(true, true);
        let readonly_signers = group(true, false);
        let writable_unsigned = group(false, true);
        let readonly_unsigned = group(false, false);

        let mut account_keys = Vec::with_capacity(flags.len() + 1);
        account_keys.push(*fee_payer);
        account_keys.extend(writable_signers.iter());
        account_keys.extend(readonly_signers.iter());
        account_keys.extend(writable_unsigned.iter());
        account_keys.extend(readonly_unsigned.iter());

        if account_keys.len() > MAX_ACCOUNT_KEYS {
            return Err(VaultClientError::TooManyAccounts(account_keys.len()));
        }

        let index_of = |address: &Address| -> u8 {
            // Every referenced key was inserted above and fits in a u8.
            account_keys
                .iter()
                .position(|key| key == address)
                .map_or(0, |i| i as u8)
        };
        let instructions = messages
            .iter()
            .map(|message| CompiledInstruction {
                program_id_index: index_of(message.program_id()),
                accounts: message.accounts().iter().map(|m| index_of(&m.address)).collect(),
                data: message.data().to_vec(),
            })
            .collect();

        let num_required_signatures = 1 + writable_signers.len() + readonly_signers.len();
        if num_required_signatures > u8::MAX as usize {
            return Err(VaultClientError::TooManyAccounts(num_required_signatures));
        }
        let transaction = Transaction {
            num_required_signatures: num_required_signatures as u8,
            num_readonly_signed: readonly_signers.len() as u8,
            num_readonly_unsigned: readonly_unsigned.len() as u8,
            account_keys,
            recent_blockhash,
            instructions,
        };
        debug!(
            "compiled {} instructions over {} keys, {} signers required",
            messages.len(),
            transaction.account_keys.len(),
            transaction.num_required_signatures
        );
        Ok(transaction)
    }

    pub fn fee_payer(&self) -> Option<&Address> {
        self.account_keys.first()
    }

    /// Keys that must sign, in signature order.
    pub fn signers(&self) -> &[Address] {
        self.account_keys
            .get(..self.num_required_signatures as usize)
            .unwrap_or_default()
    }

    /// Header counts: required signatures, readonly signed, readonly unsigned.
    pub fn header(&self) -> [u8; 3] {
        [
            self.num_required_signatures,
            self.num_readonly_signed,
            self.num_readonly_unsigned,
        ]
    }

    pub fn account_keys(&self) -> &[Address] {
        &self.account_keys
    }

    pub fn recent_blockhash(&self) -> &Blockhash {
        &self.recent_blockhash
    }

    pub fn instructions(&self) -> &[CompiledInstruction] {
        &self.instructions
    }

    /// The bytes every signer signs.
    pub fn message_bytes(&self) -> VaultResult<Vec<u8>> {
        let mut out = self.header().to_vec();
        encode_compact_u16(self.account_keys.len(), &mut out)?;
        for key in &self.account_keys {
            out.extend_from_slice(key.as_ref());
        }
        out.extend_from_slice(&self.recent_blockhash.0);
        encode_compact_u16(self.instructions.len(), &mut out)?;
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_compact_u16(ix.accounts.len(), &mut out)?;
            out.extend_from_slice(&ix.accounts);
            encode_compact_u16(ix.data.len(), &mut out)?;
            out.extend_from_slice(&ix.data);
        }
        Ok(out)
    }

    /// Wire transaction: compact-u16 signature count, signatures, message.
    pub fn signed_bytes(&self, signatures: &[Signature]) -> VaultResult<Vec<u8>> {
        if signatures.len() != self.num_required_signatures as usize {
            return Err(VaultClientError::Signing(format!(
                "expected {} signatures, got {}",
                self.num_required_signatures,
                signatures.len()
            )));
        }
        let mut out = Vec::new();
        encode_compact_u16(signatures.len(), &mut out)?;
        for signature in signatures {
            out.extend_from_slice(&signature.0);
        }
        out.extend_from_slice(&self.message_bytes()?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::{build_add_member, build_withdraw_sol};
    use crate::{SYSTEM_PROGRAM_ID, VAULT_PROGRAM_ID};

    fn addr(byte: u8) -> Address {
        Address::new_from_array([byte; 32])
    }

    #[test]
    fn compact_u16_vectors() {
        let cases: [(usize, &[u8]); 6] = [
            (0, &[0x00]),
            (0x7f, &[0x7f]),
            (0x80, &[0x80, 0x01]),
            (0x3fff, &[0xff, 0x7f]),
            (0x4000, &[0x80, 0x80, 0x01]),
            (0xffff, &[0xff, 0xff, 0x03]),
        ];
        for (value, bytes) in cases {
            let mut out = Vec::new();
            encode_compact_u16(value, &mut out).unwrap();
            assert_eq!(out, bytes, "encoding {value:#x}");
            assert_eq!(
                decode_compact_u16(bytes, 0).unwrap(),
                (value as u16, bytes.len())
            );
        }
    }

    #[test]
    fn compact_u16_rejects_bad_input() {
        assert!(encode_compact_u16(0x1_0000, &mut Vec::new()).is_err());
        assert!(decode_compact_u16(&[0x80], 0).is_err());
        assert!(decode_compact_u16(&[0x80, 0x00], 0).is_err());
        assert!(decode_compact_u16(&[0xff, 0xff, 0x04], 0).is_err());
        assert!(decode_compact_u16(&[0x80, 0x80, 0x80, 0x01], 0).is_err());
    }

    #[test]
    fn withdraw_key_order_and_header() {
        let owner = addr(2);
        let message = build_withdraw_sol(&addr(1), &owner, &addr(3), 5);
        let tx = Transaction::compile(&owner, &[message], Blockhash([9; 32])).unwrap();

        // payer, writable unsigned (vault, recipient), readonly unsigned (system, program)
        let mut expected = vec![owner, addr(1), addr(3), SYSTEM_PROGRAM_ID, VAULT_PROGRAM_ID];
        expected[3..].sort();
        assert_eq!(tx.account_keys, expected);
        assert_eq!(tx.num_required_signatures, 1);
        assert_eq!(tx.num_readonly_signed, 0);
        assert_eq!(tx.num_readonly_unsigned, 2);
        assert_eq!(tx.signers(), &[owner]);

        let ix = &tx.instructions[0];
        assert_eq!(tx.account_keys[ix.program_id_index as usize], VAULT_PROGRAM_ID);
        let referenced: Vec<Address> = ix
            .accounts
            .iter()
            .map(|i| tx.account_keys[*i as usize])
            .collect();
        assert_eq!(referenced, vec![addr(1), addr(3), owner, SYSTEM_PROGRAM_ID]);
    }

    #[test]
    fn separate_fee_payer_and_signer() {
        let message = build_add_member(&addr(1), &addr(2), &addr(4));
        let tx = Transaction::compile(&addr(7), &[message], Blockhash::default()).unwrap();
        assert_eq!(tx.fee_payer(), Some(&addr(7)));
        assert_eq!(tx.num_required_signatures, 2);
        assert_eq!(tx.num_readonly_signed, 1);
        assert_eq!(tx.signers(), &[addr(7), addr(2)]);
    }

    #[test]
    fn message_bytes_layout() {
        let owner = addr(2);
        let message = build_add_member(&addr(1), &owner, &addr(4));
        let data = message.data().to_vec();
        let tx = Transaction::compile(&owner, &[message], Blockhash([9; 32])).unwrap();
        let bytes = tx.message_bytes().unwrap();

        assert_eq!(&bytes[..3], &[1, 0, 1]);
        assert_eq!(bytes[3], 3);
        assert_eq!(&bytes[4..36], owner.as_ref());
        assert_eq!(&bytes[100..132], &[9; 32]);
        // one instruction, program index 2, two accounts
        assert_eq!(&bytes[132..137], &[1, 2, 2, 1, 0]);
        assert_eq!(bytes[137] as usize, data.len());
        assert_eq!(&bytes[138..], data.as_slice());
    }

    #[test]
    fn signed_bytes_needs_every_signature() {
        let owner = addr(2);
        let message = build_add_member(&addr(1), &owner, &addr(4));
        let tx = Transaction::compile(&owner, &[message], Blockhash::default()).unwrap();
        assert!(tx.signed_bytes(&[]).is_err());

        let signed = tx.signed_bytes(&[Signature([5; 64])]).unwrap();
        assert_eq!(signed[0], 1);
        assert_eq!(&signed[1..65], &[5; 64]);
        assert_eq!(&signed[65..], tx.message_bytes().unwrap().as_slice());
    }

    #[test]
    fn header_and_keys_out_of_step_do_not_panic() {
        let tx = Transaction {
            num_required_signatures: 2,
            num_readonly_signed: 0,
            num_readonly_unsigned: 0,
            account_keys: vec![addr(1)],
            recent_blockhash: Blockhash::default(),
            instructions: Vec::new(),
        };
        assert!(tx.signers().is_empty());
        assert_eq!(tx.fee_payer(), Some(&addr(1)));

        let empty = Transaction {
            num_required_signatures: 1,
            account_keys: Vec::new(),
            ..tx
        };
        assert_eq!(empty.fee_payer(), None);
        assert!(empty.signers().is_empty());
    }

    #[test]
    fn too_many_accounts() {
        let messages: Vec<Message> = (0..=255u8)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[0] = i;
                bytes[1] = 1;
                build_add_member(&Address::new_from_array(bytes), &addr(2), &addr(3))
            })
            .collect();
        let err = Transaction::compile(&addr(2), &messages, Blockhash::default()).unwrap_err();
        assert!(matches!(err, VaultClientError::TooManyAccounts(_)));
    }

    #[test]
    fn signature_text_round_trip() {
        let signature = Signature([3; 64]);
        let parsed: Signature = signature.to_string().parse().unwrap();
        assert_eq!(parsed, signature);
        assert!("abc".parse::<Signature>().is_err());
    }
}
