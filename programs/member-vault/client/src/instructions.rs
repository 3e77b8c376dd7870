//! Instruction builders for the vault program.
//!
//! Account order and signer/writable flags per instruction are part of the
//! program's interface: the program indexes accounts positionally, so a
//! reordered or mis-flagged list fails on chain, not here.

use log::debug;

use crate::address::Address;
use crate::codec::{encode_address, encode_sequence, encode_u64_le};
use crate::discriminator::Discriminator;
use crate::{SYSTEM_PROGRAM_ID, VAULT_PROGRAM_ID};

/// The vault program's instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    InitializeVault,
    AddMember,
    RemoveMember,
    WithdrawSol,
    GetVaultInfo,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::InitializeVault,
        MessageKind::AddMember,
        MessageKind::RemoveMember,
        MessageKind::WithdrawSol,
        MessageKind::GetVaultInfo,
    ];

    /// Handler name as the program declares it.
    pub const fn name(self) -> &'static str {
        match self {
            MessageKind::InitializeVault => "initialize_vault",
            MessageKind::AddMember => "add_member",
            MessageKind::RemoveMember => "remove_member",
            MessageKind::WithdrawSol => "withdraw_sol",
            MessageKind::GetVaultInfo => "get_vault_info",
        }
    }

    pub fn discriminator(self) -> Discriminator {
        Discriminator::instruction(self.name())
    }

    /// Identify an instruction from the leading 8 bytes of its data.
    pub fn from_data(data: &[u8]) -> Option<MessageKind> {
        let tag = data.get(..Discriminator::LEN)?;
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.discriminator().as_ref() == tag)
    }
}

/// One account reference of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub const fn new(address: Address, is_signer: bool) -> Self {
        AccountMeta {
            address,
            is_signer,
            is_writable: true,
        }
    }

    pub const fn new_readonly(address: Address, is_signer: bool) -> Self {
        AccountMeta {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

/// An instruction ready for the transaction layer.
///
/// Only the `build_*` functions construct one, so `data` always starts with
/// the discriminator of `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    program_id: Address,
    kind: MessageKind,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
}

impl Message {
    fn new(kind: MessageKind, accounts: Vec<AccountMeta>, args: &[u8]) -> Self {
        let mut data = Vec::with_capacity(Discriminator::LEN + args.len());
        data.extend_from_slice(kind.discriminator().as_ref());
        data.extend_from_slice(args);

        debug!(
            "built {} with {} accounts and {} data bytes",
            kind.name(),
            accounts.len(),
            data.len()
        );
        Message {
            program_id: VAULT_PROGRAM_ID,
            kind,
            accounts,
            data,
        }
    }

    /// Target a deployment of the vault program at another address.
    pub fn with_program_id(mut self, program_id: Address) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    /// Discriminator followed by the encoded arguments.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Arguments after the discriminator.
    pub fn args(&self) -> &[u8] {
        self.data.get(Discriminator::LEN..).unwrap_or_default()
    }
}

/// Accounts: vault (w), payer (s, w), system program.
/// Data: discriminator, `u32` member count, members.
pub fn build_initialize_vault(
    vault: &Address,
    payer: &Address,
    initial_members: &[Address],
) -> Message {
    let accounts = vec![
        AccountMeta::new(*vault, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    let args = encode_sequence(initial_members, encode_address);
    Message::new(MessageKind::InitializeVault, accounts, &args)
}

/// Accounts: vault (w), signer (s). Data: discriminator, new member.
pub fn build_add_member(vault: &Address, signer: &Address, new_member: &Address) -> Message {
    let accounts = vec![
        AccountMeta::new(*vault, false),
        AccountMeta::new_readonly(*signer, true),
    ];
    Message::new(MessageKind::AddMember, accounts, &encode_address(new_member))
}

/// Same accounts as [`build_add_member`]. Data: discriminator, member.
pub fn build_remove_member(vault: &Address, signer: &Address, member: &Address) -> Message {
    let accounts = vec![
        AccountMeta::new(*vault, false),
        AccountMeta::new_readonly(*signer, true),
    ];
    Message::new(MessageKind::RemoveMember, accounts, &encode_address(member))
}

/// Accounts: vault (w), recipient (w), signer (s), system program.
/// Data: discriminator, `u64` lamports.
pub fn build_withdraw_sol(
    vault: &Address,
    signer: &Address,
    recipient: &Address,
    amount: u64,
) -> Message {
    let accounts = vec![
        AccountMeta::new(*vault, false),
        AccountMeta::new(*recipient, false),
        AccountMeta::new_readonly(*signer, true),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    Message::new(MessageKind::WithdrawSol, accounts, &encode_u64_le(amount))
}

pub fn build_get_vault_info(vault: &Address) -> Message {
    let accounts = vec![AccountMeta::new_readonly(*vault, false)];
    Message::new(MessageKind::GetVaultInfo, accounts, &[])
}
