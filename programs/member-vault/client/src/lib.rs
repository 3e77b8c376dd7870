//! Client-side codec for the member vault program.
//!
//! Builds the program's instruction data and account lists, decodes its
//! vault accounts, and derives the per-owner vault PDA, without depending
//! on a client framework. Signing and network access stay with the caller
//! through the traits in [`client`].

pub mod address;
pub mod client;
pub mod codec;
pub mod config;
pub mod discriminator;
pub mod error;
pub mod instructions;
pub mod pda;
pub mod state;
pub mod transaction;

pub use address::{parse_address, parse_address_list, Address};
pub use client::{SigningAgent, Transport, VaultClient};
pub use config::{ClientConfig, Commitment};
pub use discriminator::{derive_discriminator, Discriminator};
pub use error::{VaultClientError, VaultResult};
pub use instructions::{
    build_add_member, build_get_vault_info, build_initialize_vault, build_remove_member,
    build_withdraw_sol, AccountMeta, Message, MessageKind,
};
pub use pda::{create_derived_address, find_derived_address, find_vault_address};
pub use state::{decode_vault_record, encode_vault_record, VaultRecord};
pub use transaction::{Blockhash, Signature, Transaction};

/// HGtcTd7zoVzQZHsXtGF8oTvA5Hry786cKBxDP9M32yft
pub const VAULT_PROGRAM_ID: Address = Address::new_from_array([
    0xf1, 0xcd, 0x0f, 0x63, 0x71, 0xe7, 0x50, 0xd7,
    0xa1, 0x49, 0x79, 0x3e, 0x66, 0x24, 0x12, 0x63,
    0x81, 0x58, 0x7a, 0x47, 0x91, 0x83, 0x0b, 0x7a,
    0x60, 0x50, 0xde, 0x4b, 0x30, 0x4a, 0x50, 0x77,
]);

/// 11111111111111111111111111111111
pub const SYSTEM_PROGRAM_ID: Address = Address::new_from_array([0; 32]);
