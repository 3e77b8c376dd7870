//! Vault session over caller-supplied collaborators.
//!
//! The codec itself never touches the network or a key. A [`Transport`]
//! carries bytes to and from the cluster and a [`SigningAgent`] (a wallet)
//! signs them; [`VaultClient`] threads the owner key and config through
//! both instead of keeping them in globals.

use log::{debug, info};

use crate::address::Address;
use crate::config::{ClientConfig, Commitment};
use crate::error::{VaultClientError, VaultResult};
use crate::instructions::{
    build_add_member, build_get_vault_info, build_initialize_vault, build_remove_member,
    build_withdraw_sol, Message,
};
use crate::pda::find_vault_address;
use crate::state::{decode_vault_record, VaultRecord};
use crate::transaction::{Blockhash, Signature, Transaction};

/// Cluster access.
pub trait Transport {
    fn latest_blockhash(&self, commitment: Commitment) -> VaultResult<Blockhash>;

    /// Raw account data, or `None` if no account lives at `address`.
    fn fetch_raw(&self, address: &Address) -> VaultResult<Option<Vec<u8>>>;

    /// Submit a signed wire transaction.
    fn submit(&self, signed: &[u8]) -> VaultResult<Signature>;

    /// Block until `signature` reaches `commitment`.
    fn confirm(&self, signature: &Signature, commitment: Commitment) -> VaultResult<()>;
}

/// A wallet holding the owner's key.
pub trait SigningAgent {
    fn public_key(&self) -> Address;

    /// Whether the agent can submit transactions on its own.
    fn can_submit(&self) -> bool {
        false
    }

    /// Sign `message` and submit it, returning the transaction signature.
    fn sign_and_submit(&self, _message: &[u8]) -> VaultResult<Signature> {
        Err(VaultClientError::MissingCollaborator(
            "signing agent cannot submit transactions",
        ))
    }

    /// Sign `message` and return the wire transaction for separate submission.
    fn sign(&self, message: &[u8]) -> VaultResult<Vec<u8>>;
}

pub struct VaultClient<T, S> {
    config: ClientConfig,
    transport: Option<T>,
    agent: Option<S>,
}

impl<T: Transport, S: SigningAgent> VaultClient<T, S> {
    pub fn new(config: ClientConfig) -> Self {
        VaultClient {
            config,
            transport: None,
            agent: None,
        }
    }

    pub fn with_transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_agent(mut self, agent: S) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn transport(&self) -> VaultResult<&T> {
        self.transport
            .as_ref()
            .ok_or(VaultClientError::MissingCollaborator("transport"))
    }

    fn agent(&self) -> VaultResult<&S> {
        self.agent
            .as_ref()
            .ok_or(VaultClientError::MissingCollaborator("signing agent"))
    }

    /// The connected owner's vault PDA and bump.
    pub fn vault_address(&self) -> VaultResult<(Address, u8)> {
        let owner = self.agent()?.public_key();
        find_vault_address(&owner, &self.config.program_id)
    }

    /// Read and decode the vault at `address`; `None` if it does not exist.
    pub fn fetch_vault_at(&self, address: &Address) -> VaultResult<Option<VaultRecord>> {
        match self.transport()?.fetch_raw(address)? {
            Some(raw) => decode_vault_record(&raw).map(Some),
            None => {
                debug!("no vault account at {address}");
                Ok(None)
            }
        }
    }

    /// The connected owner's vault, if initialized.
    pub fn fetch_vault(&self) -> VaultResult<Option<VaultRecord>> {
        let (vault, _) = self.vault_address()?;
        self.fetch_vault_at(&vault)
    }

    /// Compile, sign, submit and confirm `messages` with the agent as fee payer.
    pub fn send(&self, messages: &[Message]) -> VaultResult<Signature> {
        let transport = self.transport()?;
        let agent = self.agent()?;

        let blockhash = transport.latest_blockhash(self.config.blockhash_commitment)?;
        let transaction = Transaction::compile(&agent.public_key(), messages, blockhash)?;
        let message = transaction.message_bytes()?;

        let signature = if agent.can_submit() {
            agent.sign_and_submit(&message)?
        } else {
            let signed = agent.sign(&message)?;
            transport.submit(&signed)?
        };
        debug!("submitted {signature}, waiting for {}", self.config.commitment);

        transport.confirm(&signature, self.config.commitment)?;
        info!("transaction {signature} {}", self.config.commitment);
        Ok(signature)
    }

    fn program(&self, message: Message) -> Message {
        message.with_program_id(self.config.program_id)
    }

    pub fn initialize_vault(&self, initial_members: &[Address]) -> VaultResult<Signature> {
        let owner = self.agent()?.public_key();
        let (vault, _) = self.vault_address()?;
        let message = build_initialize_vault(&vault, &owner, initial_members);
        self.send(&[self.program(message)])
    }

    pub fn add_member(&self, new_member: &Address) -> VaultResult<Signature> {
        let owner = self.agent()?.public_key();
        let (vault, _) = self.vault_address()?;
        let message = build_add_member(&vault, &owner, new_member);
        self.send(&[self.program(message)])
    }

    pub fn remove_member(&self, member: &Address) -> VaultResult<Signature> {
        let owner = self.agent()?.public_key();
        let (vault, _) = self.vault_address()?;
        let message = build_remove_member(&vault, &owner, member);
        self.send(&[self.program(message)])
    }

    /// Withdraw `amount` lamports from the owner's vault to `recipient`.
    pub fn withdraw_sol(&self, recipient: &Address, amount: u64) -> VaultResult<Signature> {
        let owner = self.agent()?.public_key();
        let (vault, _) = self.vault_address()?;
        let message = build_withdraw_sol(&vault, &owner, recipient, amount);
        self.send(&[self.program(message)])
    }

    pub fn get_vault_info(&self) -> VaultResult<Signature> {
        let (vault, _) = self.vault_address()?;
        self.send(&[self.program(build_get_vault_info(&vault))])
    }
}
