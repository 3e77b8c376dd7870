//! Program derived addresses.
//!
//! A PDA is `sha256(seeds || bump || program_id || "ProgramDerivedAddress")`
//! for the highest bump whose hash is NOT a valid ed25519 point, so no
//! private key exists for it and only the program can sign for the account.

use curve25519_dalek::edwards::CompressedEdwardsY;
use log::{debug, trace};
use sha2::{Digest, Sha256};

use crate::address::Address;
use crate::error::{VaultClientError, VaultResult};

/// Marker appended to every PDA preimage.
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Seed prefix of the per-owner vault account.
pub const VAULT_SEED: &[u8] = b"vault";

pub const MAX_SEEDS: usize = 16;
pub const MAX_SEED_LEN: usize = 32;

/// Whether `bytes` decompress to a point on the ed25519 curve.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

fn check_seeds(seeds: &[&[u8]]) -> VaultResult<()> {
    if seeds.len() > MAX_SEEDS {
        return Err(VaultClientError::InvalidSeeds("more than 16 seeds"));
    }
    if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(VaultClientError::InvalidSeeds("seed longer than 32 bytes"));
    }
    Ok(())
}

fn hash_seeds(seeds: &[&[u8]], bump: Option<u8>, program_id: &Address) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

/// Hash a complete seed list (bump included by the caller) into a PDA.
///
/// Fails with `InvalidSeeds` if the result lands on the curve.
pub fn create_derived_address(seeds: &[&[u8]], program_id: &Address) -> VaultResult<Address> {
    check_seeds(seeds)?;
    let hash = hash_seeds(seeds, None, program_id);
    if is_on_curve(&hash) {
        return Err(VaultClientError::InvalidSeeds("derived address is on curve"));
    }
    Ok(Address::new_from_array(hash))
}

/// Search bumps from 255 down and return the first off-curve address.
///
/// The bump is appended as one extra seed, so at most 15 seeds may be given.
pub fn find_derived_address(seeds: &[&[u8]], program_id: &Address) -> VaultResult<(Address, u8)> {
    if seeds.len() >= MAX_SEEDS {
        return Err(VaultClientError::InvalidSeeds("no room for the bump seed"));
    }
    check_seeds(seeds)?;

    for bump in (0..=u8::MAX).rev() {
        let hash = hash_seeds(seeds, Some(bump), program_id);
        if is_on_curve(&hash) {
            trace!("bump {bump} lands on curve, trying next");
            continue;
        }
        let address = Address::new_from_array(hash);
        debug!("derived {address} with bump {bump} for program {program_id}");
        return Ok((address, bump));
    }
    Err(VaultClientError::DerivationExhausted)
}

/// The vault PDA for `owner`: seeds `["vault", owner]`.
pub fn find_vault_address(owner: &Address, program_id: &Address) -> VaultResult<(Address, u8)> {
    find_derived_address(&[VAULT_SEED, owner.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VAULT_PROGRAM_ID;

    #[test]
    fn vault_address_vector() {
        let owner = Address::new_from_array([7; 32]);
        let (vault, bump) = find_vault_address(&owner, &VAULT_PROGRAM_ID).unwrap();
        assert_eq!(vault.to_string(), "ESdSurUWXn3cWavFJxNpuqdTbFscTUvKq45jjTQX9UF2");
        assert_eq!(bump, 255);
    }

    #[test]
    fn skips_on_curve_bumps() {
        // bump 255 lands on the curve for the zero owner
        let owner = Address::default();
        let (vault, bump) = find_vault_address(&owner, &VAULT_PROGRAM_ID).unwrap();
        assert_eq!(vault.to_string(), "AEQrEPhY2DszExxctqaCk9KjNF1c5wCJ1Vs2D2mQiFYJ");
        assert_eq!(bump, 254);

        let on_curve = hash_seeds(&[VAULT_SEED, owner.as_ref()], Some(255), &VAULT_PROGRAM_ID);
        assert!(is_on_curve(&on_curve));
    }

    #[test]
    fn deterministic() {
        let owner = Address::new_from_array([42; 32]);
        let first = find_vault_address(&owner, &VAULT_PROGRAM_ID).unwrap();
        let second = find_vault_address(&owner, &VAULT_PROGRAM_ID).unwrap();
        assert_eq!(first, second);
        assert_ne!(first.0, find_vault_address(&Address::new_from_array([43; 32]), &VAULT_PROGRAM_ID).unwrap().0);
    }

    #[test]
    fn create_matches_find() {
        let owner = Address::new_from_array([7; 32]);
        let (vault, bump) = find_vault_address(&owner, &VAULT_PROGRAM_ID).unwrap();
        let created =
            create_derived_address(&[VAULT_SEED, owner.as_ref(), &[bump]], &VAULT_PROGRAM_ID).unwrap();
        assert_eq!(created, vault);
    }

    #[test]
    fn create_rejects_on_curve_result() {
        let owner = Address::default();
        let err = create_derived_address(&[VAULT_SEED, owner.as_ref(), &[255]], &VAULT_PROGRAM_ID)
            .unwrap_err();
        assert!(matches!(err, VaultClientError::InvalidSeeds(_)));
    }

    #[test]
    fn seed_limits() {
        let long = [0u8; 33];
        assert!(find_derived_address(&[&long], &VAULT_PROGRAM_ID).is_err());

        let seed: &[u8] = b"s";
        assert!(find_derived_address(&[seed; 15], &VAULT_PROGRAM_ID).is_ok());
        assert!(find_derived_address(&[seed; 16], &VAULT_PROGRAM_ID).is_err());
        assert!(create_derived_address(&[seed; 17], &VAULT_PROGRAM_ID).is_err());
    }

    #[test]
    fn curve_check() {
        // compressed ed25519 basepoint
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(is_on_curve(&basepoint));
    }
}
