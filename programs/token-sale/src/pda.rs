use anchor_lang::prelude::*;

use crate::{
    constants::{CUSTODY_SEED, ESCROW_SEED, REGISTRY_PAGE_SEED, REGISTRY_SEED},
    error::TokenSaleError,
    state::EscrowAccount,
};

/// Finds the canonical program address for `seeds`.
///
/// The bump walks down from 255 and the first candidate that falls off the
/// ed25519 curve wins, so no keypair can ever sign for the result.
pub fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or_else(|| error!(TokenSaleError::DerivationExhausted))
}

/// Escrow record address: `["escrow_pda", name]`
pub fn escrow_address(name: &str, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    EscrowAccount::validate_name(name)?;
    derive(&[ESCROW_SEED, name.as_bytes()], program_id)
}

/// Custody token account address: `["escrow_token_account", name, admin, mint]`
pub fn custody_address(
    name: &str,
    admin: &Pubkey,
    mint: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8)> {
    EscrowAccount::validate_name(name)?;
    derive(
        &[CUSTODY_SEED, name.as_bytes(), admin.as_ref(), mint.as_ref()],
        program_id,
    )
}

pub fn registry_address(program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[REGISTRY_SEED], program_id)
}

/// Registry page address: `["sale_registry_page", index]`
pub fn registry_page_address(index: u32, program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    derive(&[REGISTRY_PAGE_SEED, &index.to_le_bytes()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_NAME_LEN;
    use rand::{distributions::Alphanumeric, Rng};
    use std::collections::HashSet;

    #[test]
    fn escrow_address_is_deterministic() {
        let first = escrow_address("Test Escrow", &crate::ID).unwrap();
        let second = escrow_address("Test Escrow", &crate::ID).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn escrow_address_depends_on_program() {
        let other_program = Pubkey::new_unique();
        let (ours, _) = escrow_address("Test Escrow", &crate::ID).unwrap();
        let (theirs, _) = escrow_address("Test Escrow", &other_program).unwrap();
        assert_ne!(ours, theirs);
    }

    #[test]
    fn derived_addresses_are_off_curve() {
        let admin = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let (escrow, _) = escrow_address("Test Escrow", &crate::ID).unwrap();
        let (custody, _) = custody_address("Test Escrow", &admin, &mint, &crate::ID).unwrap();
        let (registry, _) = registry_address(&crate::ID).unwrap();
        let (page, _) = registry_page_address(0, &crate::ID).unwrap();

        assert!(!escrow.is_on_curve());
        assert!(!custody.is_on_curve());
        assert!(!registry.is_on_curve());
        assert!(!page.is_on_curve());
    }

    #[test]
    fn registry_pages_have_distinct_addresses() {
        let pages: HashSet<Pubkey> = (0..64)
            .map(|index| registry_page_address(index, &crate::ID).unwrap().0)
            .collect();
        assert_eq!(pages.len(), 64);
        assert!(!pages.contains(&registry_address(&crate::ID).unwrap().0));
    }

    #[test]
    fn bump_is_the_highest_valid_one() {
        let name = "Test Escrow";
        let (escrow, bump) = escrow_address(name, &crate::ID).unwrap();

        let recreated =
            Pubkey::create_program_address(&[ESCROW_SEED, name.as_bytes(), &[bump]], &crate::ID)
                .unwrap();
        assert_eq!(recreated, escrow);

        // Every higher bump must land on the curve, otherwise it would have been chosen
        for higher in (u16::from(bump) + 1)..=u16::from(u8::MAX) {
            let higher = higher as u8;
            assert!(Pubkey::create_program_address(
                &[ESCROW_SEED, name.as_bytes(), &[higher]],
                &crate::ID
            )
            .is_err());
        }
    }

    #[test]
    fn custody_is_bound_to_admin_and_mint() {
        let admin = Pubkey::new_unique();
        let other_admin = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let other_mint = Pubkey::new_unique();

        let (base, _) = custody_address("sale", &admin, &mint, &crate::ID).unwrap();
        let (by_admin, _) = custody_address("sale", &other_admin, &mint, &crate::ID).unwrap();
        let (by_mint, _) = custody_address("sale", &admin, &other_mint, &crate::ID).unwrap();
        let (by_name, _) = custody_address("sale 2", &admin, &mint, &crate::ID).unwrap();

        assert_ne!(base, by_admin);
        assert_ne!(base, by_mint);
        assert_ne!(base, by_name);
    }

    #[test]
    fn escrow_and_custody_never_share_an_address() {
        let admin = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (escrow, _) = escrow_address("sale", &crate::ID).unwrap();
        let (custody, _) = custody_address("sale", &admin, &mint, &crate::ID).unwrap();
        assert_ne!(escrow, custody);
    }

    #[test]
    fn unique_names_produce_unique_addresses() {
        let mut rng = rand::thread_rng();
        let mut names = HashSet::new();
        while names.len() < 10_000 {
            let len = rng.gen_range(1..=MAX_NAME_LEN);
            let name: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            names.insert(name);
        }

        let addresses: HashSet<Pubkey> = names
            .iter()
            .map(|name| escrow_address(name, &crate::ID).unwrap().0)
            .collect();
        assert_eq!(addresses.len(), names.len());
    }

    #[test]
    fn invalid_names_are_rejected_before_derivation() {
        let too_long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            escrow_address("", &crate::ID).unwrap_err(),
            TokenSaleError::EmptySaleName.into()
        );
        assert_eq!(
            escrow_address(&too_long, &crate::ID).unwrap_err(),
            TokenSaleError::SaleNameTooLong.into()
        );
    }
}
