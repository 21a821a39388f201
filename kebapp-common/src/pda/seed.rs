// File: kebapp-common/src/pda/seed.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 27 November 2024 @ 09:41:36
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use solana_program::pubkey::Pubkey;

/// A seed used to derive the address of a PDA.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seed {
    data: Vec<u8>,
}

impl Seed {
    /// Raw bytes of the seed.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Self {
            data: value.as_bytes().to_vec(),
        }
    }
}

impl From<&Pubkey> for Seed {
    fn from(value: &Pubkey) -> Self {
        Self {
            data: value.to_bytes().to_vec(),
        }
    }
}

impl From<Pubkey> for Seed {
    fn from(value: Pubkey) -> Self {
        Self::from(&value)
    }
}

/// Derive a program address from a list of seeds.
///
/// # Parameters
/// * `seeds` - The seeds of the address, in order,
/// * `program_id` - The program owning the address.
#[must_use]
pub fn find_program_address<I>(seeds: I, program_id: &Pubkey) -> (Pubkey, u8)
where
    I: IntoIterator<Item = Seed>,
{
    let seeds: Vec<Seed> = seeds.into_iter().collect();
    let slices: Vec<&[u8]> = seeds.iter().map(Seed::as_bytes).collect();
    Pubkey::find_program_address(&slices, program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seeds_same_address() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let first = find_program_address([Seed::from("referral"), Seed::from(owner)], &program_id);
        let second =
            find_program_address([Seed::from("referral"), Seed::from(&owner)], &program_id);
        assert_eq!(first, second);
        assert_eq!(
            first,
            Pubkey::find_program_address(&[b"referral", owner.as_ref()], &program_id)
        );
    }

    #[test]
    fn different_seeds() {
        let program_id = Pubkey::new_unique();
        let (first, _) = find_program_address([Seed::from("mint_authority")], &program_id);
        let (second, _) = find_program_address([Seed::from("distribution")], &program_id);
        assert_ne!(first, second);
    }
}
