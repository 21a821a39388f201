// File: kebapp-common/src/pda/account.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 27 November 2024 @ 10:02:19
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use super::{find_program_address, Seed};
use crate::{debug, Error, Result};

/// Common properties of an account owned by the presale program.
///
/// The client only reads these accounts, the program is the one writing them.
pub trait PresalePda: BorshDeserialize + BorshSerialize {
    /// Exact size of the account's data.
    const LEN: usize;

    /// Checks that the account has been initialized by the program.
    fn is_valid(&self) -> bool;

    /// Get the seeds used to derive the account's address.
    fn seeds(&self) -> Vec<Seed>;

    /// Address of the account.
    ///
    /// # Parameters
    /// * `program_id` - The presale program.
    fn address(&self, program_id: &Pubkey) -> Pubkey {
        find_program_address(self.seeds(), program_id).0
    }

    /// Read the account from its raw data.
    ///
    /// # Errors
    /// If the data does not have the expected size, can't be deserialized, or is not initialized.
    fn from_account_data(data: &[u8]) -> Result<Self> {
        if data.len() != Self::LEN {
            debug!("unexpected PDA size: {} instead of {}", data.len(), Self::LEN);
            return Err(Error::InvalidRawData);
        }
        let pda = Self::try_from_slice(data).map_err(|_err| Error::InvalidRawData)?;
        if !pda.is_valid() {
            return Err(Error::InvalidRawData);
        }
        Ok(pda)
    }
}
