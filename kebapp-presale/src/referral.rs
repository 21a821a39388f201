// File: kebapp-presale/src/referral.rs
// Project: kebapp-presale
// Creation date: Wednesday 20 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 09:55:40
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use borsh::{BorshDeserialize, BorshSerialize};
use kebapp_common::{
    ledger::Ledger,
    pda::{find_program_address, PresalePda, Seed},
    Error, Result,
};
use log::warn;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{PresaleConfig, PresaleInstruction, ReferralCode};

/// Seed of the referral PDAs.
pub const REFERRAL_SEED: &str = "referral";

/// Offset of the owner in a referral record.
const OWNER_OFFSET: usize = 1;

/// Base of the shareable referral links.
pub const REFERRAL_LINK_BASE: &str = "https://kebappcoin.io/ref/";

/// Referral record of a wallet, written by the presale program.
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferralPda {
    /// Set by the program when the record is created.
    pub is_initialized: bool,
    /// Wallet owning the referral code.
    pub owner: Pubkey,
    /// The referral code (space padded).
    pub code: [u8; ReferralCode::LEN],
    /// Total amount invested with this code.
    pub total_volume: u64,
    /// Number of investments made with this code.
    pub referral_count: u32,
    /// Reward of the owner, in basis points.
    pub reward_bps: u16,
}

impl PresalePda for ReferralPda {
    const LEN: usize = 55;

    fn is_valid(&self) -> bool {
        self.is_initialized
    }

    fn seeds(&self) -> Vec<Seed> {
        vec![REFERRAL_SEED.into(), self.owner.into()]
    }
}

impl ReferralPda {
    /// Get the address of the referral PDA of a wallet.
    ///
    /// # Parameters
    /// * `owner` - The wallet owning the referral code,
    /// * `program_id` - The presale program.
    #[must_use]
    pub fn get_address(owner: &Pubkey, program_id: &Pubkey) -> Pubkey {
        find_program_address([Seed::from(REFERRAL_SEED), Seed::from(owner)], program_id).0
    }

    /// The referral code of the record.
    #[must_use]
    pub const fn referral_code(&self) -> ReferralCode {
        ReferralCode::from_bytes(self.code)
    }
}

/// Referral code attributed to a wallet: the first 8 characters of its address.
///
/// # Parameters
/// * `owner` - The wallet.
#[must_use]
pub fn referral_code_for(owner: &Pubkey) -> ReferralCode {
    let mut code = [b' '; ReferralCode::LEN];
    for (slot, byte) in code.iter_mut().zip(owner.to_string().bytes()) {
        *slot = byte;
    }
    ReferralCode::from_bytes(code)
}

/// Shareable link for a referral code.
///
/// # Parameters
/// * `code` - The referral code.
#[must_use]
pub fn referral_link(code: &ReferralCode) -> String {
    format!("{REFERRAL_LINK_BASE}{code}")
}

/// Creates a `GenerateReferral` instruction for a wallet.
///
/// # Parameters
/// * `config` - The presale configuration,
/// * `owner` - The wallet registering its referral code (signer).
#[must_use]
pub fn generate_referral(config: &PresaleConfig, owner: &Pubkey) -> Instruction {
    let code = referral_code_for(owner);
    Instruction {
        program_id: config.program_id,
        accounts: vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(ReferralPda::get_address(owner, &config.program_id), false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: PresaleInstruction::GenerateReferral(code).pack(),
    }
}

/// Read the referral record of a wallet.
///
/// # Parameters
/// * `ledger` - Access to the cluster,
/// * `config` - The presale configuration,
/// * `owner` - The wallet.
///
/// # Errors
/// If the request failed or the account is not a referral record.
pub async fn fetch_referral<L: Ledger>(
    ledger: &L,
    config: &PresaleConfig,
    owner: &Pubkey,
) -> Result<Option<ReferralPda>> {
    let address = ReferralPda::get_address(owner, &config.program_id);
    let Some(account) = ledger.get_account(&address).await? else {
        return Ok(None);
    };
    ReferralPda::from_account_data(&account.data).map(Some)
}

/// List all the referral records of the presale.
///
/// Accounts of the right size that can't be read are skipped.
///
/// # Parameters
/// * `ledger` - Access to the cluster,
/// * `config` - The presale configuration.
///
/// # Errors
/// If the request failed.
pub async fn list_referrals<L: Ledger>(
    ledger: &L,
    config: &PresaleConfig,
) -> Result<Vec<(Pubkey, ReferralPda)>> {
    let accounts = ledger
        .program_accounts(&config.program_id, ReferralPda::LEN as u64)
        .await?;
    Ok(accounts
        .into_iter()
        .filter_map(|(address, account)| {
            match ReferralPda::from_account_data(&account.data) {
                Ok(record) => Some((address, record)),
                Err(err) => {
                    warn!("skipping account {address}, not a referral record: {err}");
                    None
                }
            }
        })
        .collect())
}

/// List the referral records to reward at the TGE, with their owner.
///
/// Every account of the record size is kept, the owner being read from bytes `1..33`
/// without decoding the rest of the record.
///
/// # Parameters
/// * `ledger` - Access to the cluster,
/// * `config` - The presale configuration.
///
/// # Returns
/// * `(record, owner)` pairs.
///
/// # Errors
/// If the request failed.
pub async fn referral_owners<L: Ledger>(
    ledger: &L,
    config: &PresaleConfig,
) -> Result<Vec<(Pubkey, Pubkey)>> {
    let accounts = ledger
        .program_accounts(&config.program_id, ReferralPda::LEN as u64)
        .await?;
    Ok(accounts
        .into_iter()
        .filter_map(|(address, account)| {
            let owner = account
                .data
                .get(OWNER_OFFSET..OWNER_OFFSET + 32)
                .and_then(|bytes| Pubkey::try_from(bytes).ok());
            if owner.is_none() {
                warn!("skipping account {address}: no owner in {} bytes", account.data.len());
            }
            owner.map(|owner| (address, owner))
        })
        .collect())
}

/// Find the referral record registered with a code.
///
/// # Parameters
/// * `ledger` - Access to the cluster,
/// * `config` - The presale configuration,
/// * `code` - The code typed by the investor.
///
/// # Errors
/// If the request failed or no record uses this code.
pub async fn resolve_referral_code<L: Ledger>(
    ledger: &L,
    config: &PresaleConfig,
    code: &ReferralCode,
) -> Result<Pubkey> {
    list_referrals(ledger, config)
        .await?
        .into_iter()
        .find(|(_, record)| record.referral_code() == *code)
        .map(|(address, _)| address)
        .ok_or_else(|| Error::AccountResolution(format!("Referral code {code} not found")))
}
