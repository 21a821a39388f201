// File: kebapp-presale/src/tge.rs
// Project: kebapp-presale
// Creation date: Thursday 21 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Thursday 05 December 2024 @ 14:02:11
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use kebapp_common::{
    debug,
    ledger::Ledger,
    pda::{find_program_address, Seed},
    wallet::WalletProvider,
    Error, Result, ValidationError,
};
use log::info;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use solana_sdk::signature::Signature;

use crate::{
    accounts::TOKEN_PROGRAM_ID, referral::referral_owners, PresaleConfig, PresaleInstruction,
    Submitter,
};

/// Seed of the PDA allowed to mint KEBAB.
pub const MINT_AUTHORITY_SEED: &str = "mint_authority";
/// Seed of the PDA holding the distribution state.
pub const DISTRIBUTION_SEED: &str = "distribution";

/// Address of the KEBAB mint authority.
#[must_use]
pub fn mint_authority_address(program_id: &Pubkey) -> Pubkey {
    find_program_address([Seed::from(MINT_AUTHORITY_SEED)], program_id).0
}

/// Address of the distribution state.
#[must_use]
pub fn distribution_address(program_id: &Pubkey) -> Pubkey {
    find_program_address([Seed::from(DISTRIBUTION_SEED)], program_id).0
}

/// Creates a `TriggerTge` instruction.
///
/// Each referral record is followed by its owner, in the order given.
///
/// # Parameters
/// * `config` - The presale configuration,
/// * `admin` - The signer, must be the presale admin,
/// * `referrals` - The referral records to reward, as `(record, owner)` pairs.
///
/// # Errors
/// `Unauthorized` if `admin` is not the presale admin.
pub fn trigger_tge(
    config: &PresaleConfig,
    admin: &Pubkey,
    referrals: &[(Pubkey, Pubkey)],
) -> Result<Instruction> {
    if *admin != config.admin {
        return Err(Error::Unauthorized);
    }

    let mut accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new(config.kebab_mint, false),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(mint_authority_address(&config.program_id), false),
        AccountMeta::new(distribution_address(&config.program_id), false),
    ];
    accounts.reserve(referrals.len() * 2);
    for (record, owner) in referrals {
        accounts.push(AccountMeta::new(*record, false));
        accounts.push(AccountMeta::new(*owner, false));
    }

    Ok(Instruction {
        program_id: config.program_id,
        accounts,
        data: PresaleInstruction::TriggerTge.pack(),
    })
}

/// Triggers the token generation event from the admin wallet.
pub struct TgeTrigger<'a, L, W> {
    submitter: &'a Submitter<L, W>,
}

impl<'a, L: Ledger, W: WalletProvider> TgeTrigger<'a, L, W> {
    /// Create a new trigger sending through `submitter`.
    #[must_use]
    pub const fn new(submitter: &'a Submitter<L, W>) -> Self {
        Self { submitter }
    }

    /// Whether the connected wallet is the presale admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.submitter.session().address() == Some(self.submitter.config().admin)
    }

    /// Distribute the KEBAB tokens and the referral rewards.
    ///
    /// The admin check happens before anything is read from the ledger.
    ///
    /// # Errors
    /// If no wallet is connected, the wallet is not the admin, the referrals could not be
    /// listed, or the transaction failed.
    pub async fn execute(&self) -> Result<Signature> {
        let prepared = self.prepare().await;
        let instruction = self.submitter.report(prepared)?;
        let signature = self
            .submitter
            .execute(instruction, "TGE triggered successfully!")
            .await?;
        info!("TGE triggered: {signature}");
        Ok(signature)
    }

    async fn prepare(&self) -> Result<Instruction> {
        let config = self.submitter.config();
        let admin = self
            .submitter
            .session()
            .address()
            .ok_or(Error::Validation(ValidationError::WalletNotConnected))?;
        if admin != config.admin {
            return Err(Error::Unauthorized);
        }
        let referrals = referral_owners(self.submitter.ledger().as_ref(), config).await?;
        debug!("rewarding {} referral records", referrals.len());
        trigger_tge(config, &admin, &referrals)
    }
}
