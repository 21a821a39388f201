// File: kebapp-presale/src/accounts.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 11:02:15
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use kebapp_common::{debug, ledger::Ledger, Error, Result};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey, system_program};
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::{referral::resolve_referral_code, PresaleConfig, ReferralCode, ReferralPlacement, TokenSelector};

/// The SPL Token program (USDT is a classic SPL token).
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Get the USDT token account of a wallet.
///
/// # Parameters
/// * `config` - The presale configuration,
/// * `wallet` - Owner of the token account.
#[must_use]
pub fn usdt_account(config: &PresaleConfig, wallet: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(wallet, &config.usdt_mint, &TOKEN_PROGRAM_ID)
}

/// Ordered list of accounts for an investment.
///
/// The program reads the accounts by position, so the order is part of the instruction's ABI.
///
/// # Parameters
/// * `config` - The presale configuration,
/// * `token` - The token invested,
/// * `payer` - The investor,
/// * `referral_account` - The referral record to credit, if any.
#[must_use]
pub fn investment_accounts(
    config: &PresaleConfig,
    token: TokenSelector,
    payer: &Pubkey,
    referral_account: Option<Pubkey>,
) -> Vec<AccountMeta> {
    let mut accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(config.admin, false),
    ];
    match token {
        TokenSelector::Sol => {
            accounts.push(AccountMeta::new_readonly(system_program::ID, false));
        }
        TokenSelector::Usdt => {
            accounts.extend([
                AccountMeta::new(usdt_account(config, payer), false),
                AccountMeta::new(usdt_account(config, &config.admin), false),
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
                AccountMeta::new_readonly(*payer, true),
            ]);
        }
    }

    if let Some(referral) = referral_account {
        let referral = AccountMeta::new(referral, false);
        match config.token(token).referral_placement {
            ReferralPlacement::AfterAdmin => accounts.insert(2, referral),
            ReferralPlacement::Append => accounts.push(referral),
        }
    }
    accounts
}

/// Check that a wallet can send or receive USDT.
///
/// The associated token account is used when it exists, otherwise any token account of the
/// wallet for the USDT mint.
async fn find_usdt_account<L: Ledger>(
    ledger: &L,
    config: &PresaleConfig,
    wallet: &Pubkey,
    party: &str,
) -> Result<Pubkey> {
    let associated = usdt_account(config, wallet);
    if ledger.get_account(&associated).await?.is_some() {
        return Ok(associated);
    }
    debug!("no associated USDT account for {}, looking for others", wallet);
    ledger
        .token_accounts_by_owner(wallet, &config.usdt_mint)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::AccountResolution(format!("{party} USDT token account not found")))
}

/// Resolve all the accounts of an investment from the ledger.
///
/// # Parameters
/// * `ledger` - Access to the cluster,
/// * `config` - The presale configuration,
/// * `token` - The token invested,
/// * `payer` - The investor,
/// * `referral` - The referral code typed by the investor.
///
/// # Errors
/// If the referral code is not registered, or a USDT token account is missing.
pub async fn resolve_investment_accounts<L: Ledger>(
    ledger: &L,
    config: &PresaleConfig,
    token: TokenSelector,
    payer: &Pubkey,
    referral: Option<&ReferralCode>,
) -> Result<Vec<AccountMeta>> {
    let referral_account = match referral {
        Some(code) => Some(resolve_referral_code(ledger, config, code).await?),
        None => None,
    };
    let mut accounts = investment_accounts(config, token, payer, referral_account);

    if token == TokenSelector::Usdt {
        let payer_usdt = find_usdt_account(ledger, config, payer, "Your").await?;
        let admin_usdt = find_usdt_account(ledger, config, &config.admin, "Presale").await?;
        for meta in &mut accounts {
            if meta.pubkey == usdt_account(config, payer) {
                meta.pubkey = payer_usdt;
            } else if meta.pubkey == usdt_account(config, &config.admin) {
                meta.pubkey = admin_usdt;
            }
        }
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(accounts: &[AccountMeta]) -> Vec<Pubkey> {
        accounts.iter().map(|meta| meta.pubkey).collect()
    }

    #[test]
    fn sol_accounts() {
        let config = PresaleConfig::default();
        let payer = Pubkey::new_unique();
        let accounts = investment_accounts(&config, TokenSelector::Sol, &payer, None);
        assert_eq!(
            accounts,
            vec![
                AccountMeta::new(payer, true),
                AccountMeta::new(config.admin, false),
                AccountMeta::new_readonly(system_program::ID, false),
            ]
        );

        let referral = Pubkey::new_unique();
        let accounts = investment_accounts(&config, TokenSelector::Sol, &payer, Some(referral));
        assert_eq!(
            keys(&accounts),
            vec![payer, config.admin, referral, system_program::ID]
        );
        assert_eq!(accounts[2], AccountMeta::new(referral, false));
    }

    #[test]
    fn usdt_accounts() {
        let config = PresaleConfig::default();
        let payer = Pubkey::new_unique();
        let referral = Pubkey::new_unique();
        let accounts = investment_accounts(&config, TokenSelector::Usdt, &payer, Some(referral));
        assert_eq!(
            accounts,
            vec![
                AccountMeta::new(payer, true),
                AccountMeta::new(config.admin, false),
                AccountMeta::new(usdt_account(&config, &payer), false),
                AccountMeta::new(usdt_account(&config, &config.admin), false),
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
                AccountMeta::new_readonly(payer, true),
                AccountMeta::new(referral, false),
            ]
        );
    }

    #[test]
    fn configurable_placement() {
        let mut config = PresaleConfig::default();
        config.usdt.referral_placement = ReferralPlacement::AfterAdmin;
        config.sol.referral_placement = ReferralPlacement::Append;
        let payer = Pubkey::new_unique();
        let referral = Pubkey::new_unique();

        let accounts = investment_accounts(&config, TokenSelector::Usdt, &payer, Some(referral));
        assert_eq!(accounts[2].pubkey, referral);
        assert_eq!(accounts.len(), 7);

        let accounts = investment_accounts(&config, TokenSelector::Sol, &payer, Some(referral));
        assert_eq!(accounts.last().map(|meta| meta.pubkey), Some(referral));
    }
}
