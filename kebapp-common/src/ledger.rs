// File: kebapp-common/src/ledger.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Monday 02 December 2024 @ 15:31:07
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};

use crate::LedgerError;

/// Recent block reference a transaction is built against.
///
/// A transaction stays valid until the cluster passes `last_valid_block_height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    /// Recent blockhash of the transaction.
    pub blockhash: Hash,
    /// Last block height at which the transaction can be included.
    pub last_valid_block_height: u64,
}

/// Final outcome of a sent transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    /// The transaction reached the requested commitment.
    Confirmed,
    /// The transaction was included but failed.
    Failed(LedgerError),
    /// The anchor expired before the transaction was included.
    Expired,
}

/// Access to the remote ledger.
///
/// Every call is a network round trip; nothing is cached by implementors.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    /// Balance of an account, in lamports.
    ///
    /// # Errors
    /// If the request failed.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError>;

    /// Latest blockhash and its expiry height.
    ///
    /// # Errors
    /// If the request failed.
    async fn latest_anchor(&self) -> Result<Anchor, LedgerError>;

    /// Send a signed transaction.
    ///
    /// # Errors
    /// If the cluster refused the transaction (preflight failure for example).
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError>;

    /// Wait for the outcome of a sent transaction.
    ///
    /// # Errors
    /// If the status could not be queried.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        anchor: &Anchor,
    ) -> Result<Confirmation, LedgerError>;

    /// Get an account, `None` if it does not exist.
    ///
    /// # Errors
    /// If the request failed.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError>;

    /// Addresses of the token accounts of `owner` for `mint`.
    ///
    /// # Errors
    /// If the request failed.
    async fn token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>, LedgerError>;

    /// Accounts owned by a program whose data has exactly `data_size` bytes.
    ///
    /// # Errors
    /// If the request failed.
    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        data_size: u64,
    ) -> Result<Vec<(Pubkey, Account)>, LedgerError>;
}
