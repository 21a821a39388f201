// File: tests-utilities/src/ledger.rs
// Project: kebapp-presale
// Creation date: Monday 25 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 10:05:51
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::{
    collections::HashMap,
    future,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use kebapp_common::{
    ledger::{Anchor, Confirmation, Ledger},
    LedgerError,
};
use solana_program::{program_option::COption, program_pack::Pack as _};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, system_program,
    transaction::Transaction,
};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_token_2022::{
    extension::StateWithExtensions,
    state::{self, AccountState},
};

/// The SPL Token program.
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Last valid block height of the anchors handed out by the mock.
pub const LAST_VALID_BLOCK_HEIGHT: u64 = 1_000;

/// What happens when a transaction is sent.
#[derive(Clone, Debug)]
pub enum SendOutcome {
    /// The transaction is accepted.
    Accept,
    /// The transaction is refused (preflight failure for example).
    Reject(LedgerError),
}

/// What happens when a sent transaction is confirmed.
#[derive(Clone, Debug)]
pub enum ConfirmOutcome {
    /// Confirmed after the configured delay.
    Confirmed,
    /// Failed on-chain with the given error.
    Failed(LedgerError),
    /// The blockhash expired.
    Expired,
    /// Never confirmed.
    Pending,
}

#[derive(Debug)]
struct State {
    balances: HashMap<Pubkey, u64>,
    accounts: HashMap<Pubkey, Account>,
    send: SendOutcome,
    confirm: ConfirmOutcome,
    confirm_delay: Duration,
    offline: bool,
    sent: Vec<Transaction>,
    requests: usize,
}

/// In-memory ledger used in the tests.
///
/// Counts every request so tests can check that nothing reached the network.
#[derive(Debug)]
pub struct MockLedger {
    state: Mutex<State>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Creates an empty ledger accepting and confirming every transaction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                balances: HashMap::new(),
                accounts: HashMap::new(),
                send: SendOutcome::Accept,
                confirm: ConfirmOutcome::Confirmed,
                confirm_delay: Duration::ZERO,
                offline: false,
                sent: Vec::new(),
                requests: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Lock the state for a request, failing if the ledger is offline.
    fn request(&self) -> Result<MutexGuard<'_, State>, LedgerError> {
        let mut state = self.lock();
        state.requests += 1;
        if state.offline {
            return Err(LedgerError::new("node unavailable"));
        }
        Ok(state)
    }

    /// Set the lamports of a wallet.
    pub fn set_balance(&self, address: &Pubkey, lamports: u64) {
        self.lock().balances.insert(*address, lamports);
    }

    /// Make every request fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Choose what happens to the next transactions sent.
    pub fn set_send_outcome(&self, outcome: SendOutcome) {
        self.lock().send = outcome;
    }

    /// Choose what happens when the next transactions are confirmed.
    ///
    /// # Parameters
    /// * `outcome` - The outcome of the confirmation,
    /// * `delay` - How long the confirmation takes.
    pub fn set_confirm_outcome(&self, outcome: ConfirmOutcome, delay: Duration) {
        let mut state = self.lock();
        state.confirm = outcome;
        state.confirm_delay = delay;
    }

    /// Add (or replace) an account.
    pub fn add_account(&self, address: &Pubkey, account: Account) {
        self.lock().accounts.insert(*address, account);
    }

    /// Add an account owned by a program.
    ///
    /// # Parameters
    /// * `program_id` - Owner of the account,
    /// * `address` - Address of the account,
    /// * `data` - Raw data of the account.
    pub fn add_program_account(&self, program_id: &Pubkey, address: &Pubkey, data: Vec<u8>) {
        self.add_account(
            address,
            Account {
                lamports: 1_000_000,
                data,
                owner: *program_id,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    /// Add a token account at a given address.
    pub fn add_token_account_at(&self, address: &Pubkey, owner: &Pubkey, mint: &Pubkey, amount: u64) {
        let token_account = state::Account {
            mint: *mint,
            owner: *owner,
            amount,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        };
        let mut data = vec![0; state::Account::LEN];
        state::Account::pack(token_account, &mut data).unwrap();
        self.add_program_account(&TOKEN_PROGRAM_ID, address, data);
    }

    /// Add the associated token account of a wallet.
    ///
    /// # Returns
    /// * Address of the token account.
    pub fn add_token_account(&self, owner: &Pubkey, mint: &Pubkey, amount: u64) -> Pubkey {
        let address = get_associated_token_address_with_program_id(owner, mint, &TOKEN_PROGRAM_ID);
        self.add_token_account_at(&address, owner, mint, amount);
        address
    }

    /// Transactions accepted by the ledger, in order.
    #[must_use]
    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.lock().sent.clone()
    }

    /// Number of requests received.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }
}

impl Ledger for MockLedger {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        let state = self.request()?;
        Ok(state.balances.get(address).copied().unwrap_or_default())
    }

    async fn latest_anchor(&self) -> Result<Anchor, LedgerError> {
        let state = self.request()?;
        Ok(Anchor {
            blockhash: Hash::new_from_array([u8::try_from(state.sent.len() % 256).unwrap(); 32]),
            last_valid_block_height: LAST_VALID_BLOCK_HEIGHT,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        let mut state = self.request()?;
        if let SendOutcome::Reject(err) = &state.send {
            return Err(err.clone());
        }
        assert!(
            transaction.is_signed(),
            "transactions must be signed before being sent"
        );
        state.sent.push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _anchor: &Anchor,
    ) -> Result<Confirmation, LedgerError> {
        let (outcome, delay) = {
            let state = self.request()?;
            (state.confirm.clone(), state.confirm_delay)
        };
        tokio::time::sleep(delay).await;
        match outcome {
            ConfirmOutcome::Confirmed => Ok(Confirmation::Confirmed),
            ConfirmOutcome::Failed(err) => Ok(Confirmation::Failed(err)),
            ConfirmOutcome::Expired => Ok(Confirmation::Expired),
            ConfirmOutcome::Pending => future::pending().await,
        }
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let state = self.request()?;
        Ok(state.accounts.get(address).cloned())
    }

    async fn token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>, LedgerError> {
        let state = self.request()?;
        let mut found: Vec<Pubkey> = state
            .accounts
            .iter()
            .filter(|(_, account)| account.owner == TOKEN_PROGRAM_ID)
            .filter_map(|(address, account)| {
                let token = StateWithExtensions::<state::Account>::unpack(&account.data).ok()?;
                (token.base.owner == *owner && token.base.mint == *mint).then_some(*address)
            })
            .collect();
        found.sort();
        Ok(found)
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        data_size: u64,
    ) -> Result<Vec<(Pubkey, Account)>, LedgerError> {
        let state = self.request()?;
        let mut found: Vec<(Pubkey, Account)> = state
            .accounts
            .iter()
            .filter(|(_, account)| {
                account.owner == *program_id && account.data.len() as u64 == data_size
            })
            .map(|(address, account)| (*address, account.clone()))
            .collect();
        found.sort_by_key(|(address, _)| *address);
        Ok(found)
    }
}

/// A system account holding `lamports`.
#[must_use]
pub fn system_account(lamports: u64) -> Account {
    Account::new(lamports, 0, &system_program::ID)
}
