// File: kebapp-common/src/wallet.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Monday 02 December 2024 @ 16:02:44
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::sync::{PoisonError, RwLock};

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use tokio::sync::watch;

use crate::{debug, WalletError};

/// A wallet able to sign transactions for the investor.
///
/// The wallet is selected explicitly by the caller; there is no auto-detection.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Name of the wallet (shown in messages).
    fn name(&self) -> &str;

    /// Ask the wallet for access to its account.
    ///
    /// # Errors
    /// If the wallet is unavailable or the user refused.
    async fn connect(&self) -> Result<Pubkey, WalletError>;

    /// Release the connection to the wallet.
    async fn disconnect(&self);

    /// Sign a transaction whose blockhash is already set.
    ///
    /// # Errors
    /// If the wallet is not connected, or the user refused to sign.
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError>;

    /// Follow the account selected in the wallet (`None` when disconnected).
    fn on_account_change(&self) -> watch::Receiver<Option<Pubkey>>;
}

/// A wallet backed by a local keypair.
pub struct KeypairWallet {
    name: String,
    keypair: RwLock<Keypair>,
    account: watch::Sender<Option<Pubkey>>,
}

impl KeypairWallet {
    /// Create a new (disconnected) wallet.
    ///
    /// # Parameters
    /// * `name` - Name of the wallet,
    /// * `keypair` - The keypair used to sign.
    #[must_use]
    pub fn new<S: Into<String>>(name: S, keypair: Keypair) -> Self {
        let (account, _) = watch::channel(None);
        Self {
            name: name.into(),
            keypair: RwLock::new(keypair),
            account,
        }
    }

    /// Address of the keypair, connected or not.
    #[must_use]
    pub fn pubkey(&self) -> Pubkey {
        self.keypair
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pubkey()
    }

    /// Select another account in the wallet.
    ///
    /// Subscribers are notified if the wallet is connected.
    ///
    /// # Parameters
    /// * `keypair` - The new account's keypair.
    pub fn switch_account(&self, keypair: Keypair) {
        let pubkey = keypair.pubkey();
        *self.keypair.write().unwrap_or_else(PoisonError::into_inner) = keypair;
        self.account.send_if_modified(|account| {
            if account.is_some() {
                *account = Some(pubkey);
                true
            } else {
                false
            }
        });
    }

    fn is_connected(&self) -> bool {
        self.account.borrow().is_some()
    }
}

impl WalletProvider for KeypairWallet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<Pubkey, WalletError> {
        let pubkey = self.pubkey();
        debug!("{} wallet connected to {}", self.name, pubkey);
        self.account.send_replace(Some(pubkey));
        Ok(pubkey)
    }

    async fn disconnect(&self) {
        debug!("{} wallet disconnected", self.name);
        self.account.send_replace(None);
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, WalletError> {
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }
        let keypair = self.keypair.read().unwrap_or_else(PoisonError::into_inner);
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[&*keypair], blockhash)
            .map_err(|err| WalletError::Signing(err.to_string()))?;
        Ok(transaction)
    }

    fn on_account_change(&self) -> watch::Receiver<Option<Pubkey>> {
        self.account.subscribe()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use solana_sdk::{hash::Hash, system_instruction};

    use super::*;

    fn transfer(from: &Pubkey) -> Transaction {
        let instruction = system_instruction::transfer(from, &Pubkey::new_unique(), 1_000);
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(from));
        transaction.message.recent_blockhash = Hash::new_unique();
        transaction
    }

    #[tokio::test]
    async fn sign_requires_connection() {
        let wallet = KeypairWallet::new("Phantom", Keypair::new());
        let transaction = transfer(&wallet.pubkey());
        assert_eq!(
            wallet.sign_transaction(transaction.clone()).await.unwrap_err(),
            WalletError::NotConnected
        );

        wallet.connect().await.unwrap();
        let signed = wallet.sign_transaction(transaction).await.unwrap();
        assert!(signed.is_signed(), "transaction should be signed");
        assert!(signed.verify().is_ok(), "signature should be valid");
    }

    #[tokio::test]
    async fn account_changes_are_published() {
        let wallet = KeypairWallet::new("Solflare", Keypair::new());
        let mut changes = wallet.on_account_change();
        assert_eq!(*changes.borrow_and_update(), None);

        let pubkey = wallet.connect().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), Some(pubkey));

        let other = Keypair::new();
        let other_pubkey = other.pubkey();
        wallet.switch_account(other);
        assert!(changes.has_changed().unwrap(), "account change should be seen");
        assert_eq!(*changes.borrow_and_update(), Some(other_pubkey));

        wallet.disconnect().await;
        assert_eq!(*changes.borrow_and_update(), None);
    }
}
