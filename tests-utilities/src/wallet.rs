// File: tests-utilities/src/wallet.rs
// Project: kebapp-presale
// Creation date: Monday 25 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Tuesday 03 December 2024 @ 12:40:17
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use kebapp_common::{
    wallet::{KeypairWallet, WalletProvider},
    WalletError,
};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, transaction::Transaction};
use tokio::sync::watch;

/// Keypair wallet whose answers can be scripted by the tests.
pub struct ScriptedWallet {
    inner: KeypairWallet,
    installed: AtomicBool,
    reject_signatures: AtomicBool,
    signature_requests: AtomicUsize,
}

impl ScriptedWallet {
    /// Creates a new (disconnected) wallet.
    #[must_use]
    pub fn new(name: &str, keypair: Keypair) -> Self {
        Self {
            inner: KeypairWallet::new(name, keypair),
            installed: AtomicBool::new(true),
            reject_signatures: AtomicBool::new(false),
            signature_requests: AtomicUsize::new(0),
        }
    }

    /// Pretend the wallet extension is not installed.
    pub fn uninstall(&self) {
        self.installed.store(false, Ordering::SeqCst);
    }

    /// Make the user refuse (or accept again) the signature requests.
    pub fn reject_signatures(&self, reject: bool) {
        self.reject_signatures.store(reject, Ordering::SeqCst);
    }

    /// Select another account in the wallet.
    pub fn switch_account(&self, keypair: Keypair) {
        self.inner.switch_account(keypair);
    }

    /// Number of signature requests received.
    #[must_use]
    pub fn signature_requests(&self) -> usize {
        self.signature_requests.load(Ordering::SeqCst)
    }
}

impl WalletProvider for ScriptedWallet {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn connect(&self) -> Result<Pubkey, WalletError> {
        if !self.installed.load(Ordering::SeqCst) {
            return Err(WalletError::NotFound(self.inner.name().to_owned()));
        }
        self.inner.connect().await
    }

    async fn disconnect(&self) {
        self.inner.disconnect().await;
    }

    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError> {
        self.signature_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_signatures.load(Ordering::SeqCst) {
            return Err(WalletError::Rejected);
        }
        self.inner.sign_transaction(transaction).await
    }

    fn on_account_change(&self) -> watch::Receiver<Option<Pubkey>> {
        self.inner.on_account_change()
    }
}
