// File: kebapp-presale/src/session.rs
// Project: kebapp-presale
// Creation date: Wednesday 20 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Monday 02 December 2024 @ 17:30:18
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use kebapp_common::{
    debug,
    notification::{Notification, Notifier},
    truncate_address,
    wallet::WalletProvider,
    Error, Result, WalletError,
};
use solana_program::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use tokio::sync::watch;

/// Connection of the investor's wallet.
///
/// The address follows the account selected in the wallet.
pub struct WalletSession<W> {
    wallet: W,
    address: watch::Receiver<Option<Pubkey>>,
    notifier: Notifier,
}

impl<W: WalletProvider> WalletSession<W> {
    /// Create a session for the wallet chosen by the investor.
    ///
    /// # Parameters
    /// * `wallet` - The wallet adapter,
    /// * `notifier` - Where the investor notifications go.
    #[must_use]
    pub fn new(wallet: W, notifier: Notifier) -> Self {
        let address = wallet.on_account_change();
        Self {
            wallet,
            address,
            notifier,
        }
    }

    /// Connect the wallet.
    ///
    /// # Errors
    /// If the wallet refused or is not available.
    pub async fn connect(&self) -> Result<Pubkey> {
        match self.wallet.connect().await {
            Ok(address) => {
                debug!("{} connected to {}", self.wallet.name(), address);
                self.notifier.notify(Notification::success(format!(
                    "Connected to {}",
                    truncate_address(&address)
                )));
                Ok(address)
            }
            Err(err) => {
                let err = Error::from(err);
                self.notifier.notify(err.notification());
                Err(err)
            }
        }
    }

    /// Disconnect the wallet.
    pub async fn disconnect(&self) {
        self.wallet.disconnect().await;
    }

    /// Address of the connected account.
    #[must_use]
    pub fn address(&self) -> Option<Pubkey> {
        *self.address.borrow()
    }

    /// Shortened address of the connected account, for display.
    #[must_use]
    pub fn truncated_address(&self) -> Option<String> {
        self.address().as_ref().map(truncate_address)
    }

    /// Follow the connected account.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Pubkey>> {
        self.address.clone()
    }

    /// The wallet adapter.
    #[must_use]
    pub const fn wallet(&self) -> &W {
        &self.wallet
    }

    /// Ask the wallet to sign a transaction.
    ///
    /// # Errors
    /// If the wallet is disconnected or the investor refused.
    pub async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, WalletError> {
        if self.address().is_none() {
            return Err(WalletError::NotConnected);
        }
        self.wallet.sign_transaction(transaction).await
    }
}
