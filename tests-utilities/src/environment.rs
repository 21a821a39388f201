// File: tests-utilities/src/environment.rs
// Project: kebapp-presale
// Creation date: Monday 25 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 10:11:32
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::{collections::HashMap, sync::Arc};

use solana_sdk::{
    pubkey::Pubkey,
    signature::{keypair_from_seed_phrase_and_passphrase, Keypair},
    signer::Signer,
};

use crate::{ledger::MockLedger, wallet::ScriptedWallet};

/// Environment used for the client tests.
pub struct Environment {
    /// The ledger the client talks to
    pub ledger: Arc<MockLedger>,
    /// Map of Name - Keypair for all wallets used in the tests
    pub wallets: HashMap<String, Keypair>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates a new testing environment with an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        println!("Creating environment");
        Self {
            ledger: Arc::new(MockLedger::new()),
            wallets: HashMap::new(),
        }
    }

    /// Adds a new wallet to the testing environment.
    ///
    /// The keypair is derived from the name, so it is the same across tests.
    ///
    /// # Parameters
    /// * `name` - Name of the wallet's owner,
    /// * `lamports` - Initial balance of the wallet.
    ///
    /// # Returns
    /// * Pubkey of the wallet.
    ///
    /// # Panics
    /// If the keypair couldn't be generated
    pub fn add_wallet(&mut self, name: &str, lamports: u64) -> Pubkey {
        println!("adding wallet for user '{name}'");
        let keypair = keypair_from_seed_phrase_and_passphrase(name, "passphrase").unwrap();
        let key = keypair.pubkey();
        self.wallets.insert(name.into(), keypair);
        self.ledger.set_balance(&key, lamports);
        key
    }

    /// Get the address of a wallet.
    ///
    /// # Panics
    /// If the wallet was not added.
    #[must_use]
    pub fn pubkey(&self, name: &str) -> Pubkey {
        let Some(keypair) = self.wallets.get(name) else {
            panic!("no wallet named '{name}' in the environment");
        };
        keypair.pubkey()
    }

    /// Get a copy of the keypair of a wallet.
    ///
    /// # Panics
    /// If the wallet was not added.
    #[must_use]
    pub fn keypair(&self, name: &str) -> Keypair {
        let Some(keypair) = self.wallets.get(name) else {
            panic!("no wallet named '{name}' in the environment");
        };
        Keypair::from_bytes(&keypair.to_bytes()).unwrap()
    }

    /// Creates a (disconnected) browser wallet holding the keypair of `name`.
    ///
    /// # Panics
    /// If the wallet was not added.
    #[must_use]
    pub fn wallet(&self, name: &str) -> ScriptedWallet {
        ScriptedWallet::new("Phantom", self.keypair(name))
    }
}
