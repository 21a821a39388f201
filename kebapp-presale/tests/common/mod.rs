// File: kebapp-presale/tests/common/mod.rs
// Project: kebapp-presale
// Creation date: Tuesday 26 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Thursday 05 December 2024 @ 16:48:12
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

#![allow(clippy::panic)]
#![allow(clippy::print_stdout)]
#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use kebapp_common::{
    notification::{Notification, Notifier},
    Error, Result,
};
use kebapp_presale::{
    referral_code_for, Oracle, PresaleConfig, PresaleStore, PriceFeed, ReferralPda, Submitter,
    WalletSession,
};
use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use tests_utilities::{ledger::MockLedger, wallet::ScriptedWallet, Environment};
use tokio::sync::mpsc::UnboundedReceiver;

pub const INVESTOR: &str = "alice";
pub const ADMIN: &str = "admin";
pub const INVESTOR_LAMPORTS: u64 = 10 * LAMPORTS_PER_SOL;

/// Price feed returning a fixed price, or failing when unset.
pub struct FixedPrice(pub Mutex<Option<f64>>);

impl FixedPrice {
    pub fn new(price: f64) -> Self {
        Self(Mutex::new(Some(price)))
    }

    pub fn set(&self, price: Option<f64>) {
        *self.0.lock().unwrap() = price;
    }
}

impl PriceFeed for FixedPrice {
    async fn fetch_sol_price(&self) -> Result<f64> {
        self.0
            .lock()
            .unwrap()
            .ok_or_else(|| Error::PriceFeed("price feed unavailable".to_owned()))
    }
}

/// A presale client wired to the mock ledger.
pub struct Client {
    pub env: Environment,
    pub config: Arc<PresaleConfig>,
    pub store: Arc<PresaleStore>,
    pub session: Arc<WalletSession<ScriptedWallet>>,
    pub oracle: Oracle<MockLedger, FixedPrice>,
    pub submitter: Submitter<MockLedger, ScriptedWallet>,
    pub notifications: UnboundedReceiver<Notification>,
}

impl Client {
    pub fn ledger(&self) -> &MockLedger {
        &self.env.ledger
    }

    pub fn investor(&self) -> Pubkey {
        self.env.pubkey(INVESTOR)
    }

    pub fn admin(&self) -> Pubkey {
        self.env.pubkey(ADMIN)
    }

    /// All the notifications received so far.
    pub fn notifications(&mut self) -> Vec<Notification> {
        let mut received = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            received.push(notification);
        }
        received
    }

    /// Register a referral record for `owner` on the ledger.
    ///
    /// # Returns
    /// * Address of the record.
    pub fn add_referral(&self, owner: &Pubkey) -> Pubkey {
        let record = ReferralPda {
            is_initialized: true,
            owner: *owner,
            code: referral_code_for(owner).to_bytes(),
            total_volume: 0,
            referral_count: 0,
            reward_bps: 500,
        };
        let address = ReferralPda::get_address(owner, &self.config.program_id);
        self.ledger().add_program_account(
            &self.config.program_id,
            &address,
            borsh::to_vec(&record).unwrap(),
        );
        address
    }
}

/// Creates a client for the investor, with a presale ending in a week.
pub fn init() -> Client {
    init_with(|_| {})
}

/// Creates a client for the investor, after adjusting the configuration.
pub fn init_with<F: FnOnce(&mut PresaleConfig)>(adjust: F) -> Client {
    init_for(INVESTOR, adjust)
}

/// Creates a client whose browser wallet holds the keypair of `user`.
pub fn init_for<F: FnOnce(&mut PresaleConfig)>(user: &str, adjust: F) -> Client {
    let mut env = Environment::new();
    env.add_wallet(INVESTOR, INVESTOR_LAMPORTS);
    let admin = env.add_wallet(ADMIN, 0);

    let mut config = PresaleConfig {
        admin,
        end_date: Utc::now() + Duration::days(7),
        ..PresaleConfig::default()
    };
    adjust(&mut config);
    let config = Arc::new(config);

    let (notifier, notifications) = Notifier::channel();
    let store = Arc::new(PresaleStore::new(config.hard_cap, notifier.clone()));
    let session = Arc::new(WalletSession::new(env.wallet(user), notifier.clone()));
    let oracle = Oracle::new(
        Arc::clone(&env.ledger),
        FixedPrice::new(150.0),
        Arc::clone(&config),
        Arc::clone(&store),
        session.subscribe(),
    );
    let submitter = Submitter::new(
        Arc::clone(&env.ledger),
        Arc::clone(&session),
        Arc::clone(&config),
        Arc::clone(&store),
        oracle.subscribe(),
        notifier,
    );

    Client {
        env,
        config,
        store,
        session,
        oracle,
        submitter,
        notifications,
    }
}

/// Creates a client whose investor wallet is already connected.
pub async fn init_connected() -> Client {
    connect(init()).await
}

/// Connect the wallet of the client, dropping the connection notification.
pub async fn connect(mut client: Client) -> Client {
    let Ok(_) = client.session.connect().await else {
        panic!("could not connect the wallet");
    };
    client.notifications();
    client
}
