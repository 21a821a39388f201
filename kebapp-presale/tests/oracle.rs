// File: kebapp-presale/tests/oracle.rs
// Project: kebapp-presale
// Creation date: Friday 29 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Thursday 05 December 2024 @ 17:36:20
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

#![allow(clippy::tests_outside_test_module)]
#![allow(clippy::panic_in_result_fn)]
#![allow(clippy::unwrap_used)]

type Error = Box<dyn error::Error>;
type Result<T> = result::Result<T, Error>;

use std::{error, result, time::Duration};

use kebapp_common::ValidationError;
use kebapp_presale::{OracleCache, TokenSelector};
use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use tokio::sync::watch;

pub mod common;

#[tokio::test]
async fn balances() -> Result<()> {
    let client = common::init_connected().await;
    let investor = client.investor();
    let mint = client.config.usdt_mint;
    client
        .ledger()
        .set_balance(&client.admin(), 3 * LAMPORTS_PER_SOL);
    client.ledger().add_token_account(&investor, &mint, 12_500_000);
    client
        .ledger()
        .add_token_account_at(&Pubkey::new_unique(), &investor, &mint, 500_000);
    // someone else's USDT
    client
        .ledger()
        .add_token_account(&Pubkey::new_unique(), &mint, 1_000_000);

    client.oracle.poll_balances().await?;
    let cache = client.oracle.cache();
    assert_eq!(cache.raised, Some(3.0));
    assert_eq!(cache.sol_balance, Some(10.0));
    assert_eq!(cache.usdt_balance, Some(13.0));
    assert!(cache.balances_updated_at.is_some());
    assert_eq!(client.store.get_state().on_chain_raised, Some(3.0));
    Ok(())
}

#[tokio::test]
async fn no_wallet_no_balances() -> Result<()> {
    let client = common::init();
    client.oracle.poll_balances().await?;
    let cache = client.oracle.cache();
    assert_eq!(cache.raised, Some(0.0));
    assert_eq!(cache.sol_balance, None);
    assert_eq!(cache.usdt_balance, None);
    Ok(())
}

#[tokio::test]
async fn failures_keep_previous_values() -> Result<()> {
    let client = common::init_connected().await;
    client.oracle.poll_balances().await?;
    client.oracle.poll_price().await?;
    let before = client.oracle.cache();
    assert_eq!(before.sol_price_usd, Some(150.0));
    assert_eq!(before.raised_usd(), Some(0.0));

    client.ledger().set_offline(true);
    client.oracle.feed().set(None);
    assert!(client.oracle.poll_balances().await.is_err());
    assert!(client.oracle.poll_price().await.is_err());
    assert_eq!(client.oracle.cache(), before);
    Ok(())
}

#[tokio::test]
async fn stopped_oracle_publishes_nothing() -> Result<()> {
    let client = common::init_connected().await;
    client.oracle.stop();
    client.oracle.poll_balances().await?;
    client.oracle.poll_price().await?;
    assert_eq!(client.oracle.cache(), OracleCache::default());
    assert_eq!(client.store.get_state().on_chain_raised, None);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn polling_until_shutdown() {
    let client = common::init_connected().await;
    let (shutdown, signal) = watch::channel(false);

    let ledger = client.ledger();
    tokio::join!(client.oracle.run(signal), async {
        // first ticks are immediate, then every 10 s
        tokio::time::sleep(Duration::from_secs(25)).await;
        ledger.set_balance(&client.admin(), LAMPORTS_PER_SOL);
        tokio::time::sleep(Duration::from_secs(10)).await;
        shutdown.send(true).unwrap();
    });

    let cache = client.oracle.cache();
    assert_eq!(cache.raised, Some(1.0));
    assert_eq!(cache.sol_price_usd, Some(150.0));

    // late results are dropped once stopped
    ledger.set_balance(&client.admin(), 2 * LAMPORTS_PER_SOL);
    client.oracle.poll_balances().await.unwrap();
    assert_eq!(client.oracle.cache(), cache);
    assert_eq!(client.store.get_state().on_chain_raised, Some(1.0));
}

#[tokio::test]
async fn validation_uses_ledger_total() -> Result<()> {
    let client = common::init_with(|config| config.hard_cap = 100.0);
    let client = common::connect(client).await;
    client
        .ledger()
        .set_balance(&client.admin(), 99 * LAMPORTS_PER_SOL + LAMPORTS_PER_SOL / 2);
    client.oracle.poll_balances().await?;

    assert_eq!(
        client.oracle.validate(TokenSelector::Sol, "1"),
        Err(ValidationError::HardCapExceeded)
    );
    assert_eq!(client.oracle.validate(TokenSelector::Sol, "0.5"), Ok(0.5));
    assert_eq!(
        client.oracle.validate(TokenSelector::Usdt, "49"),
        Err(ValidationError::BelowMinimum {
            minimum: 50.0,
            symbol: "USDT".to_owned()
        })
    );
    Ok(())
}
