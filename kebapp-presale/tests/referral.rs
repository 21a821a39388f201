// File: kebapp-presale/tests/referral.rs
// Project: kebapp-presale
// Creation date: Wednesday 27 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Thursday 05 December 2024 @ 17:10:03
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

#![allow(clippy::tests_outside_test_module)]
#![allow(clippy::panic_in_result_fn)]
#![allow(clippy::indexing_slicing)]

type Error = Box<dyn error::Error>;
type Result<T> = result::Result<T, Error>;

use std::{error, result};

use kebapp_common::{
    notification::{Notification, NotificationKind},
    pda::PresalePda as _,
    EncodingError, Error as PresaleError,
};
use kebapp_presale::{
    referral::{fetch_referral, list_referrals, referral_owners, resolve_referral_code},
    referral_code_for, referral_link, PresaleInstruction, ReferralCode, ReferralPda,
    SubmissionState, TokenSelector,
};
use solana_sdk::pubkey::Pubkey;

pub mod common;

#[tokio::test]
async fn register_new_code() -> Result<()> {
    let mut client = common::init_connected().await;
    let investor = client.investor();

    let code = client.submitter.register_referral().await?;
    assert_eq!(code, referral_code_for(&investor));
    assert_eq!(code.as_str(), &investor.to_string()[..8]);

    let sent = client.ledger().sent_transactions();
    assert_eq!(sent.len(), 1);
    let message = &sent[0].message;
    let instruction = &message.instructions[0];
    assert_eq!(
        PresaleInstruction::unpack(&instruction.data)?,
        PresaleInstruction::GenerateReferral(code)
    );
    assert_eq!(
        message.account_keys[usize::from(instruction.accounts[1])],
        ReferralPda::get_address(&investor, &client.config.program_id)
    );
    assert!(matches!(
        client.submitter.state(),
        SubmissionState::Succeeded(_)
    ));
    assert_eq!(
        client.notifications(),
        vec![Notification::success(format!("Referral code {code} generated"))]
    );
    Ok(())
}

#[tokio::test]
async fn existing_code_is_not_sent_again() -> Result<()> {
    let mut client = common::init_connected().await;
    let investor = client.investor();
    client.add_referral(&investor);

    let code = client.submitter.register_referral().await?;
    assert_eq!(code, referral_code_for(&investor));
    assert!(client.ledger().sent_transactions().is_empty());
    assert_eq!(client.submitter.state(), SubmissionState::Idle);

    let notifications = client.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Info);
    assert_eq!(
        referral_link(&code),
        format!("https://kebappcoin.io/ref/{code}")
    );
    Ok(())
}

#[tokio::test]
async fn lookup() -> Result<()> {
    let client = common::init();
    let owners = [Pubkey::new_unique(), Pubkey::new_unique()];
    let addresses = owners.map(|owner| client.add_referral(&owner));
    // right size, wrong content
    let unreadable = Pubkey::new_unique();
    client.ledger().add_program_account(
        &client.config.program_id,
        &unreadable,
        vec![0; ReferralPda::LEN],
    );
    // not a referral record
    client.ledger().add_program_account(
        &client.config.program_id,
        &Pubkey::new_unique(),
        vec![1; 12],
    );

    let records = list_referrals(client.ledger(), &client.config).await?;
    assert_eq!(records.len(), 2);
    for (address, record) in &records {
        let index = addresses
            .iter()
            .position(|known| known == address)
            .ok_or("unexpected referral record")?;
        assert_eq!(record.owner, owners[index]);
    }

    // the TGE keeps every record of the right size
    let mut rewarded = referral_owners(client.ledger(), &client.config).await?;
    rewarded.sort();
    let mut expected = vec![
        (addresses[0], owners[0]),
        (addresses[1], owners[1]),
        (unreadable, Pubkey::default()),
    ];
    expected.sort();
    assert_eq!(rewarded, expected);

    let found = resolve_referral_code(
        client.ledger(),
        &client.config,
        &referral_code_for(&owners[1]),
    )
    .await?;
    assert_eq!(found, addresses[1]);

    let record = fetch_referral(client.ledger(), &client.config, &owners[0]).await?;
    assert_eq!(record.map(|record| record.owner), Some(owners[0]));
    assert_eq!(
        fetch_referral(client.ledger(), &client.config, &Pubkey::new_unique()).await?,
        None
    );
    Ok(())
}

#[tokio::test]
async fn unknown_code() {
    let mut client = common::init_connected().await;
    let code = ReferralCode::new("ZZZZZZZZ").unwrap_or_else(|_| panic!("valid code"));

    let res = client
        .submitter
        .invest(TokenSelector::Sol, "1", Some(code.as_str()))
        .await;
    assert_eq!(
        res,
        Err(PresaleError::AccountResolution(
            "Referral code ZZZZZZZZ not found".to_owned()
        ))
    );
    assert_eq!(client.submitter.state(), SubmissionState::Idle);
    assert!(client.ledger().sent_transactions().is_empty());
    assert_eq!(
        client.notifications(),
        vec![Notification::error("Referral code ZZZZZZZZ not found")]
    );
}

#[tokio::test]
async fn overlong_code() {
    let mut client = common::init_connected().await;

    let res = client
        .submitter
        .invest(TokenSelector::Sol, "1", Some("ABCDEFGHIJ"))
        .await;
    assert_eq!(
        res,
        Err(PresaleError::Encoding(EncodingError::ReferralCodeTooLong))
    );
    assert_eq!(client.ledger().request_count(), 0);
    assert_eq!(client.notifications().len(), 1);
}

#[tokio::test]
async fn blank_code_is_no_code() -> Result<()> {
    let mut client = common::init_connected().await;

    client
        .submitter
        .invest(TokenSelector::Sol, "1", Some("   "))
        .await?;
    let sent = client.ledger().sent_transactions();
    assert_eq!(sent[0].message.instructions[0].data.len(), 9);
    Ok(())
}
