// File: kebapp-common/src/lib.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Tuesday 03 December 2024 @ 18:12:40
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

//! Definitions of types, capabilities and utilities shared by all the KebappCoin presale crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use solana_program::pubkey::Pubkey;
use spl_token_2022::{extension::StateWithExtensions, state::Account};

mod error;
/// Custom errors emitted by the presale program.
pub mod errors;
/// Access to the remote ledger.
pub mod ledger;
/// User facing notifications.
pub mod notification;
/// Program derived addresses.
pub mod pda;
/// Wallet capabilities.
pub mod wallet;

pub use error::*;

/// Only output messages if in debug mode.
#[macro_export]
macro_rules! debug {
    ($($msg:expr),+$(,)?) => {
        #[cfg(feature = "debug-msg")]
        log::debug!($($msg,)+)
    };
}

/// Get the amount of tokens held by a token account from its raw data.
///
/// Works for both the SPL Token and SPL Token 2022 layouts.
///
/// # Parameters
/// * `data` - Raw data of the token account
///
/// # Errors
/// If the data is not the one of an (initialized) token account.
pub fn get_token_account_amount(data: &[u8]) -> Result<u64> {
    let state = StateWithExtensions::<Account>::unpack(data)
        .map_err(|_err| Error::InvalidTokenAccount)?
        .base;
    Ok(state.amount)
}

/// Shorten an address for display (`2FcJbN...xfhA`).
///
/// # Parameters
/// * `address` - The address to shorten.
#[must_use]
pub fn truncate_address(address: &Pubkey) -> String {
    let address = address.to_string();
    let head: String = address.chars().take(6).collect();
    let tail: String = address
        .chars()
        .skip(address.len().saturating_sub(4))
        .collect();
    format!("{head}...{tail}")
}
