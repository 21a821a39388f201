// File: kebapp-presale/src/lib.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Thursday 05 December 2024 @ 15:20:37
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

//! Client of the KebappCoin (BART) presale program.
//!
//! Builds and sends the investment, referral and TGE instructions, and keeps track of
//! the presale progress and the investor's balances.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod accounts;
mod config;
mod countdown;
mod instruction;
mod oracle;
/// Referral codes and records.
pub mod referral;
mod rpc;
mod session;
mod state;
mod submitter;
/// Token generation event.
pub mod tge;

/// Accounts of an investment.
pub use accounts::*;
/// Presale configuration.
pub use config::*;
pub use countdown::{Countdown, TimeLeft};
/// Instructions of the presale program.
pub use instruction::*;
/// Balances, prices and investment validation.
pub use oracle::*;
pub use referral::{referral_code_for, referral_link, ReferralPda};
pub use rpc::RpcLedger;
pub use session::WalletSession;
/// Presale state and its store.
pub use state::*;
pub use submitter::{SubmissionState, Submitter};
pub use tge::TgeTrigger;

/// Deployment addresses, set at build time by `KEBAPP_MODE`.
pub mod keys {
    use solana_program::pubkey::Pubkey;

    include!(concat!(env!("OUT_DIR"), "/keys.rs"));
}

// Set the program's ID.
include!(concat!(env!("OUT_DIR"), "/program_id.rs"));
