// File: kebapp-presale/src/state.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Tuesday 03 December 2024 @ 16:40:52
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::mem;

use kebapp_common::{
    debug,
    notification::{Notification, Notifier},
    Error, Result,
};
use num_format::{Locale, ToFormattedString as _};
use tokio::sync::watch;

/// Snapshot of the presale.
#[derive(Clone, Debug, PartialEq)]
pub struct PresaleState {
    /// Amount raised, as seen by this client (optimistic).
    pub total_raised: f64,
    /// Maximum amount the presale accepts.
    pub hard_cap: f64,
    /// Set once the presale is closed, never reset.
    pub ended: bool,
    /// Amount raised according to the ledger, from the last successful poll.
    pub on_chain_raised: Option<f64>,
}

impl PresaleState {
    /// Progress of the presale in percent, capped at 100.
    #[must_use]
    pub fn progress(&self) -> f64 {
        (self.total_raised / self.hard_cap * 100.0).min(100.0)
    }

    /// Human readable summary of the amount raised (`1,500 / 2,250,000`).
    #[must_use]
    pub fn summary(&self) -> String {
        let raised = self.on_chain_raised.unwrap_or(self.total_raised);
        format!("{} / {}", format_amount(raised), format_amount(self.hard_cap))
    }
}

/// Changes that can be applied to the presale state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PresaleAction {
    /// A deposit was confirmed by this client.
    AddDeposit(f64),
    /// The presale is closed.
    EndPresale,
    /// The ledger reported the amount raised.
    ObserveOnChainRaised(f64),
}

/// Store holding the presale state, shared by reference between the components.
#[derive(Debug)]
pub struct PresaleStore {
    state: watch::Sender<PresaleState>,
    notifier: Notifier,
}

impl PresaleStore {
    /// Create a new store for an open presale.
    ///
    /// # Parameters
    /// * `hard_cap` - Maximum amount the presale accepts,
    /// * `notifier` - Where the investor notifications go.
    #[must_use]
    pub fn new(hard_cap: f64, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(PresaleState {
            total_raised: 0.0,
            hard_cap,
            ended: false,
            on_chain_raised: None,
        });
        Self { state, notifier }
    }

    /// Current state of the presale.
    #[must_use]
    pub fn get_state(&self) -> PresaleState {
        self.state.borrow().clone()
    }

    /// Follow the changes of the presale state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PresaleState> {
        self.state.subscribe()
    }

    /// Apply an action to the state.
    ///
    /// A refused deposit leaves the state untouched and is reported to the investor.
    ///
    /// # Errors
    /// `PresaleEnded` or `HardCapExceeded` if a deposit is refused.
    pub fn dispatch(&self, action: PresaleAction) -> Result<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|state| match action {
            PresaleAction::AddDeposit(amount) => {
                if state.ended {
                    outcome = Err(Error::PresaleEnded);
                    return false;
                }
                let total = state.total_raised + amount;
                if total > state.hard_cap {
                    outcome = Err(Error::HardCapExceeded);
                    return false;
                }
                state.total_raised = total;
                true
            }
            PresaleAction::EndPresale => !mem::replace(&mut state.ended, true),
            PresaleAction::ObserveOnChainRaised(raised) => {
                let changed = state.on_chain_raised != Some(raised);
                state.on_chain_raised = Some(raised);
                changed
            }
        });

        match (&outcome, action) {
            (Ok(()), PresaleAction::AddDeposit(amount)) => {
                self.notifier.notify(Notification::success(format!(
                    "Successfully added ${} to the presale",
                    format_amount(amount)
                )));
            }
            (Err(err), _) => {
                debug!("refused {:?}: {}", action, err);
                self.notifier.notify(err.notification());
            }
            _ => {}
        }
        outcome
    }
}

/// Format an amount with thousands separators and at most 3 decimals.
///
/// # Parameters
/// * `amount` - The amount to format.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount.abs() * 1000.0).round() / 1000.0;
    let integer = rounded.trunc();
    let mut text = (integer as u64).to_formatted_string(&Locale::en);
    let fraction = format!("{:.3}", rounded - integer);
    let fraction = fraction.trim_start_matches('0').trim_end_matches('0');
    if fraction != "." {
        text.push_str(fraction);
    }
    text
}
