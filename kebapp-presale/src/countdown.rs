// File: kebapp-presale/src/countdown.rs
// Project: kebapp-presale
// Creation date: Thursday 21 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Tuesday 03 December 2024 @ 10:27:35
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::time::Duration;

use chrono::{DateTime, Utc};
use kebapp_common::notification::{Notification, Notifier};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};

use crate::{PresaleAction, PresaleStore};

const TICK: Duration = Duration::from_secs(1);

/// Time remaining before the end of the presale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLeft {
    /// Full days.
    pub days: i64,
    /// Hours (0-23).
    pub hours: i64,
    /// Minutes (0-59).
    pub minutes: i64,
    /// Seconds (0-59).
    pub seconds: i64,
}

impl TimeLeft {
    /// Whether no time is left.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// Countdown to the end of the presale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    deadline: DateTime<Utc>,
}

impl Countdown {
    /// Create a countdown ending at `deadline`.
    #[must_use]
    pub const fn new(deadline: DateTime<Utc>) -> Self {
        Self { deadline }
    }

    /// End of the presale.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Time left at `now`, all zero once the deadline is passed.
    #[must_use]
    #[allow(clippy::integer_division, clippy::arithmetic_side_effects)]
    pub fn time_left(&self, now: DateTime<Utc>) -> TimeLeft {
        let remaining = (self.deadline - now).num_seconds();
        if remaining <= 0 {
            return TimeLeft::default();
        }
        TimeLeft {
            days: remaining / 86_400,
            hours: remaining % 86_400 / 3_600,
            minutes: remaining % 3_600 / 60,
            seconds: remaining % 60,
        }
    }

    /// Whether the presale is over at `now`.
    #[must_use]
    pub fn is_over(&self, now: DateTime<Utc>) -> bool {
        self.time_left(now).is_zero()
    }

    /// Close the presale when the deadline is reached.
    ///
    /// Ticks every second until the deadline or the shutdown signal. The presale is
    /// closed and the investor notified only once.
    ///
    /// # Parameters
    /// * `store` - The presale state,
    /// * `notifier` - Where the investor notifications go,
    /// * `shutdown` - Stops the countdown when set to `true` (or dropped).
    pub async fn watch_deadline(
        &self,
        store: &PresaleStore,
        notifier: &Notifier,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticks = interval(TICK);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            if *shutdown.borrow_and_update() {
                return;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = ticks.tick() => {
                    if self.is_over(Utc::now()) {
                        break;
                    }
                }
            }
        }

        if store.get_state().ended {
            return;
        }
        if let Err(err) = store.dispatch(PresaleAction::EndPresale) {
            warn!("could not close the presale: {err}");
            return;
        }
        info!("presale closed at {}", self.deadline);
        notifier.notify(Notification::info("Presale has ended!"));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn remaining_time() {
        let now = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        let countdown = Countdown::new(Utc.with_ymd_and_hms(2024, 12, 3, 4, 5, 6).unwrap());
        assert_eq!(
            countdown.time_left(now),
            TimeLeft {
                days: 2,
                hours: 4,
                minutes: 5,
                seconds: 6
            }
        );
        assert!(!countdown.is_over(now));
    }

    #[test]
    fn past_deadline() {
        let now = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        let countdown = Countdown::new(Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap());
        assert_eq!(countdown.time_left(now), TimeLeft::default());
        assert!(countdown.is_over(now));
        assert!(Countdown::new(now).is_over(now));
    }
}
