// File: kebapp-presale/src/oracle.rs
// Project: kebapp-presale
// Creation date: Tuesday 19 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 15:21:03
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use kebapp_common::{
    debug, get_token_account_amount, ledger::Ledger, EncodingError, Error, Result,
    ValidationError,
};
use log::warn;
use serde::Deserialize;
use solana_program::pubkey::Pubkey;
use tokio::{
    sync::watch,
    time::{interval, MissedTickBehavior},
};

use crate::{
    parse_decimal, PresaleAction, PresaleConfig, PresaleState, PresaleStore, TokenSelector,
};

/// Values read from the ledger and the price feed.
///
/// A value is kept until a later poll succeeds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OracleCache {
    /// SOL held by the admin wallet.
    pub raised: Option<f64>,
    /// SOL held by the connected wallet.
    pub sol_balance: Option<f64>,
    /// USDT held by the connected wallet.
    pub usdt_balance: Option<f64>,
    /// Price of one SOL in USD.
    pub sol_price_usd: Option<f64>,
    /// Time of the last successful balance poll.
    pub balances_updated_at: Option<DateTime<Utc>>,
    /// Time of the last successful price poll.
    pub price_updated_at: Option<DateTime<Utc>>,
}

impl OracleCache {
    /// Balance of the connected wallet for a token.
    #[must_use]
    pub const fn balance(&self, token: TokenSelector) -> Option<f64> {
        match token {
            TokenSelector::Sol => self.sol_balance,
            TokenSelector::Usdt => self.usdt_balance,
        }
    }

    /// Value of the amount raised in USD.
    #[must_use]
    pub fn raised_usd(&self) -> Option<f64> {
        Some(self.raised? * self.sol_price_usd?)
    }
}

/// Source of the SOL price.
#[allow(async_fn_in_trait)]
pub trait PriceFeed {
    /// Current price of one SOL in USD.
    ///
    /// # Errors
    /// If the price could not be read.
    async fn fetch_sol_price(&self) -> Result<f64>;
}

#[derive(Deserialize)]
struct SimplePrice {
    solana: UsdPrice,
}

#[derive(Deserialize)]
struct UsdPrice {
    usd: f64,
}

/// Price feed backed by the `CoinGecko` public API.
#[derive(Clone, Debug)]
pub struct CoinGeckoFeed {
    client: reqwest::Client,
    url: String,
}

impl CoinGeckoFeed {
    /// Create a new feed.
    ///
    /// # Parameters
    /// * `url` - The `simple/price` endpoint, asking for `solana` in `usd`.
    ///
    /// # Errors
    /// If the HTTP client could not be created.
    pub fn new<S: Into<String>>(url: S) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| Error::PriceFeed(err.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl PriceFeed for CoinGeckoFeed {
    async fn fetch_sol_price(&self) -> Result<f64> {
        let response: SimplePrice = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| Error::PriceFeed(err.to_string()))?
            .json()
            .await
            .map_err(|err| Error::PriceFeed(err.to_string()))?;
        Ok(response.solana.usd)
    }
}

/// Everything needed to validate an investment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidationInput<'a> {
    /// Amount typed by the investor.
    pub amount: &'a str,
    /// Token invested.
    pub token: TokenSelector,
    /// Minimum amount for the token.
    pub min_investment: f64,
    /// Maximum amount for the token.
    pub max_investment: f64,
    /// Balance of the investor for the token, if known.
    pub balance: Option<f64>,
    /// Amount already raised.
    pub total_raised: f64,
    /// Maximum amount of the presale.
    pub hard_cap: f64,
    /// Whether the presale is closed.
    pub ended: bool,
}

impl<'a> ValidationInput<'a> {
    /// Gather the validation input from the current state of the client.
    ///
    /// The amount raised is the one read from the ledger when available.
    #[must_use]
    pub fn new(
        config: &PresaleConfig,
        token: TokenSelector,
        amount: &'a str,
        state: &PresaleState,
        cache: &OracleCache,
    ) -> Self {
        let settings = config.token(token);
        Self {
            amount,
            token,
            min_investment: settings.min_investment,
            max_investment: settings.max_investment,
            balance: cache.balance(token),
            total_raised: state.on_chain_raised.unwrap_or(state.total_raised),
            hard_cap: state.hard_cap,
            ended: state.ended,
        }
    }
}

/// Check an investment before anything is sent.
///
/// Constraints are checked in order: ended, amount, minimum, maximum, balance and hard cap.
/// The balance is only checked when it is known.
///
/// # Errors
/// The first constraint that isn't satisfied.
pub fn validate_investment(input: &ValidationInput<'_>) -> Result<f64, ValidationError> {
    if input.ended {
        return Err(ValidationError::PresaleEnded);
    }
    let amount = match parse_decimal(input.amount) {
        Ok(amount) => amount,
        Err(EncodingError::Overflow) => f64::INFINITY,
        Err(_) => return Err(ValidationError::InvalidAmount),
    };
    if amount <= 0.0 {
        return Err(ValidationError::InvalidAmount);
    }
    let symbol = input.token.symbol().to_owned();
    if amount < input.min_investment {
        return Err(ValidationError::BelowMinimum {
            minimum: input.min_investment,
            symbol,
        });
    }
    if amount > input.max_investment {
        return Err(ValidationError::AboveMaximum {
            maximum: input.max_investment,
            symbol,
        });
    }
    if input.balance.is_some_and(|balance| balance < amount) {
        return Err(ValidationError::InsufficientBalance {
            required: amount,
            symbol,
        });
    }
    if input.total_raised + amount > input.hard_cap {
        return Err(ValidationError::HardCapExceeded);
    }
    Ok(amount)
}

/// Periodic reader of the balances and of the SOL price.
pub struct Oracle<L, P> {
    ledger: Arc<L>,
    feed: P,
    config: Arc<PresaleConfig>,
    store: Arc<PresaleStore>,
    wallet: watch::Receiver<Option<Pubkey>>,
    cache: watch::Sender<OracleCache>,
    stopped: AtomicBool,
}

impl<L: Ledger, P: PriceFeed> Oracle<L, P> {
    /// Create a new oracle.
    ///
    /// # Parameters
    /// * `ledger` - Access to the cluster,
    /// * `feed` - Source of the SOL price,
    /// * `config` - The presale configuration,
    /// * `store` - Store receiving the amount raised,
    /// * `wallet` - The connected wallet (from the wallet session).
    #[must_use]
    pub fn new(
        ledger: Arc<L>,
        feed: P,
        config: Arc<PresaleConfig>,
        store: Arc<PresaleStore>,
        wallet: watch::Receiver<Option<Pubkey>>,
    ) -> Self {
        let (cache, _) = watch::channel(OracleCache::default());
        Self {
            ledger,
            feed,
            config,
            store,
            wallet,
            cache,
            stopped: AtomicBool::new(false),
        }
    }

    /// Current cached values.
    #[must_use]
    pub fn cache(&self) -> OracleCache {
        self.cache.borrow().clone()
    }

    /// Follow the cached values.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OracleCache> {
        self.cache.subscribe()
    }

    /// The price feed.
    #[must_use]
    pub const fn feed(&self) -> &P {
        &self.feed
    }

    /// Stop publishing: results of fetches still in flight are dropped.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    async fn usdt_balance(&self, wallet: &Pubkey) -> Result<f64> {
        let mut units = 0_u64;
        for address in self
            .ledger
            .token_accounts_by_owner(wallet, &self.config.usdt_mint)
            .await?
        {
            if let Some(account) = self.ledger.get_account(&address).await? {
                units = units.saturating_add(get_token_account_amount(&account.data)?);
            }
        }
        Ok(TokenSelector::Usdt.to_display(units))
    }

    /// Read the amount raised and the balances of the connected wallet.
    ///
    /// # Errors
    /// If a read failed: the cache is left untouched.
    pub async fn poll_balances(&self) -> Result<()> {
        let raised = TokenSelector::Sol.to_display(self.ledger.get_balance(&self.config.admin).await?);
        let wallet = *self.wallet.borrow();
        let (sol_balance, usdt_balance) = match wallet {
            Some(wallet) => {
                let sol = TokenSelector::Sol.to_display(self.ledger.get_balance(&wallet).await?);
                (Some(sol), Some(self.usdt_balance(&wallet).await?))
            }
            None => (None, None),
        };

        if self.is_stopped() {
            debug!("oracle stopped, dropping balances");
            return Ok(());
        }
        self.store
            .dispatch(PresaleAction::ObserveOnChainRaised(raised))?;
        self.cache.send_modify(|cache| {
            cache.raised = Some(raised);
            cache.sol_balance = sol_balance;
            cache.usdt_balance = usdt_balance;
            cache.balances_updated_at = Some(Utc::now());
        });
        Ok(())
    }

    /// Read the SOL price.
    ///
    /// # Errors
    /// If the price feed failed: the cache is left untouched.
    pub async fn poll_price(&self) -> Result<()> {
        let price = self.feed.fetch_sol_price().await?;
        if self.is_stopped() {
            debug!("oracle stopped, dropping price");
            return Ok(());
        }
        self.cache.send_modify(|cache| {
            cache.sol_price_usd = Some(price);
            cache.price_updated_at = Some(Utc::now());
        });
        Ok(())
    }

    /// Poll the balances and the price until `shutdown` is set.
    ///
    /// Failures are logged and the previous values are kept. No retry is done before the next
    /// tick.
    ///
    /// # Parameters
    /// * `shutdown` - Set to `true` (or dropped) to stop polling.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut balances = interval(self.config.balance_poll_interval());
        balances.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut prices = interval(self.config.price_poll_interval());
        prices.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !*shutdown.borrow_and_update() && !self.is_stopped() {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = balances.tick() => {
                    if let Err(err) = self.poll_balances().await {
                        warn!("could not refresh the balances: {err}");
                    }
                }
                _ = prices.tick() => {
                    if let Err(err) = self.poll_price().await {
                        warn!("could not refresh the SOL price: {err}");
                    }
                }
            }
        }
        self.stop();
    }

    /// Validate an investment against the current state of the presale.
    ///
    /// # Errors
    /// The first constraint that isn't satisfied.
    pub fn validate(&self, token: TokenSelector, amount: &str) -> Result<f64, ValidationError> {
        let state = self.store.get_state();
        let cache = self.cache.borrow();
        validate_investment(&ValidationInput::new(
            &self.config,
            token,
            amount,
            &state,
            &cache,
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn input(amount: &str) -> ValidationInput<'_> {
        ValidationInput {
            amount,
            token: TokenSelector::Sol,
            min_investment: 0.27,
            max_investment: 5000.0,
            balance: Some(100.0),
            total_raised: 0.0,
            hard_cap: 2_250_000.0,
            ended: false,
        }
    }

    #[test]
    fn validation_order() {
        let ended = ValidationInput {
            ended: true,
            ..input("0.1")
        };
        assert_eq!(validate_investment(&ended), Err(ValidationError::PresaleEnded));

        for amount in ["", "abc", "0", "-3", "NaN"] {
            assert_eq!(
                validate_investment(&input(amount)),
                Err(ValidationError::InvalidAmount),
                "{amount:?} should be refused"
            );
        }

        let Err(err) = validate_investment(&input("0.1")) else {
            panic!("0.1 SOL is below the minimum");
        };
        assert_eq!(err.to_string(), "Minimum investment is 0.27 SOL");

        let Err(err) = validate_investment(&input("6000")) else {
            panic!("6000 SOL is above the maximum");
        };
        assert_eq!(err.to_string(), "Maximum investment is 5000 SOL");

        assert_eq!(
            validate_investment(&input("150")),
            Err(ValidationError::InsufficientBalance {
                required: 150.0,
                symbol: "SOL".to_owned()
            })
        );

        let almost_full = ValidationInput {
            total_raised: 2_249_990.0,
            ..input("50")
        };
        assert_eq!(
            validate_investment(&almost_full),
            Err(ValidationError::HardCapExceeded)
        );

        assert_eq!(validate_investment(&input("1.5")).unwrap(), 1.5);
    }

    #[test]
    fn exponent_amounts() {
        assert_eq!(validate_investment(&input("1e0")).unwrap(), 1.0);
        assert_eq!(validate_investment(&input("5e1")).unwrap(), 50.0);
        assert_eq!(
            validate_investment(&input("inf")),
            Err(ValidationError::InvalidAmount)
        );
        let Err(err) = validate_investment(&input("1e500")) else {
            panic!("1e500 SOL is above the maximum");
        };
        assert_eq!(err.to_string(), "Maximum investment is 5000 SOL");
    }

    #[test]
    fn unknown_balance_is_not_checked() {
        let unknown = ValidationInput {
            balance: None,
            ..input("1000")
        };
        assert_eq!(validate_investment(&unknown).unwrap(), 1000.0);
    }

    #[test]
    fn usd_value() {
        let cache = OracleCache {
            raised: Some(10.0),
            sol_price_usd: Some(150.0),
            ..OracleCache::default()
        };
        assert_eq!(cache.raised_usd(), Some(1500.0));
        assert_eq!(OracleCache::default().raised_usd(), None);
    }
}
