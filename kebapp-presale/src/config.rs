// File: kebapp-presale/src/config.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Tuesday 03 December 2024 @ 14:26:09
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::time::Duration;

use chrono::{DateTime, Utc};
use kebapp_common::{Error, Result};
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};

use crate::{keys, TokenSelector};

/// Where the referral record goes in the account list of an investment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralPlacement {
    /// Right after the admin wallet (index 2).
    AfterAdmin,
    /// At the end of the list.
    Append,
}

/// Investment rules for one token.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct TokenSettings {
    /// Minimum amount per investment.
    pub min_investment: f64,
    /// Maximum amount per investment.
    pub max_investment: f64,
    /// Position of the referral record in the account list.
    pub referral_placement: ReferralPlacement,
}

/// Configuration of the presale client.
///
/// The defaults come from the deployment selected at build time (`KEBAPP_MODE`).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PresaleConfig {
    /// The presale program.
    #[serde(with = "pubkey_string")]
    pub program_id: Pubkey,
    /// Wallet receiving the investments.
    #[serde(with = "pubkey_string")]
    pub admin: Pubkey,
    /// Mint of the USDT token.
    #[serde(with = "pubkey_string")]
    pub usdt_mint: Pubkey,
    /// Mint of the KEBAB token (minted at the TGE).
    #[serde(with = "pubkey_string")]
    pub kebab_mint: Pubkey,
    /// RPC endpoint of the cluster.
    pub rpc_url: String,
    /// Commitment used for reads and confirmations.
    pub commitment: CommitmentLevel,
    /// Maximum amount raised by the presale.
    pub hard_cap: f64,
    /// End of the presale.
    pub end_date: DateTime<Utc>,
    /// Rules for SOL investments.
    pub sol: TokenSettings,
    /// Rules for USDT investments.
    pub usdt: TokenSettings,
    /// Seconds between two balance polls.
    pub balance_poll_secs: u64,
    /// Seconds between two price polls.
    pub price_poll_secs: u64,
    /// Seconds to wait for a confirmation.
    pub confirmation_timeout_secs: u64,
    /// Endpoint returning the SOL price in USD.
    pub price_api_url: String,
}

impl Default for PresaleConfig {
    fn default() -> Self {
        Self {
            program_id: crate::ID,
            admin: keys::ADMIN,
            usdt_mint: keys::USDT_MINT,
            kebab_mint: keys::KEBAB_MINT,
            rpc_url: keys::DEFAULT_RPC_URL.to_owned(),
            commitment: CommitmentLevel::Confirmed,
            hard_cap: 2_250_000.0,
            end_date: Utc::now() + chrono::Duration::days(7),
            sol: TokenSettings {
                min_investment: 0.27,
                max_investment: 5000.0,
                referral_placement: ReferralPlacement::AfterAdmin,
            },
            usdt: TokenSettings {
                min_investment: 50.0,
                max_investment: 5000.0,
                referral_placement: ReferralPlacement::Append,
            },
            balance_poll_secs: 10,
            price_poll_secs: 300,
            confirmation_timeout_secs: 60,
            price_api_url:
                "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd"
                    .to_owned(),
        }
    }
}

impl PresaleConfig {
    /// Load the configuration from JSON; missing fields take their default value.
    ///
    /// # Errors
    /// If the JSON is malformed or the configuration is not consistent.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| Error::InvalidConfiguration(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is consistent.
    ///
    /// # Errors
    /// If a bound, the hard cap or an interval is not valid.
    pub fn validate(&self) -> Result<()> {
        for (token, settings) in [(TokenSelector::Sol, &self.sol), (TokenSelector::Usdt, &self.usdt)]
        {
            if !(settings.min_investment >= 0.0
                && settings.min_investment <= settings.max_investment)
            {
                return Err(Error::InvalidConfiguration(format!(
                    "invalid investment bounds for {token}"
                )));
            }
        }
        if !(self.hard_cap > 0.0) {
            return Err(Error::InvalidConfiguration(
                "the hard cap must be strictly positive".to_owned(),
            ));
        }
        if self.balance_poll_secs == 0
            || self.price_poll_secs == 0
            || self.confirmation_timeout_secs == 0
        {
            return Err(Error::InvalidConfiguration(
                "intervals must be strictly positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// Investment rules for a token.
    #[must_use]
    pub const fn token(&self, token: TokenSelector) -> &TokenSettings {
        match token {
            TokenSelector::Sol => &self.sol,
            TokenSelector::Usdt => &self.usdt,
        }
    }

    /// Commitment used for reads and confirmations.
    #[must_use]
    pub const fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }

    /// Delay between two balance polls.
    #[must_use]
    pub const fn balance_poll_interval(&self) -> Duration {
        Duration::from_secs(self.balance_poll_secs)
    }

    /// Delay between two price polls.
    #[must_use]
    pub const fn price_poll_interval(&self) -> Duration {
        Duration::from_secs(self.price_poll_secs)
    }

    /// Maximum delay to wait for a confirmation.
    #[must_use]
    pub const fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

/// Base58 (de)serialization of addresses.
mod pubkey_string {
    use std::str::FromStr as _;

    use serde::{de, Deserialize as _, Deserializer, Serializer};
    use solana_program::pubkey::Pubkey;

    pub fn serialize<S: Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(pubkey)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let value = String::deserialize(deserializer)?;
        Pubkey::from_str(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn defaults() {
        let config = PresaleConfig::default();
        assert!(config.validate().is_ok(), "default configuration should be valid");
        assert_eq!(config.program_id, crate::ID);
        assert_eq!(config.token(TokenSelector::Usdt).min_investment, 50.0);
        assert_eq!(
            config.token(TokenSelector::Sol).referral_placement,
            ReferralPlacement::AfterAdmin
        );
        assert_eq!(config.balance_poll_interval(), Duration::from_secs(10));
        assert!(config.end_date > Utc::now(), "presale should not be over");
    }

    #[test]
    fn load_json() {
        let config = PresaleConfig::from_json(
            r#"{
                "admin": "2FcJbN2kgx3eB1JeJgoBKczpAsXxJzosq269CoidxfhA",
                "commitment": "processed",
                "hard_cap": 1000.0,
                "usdt": { "min_investment": 10.0, "max_investment": 100.0, "referral_placement": "after_admin" },
                "end_date": "2025-01-31T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(config.commitment, CommitmentLevel::Processed);
        assert_eq!(config.hard_cap, 1000.0);
        assert_eq!(config.usdt.referral_placement, ReferralPlacement::AfterAdmin);
        assert_eq!(config.sol, PresaleConfig::default().sol);
        assert_eq!(config.end_date.to_rfc3339(), "2025-01-31T12:00:00+00:00");

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"2FcJbN2kgx3eB1JeJgoBKczpAsXxJzosq269CoidxfhA\""));
    }

    #[test]
    fn invalid_configurations() {
        let Err(Error::InvalidConfiguration(_)) = PresaleConfig::from_json(
            r#"{ "sol": { "min_investment": 10.0, "max_investment": 1.0, "referral_placement": "append" } }"#,
        ) else {
            panic!("inverted bounds should be refused");
        };
        let Err(Error::InvalidConfiguration(_)) =
            PresaleConfig::from_json(r#"{ "hard_cap": 0.0 }"#)
        else {
            panic!("null hard cap should be refused");
        };
        let Err(Error::InvalidConfiguration(_)) =
            PresaleConfig::from_json(r#"{ "balance_poll_secs": 0 }"#)
        else {
            panic!("null interval should be refused");
        };
        let Err(Error::InvalidConfiguration(_)) =
            PresaleConfig::from_json(r#"{ "admin": "not a key" }"#)
        else {
            panic!("invalid address should be refused");
        };
    }
}
