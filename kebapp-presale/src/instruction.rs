// File: kebapp-presale/src/instruction.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 10:47:31
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::{fmt, iter, str};

use kebapp_common::EncodingError;
use serde::{Deserialize, Serialize};
use solana_program::{instruction::Instruction, pubkey::Pubkey};
use strum::{Display, EnumIter, EnumString};

use crate::{accounts::investment_accounts, PresaleConfig};

/// Token used to invest in the presale.
///
/// The discriminant is the first byte of the investment payload.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenSelector {
    /// Native SOL (9 decimals).
    Sol = 0,
    /// USDT (6 decimals).
    Usdt = 1,
}

impl TokenSelector {
    /// Number of decimals of the token.
    #[must_use]
    pub const fn decimals(self) -> u32 {
        match self {
            Self::Sol => 9,
            Self::Usdt => 6,
        }
    }

    /// Number of base units in one token.
    #[must_use]
    pub const fn factor(self) -> u64 {
        10_u64.pow(self.decimals())
    }

    /// Symbol shown to the investor.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Sol => "SOL",
            Self::Usdt => "USDT",
        }
    }

    /// Convert base units into a display amount.
    ///
    /// # Parameters
    /// * `units` - Amount in base units (lamports for SOL).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_display(self, units: u64) -> f64 {
        units as f64 / self.factor() as f64
    }
}

impl TryFrom<u8> for TokenSelector {
    type Error = EncodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Sol),
            1 => Ok(Self::Usdt),
            _ => Err(EncodingError::UnknownToken(value)),
        }
    }
}

/// A referral code: up to 8 printable ASCII characters, space padded on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReferralCode([u8; ReferralCode::LEN]);

impl ReferralCode {
    /// Size of a code on the wire.
    pub const LEN: usize = 8;

    /// Create a referral code.
    ///
    /// # Parameters
    /// * `code` - The code typed by the investor.
    ///
    /// # Errors
    /// If the code is not printable ASCII or is longer than 8 characters.
    pub fn new(code: &str) -> Result<Self, EncodingError> {
        if !code.bytes().all(|byte| byte.is_ascii_graphic()) {
            return Err(EncodingError::ReferralCodeNotAscii);
        }
        if code.len() > Self::LEN {
            return Err(EncodingError::ReferralCodeTooLong);
        }
        let mut bytes = [b' '; Self::LEN];
        for (slot, byte) in bytes.iter_mut().zip(code.bytes()) {
            *slot = byte;
        }
        Ok(Self(bytes))
    }

    /// Create a code from its padded on-chain representation.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// The padded on-chain representation.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; Self::LEN] {
        self.0
    }

    /// The code without its padding.
    #[must_use]
    pub fn as_str(&self) -> &str {
        str::from_utf8(&self.0)
            .unwrap_or_default()
            .trim_end_matches(' ')
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl str::FromStr for ReferralCode {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Largest exponent expanded when reading an amount.
const MAX_EXPONENT: i64 = 64;

/// Decimal amount split into its sign and digits, the exponent already applied.
#[derive(Debug, PartialEq, Eq)]
struct Decimal {
    negative: bool,
    integer: String,
    fraction: String,
}

impl Decimal {
    fn is_zero(&self) -> bool {
        self.integer
            .bytes()
            .chain(self.fraction.bytes())
            .all(|byte| byte == b'0')
    }

    fn units(&self, decimals: u32) -> Result<u64, EncodingError> {
        if self.negative && !self.is_zero() {
            return Err(EncodingError::Negative);
        }
        let fraction = self
            .fraction
            .bytes()
            .chain(iter::repeat(b'0'))
            .take(decimals as usize);
        self.integer
            .bytes()
            .chain(fraction)
            .try_fold(0_u64, |value, digit| {
                value
                    .checked_mul(10)
                    .and_then(|value| value.checked_add(u64::from(digit.saturating_sub(b'0'))))
                    .ok_or(EncodingError::Overflow)
            })
    }

    fn value(&self) -> Result<f64, EncodingError> {
        let sign = if self.negative { "-" } else { "" };
        format!("{sign}0{}.{}0", self.integer, self.fraction)
            .parse()
            .map_err(|_| EncodingError::NotANumber)
    }
}

impl str::FromStr for Decimal {
    type Err = EncodingError;

    fn from_str(amount: &str) -> Result<Self, Self::Err> {
        let amount = amount.trim();
        let (negative, unsigned) = amount.strip_prefix('-').map_or_else(
            || (false, amount.strip_prefix('+').unwrap_or(amount)),
            |rest| (true, rest),
        );
        let (mantissa, exponent) = match unsigned.split_once(|c: char| c == 'e' || c == 'E') {
            Some((mantissa, exponent)) => (
                mantissa,
                exponent
                    .parse::<i64>()
                    .map_err(|_| EncodingError::NotANumber)?,
            ),
            None => (unsigned, 0),
        };
        let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if (integer.is_empty() && fraction.is_empty())
            || !integer
                .bytes()
                .chain(fraction.bytes())
                .all(|byte| byte.is_ascii_digit())
        {
            return Err(EncodingError::NotANumber);
        }

        let digits = format!("{integer}{fraction}");
        if exponent > MAX_EXPONENT && digits.bytes().any(|byte| byte != b'0') {
            return Err(EncodingError::Overflow);
        }
        let exponent = exponent.clamp(-MAX_EXPONENT, MAX_EXPONENT);
        let len = i64::try_from(digits.len()).map_err(|_| EncodingError::Overflow)?;
        let point = i64::try_from(integer.len())
            .map_err(|_| EncodingError::Overflow)?
            .saturating_add(exponent);
        let (integer, fraction) = if point <= 0 {
            let zeros = "0".repeat(usize::try_from(-point).unwrap_or_default());
            (String::new(), format!("{zeros}{digits}"))
        } else if point >= len {
            let zeros = "0".repeat(usize::try_from(point - len).unwrap_or_default());
            (format!("{digits}{zeros}"), String::new())
        } else {
            let (integer, fraction) =
                digits.split_at(usize::try_from(point).unwrap_or_default());
            (integer.to_owned(), fraction.to_owned())
        };
        Ok(Self {
            negative,
            integer,
            fraction,
        })
    }
}

/// Read a decimal amount (`"12.5"`, `"1.25e1"`).
///
/// Validation and encoding share this grammar, so an amount accepted here is encodable.
///
/// # Errors
/// If the amount is not a decimal number, or its exponent is out of range.
pub fn parse_decimal(amount: &str) -> Result<f64, EncodingError> {
    amount.parse::<Decimal>()?.value()
}

/// Scale a decimal amount into base units.
///
/// Digits beyond the token's decimals are dropped (floor).
///
/// # Parameters
/// * `amount` - Decimal amount (`"12.5"`, exponent notation accepted),
/// * `decimals` - Number of decimals of the token.
///
/// # Errors
/// If the amount is not a decimal number, is negative, or overflows 64 bits.
pub fn parse_amount(amount: &str, decimals: u32) -> Result<u64, EncodingError> {
    amount.parse::<Decimal>()?.units(decimals)
}

/// Payload of an investment in the presale.
///
/// Layout: `[token (1), amount LE (8), referral code (8, optional)]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvestmentInstruction {
    /// Token invested.
    pub token: TokenSelector,
    /// Amount in base units of the token.
    pub amount: u64,
    /// Referral code crediting another investor.
    pub referral_code: Option<ReferralCode>,
}

impl InvestmentInstruction {
    /// Size of the payload without a referral code.
    pub const LEN: usize = 9;
    /// Size of the payload with a referral code.
    pub const LEN_WITH_REFERRAL: usize = Self::LEN + ReferralCode::LEN;

    /// Create the payload from the amount typed by the investor.
    ///
    /// An empty referral code is the same as no referral code.
    ///
    /// # Parameters
    /// * `token` - Token invested,
    /// * `amount` - Decimal amount of tokens,
    /// * `referral` - Optional referral code.
    ///
    /// # Errors
    /// If the amount can't be scaled or the referral code is invalid.
    pub fn new(
        token: TokenSelector,
        amount: &str,
        referral: Option<&str>,
    ) -> Result<Self, EncodingError> {
        let amount = parse_amount(amount, token.decimals())?;
        let referral_code = referral
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(ReferralCode::new)
            .transpose()?;
        Ok(Self {
            token,
            amount,
            referral_code,
        })
    }

    /// Serialize the payload.
    #[must_use]
    #[allow(clippy::little_endian_bytes)]
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::LEN_WITH_REFERRAL);
        data.push(self.token as u8);
        data.extend_from_slice(&self.amount.to_le_bytes());
        if let Some(code) = self.referral_code {
            data.extend_from_slice(&code.to_bytes());
        }
        data
    }

    /// Deserialize a payload.
    ///
    /// # Errors
    /// If the payload is not 9 or 17 bytes long, or the token is unknown.
    #[allow(clippy::little_endian_bytes)]
    pub fn decode(data: &[u8]) -> Result<Self, EncodingError> {
        if data.len() != Self::LEN && data.len() != Self::LEN_WITH_REFERRAL {
            return Err(EncodingError::InvalidLength(data.len()));
        }
        let invalid_length = || EncodingError::InvalidLength(data.len());
        let token = TokenSelector::try_from(*data.first().ok_or_else(invalid_length)?)?;
        let amount: [u8; 8] = data
            .get(1..Self::LEN)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(invalid_length)?;
        let referral_code = data
            .get(Self::LEN..)
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| bytes.try_into().map(ReferralCode::from_bytes))
            .transpose()
            .map_err(|_err| invalid_length())?;
        Ok(Self {
            token,
            amount: u64::from_le_bytes(amount),
            referral_code,
        })
    }
}

/// Instructions of the presale program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresaleInstruction {
    /// Invest SOL or USDT in the presale.
    ///
    /// Accounts (SOL):
    /// 0. `[signer, writable]` investor
    /// 1. `[writable]` admin wallet
    /// 2. `[]` system program
    ///
    /// Accounts (USDT):
    /// 0. `[signer, writable]` investor
    /// 1. `[writable]` admin wallet
    /// 2. `[writable]` investor USDT account
    /// 3. `[writable]` admin USDT account
    /// 4. `[]` token program
    /// 5. `[signer]` investor, as owner of its USDT account
    ///
    /// The referral record, when given, is inserted after the admin (SOL) or appended (USDT).
    Invest(InvestmentInstruction),
    /// Register a referral code for the signer.
    ///
    /// 0. `[signer, writable]` owner
    /// 1. `[writable]` referral PDA
    /// 2. `[]` system program
    GenerateReferral(ReferralCode),
    /// Token generation event: mint and distribute the tokens.
    ///
    /// 0. `[signer, writable]` admin
    /// 1. `[writable]` KEBAB mint
    /// 2. `[]` token program
    /// 3. `[]` mint authority PDA
    /// 4. `[writable]` distribution PDA
    /// 5. `[writable]` then `[writable]` referral PDA and its owner, for each referral
    TriggerTge,
}

impl PresaleInstruction {
    const GENERATE_REFERRAL: u8 = 2;
    const TRIGGER_TGE: u8 = 3;

    /// Serialize the instruction.
    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        match self {
            Self::Invest(investment) => investment.encode(),
            Self::GenerateReferral(code) => iter::once(Self::GENERATE_REFERRAL)
                .chain(code.to_bytes())
                .collect(),
            Self::TriggerTge => vec![Self::TRIGGER_TGE],
        }
    }

    /// Deserialize an instruction.
    ///
    /// # Errors
    /// If the tag is unknown or the data has the wrong size for it.
    pub fn unpack(data: &[u8]) -> Result<Self, EncodingError> {
        let Some((&tag, rest)) = data.split_first() else {
            return Err(EncodingError::InvalidLength(0));
        };
        match tag {
            0 | 1 => Ok(Self::Invest(InvestmentInstruction::decode(data)?)),
            Self::GENERATE_REFERRAL => {
                let code: [u8; ReferralCode::LEN] = rest
                    .try_into()
                    .map_err(|_err| EncodingError::InvalidLength(data.len()))?;
                Ok(Self::GenerateReferral(ReferralCode::from_bytes(code)))
            }
            Self::TRIGGER_TGE if rest.is_empty() => Ok(Self::TriggerTge),
            Self::TRIGGER_TGE => Err(EncodingError::InvalidLength(data.len())),
            _ => Err(EncodingError::UnknownInstruction(tag)),
        }
    }
}

/// Creates an `Invest` instruction.
///
/// # Parameters
/// * `config` - The presale configuration,
/// * `payer` - The investor (signer),
/// * `investment` - The investment payload,
/// * `referral_account` - The referral record matching the payload's referral code.
#[must_use]
pub fn invest(
    config: &PresaleConfig,
    payer: &Pubkey,
    investment: &InvestmentInstruction,
    referral_account: Option<Pubkey>,
) -> Instruction {
    Instruction {
        program_id: config.program_id,
        accounts: investment_accounts(config, investment.token, payer, referral_account),
        data: PresaleInstruction::Invest(*investment).pack(),
    }
}
