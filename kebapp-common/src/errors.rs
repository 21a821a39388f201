// File: kebapp-common/src/errors.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Friday 29 November 2024 @ 11:05:21
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;
use solana_program::instruction::InstructionError;
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// Custom errors that can be returned by the presale program.
///
/// The discriminant is the code carried by `ProgramError::Custom`.
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum PresaleProgramError {
    /// The instruction data could not be decoded.
    #[error("the instruction is not valid")]
    InvalidInstruction = 0,
    /// The presale is closed.
    #[error("the presale has ended")]
    PresaleEnded = 1,
    /// The investment would go past the presale hard cap.
    #[error("the investment would exceed the hard cap")]
    HardCapReached = 2,
    /// The investment is below the minimum accepted.
    #[error("the investment is below the minimum")]
    BelowMinimumInvestment = 3,
    /// The investment is above the maximum accepted.
    #[error("the investment is above the maximum")]
    AboveMaximumInvestment = 4,
    /// The referral account given does not match a registered referral.
    #[error("the referral code is not valid")]
    InvalidReferralCode = 5,
    /// The wallet already registered a referral code.
    #[error("a referral code already exists for this wallet")]
    ReferralAlreadyExists = 6,
    /// A wallet cannot be its own referrer.
    #[error("a wallet cannot refer itself")]
    SelfReferral = 7,
    /// The signer is not allowed to run this instruction.
    #[error("signer is not authorized for this operation")]
    Unauthorized = 8,
    /// A token account does not match the expected mint or owner.
    #[error("a token account does not match what was expected")]
    InvalidTokenAccount = 9,
    /// The token generation event already happened.
    #[error("the TGE has already been triggered")]
    TgeAlreadyTriggered = 10,
    /// A computation overflowed on-chain.
    #[error("arithmetic overflow")]
    ArithmeticOverflow = 11,
    /// Any code this client does not know about.
    #[error("unknown error")]
    UnknownError = 255,
}

impl From<u32> for PresaleProgramError {
    fn from(value: u32) -> Self {
        Self::from_u32(value).unwrap_or(Self::UnknownError)
    }
}

impl PresaleProgramError {
    /// Extract the presale program error from a failed transaction, if any.
    ///
    /// # Parameters
    /// * `error` - The error reported by the cluster for the transaction.
    #[must_use]
    pub fn from_transaction_error(error: &TransactionError) -> Option<Self> {
        match error {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
                Some(Self::from(*code))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_known_codes() {
        assert_eq!(PresaleProgramError::from(1), PresaleProgramError::PresaleEnded);
        assert_eq!(
            PresaleProgramError::from(10),
            PresaleProgramError::TgeAlreadyTriggered
        );
        assert_eq!(PresaleProgramError::from(42), PresaleProgramError::UnknownError);
    }

    #[test]
    fn decode_transaction_error() {
        let error = TransactionError::InstructionError(0, InstructionError::Custom(2));
        assert_eq!(
            PresaleProgramError::from_transaction_error(&error),
            Some(PresaleProgramError::HardCapReached)
        );
        assert_eq!(
            PresaleProgramError::from_transaction_error(&TransactionError::BlockhashNotFound),
            None
        );
    }
}
