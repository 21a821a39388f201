// File: kebapp-common/src/error.rs
// Project: kebapp-presale
// Creation date: Monday 18 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Tuesday 03 December 2024 @ 17:48:02
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::result;

use solana_sdk::transaction::TransactionError;
use thiserror::Error;

use crate::{
    errors::PresaleProgramError,
    notification::{Notification, NotificationKind},
};

/// Results for the presale client with an `Error` associated by default.
pub type Result<T, E = Error> = result::Result<T, E>;

/// Reason why an investment was refused before anything was sent.
///
/// The messages are the ones shown to the investor.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The presale is closed.
    #[error("Presale has ended")]
    PresaleEnded,
    /// The amount is not a number or is not strictly positive.
    #[error("Please enter a valid amount")]
    InvalidAmount,
    /// The amount is lower than the minimum for the token.
    #[error("Minimum investment is {minimum} {symbol}")]
    BelowMinimum {
        /// Minimum accepted amount.
        minimum: f64,
        /// Symbol of the token.
        symbol: String,
    },
    /// The amount is greater than the maximum for the token.
    #[error("Maximum investment is {maximum} {symbol}")]
    AboveMaximum {
        /// Maximum accepted amount.
        maximum: f64,
        /// Symbol of the token.
        symbol: String,
    },
    /// The wallet does not hold enough of the token.
    #[error("Insufficient balance. Required: {required} {symbol}")]
    InsufficientBalance {
        /// Amount the investor tried to invest.
        required: f64,
        /// Symbol of the token.
        symbol: String,
    },
    /// The investment would go past the hard cap.
    #[error("Investment would exceed hardcap")]
    HardCapExceeded,
    /// No wallet is connected.
    #[error("Please connect your wallet")]
    WalletNotConnected,
}

/// Errors raised while building an instruction payload.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum EncodingError {
    /// The amount is not a decimal number.
    #[error("the amount is not a decimal number")]
    NotANumber,
    /// The amount is negative.
    #[error("the amount must not be negative")]
    Negative,
    /// The scaled amount does not fit in 64 bits.
    #[error("the scaled amount does not fit in 64 bits")]
    Overflow,
    /// Referral codes are limited to 8 characters.
    #[error("referral codes are at most 8 characters long")]
    ReferralCodeTooLong,
    /// Referral codes only use printable ASCII characters.
    #[error("referral codes must be printable ASCII")]
    ReferralCodeNotAscii,
    /// The payload does not have a length this client knows about.
    #[error("instruction data has an unexpected length ({0} bytes)")]
    InvalidLength(usize),
    /// The token selector is not known.
    #[error("unknown token selector {0}")]
    UnknownToken(u8),
    /// The instruction tag is not known.
    #[error("unknown instruction {0}")]
    UnknownInstruction(u8),
}

/// Errors reported by a wallet adapter.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum WalletError {
    /// The wallet extension is not available.
    #[error("{0} wallet not found!")]
    NotFound(String),
    /// An operation needing a connected wallet was attempted without one.
    #[error("wallet is not connected")]
    NotConnected,
    /// The user refused the request.
    #[error("the request was rejected by the wallet")]
    Rejected,
    /// The transaction could not be signed.
    #[error("could not sign the transaction: {0}")]
    Signing(String),
}

/// Failure reported by the ledger, with the diagnostic logs when available.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{message}")]
pub struct LedgerError {
    /// Human readable message.
    pub message: String,
    /// Program logs returned by the cluster.
    pub logs: Vec<String>,
    /// The transaction error, if the failure comes from executing a transaction.
    pub transaction_error: Option<TransactionError>,
}

impl LedgerError {
    /// Create a new ledger error without logs.
    ///
    /// # Parameters
    /// * `message` - What went wrong.
    #[must_use]
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            logs: Vec::new(),
            transaction_error: None,
        }
    }

    /// Attach the program logs to the error.
    #[must_use]
    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = logs;
        self
    }

    /// Attach the transaction error to the error.
    #[must_use]
    pub fn with_transaction_error(mut self, error: TransactionError) -> Self {
        self.transaction_error = Some(error);
        self
    }

    /// The presale program error, if the transaction failed with one of its codes.
    #[must_use]
    pub fn program_error(&self) -> Option<PresaleProgramError> {
        self.transaction_error
            .as_ref()
            .and_then(PresaleProgramError::from_transaction_error)
    }

    /// Best description available for the investor.
    ///
    /// Decoded program errors come first, then the program logs, and finally the raw message.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        if let Some(error) = self.program_error() {
            return error.to_string();
        }
        if self.logs.is_empty() {
            self.message.clone()
        } else {
            self.logs.join("\n")
        }
    }
}

/// Custom error that can occur in the presale client.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// The investment was refused before anything was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// The instruction payload could not be built.
    #[error("could not encode the instruction: {0}")]
    Encoding(#[from] EncodingError),
    /// A required account could not be found.
    #[error("{0}")]
    AccountResolution(String),
    /// The cluster refused the transaction.
    #[error("Transaction failed: {}", .0.diagnostic())]
    Submission(LedgerError),
    /// The transaction was sent but failed on-chain.
    #[error("Transaction failed: {}", .0.diagnostic())]
    Confirmation(LedgerError),
    /// The transaction was not confirmed in time.
    #[error("Transaction was not confirmed in time")]
    ConfirmationTimeout,
    /// The presale is closed.
    #[error("Presale has ended")]
    PresaleEnded,
    /// The deposit would go past the hard cap.
    #[error("Amount exceeds hard cap")]
    HardCapExceeded,
    /// The wallet adapter failed.
    #[error("{0}")]
    Wallet(#[from] WalletError),
    /// A read from the ledger failed.
    #[error("ledger request failed: {0}")]
    Ledger(LedgerError),
    /// The price feed could not be read.
    #[error("price feed request failed: {0}")]
    PriceFeed(String),
    /// The signer is not allowed to perform this operation.
    #[error("Only admin can trigger TGE")]
    Unauthorized,
    /// The configuration is not consistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// An investment is already being processed.
    #[error("an investment is already being processed")]
    SubmissionInProgress,
    /// The data of an account is not the one of a token account.
    #[error("invalid data for token account")]
    InvalidTokenAccount,
    /// The data of an account could not be deserialized.
    #[error("data could not be deserialized as expected")]
    InvalidRawData,
}

impl From<LedgerError> for Error {
    fn from(error: LedgerError) -> Self {
        Self::Ledger(error)
    }
}

impl Error {
    /// The kind of notification matching this error.
    #[must_use]
    pub const fn notification_kind(&self) -> NotificationKind {
        match self {
            Self::Validation(ValidationError::WalletNotConnected)
            | Self::Wallet(WalletError::Rejected | WalletError::NotConnected)
            | Self::SubmissionInProgress => NotificationKind::Warning,
            _ => NotificationKind::Error,
        }
    }

    /// Convert the error into the notification shown to the investor.
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification {
            kind: self.notification_kind(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use solana_program::instruction::InstructionError;

    use super::*;

    #[test]
    fn validation_messages() {
        let error = ValidationError::BelowMinimum {
            minimum: 0.27,
            symbol: "SOL".to_owned(),
        };
        assert_eq!(error.to_string(), "Minimum investment is 0.27 SOL");
        let error = ValidationError::AboveMaximum {
            maximum: 5000.0,
            symbol: "USDT".to_owned(),
        };
        assert_eq!(error.to_string(), "Maximum investment is 5000 USDT");
    }

    #[test]
    fn diagnostic_prefers_program_error() {
        let error = LedgerError::new("transaction failed")
            .with_logs(vec!["Program log: hard cap".to_owned()])
            .with_transaction_error(TransactionError::InstructionError(
                0,
                InstructionError::Custom(2),
            ));
        assert_eq!(
            error.diagnostic(),
            "the investment would exceed the hard cap"
        );

        let error = LedgerError::new("transaction failed")
            .with_logs(vec!["log 1".to_owned(), "log 2".to_owned()]);
        assert_eq!(error.diagnostic(), "log 1\nlog 2");
        assert_eq!(
            Error::Submission(error).to_string(),
            "Transaction failed: log 1\nlog 2"
        );

        let error = LedgerError::new("blockhash not found");
        assert_eq!(error.diagnostic(), "blockhash not found");
    }

    #[test]
    fn notifications() {
        let notification = Error::Wallet(WalletError::Rejected).notification();
        assert_eq!(notification.kind, NotificationKind::Warning);

        let notification = Error::HardCapExceeded.notification();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "Amount exceeds hard cap");
    }
}
