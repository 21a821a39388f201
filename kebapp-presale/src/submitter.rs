// File: kebapp-presale/src/submitter.rs
// Project: kebapp-presale
// Creation date: Wednesday 20 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Thursday 05 December 2024 @ 11:18:46
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use kebapp_common::{
    debug,
    ledger::{Confirmation, Ledger},
    notification::{Notification, Notifier},
    wallet::WalletProvider,
    Error, LedgerError, Result, ValidationError,
};
use log::{info, warn};
use solana_program::{instruction::Instruction, pubkey::Pubkey};
use solana_sdk::{signature::Signature, transaction::Transaction};
use tokio::{sync::watch, time::timeout};

use crate::{
    referral::{fetch_referral, generate_referral, referral_code_for},
    resolve_investment_accounts, validate_investment, InvestmentInstruction, OracleCache,
    PresaleAction, PresaleConfig, PresaleInstruction, PresaleStore, ReferralCode,
    TokenSelector, ValidationInput, WalletSession,
};

/// Progress of a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing is being submitted.
    Idle,
    /// The instruction and its accounts are being prepared.
    Building,
    /// Waiting for the wallet to sign.
    AwaitingSignature,
    /// The signed transaction is being sent.
    Submitting,
    /// Waiting for the transaction to be confirmed.
    Confirming(Signature),
    /// The transaction was confirmed.
    Succeeded(Signature),
    /// The transaction failed on-chain or was not confirmed in time.
    Failed(String),
}

/// Releases the submission slot when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Builds, signs, sends and confirms the presale transactions, one at a time.
///
/// Every failure is turned into a notification and nothing is retried.
pub struct Submitter<L, W> {
    ledger: Arc<L>,
    session: Arc<WalletSession<W>>,
    config: Arc<PresaleConfig>,
    store: Arc<PresaleStore>,
    balances: watch::Receiver<OracleCache>,
    notifier: Notifier,
    state: watch::Sender<SubmissionState>,
    in_flight: AtomicBool,
}

impl<L: Ledger, W: WalletProvider> Submitter<L, W> {
    /// Create a new submitter.
    ///
    /// # Parameters
    /// * `ledger` - Access to the cluster,
    /// * `session` - The investor's wallet,
    /// * `config` - The presale configuration,
    /// * `store` - The presale state,
    /// * `balances` - Cached balances (from the oracle),
    /// * `notifier` - Where the investor notifications go.
    #[must_use]
    pub fn new(
        ledger: Arc<L>,
        session: Arc<WalletSession<W>>,
        config: Arc<PresaleConfig>,
        store: Arc<PresaleStore>,
        balances: watch::Receiver<OracleCache>,
        notifier: Notifier,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            ledger,
            session,
            config,
            store,
            balances,
            notifier,
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current state of the submission.
    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    /// Follow the state of the submissions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    pub(crate) const fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub(crate) const fn config(&self) -> &Arc<PresaleConfig> {
        &self.config
    }

    pub(crate) const fn session(&self) -> &Arc<WalletSession<W>> {
        &self.session
    }

    fn set_state(&self, state: SubmissionState) {
        debug!("submission state: {:?}", state);
        self.state.send_replace(state);
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(Error::SubmissionInProgress);
        }
        Ok(InFlight(&self.in_flight))
    }

    /// Notify the investor of a failure.
    pub(crate) fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!("presale operation failed: {err}");
            self.notifier.notify(err.notification());
        }
        result
    }

    fn connected_wallet(&self) -> Result<Pubkey> {
        self.session
            .address()
            .ok_or(Error::Validation(ValidationError::WalletNotConnected))
    }

    /// Invest in the presale.
    ///
    /// On success the deposit is added to the presale state.
    ///
    /// # Parameters
    /// * `token` - Token invested,
    /// * `amount` - Decimal amount typed by the investor,
    /// * `referral` - Referral code typed by the investor.
    ///
    /// # Errors
    /// If the investment is not valid, an account is missing, the wallet refused to sign,
    /// or the transaction failed.
    pub async fn invest(
        &self,
        token: TokenSelector,
        amount: &str,
        referral: Option<&str>,
    ) -> Result<Signature> {
        let result = self.try_invest(token, amount, referral).await;
        self.report(result)
    }

    async fn try_invest(
        &self,
        token: TokenSelector,
        amount: &str,
        referral: Option<&str>,
    ) -> Result<Signature> {
        let _slot = self.begin()?;
        let payer = self.connected_wallet()?;
        let deposit = {
            let state = self.store.get_state();
            let balances = self.balances.borrow();
            validate_investment(&ValidationInput::new(
                &self.config,
                token,
                amount,
                &state,
                &balances,
            ))?
        };

        self.set_state(SubmissionState::Building);
        let instruction = match self.build_investment(token, amount, referral, &payer).await {
            Ok(instruction) => instruction,
            Err(err) => {
                self.set_state(SubmissionState::Idle);
                return Err(err);
            }
        };
        let signature = self.process(payer, instruction).await?;

        info!("investment of {amount} {token} confirmed: {signature}");
        self.notifier
            .notify(Notification::success("Investment successful!"));
        if let Err(err) = self.store.dispatch(PresaleAction::AddDeposit(deposit)) {
            warn!("deposit not added to the local total: {err}");
        }
        Ok(signature)
    }

    async fn build_investment(
        &self,
        token: TokenSelector,
        amount: &str,
        referral: Option<&str>,
        payer: &Pubkey,
    ) -> Result<Instruction> {
        let investment = InvestmentInstruction::new(token, amount, referral)?;
        let accounts = resolve_investment_accounts(
            self.ledger.as_ref(),
            &self.config,
            token,
            payer,
            investment.referral_code.as_ref(),
        )
        .await?;
        debug!("investment payload: {:?}", investment.encode());
        Ok(Instruction {
            program_id: self.config.program_id,
            accounts,
            data: PresaleInstruction::Invest(investment).pack(),
        })
    }

    /// Sign, send and confirm an instruction with the connected wallet as fee payer.
    ///
    /// # Parameters
    /// * `instruction` - The instruction to execute,
    /// * `success` - Message notified once the transaction is confirmed.
    ///
    /// # Errors
    /// If no wallet is connected, another submission is running, the wallet refused to sign,
    /// or the transaction failed.
    pub async fn execute(&self, instruction: Instruction, success: &str) -> Result<Signature> {
        let result = async {
            let _slot = self.begin()?;
            let payer = self.connected_wallet()?;
            self.set_state(SubmissionState::Building);
            let signature = self.process(payer, instruction).await?;
            info!("transaction confirmed: {signature}");
            self.notifier.notify(Notification::success(success));
            Ok(signature)
        }
        .await;
        self.report(result)
    }

    /// Register the referral code of the connected wallet.
    ///
    /// Nothing is sent if the wallet already has a referral code.
    ///
    /// # Errors
    /// If no wallet is connected or the transaction failed.
    pub async fn register_referral(&self) -> Result<ReferralCode> {
        let owner = self.report(self.connected_wallet())?;
        if let Some(record) = self.report(
            fetch_referral(self.ledger.as_ref(), &self.config, &owner).await,
        )? {
            let code = record.referral_code();
            self.notifier
                .notify(Notification::info(format!("Your referral code is {code}")));
            return Ok(code);
        }
        let code = referral_code_for(&owner);
        self.execute(
            generate_referral(&self.config, &owner),
            &format!("Referral code {code} generated"),
        )
        .await?;
        Ok(code)
    }

    /// Runs from `Building` to `Succeeded`, `Failed` or back to `Idle`.
    async fn process(&self, payer: Pubkey, instruction: Instruction) -> Result<Signature> {
        let anchor = match self.ledger.latest_anchor().await {
            Ok(anchor) => anchor,
            Err(err) => {
                self.set_state(SubmissionState::Idle);
                return Err(Error::Ledger(err));
            }
        };
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer));
        transaction.message.recent_blockhash = anchor.blockhash;

        self.set_state(SubmissionState::AwaitingSignature);
        let signed = match self.session.sign_transaction(transaction).await {
            Ok(signed) => signed,
            Err(err) => {
                self.set_state(SubmissionState::Idle);
                return Err(err.into());
            }
        };

        self.set_state(SubmissionState::Submitting);
        let signature = match self.ledger.send_transaction(&signed).await {
            Ok(signature) => signature,
            Err(err) => {
                self.set_state(SubmissionState::Idle);
                return Err(Error::Submission(err));
            }
        };

        self.set_state(SubmissionState::Confirming(signature));
        let confirmation = timeout(
            self.config.confirmation_timeout(),
            self.ledger.confirm_transaction(&signature, &anchor),
        )
        .await;
        let err = match confirmation {
            Ok(Ok(Confirmation::Confirmed)) => {
                self.set_state(SubmissionState::Succeeded(signature));
                return Ok(signature);
            }
            Ok(Ok(Confirmation::Failed(err)) | Err(err)) => Error::Confirmation(err),
            Ok(Ok(Confirmation::Expired)) => Error::Confirmation(LedgerError::new(
                "the transaction expired before being confirmed",
            )),
            Err(_) => Error::ConfirmationTimeout,
        };
        self.set_state(SubmissionState::Failed(err.to_string()));
        Err(err)
    }
}
