// File: kebapp-presale/src/rpc.rs
// Project: kebapp-presale
// Creation date: Friday 22 November 2024
// Author: Kebapp Team <dev@kebappcoin.io>
// -----
// Last modified: Wednesday 04 December 2024 @ 18:44:03
// Modified by: Kebapp Team
// -----
// Copyright © 2024 <KebappCoin> - All rights reserved

use std::time::Duration;

use kebapp_common::{
    debug,
    ledger::{Anchor, Confirmation, Ledger},
    LedgerError,
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::{
    client_error::{Error as ClientError, ErrorKind},
    config::{RpcProgramAccountsConfig, RpcSendTransactionConfig, RpcTransactionConfig},
    filter::RpcFilterType,
    request::{RpcError, RpcResponseErrorData, TokenAccountsFilter},
    response::RpcSimulateTransactionResult,
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use solana_transaction_status::{option_serializer::OptionSerializer, UiTransactionEncoding};

use crate::PresaleConfig;

const CONFIRMATION_POLL: Duration = Duration::from_millis(500);

/// Ledger reached through a JSON-RPC node.
pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    /// Connect to the node of the configuration.
    #[must_use]
    pub fn new(config: &PresaleConfig) -> Self {
        let commitment = config.commitment_config();
        Self {
            client: RpcClient::new_with_commitment(config.rpc_url.clone(), commitment),
            commitment,
        }
    }

    /// Program logs of an executed transaction, empty if they can't be read.
    async fn transaction_logs(&self, signature: &Signature) -> Vec<String> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };
        match self.client.get_transaction_with_config(signature, config).await {
            Ok(transaction) => match transaction.transaction.meta.map(|meta| meta.log_messages) {
                Some(OptionSerializer::Some(logs)) => logs,
                _ => Vec::new(),
            },
            Err(err) => {
                debug!("could not read the logs of {}: {}", signature, err);
                Vec::new()
            }
        }
    }
}

/// Convert an RPC error, keeping the preflight logs and the transaction error.
fn ledger_error(err: ClientError) -> LedgerError {
    let mut error = LedgerError::new(err.to_string());
    if let ErrorKind::RpcError(RpcError::RpcResponseError {
        data:
            RpcResponseErrorData::SendTransactionPreflightFailure(RpcSimulateTransactionResult {
                logs: Some(logs),
                ..
            }),
        ..
    }) = err.kind()
    {
        error = error.with_logs(logs.clone());
    }
    if let Some(transaction_error) = err.get_transaction_error() {
        error = error.with_transaction_error(transaction_error);
    }
    error
}

impl Ledger for RpcLedger {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        self.client.get_balance(address).await.map_err(ledger_error)
    }

    async fn latest_anchor(&self) -> Result<Anchor, LedgerError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(ledger_error)?;
        Ok(Anchor {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, LedgerError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };
        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(ledger_error)
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        anchor: &Anchor,
    ) -> Result<Confirmation, LedgerError> {
        loop {
            let status = self
                .client
                .get_signature_statuses(&[*signature])
                .await
                .map_err(ledger_error)?
                .value
                .into_iter()
                .next()
                .flatten();
            match status {
                Some(status) => {
                    if let Some(err) = status.err {
                        let logs = self.transaction_logs(signature).await;
                        return Ok(Confirmation::Failed(
                            LedgerError::new(err.to_string())
                                .with_logs(logs)
                                .with_transaction_error(err),
                        ));
                    }
                    if status.satisfies_commitment(self.commitment) {
                        return Ok(Confirmation::Confirmed);
                    }
                }
                None => {
                    let height = self
                        .client
                        .get_block_height_with_commitment(self.commitment)
                        .await
                        .map_err(ledger_error)?;
                    if height > anchor.last_valid_block_height {
                        return Ok(Confirmation::Expired);
                    }
                }
            }
            tokio::time::sleep(CONFIRMATION_POLL).await;
        }
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map_err(ledger_error)?
            .value)
    }

    async fn token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<Pubkey>, LedgerError> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::Mint(*mint))
            .await
            .map_err(ledger_error)?;
        accounts
            .into_iter()
            .map(|account| {
                account.pubkey.parse().map_err(|_| {
                    LedgerError::new(format!("invalid token account address {}", account.pubkey))
                })
            })
            .collect()
    }

    async fn program_accounts(
        &self,
        program_id: &Pubkey,
        data_size: u64,
    ) -> Result<Vec<(Pubkey, Account)>, LedgerError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::DataSize(data_size)]),
            ..RpcProgramAccountsConfig::default()
        };
        self.client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(ledger_error)
    }
}
