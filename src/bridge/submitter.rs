// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, TxHash, U256};
use alloy_rpc_types::TransactionRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, Instrument};

use super::config::ExecutorConfig;
use super::params::DepositForBurnParams;
use crate::chain::ChainDescriptor;
use crate::contracts::{Erc20Contract, MessageTransmitterV2Contract, TokenMessengerV2Contract};
use crate::error::{CctpError, Result};
use crate::gas::apply_gas_buffer;
use crate::protocol::AttestationMessage;
use crate::rpc::{MultiEndpointRpcClient, ReceiptSummary};
use crate::spans;
use crate::traits::{RpcTransport, TransactionSigner};

/// Contract call a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionStep {
    Approve,
    DepositForBurn,
    ReceiveMessage,
}

impl SubmissionStep {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::DepositForBurn => "depositForBurn",
            Self::ReceiveMessage => "receiveMessage",
        }
    }
}

impl fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds, signs and sends the CCTP contract calls on one chain.
///
/// Every failure while submitting surfaces as
/// [`CctpError::TransactionFailed`] tagged with the step, so callers can
/// tell an approval problem from a mint problem.
pub struct TransactionSubmitter<'a, T, S> {
    rpc: &'a MultiEndpointRpcClient<T>,
    chain: &'a ChainDescriptor,
    signer: &'a S,
    config: &'a ExecutorConfig,
}

impl<'a, T: RpcTransport, S: TransactionSigner> TransactionSubmitter<'a, T, S> {
    pub fn new(
        rpc: &'a MultiEndpointRpcClient<T>,
        chain: &'a ChainDescriptor,
        signer: &'a S,
        config: &'a ExecutorConfig,
    ) -> Self {
        Self {
            rpc,
            chain,
            signer,
            config,
        }
    }

    pub fn chain(&self) -> &ChainDescriptor {
        self.chain
    }

    /// USDC the signer has allowed `spender` to pull.
    pub async fn allowance(&self, spender: Address) -> Result<U256> {
        let usdc = Erc20Contract::new(self.chain.usdc);
        let output = self
            .rpc
            .eth_call(&usdc.allowance_call(self.signer.address(), spender))
            .await?;
        Erc20Contract::decode_uint256(&output)
    }

    /// Signer's USDC balance on this chain.
    pub async fn usdc_balance(&self) -> Result<U256> {
        let usdc = Erc20Contract::new(self.chain.usdc);
        let output = self
            .rpc
            .eth_call(&usdc.balance_of_call(self.signer.address()))
            .await?;
        Erc20Contract::decode_uint256(&output)
    }

    /// Sends `approve(spender, amount)` on the chain's USDC contract.
    pub async fn approve(&self, spender: Address, amount: U256) -> Result<TxHash> {
        let tx = Erc20Contract::new(self.chain.usdc).approve_transaction(
            self.signer.address(),
            spender,
            amount,
        );
        self.send(SubmissionStep::Approve, tx, 1).await
    }

    /// Sends `depositForBurn` on the chain's TokenMessengerV2.
    ///
    /// The signer must hold at least `params.amount()` USDC.
    pub async fn deposit_for_burn(&self, params: &DepositForBurnParams) -> Result<TxHash> {
        params.validate()?;

        let balance = self
            .usdc_balance()
            .await
            .map_err(|e| e.into_step_failure(SubmissionStep::DepositForBurn))?;
        if balance < params.amount() {
            return Err(CctpError::TransactionFailed {
                step: SubmissionStep::DepositForBurn,
                reason: format!(
                    "insufficient USDC balance: have {balance}, need {}",
                    params.amount()
                ),
            });
        }

        let tx = TokenMessengerV2Contract::new(self.chain.token_messenger)
            .deposit_for_burn_transaction(self.signer.address(), params);
        self.send(SubmissionStep::DepositForBurn, tx, 1).await
    }

    /// Sends `receiveMessage` on the chain's MessageTransmitterV2.
    ///
    /// Gas comes from an estimate plus the configured buffer; fees are the
    /// node's current fees times the configured multiplier.
    pub async fn receive_message(
        &self,
        attestation: &AttestationMessage,
        attempt: u32,
    ) -> Result<TxHash> {
        let step = SubmissionStep::ReceiveMessage;
        let mut tx = MessageTransmitterV2Contract::new(self.chain.message_transmitter)
            .receive_message_transaction(
                self.signer.address(),
                &attestation.message,
                &attestation.attestation,
            );

        let estimate = self
            .rpc
            .estimate_gas(&tx)
            .await
            .map_err(|e| e.into_step_failure(step))?;
        let gas = apply_gas_buffer(estimate, self.config.gas_buffer_percent());

        let fees = self
            .rpc
            .get_fee_data()
            .await
            .map_err(|e| e.into_step_failure(step))?
            .scaled(self.config.fee_multiplier());

        debug!(
            chain = %self.chain.chain,
            estimate,
            gas,
            max_fee_per_gas = ?fees.max_fee_per_gas,
            gas_price = ?fees.gas_price,
            "Prepared receiveMessage"
        );

        tx.gas = Some(gas);
        if fees.is_eip1559() {
            tx.max_fee_per_gas = fees.max_fee_per_gas;
            tx.max_priority_fee_per_gas = fees.max_priority_fee_per_gas;
        } else {
            tx.gas_price = fees.gas_price;
        }

        self.send(step, tx, attempt).await
    }

    /// Waits for the configured confirmations of `tx_hash` and fails if it reverted.
    pub async fn wait_for_confirmation(
        &self,
        step: SubmissionStep,
        tx_hash: TxHash,
    ) -> Result<ReceiptSummary> {
        let receipt = self
            .rpc
            .wait_for_receipt(
                tx_hash,
                self.config.confirmations(),
                self.config.receipt_timeout(),
                self.config.receipt_poll_interval(),
            )
            .await
            .map_err(|e| e.into_step_failure(step))?;

        if !receipt.succeeded() {
            return Err(CctpError::TransactionFailed {
                step,
                reason: format!(
                    "transaction {tx_hash} reverted in block {}",
                    receipt
                        .block_number()
                        .map_or_else(|| "unknown".to_string(), |n| n.to_string())
                ),
            });
        }
        Ok(receipt)
    }

    async fn send(&self, step: SubmissionStep, tx: TransactionRequest, attempt: u32) -> Result<TxHash> {
        let span = spans::submit_transaction(step, &self.chain.chain, attempt);
        async {
            match self.signer.sign_and_send(self.chain.chain_id(), tx).await {
                Ok(tx_hash) => {
                    tracing::Span::current().record("tx_hash", tracing::field::display(tx_hash));
                    info!(
                        step = %step,
                        chain = %self.chain.chain,
                        tx_hash = %tx_hash,
                        event = "transaction_sent"
                    );
                    Ok(tx_hash)
                }
                Err(e) => {
                    spans::record_error(&e);
                    Err(e.into_step_failure(step))
                }
            }
        }
        .instrument(span)
        .await
    }
}
