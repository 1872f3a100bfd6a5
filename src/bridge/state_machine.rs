// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, TxHash};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Instrument};

use super::config::{ExecutorConfig, HISTORY_NOTIFY_TIMEOUT_SECS};
use super::history::HistoryEntry;
use super::params::DepositForBurnParams;
use super::poller::AttestationPoller;
use super::record::{TransferId, TransferRecord, TransferRequest, TransferState};
use super::registry::TransferRegistry;
use super::submitter::{SubmissionStep, TransactionSubmitter};
use crate::chain::ChainRegistry;
use crate::error::{CctpError, Result};
use crate::protocol::{address_to_bytes32, AttestationMessage};
use crate::providers::NoopHistorySink;
use crate::rpc::RpcClientPool;
use crate::spans;
use crate::traits::{AttestationProvider, Clock, HistorySink, RpcTransport, TransactionSigner};

/// Drives transfers from `Idle` through approve, burn, attestation and mint.
///
/// One machine serves any number of concurrent transfers; each transfer owns
/// its record, and the only shared state is the chain registry (read-only), the
/// per-chain RPC clients and the transfer registry.
///
/// ```rust,no_run
/// use cctp_orchestrator::{
///     ChainRegistry, ExecutorConfig, HttpRpcTransport, IrisAttestationProvider, TokioClock,
///     TransferRequest, TransferStateMachine,
/// };
/// use alloy_chains::NamedChain;
/// use alloy_primitives::{address, U256};
/// use std::sync::Arc;
///
/// # async fn example<S: cctp_orchestrator::TransactionSigner + 'static>(signer: Arc<S>) -> cctp_orchestrator::Result<()> {
/// let machine = Arc::new(TransferStateMachine::new(
///     ChainRegistry::testnet()?,
///     HttpRpcTransport::new()?,
///     IrisAttestationProvider::sandbox()?,
///     TokioClock,
///     ExecutorConfig::from_env()?,
/// )?);
///
/// let request = TransferRequest::builder()
///     .source_chain(NamedChain::Sepolia)
///     .destination_chain(NamedChain::BaseSepolia)
///     .amount(U256::from(1_000_000))
///     .recipient(address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d"))
///     .build();
///
/// let handle = machine.start(request, signer)?;
/// let record = handle.wait().await?;
/// println!("{} finished in state {}", record.id(), record.state());
/// # Ok(())
/// # }
/// ```
pub struct TransferStateMachine<T, A, C> {
    chains: Arc<ChainRegistry>,
    rpc: RpcClientPool<T>,
    poller: AttestationPoller<A, C>,
    clock: C,
    transfers: TransferRegistry,
    history: Arc<dyn HistorySink>,
    config: ExecutorConfig,
}

impl<T, A, C> TransferStateMachine<T, A, C>
where
    T: RpcTransport + Clone,
    A: AttestationProvider,
    C: Clock + Clone,
{
    pub fn new(
        chains: ChainRegistry,
        transport: T,
        attestation_provider: A,
        clock: C,
        config: ExecutorConfig,
    ) -> Result<Self> {
        let rpc = RpcClientPool::new(&chains, transport)?;
        let poller = AttestationPoller::new(attestation_provider, clock.clone(), config.polling());
        Ok(Self {
            chains: Arc::new(chains),
            rpc,
            poller,
            clock,
            transfers: TransferRegistry::new(),
            history: Arc::new(NoopHistorySink),
            config,
        })
    }

    /// Reports every terminal outcome to `sink`.
    pub fn with_history_sink(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history = sink;
        self
    }

    /// Publishes records into a registry shared with other components.
    pub fn with_transfer_registry(mut self, transfers: TransferRegistry) -> Self {
        self.transfers = transfers;
        self
    }

    pub fn transfers(&self) -> &TransferRegistry {
        &self.transfers
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Validates `request` and registers its `Idle` record.
    pub fn prepare(&self, request: TransferRequest) -> Result<TransferRecord> {
        request.validate()?;
        self.chains.resolve(request.source_chain)?;
        self.chains.resolve(request.destination_chain)?;

        let record = self.transfers.register(request, Utc::now());
        info!(
            transfer_id = %record.id(),
            source_chain = %record.request().source_chain,
            destination_chain = %record.request().destination_chain,
            amount = %record.request().amount,
            transfer_type = %record.request().transfer_type,
            event = "transfer_created"
        );
        Ok(record)
    }

    /// Runs a transfer to completion on the current task.
    ///
    /// Invalid requests are rejected before a record exists. Once the record
    /// is registered, every failure is captured in it and the returned record
    /// is terminal.
    pub async fn execute<S: TransactionSigner>(
        &self,
        request: TransferRequest,
        signer: &S,
        cancel: &CancellationToken,
    ) -> Result<TransferRecord> {
        let record = self.prepare(request)?;
        Ok(self.drive(record, signer, cancel).await)
    }

    /// Spawns a transfer onto the tokio runtime.
    pub fn start<S>(self: &Arc<Self>, request: TransferRequest, signer: Arc<S>) -> Result<TransferHandle>
    where
        S: TransactionSigner + 'static,
        T: 'static,
        A: 'static,
        C: 'static,
    {
        let record = self.prepare(request)?;
        let id = record.id().clone();
        let cancel = CancellationToken::new();

        let machine = Arc::clone(self);
        let token = cancel.clone();
        let task = tokio::spawn(async move { machine.drive(record, signer.as_ref(), &token).await });

        Ok(TransferHandle { id, cancel, task })
    }

    async fn drive<S: TransactionSigner>(
        &self,
        mut record: TransferRecord,
        signer: &S,
        cancel: &CancellationToken,
    ) -> TransferRecord {
        let request = record.request().clone();
        let span = spans::execute_transfer(
            record.id().as_str(),
            &request.source_chain,
            &request.destination_chain,
            &request.amount,
            request.transfer_type,
        );

        async {
            match self.run(&mut record, signer, cancel).await {
                Ok(()) => info!(
                    transfer_id = %record.id(),
                    source_tx_hash = ?record.source_tx_hash(),
                    destination_tx_hash = ?record.destination_tx_hash(),
                    event = "transfer_completed"
                ),
                Err(e) => {
                    spans::record_error(&e);
                    error!(
                        transfer_id = %record.id(),
                        state = %record.state(),
                        kind = ?e.kind(),
                        error = %e,
                        event = "transfer_failed"
                    );
                    match record.fail(&e) {
                        Ok(()) => {
                            if let Err(publish_error) = self.transfers.publish(&record) {
                                warn!(transfer_id = %record.id(), error = %publish_error, "Failed to publish failed transfer");
                            }
                        }
                        Err(fail_error) => {
                            warn!(transfer_id = %record.id(), error = %fail_error, "Transfer already terminal")
                        }
                    }
                }
            }
            self.notify_history(&record, signer.address(), cancel).await;
        }
        .instrument(span)
        .await;

        record
    }

    async fn run<S: TransactionSigner>(
        &self,
        record: &mut TransferRecord,
        signer: &S,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let request = record.request().clone();
        let source = self.chains.resolve(request.source_chain)?;
        let destination = self.chains.resolve(request.destination_chain)?;
        let source_rpc = self.rpc.client(source.chain)?;
        let destination_rpc = self.rpc.client(destination.chain)?;
        let on_source = TransactionSubmitter::new(&source_rpc, source, signer, &self.config);
        let on_destination =
            TransactionSubmitter::new(&destination_rpc, destination, signer, &self.config);

        // Approve
        self.advance(
            record,
            TransferState::Approving,
            format!("Checking USDC allowance on {}", source.name),
        )?;
        let allowance = cancellable(cancel, on_source.allowance(source.token_messenger)).await?;
        if allowance >= request.amount {
            info!(
                transfer_id = %record.id(),
                allowance = %allowance,
                event = "approval_skipped"
            );
            record.log(format!("Existing allowance {allowance} covers the transfer"))?;
        } else {
            let amount = self.config.approval_allowance().max(request.amount);
            let approval = cancellable(cancel, on_source.approve(source.token_messenger, amount)).await?;
            record.set_approval_tx_hash(approval)?;
            record.log(format!("Approval sent: {approval}"))?;
            self.publish(record)?;

            cancellable(
                cancel,
                on_source.wait_for_confirmation(SubmissionStep::Approve, approval),
            )
            .await?;
            record.log("Approval confirmed")?;
        }

        // Burn
        self.advance(
            record,
            TransferState::Burning,
            format!(
                "Burning {} USDC units on {} for {} ({})",
                request.amount, source.name, destination.name, request.transfer_type
            ),
        )?;
        let params = DepositForBurnParams::builder()
            .amount(request.amount)
            .destination_domain(destination.domain)
            .mint_recipient(address_to_bytes32(request.recipient))
            .burn_token(source.usdc)
            .max_fee(request.effective_max_fee())
            .transfer_type(request.transfer_type)
            .build();
        let burn = cancellable(cancel, on_source.deposit_for_burn(&params)).await?;
        record.set_source_tx_hash(burn)?;
        record.log(format!("Burn transaction sent: {burn}"))?;
        self.publish(record)?;
        info!(
            transfer_id = %record.id(),
            tx_hash = %burn,
            event = "burn_transaction_sent"
        );
        cancellable(
            cancel,
            on_source.wait_for_confirmation(SubmissionStep::DepositForBurn, burn),
        )
        .await?;
        record.log("Burn confirmed")?;

        // Attestation
        self.advance(
            record,
            TransferState::WaitingAttestation,
            format!("Waiting for attestation from domain {}", source.domain),
        )?;
        let attestation = cancellable(cancel, self.poller.poll(source.domain, burn)).await?;
        record.set_attestation(attestation.clone())?;
        record.log("Attestation received")?;
        self.publish(record)?;

        let balance = cancellable(cancel, destination_rpc.get_balance(signer.address())).await?;
        if balance < destination.min_gas_balance {
            return Err(CctpError::InsufficientGasFunds {
                chain: destination.name.clone(),
                balance,
                required: destination.min_gas_balance,
            });
        }

        // Mint
        self.advance(
            record,
            TransferState::Minting,
            format!("Minting on {}", destination.name),
        )?;
        let mint = self
            .mint_with_retry(record, &on_destination, &attestation, cancel)
            .await?;
        record.set_destination_tx_hash(mint)?;

        self.advance(
            record,
            TransferState::Completed,
            format!("Transfer completed, mint transaction {mint}"),
        )
    }

    /// `receiveMessage` with up to `mint_max_retries` retries after the first
    /// attempt. Retry `n` waits `n * mint_backoff`.
    async fn mint_with_retry<S: TransactionSigner>(
        &self,
        record: &mut TransferRecord,
        submitter: &TransactionSubmitter<'_, T, S>,
        attestation: &AttestationMessage,
        cancel: &CancellationToken,
    ) -> Result<TxHash> {
        let max_attempts = self.config.mint_max_retries() + 1;
        let mut attempt = 1u32;

        loop {
            match cancellable(cancel, mint_once(submitter, attestation, attempt)).await {
                Ok(tx_hash) => return Ok(tx_hash),
                Err(e @ CctpError::TransactionFailed { .. }) if attempt < max_attempts => {
                    let backoff = self.config.mint_backoff() * attempt;
                    warn!(
                        transfer_id = %record.id(),
                        attempt,
                        max_attempts,
                        backoff_secs = backoff.as_secs(),
                        error = %e,
                        event = "mint_retry"
                    );
                    record.log(format!(
                        "Mint attempt {attempt} failed: {e}. Retrying in {}s",
                        backoff.as_secs()
                    ))?;
                    self.publish(record)?;

                    cancellable(cancel, pause(&self.clock, backoff)).await?;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn advance(
        &self,
        record: &mut TransferRecord,
        next: TransferState,
        message: impl Into<String>,
    ) -> Result<()> {
        let from = record.state();
        record.transition(next, message)?;
        info!(
            transfer_id = %record.id(),
            from = %from,
            to = %next,
            event = "state_transition"
        );
        self.publish(record)
    }

    fn publish(&self, record: &TransferRecord) -> Result<()> {
        self.transfers.publish(record)
    }

    /// Reports the outcome to the history sink.
    ///
    /// The sink gets [`HISTORY_NOTIFY_TIMEOUT_SECS`] to answer and is abandoned
    /// early once `cancel` fires; neither case touches the record.
    async fn notify_history(
        &self,
        record: &TransferRecord,
        source_address: Address,
        cancel: &CancellationToken,
    ) {
        let entry = HistoryEntry::from_record(record, source_address);
        let outcome = tokio::select! {
            biased;
            outcome = tokio::time::timeout(
                Duration::from_secs(HISTORY_NOTIFY_TIMEOUT_SECS),
                self.history.record(&entry),
            ) => outcome,
            _ = cancel.cancelled() => {
                warn!(
                    transfer_id = %record.id(),
                    event = "history_sink_abandoned",
                    "Cancelled before the history sink answered"
                );
                return;
            }
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(
                transfer_id = %record.id(),
                error = %e,
                event = "history_sink_failed"
            ),
            Err(_) => warn!(
                transfer_id = %record.id(),
                timeout_secs = HISTORY_NOTIFY_TIMEOUT_SECS,
                event = "history_sink_timeout"
            ),
        }
    }
}

async fn mint_once<T: RpcTransport, S: TransactionSigner>(
    submitter: &TransactionSubmitter<'_, T, S>,
    attestation: &AttestationMessage,
    attempt: u32,
) -> Result<TxHash> {
    let tx_hash = submitter.receive_message(attestation, attempt).await?;
    submitter
        .wait_for_confirmation(SubmissionStep::ReceiveMessage, tx_hash)
        .await?;
    Ok(tx_hash)
}

async fn pause<C: Clock>(clock: &C, duration: Duration) -> Result<()> {
    clock.sleep(duration).await;
    Ok(())
}

/// Resolves to [`CctpError::Cancelled`] as soon as `cancel` fires.
async fn cancellable<T, F>(cancel: &CancellationToken, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CctpError::Cancelled),
        result = future => result,
    }
}

/// Handle to a transfer running on its own task.
#[derive(Debug)]
pub struct TransferHandle {
    id: TransferId,
    cancel: CancellationToken,
    task: JoinHandle<TransferRecord>,
}

impl TransferHandle {
    pub fn id(&self) -> &TransferId {
        &self.id
    }

    /// Requests cancellation. The transfer stops at its next await point and
    /// ends in `Error` with kind `cancelled`, unless it already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the terminal record.
    pub async fn wait(self) -> Result<TransferRecord> {
        Ok(self.task.await?)
    }
}
