// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Testnet USDC transfer driven end to end by the state machine
//!
//! Required environment (a `.env` file works too):
//!
//! - `PRIVATE_KEY`: funded testnet key holding USDC on the source chain and
//!   some gas on the destination chain
//! - `RECIPIENT`: destination address (defaults to the signer)
//!
//! Optional: `CCTP_RPC_URLS_<CHAIN>`, `CCTP_*` executor overrides,
//! `CCTP_HISTORY_URL` and `RUST_LOG`.
//!
//! Run with: `cargo run --example transfer`

use alloy_chains::NamedChain;
use alloy_primitives::U256;
use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use cctp_orchestrator::{
    parse_recipient, CctpError, ChainRegistry, ExecutorConfig, HttpHistorySink, HttpRpcTransport,
    IrisAttestationProvider, ProviderSigner, TokioClock, TransferRequest, TransferStateMachine,
    TransferType,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const SOURCE: NamedChain = NamedChain::Sepolia;
const DESTINATION: NamedChain = NamedChain::BaseSepolia;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let wallet: PrivateKeySigner = dotenvy::var("PRIVATE_KEY")?.parse()?;
    let address = wallet.address();
    let recipient = match dotenvy::var("RECIPIENT") {
        Ok(raw) => parse_recipient(&raw)?,
        Err(_) => address,
    };

    let chains = ChainRegistry::testnet()?.with_env_overrides()?;

    let mut signer = ProviderSigner::new(address);
    for chain in [SOURCE, DESTINATION] {
        let descriptor = chains.resolve(chain)?;
        let provider = ProviderBuilder::new()
            .wallet(wallet.clone())
            .connect_http(descriptor.rpc_endpoints[0].clone());
        signer = signer.with_provider(descriptor.chain_id(), provider);
    }

    let mut machine = TransferStateMachine::new(
        chains,
        HttpRpcTransport::new()?,
        IrisAttestationProvider::for_chain(SOURCE)?,
        TokioClock,
        ExecutorConfig::from_env()?,
    )?;
    if let Some(history) = HttpHistorySink::from_env()? {
        machine = machine.with_history_sink(Arc::new(history));
    }
    let machine = Arc::new(machine);

    let request = TransferRequest::builder()
        .source_chain(SOURCE)
        .destination_chain(DESTINATION)
        .amount(U256::from(1_000_000u64))
        .recipient(recipient)
        .transfer_type(TransferType::Fast)
        .build();

    println!("Bridging 1 USDC from {SOURCE} to {DESTINATION} for {recipient}");

    let handle = machine.start(request, Arc::new(signer))?;
    let mut updates = machine
        .transfers()
        .subscribe(handle.id())
        .ok_or_else(|| CctpError::TransferNotFound(handle.id().to_string()))?;

    let progress = tokio::spawn(async move {
        let mut seen = 0;
        loop {
            let record = updates.borrow_and_update().clone();
            for event in &record.events()[seen..] {
                println!("  {event}");
            }
            seen = record.events().len();
            if record.is_terminal() || updates.changed().await.is_err() {
                break;
            }
        }
    });

    let record = handle.wait().await?;
    progress.await?;

    match record.failure() {
        None => println!(
            "Done: burn {:?}, mint {:?}",
            record.source_tx_hash(),
            record.destination_tx_hash()
        ),
        Some(failure) => println!("Failed ({:?}): {}", failure.kind, failure.message),
    }
    Ok(())
}
