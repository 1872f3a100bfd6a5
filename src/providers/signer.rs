// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Alloy-based transaction signer.

use alloy_network::Ethereum;
use alloy_primitives::{Address, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::error::{CctpError, Result};
use crate::traits::TransactionSigner;

/// [`TransactionSigner`] that delegates to one wallet-enabled Alloy provider
/// per chain.
///
/// Every provider must sign with the key behind `address`; nonce, gas and
/// fee fields left empty are completed by the provider's fillers.
///
/// ```rust,no_run
/// use cctp_orchestrator::ProviderSigner;
/// use alloy_chains::NamedChain;
/// use alloy_provider::ProviderBuilder;
/// use alloy_signer_local::PrivateKeySigner;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet: PrivateKeySigner = std::env::var("PRIVATE_KEY")?.parse()?;
/// let address = wallet.address();
/// let sepolia = ProviderBuilder::new()
///     .wallet(wallet)
///     .connect_http("https://ethereum-sepolia-rpc.publicnode.com".parse()?);
///
/// let signer = ProviderSigner::new(address).with_provider(NamedChain::Sepolia as u64, sepolia);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProviderSigner<P> {
    address: Address,
    providers: HashMap<u64, P>,
}

impl<P: Provider<Ethereum>> ProviderSigner<P> {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            providers: HashMap::new(),
        }
    }

    pub fn with_provider(mut self, chain_id: u64, provider: P) -> Self {
        self.providers.insert(chain_id, provider);
        self
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.providers.keys().copied()
    }
}

#[async_trait]
impl<P: Provider<Ethereum>> TransactionSigner for ProviderSigner<P> {
    fn address(&self) -> Address {
        self.address
    }

    #[instrument(skip(self, tx), fields(from = %self.address))]
    async fn sign_and_send(&self, chain_id: u64, mut tx: TransactionRequest) -> Result<TxHash> {
        let provider = self.providers.get(&chain_id).ok_or_else(|| {
            CctpError::InvalidConfig(format!("no signing provider configured for chain id {chain_id}"))
        })?;

        tx.from = Some(self.address);
        tx.chain_id = Some(chain_id);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| CctpError::Provider(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        debug!(tx_hash = %tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }
}
