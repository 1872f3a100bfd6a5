// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_chains::NamedChain;
use alloy_primitives::{Address, Bytes, TxHash, U128, U256, U64};
use alloy_rpc_types::TransactionRequest;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn, Instrument};
use url::Url;

use super::types::{BlockFees, ReceiptSummary};
use crate::chain::{ChainDescriptor, ChainRegistry};
use crate::error::{CctpError, EndpointError, Result};
use crate::gas::{calculate_gas_price_with_buffer, FeeData};
use crate::spans;
use crate::traits::RpcTransport;

/// Consecutive polls with neither a receipt nor a known transaction before it is
/// reported as dropped.
pub const DROPPED_AFTER_MISSES: u32 = 3;

/// One logical JSON-RPC client for a chain, backed by an ordered endpoint list.
///
/// The endpoint list is immutable. The only shared mutable state is the cursor,
/// an index into that list, which moves forward (wrapping) whenever the current
/// endpoint is rate limited or unreachable. A client is meant to be shared via
/// `Arc` by every transfer touching the chain.
///
/// ```rust,no_run
/// use cctp_orchestrator::{ChainRegistry, HttpRpcTransport, MultiEndpointRpcClient};
/// use alloy_chains::NamedChain;
/// use alloy_primitives::Address;
///
/// # async fn example() -> cctp_orchestrator::Result<()> {
/// let registry = ChainRegistry::testnet()?;
/// let sepolia = registry.resolve(NamedChain::Sepolia)?;
/// let client = MultiEndpointRpcClient::from_descriptor(sepolia, HttpRpcTransport::new()?)?;
///
/// let balance = client.get_balance(Address::ZERO).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MultiEndpointRpcClient<T> {
    chain: NamedChain,
    endpoints: Arc<[Url]>,
    cursor: AtomicUsize,
    transport: T,
}

impl<T: RpcTransport> MultiEndpointRpcClient<T> {
    pub fn new(chain: NamedChain, endpoints: Vec<Url>, transport: T) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(CctpError::InvalidConfig(format!(
                "{chain} has no RPC endpoints"
            )));
        }
        Ok(Self {
            chain,
            endpoints: endpoints.into(),
            cursor: AtomicUsize::new(0),
            transport,
        })
    }

    pub fn from_descriptor(descriptor: &ChainDescriptor, transport: T) -> Result<Self> {
        Self::new(descriptor.chain, descriptor.rpc_endpoints.clone(), transport)
    }

    pub fn chain(&self) -> NamedChain {
        self.chain
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// Endpoint the next call will try first.
    pub fn current_endpoint(&self) -> &Url {
        &self.endpoints[self.cursor.load(Ordering::Acquire) % self.endpoints.len()]
    }

    /// Issues `method`, failing over on rate limits and connection failures.
    ///
    /// Each endpoint is tried at most once per call, starting at the cursor.
    /// JSON-RPC error objects come from a healthy node and are returned
    /// immediately as [`CctpError::RpcResponse`].
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<R> {
        let value = self
            .call_with_failover(method, params)
            .instrument(spans::rpc_call(method, &self.chain))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn call_with_failover(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let total = self.endpoints.len();
        let start = self.cursor.load(Ordering::Acquire) % total;
        let mut last_error = None;

        for offset in 0..total {
            let index = (start + offset) % total;
            let endpoint = &self.endpoints[index];

            match self.transport.request(endpoint, method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    let next = (index + 1) % total;
                    // Concurrent callers that failed on the same endpoint advance it once.
                    let _ = self.cursor.compare_exchange(
                        index,
                        next,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                    warn!(
                        event = "endpoint_rotated",
                        chain = %self.chain,
                        failed_endpoint = %endpoint,
                        next_endpoint = %self.endpoints[next],
                        error = %err,
                        "RPC endpoint failed, rotating"
                    );
                    last_error = Some(err);
                }
                Err(EndpointError::Rpc { code, message }) => {
                    return Err(CctpError::RpcResponse { code, message })
                }
                Err(err) => {
                    return Err(CctpError::Provider(format!(
                        "{method} via {endpoint}: {err}"
                    )))
                }
            }
        }

        Err(CctpError::AllEndpointsExhausted {
            chain: self.chain.to_string(),
            attempts: total,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no endpoint attempted".to_string()),
        })
    }

    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        self.call("eth_getBalance", json!([address, "latest"])).await
    }

    pub async fn get_block_number(&self) -> Result<u64> {
        let number: U64 = self.call("eth_blockNumber", json!([])).await?;
        Ok(number.to::<u64>())
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        let gas: U64 = self.call("eth_estimateGas", json!([tx])).await?;
        Ok(gas.to::<u64>())
    }

    /// Read-only contract call against the latest block.
    pub async fn eth_call(&self, tx: &TransactionRequest) -> Result<Bytes> {
        self.call("eth_call", json!([tx, "latest"])).await
    }

    /// Current fee market.
    ///
    /// EIP-1559 caps are derived from the latest block's base fee as
    /// `2 * baseFee + priorityFee`; chains without a base fee only report a
    /// legacy gas price.
    pub async fn get_fee_data(&self) -> Result<FeeData> {
        let gas_price: U128 = self.call("eth_gasPrice", json!([])).await?;
        let block: Option<BlockFees> = self
            .call("eth_getBlockByNumber", json!(["latest", false]))
            .await?;

        let mut fees = FeeData {
            gas_price: Some(gas_price.to::<u128>()),
            ..Default::default()
        };

        if let Some(base_fee) = block.and_then(|b| b.base_fee_per_gas) {
            let priority: U128 = self.call("eth_maxPriorityFeePerGas", json!([])).await?;
            let (max_fee, max_priority) =
                calculate_gas_price_with_buffer(base_fee.to::<u128>(), priority.to::<u128>(), 0);
            fees.max_fee_per_gas = Some(max_fee);
            fees.max_priority_fee_per_gas = Some(max_priority);
        }

        Ok(fees)
    }

    pub async fn get_transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<ReceiptSummary>> {
        self.call("eth_getTransactionReceipt", json!([tx_hash])).await
    }

    /// Whether any endpoint still knows the transaction (mined or pending).
    pub async fn transaction_exists(&self, tx_hash: TxHash) -> Result<bool> {
        let tx: serde_json::Value = self
            .call("eth_getTransactionByHash", json!([tx_hash]))
            .await?;
        Ok(!tx.is_null())
    }

    /// Polls until `tx_hash` is mined with `confirmations` blocks on top (counting
    /// its own block), checking every `poll_interval`.
    ///
    /// Fails with [`CctpError::Timeout`] once `timeout` elapses and with
    /// [`CctpError::ReceiptUnavailable`] when the transaction disappears from the
    /// node for [`DROPPED_AFTER_MISSES`] consecutive polls. The returned receipt
    /// may report a revert; judging it is up to the caller.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<ReceiptSummary> {
        let confirmations = confirmations.max(1);

        tokio::time::timeout(
            timeout,
            self.poll_receipt(tx_hash, confirmations, poll_interval),
        )
        .instrument(spans::wait_for_receipt(tx_hash, &self.chain, confirmations))
        .await
        .map_err(|_| CctpError::Timeout {
            operation: format!("{confirmations} confirmation(s) of {tx_hash}"),
        })?
    }

    async fn poll_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
        poll_interval: Duration,
    ) -> Result<ReceiptSummary> {
        let mut misses = 0u32;
        loop {
            match self.get_transaction_receipt(tx_hash).await? {
                Some(receipt) => {
                    misses = 0;
                    if let Some(mined_in) = receipt.block_number() {
                        let head = self.get_block_number().await?;
                        let observed = head.saturating_sub(mined_in) + 1;
                        if observed >= confirmations {
                            debug!(tx_hash = %tx_hash, block = mined_in, observed, "Transaction confirmed");
                            return Ok(receipt);
                        }
                        trace!(tx_hash = %tx_hash, observed, required = confirmations, "Awaiting confirmations");
                    }
                }
                None if self.transaction_exists(tx_hash).await? => misses = 0,
                None => {
                    misses += 1;
                    if misses >= DROPPED_AFTER_MISSES {
                        return Err(CctpError::ReceiptUnavailable { tx_hash });
                    }
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// One shared [`MultiEndpointRpcClient`] per registered chain.
#[derive(Debug)]
pub struct RpcClientPool<T> {
    clients: HashMap<NamedChain, Arc<MultiEndpointRpcClient<T>>>,
}

impl<T: RpcTransport + Clone> RpcClientPool<T> {
    pub fn new(registry: &ChainRegistry, transport: T) -> Result<Self> {
        let clients = registry
            .descriptors()
            .map(|descriptor| {
                MultiEndpointRpcClient::from_descriptor(descriptor, transport.clone())
                    .map(|client| (descriptor.chain, Arc::new(client)))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { clients })
    }

    pub fn client(&self, chain: NamedChain) -> Result<Arc<MultiEndpointRpcClient<T>>> {
        self.clients
            .get(&chain)
            .cloned()
            .ok_or_else(|| CctpError::UnknownChain {
                chain: chain.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRpcTransport;

    fn endpoints() -> Vec<Url> {
        ["http://a.local", "http://b.local", "http://c.local"]
            .iter()
            .map(|s| Url::parse(s).unwrap())
            .collect()
    }

    fn client(transport: FakeRpcTransport) -> MultiEndpointRpcClient<FakeRpcTransport> {
        MultiEndpointRpcClient::new(NamedChain::Sepolia, endpoints(), transport).unwrap()
    }

    #[tokio::test]
    async fn test_failover_skips_rate_limited_endpoints() {
        let transport = FakeRpcTransport::healthy();
        let [a, b, c]: [Url; 3] = endpoints().try_into().unwrap();
        transport.fail_endpoint(&a, EndpointError::RateLimited);
        transport.fail_endpoint(&b, EndpointError::RateLimited);

        let client = client(transport.clone());
        assert_eq!(client.get_block_number().await.unwrap(), 0x10);

        let attempted: Vec<Url> = transport.calls().into_iter().map(|c| c.endpoint).collect();
        assert_eq!(attempted, vec![a, b, c.clone()]);
        assert_eq!(client.current_endpoint(), &c);

        // Subsequent calls go straight to the healthy endpoint.
        client.get_block_number().await.unwrap();
        assert_eq!(transport.calls().len(), 4);
        assert_eq!(transport.calls()[3].endpoint, c);
    }

    #[tokio::test]
    async fn test_connection_failure_rotates_with_wrap_around() {
        let transport = FakeRpcTransport::healthy();
        let [a, b, c]: [Url; 3] = endpoints().try_into().unwrap();
        let client = client(transport.clone());

        transport.fail_endpoint(&a, EndpointError::Unavailable("connection refused".into()));
        client.get_block_number().await.unwrap();
        assert_eq!(client.current_endpoint(), &b);

        transport.fail_endpoint(&b, EndpointError::Unavailable("connection reset".into()));
        transport.fail_endpoint(&c, EndpointError::RateLimited);
        transport.heal_endpoint(&a);
        client.get_block_number().await.unwrap();
        assert_eq!(client.current_endpoint(), &a);
    }

    #[tokio::test]
    async fn test_all_endpoints_exhausted() {
        let transport = FakeRpcTransport::healthy();
        for endpoint in endpoints() {
            transport.fail_endpoint(&endpoint, EndpointError::RateLimited);
        }

        let err = client(transport.clone()).get_block_number().await.unwrap_err();
        assert!(matches!(
            err,
            CctpError::AllEndpointsExhausted { attempts: 3, .. }
        ));
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_rpc_error_is_not_retried() {
        let transport = FakeRpcTransport::healthy();
        transport.fail_method(
            "eth_estimateGas",
            EndpointError::Rpc {
                code: 3,
                message: "execution reverted".into(),
            },
        );

        let err = client(transport.clone())
            .estimate_gas(&TransactionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CctpError::RpcResponse { code: 3, .. }));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fee_data_from_latest_block() {
        let transport = FakeRpcTransport::healthy();
        transport.set_result("eth_getBlockByNumber", json!({ "baseFeePerGas": "0x3b9aca00" }));
        transport.set_result("eth_maxPriorityFeePerGas", json!("0x77359400"));
        transport.set_result("eth_gasPrice", json!("0x4a817c800"));

        let fees = client(transport).get_fee_data().await.unwrap();
        assert_eq!(fees.gas_price, Some(20_000_000_000));
        assert_eq!(fees.max_priority_fee_per_gas, Some(2_000_000_000));
        assert_eq!(fees.max_fee_per_gas, Some(4_000_000_000));
    }

    #[tokio::test]
    async fn test_fee_data_without_base_fee_is_legacy() {
        let transport = FakeRpcTransport::healthy();
        transport.set_result("eth_getBlockByNumber", json!({ "number": "0x10" }));

        let fees = client(transport.clone()).get_fee_data().await.unwrap();
        assert!(!fees.is_eip1559());
        assert!(transport.calls_for("eth_maxPriorityFeePerGas").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_receipt_counts_confirmations() {
        let transport = FakeRpcTransport::healthy();
        transport.set_result(
            "eth_getTransactionReceipt",
            json!({ "blockNumber": "0x10", "status": "0x1" }),
        );
        transport.push_result("eth_blockNumber", json!("0x10"));
        transport.push_result("eth_blockNumber", json!("0x11"));
        transport.set_result("eth_blockNumber", json!("0x12"));

        let receipt = client(transport.clone())
            .wait_for_receipt(
                TxHash::repeat_byte(1),
                3,
                Duration::from_secs(60),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert!(receipt.succeeded());
        assert_eq!(transport.calls_for("eth_blockNumber").len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_receipt_times_out() {
        let transport = FakeRpcTransport::healthy();
        transport.set_result("eth_getTransactionReceipt", json!(null));

        let start = tokio::time::Instant::now();
        let err = client(transport)
            .wait_for_receipt(
                TxHash::repeat_byte(2),
                1,
                Duration::from_secs(10),
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CctpError::Timeout { .. }));
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_receipt_detects_dropped_transaction() {
        let transport = FakeRpcTransport::healthy();
        transport.set_result("eth_getTransactionReceipt", json!(null));
        transport.set_result("eth_getTransactionByHash", json!(null));

        let tx_hash = TxHash::repeat_byte(3);
        let err = client(transport.clone())
            .wait_for_receipt(tx_hash, 1, Duration::from_secs(60), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, CctpError::ReceiptUnavailable { tx_hash: h } if h == tx_hash));
        assert_eq!(
            transport.calls_for("eth_getTransactionReceipt").len(),
            DROPPED_AFTER_MISSES as usize
        );
    }

    #[test]
    fn test_pool_rejects_unknown_chain() {
        let registry = ChainRegistry::testnet().unwrap();
        let pool = RpcClientPool::new(&registry, FakeRpcTransport::healthy()).unwrap();

        assert!(pool.client(NamedChain::BaseSepolia).is_ok());
        assert!(matches!(
            pool.client(NamedChain::Base),
            Err(CctpError::UnknownChain { .. })
        ));
    }
}
