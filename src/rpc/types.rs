// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_json_rpc::ErrorPayload;
use alloy_primitives::{TxHash, U128, U64};
use serde::{Deserialize, Serialize};

/// The subset of `eth_getTransactionReceipt` the orchestrator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSummary {
    #[serde(default)]
    pub transaction_hash: Option<TxHash>,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub gas_used: Option<U64>,
}

impl ReceiptSummary {
    /// `false` only for receipts that explicitly report status `0x0`.
    #[inline]
    pub fn succeeded(&self) -> bool {
        !matches!(self.status, Some(status) if status == U64::ZERO)
    }

    #[inline]
    pub fn block_number(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse {
    /// `null` is a legitimate result (e.g. receipt not yet available).
    #[serde(default)]
    pub result: serde_json::Value,
    #[serde(default)]
    pub error: Option<ErrorPayload>,
}

/// Fee-related fields of `eth_getBlockByNumber`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlockFees {
    #[serde(default)]
    pub base_fee_per_gas: Option<U128>,
}
