// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC access with per-chain endpoint failover.

mod client;
mod http;
mod types;

pub use client::{MultiEndpointRpcClient, RpcClientPool, DROPPED_AFTER_MISSES};
pub use http::{HttpRpcTransport, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use types::ReceiptSummary;
