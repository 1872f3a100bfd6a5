// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC 2.0 over HTTP.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;
use url::Url;

use super::types::{JsonRpcRequest, JsonRpcResponse};
use crate::error::{EndpointError, Result};
use crate::traits::RpcTransport;

/// Per-request timeout applied to every JSON-RPC POST.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Node-side rate limit code used by Infura, Alchemy and most public gateways.
const LIMIT_EXCEEDED_CODE: i64 = -32005;

/// Production [`RpcTransport`] backed by `reqwest`.
///
/// Cloning is cheap; clones share the connection pool and request id counter.
#[derive(Debug, Clone)]
pub struct HttpRpcTransport {
    client: Client,
    next_id: Arc<AtomicU64>,
}

impl HttpRpcTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn request(
        &self,
        endpoint: &Url,
        method: &str,
        params: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, EndpointError> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params: &params,
        };

        let response = self
            .client
            .post(endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| EndpointError::Unavailable(e.to_string()))?;

        let status = response.status();
        trace!(endpoint = %endpoint, method, status = %status, "JSON-RPC response");
        classify_status(status)?;

        let body = response
            .bytes()
            .await
            .map_err(|e| EndpointError::Malformed(e.to_string()))?;
        classify_payload(&body)
    }
}

/// Rate limits and non-2xx statuses, before the body is read.
fn classify_status(status: StatusCode) -> std::result::Result<(), EndpointError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(EndpointError::RateLimited);
    }
    if !status.is_success() {
        return Err(EndpointError::Unavailable(format!("HTTP {status}")));
    }
    Ok(())
}

/// Splits a JSON-RPC response body into its result or the endpoint error it carries.
fn classify_payload(body: &[u8]) -> std::result::Result<serde_json::Value, EndpointError> {
    let payload: JsonRpcResponse =
        serde_json::from_slice(body).map_err(|e| EndpointError::Malformed(e.to_string()))?;

    match payload.error {
        Some(error) if error.code == LIMIT_EXCEEDED_CODE => Err(EndpointError::RateLimited),
        Some(error) => Err(EndpointError::Rpc {
            code: error.code,
            message: error.message.to_string(),
        }),
        None => Ok(payload.result),
    }
}
