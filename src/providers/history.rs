// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer history sinks.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::bridge::HistoryEntry;
use crate::error::{CctpError, Result};
use crate::traits::HistorySink;

/// Timeout of one history POST.
pub const HISTORY_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Sink that only logs the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHistorySink;

#[async_trait]
impl HistorySink for NoopHistorySink {
    async fn record(&self, entry: &HistoryEntry) -> Result<()> {
        debug!(order_id = %entry.order_id, status = %entry.status, "History sink disabled");
        Ok(())
    }
}

/// Sink that POSTs each [`HistoryEntry`] as camelCase JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpHistorySink {
    url: Url,
    client: Client,
}

impl HttpHistorySink {
    pub fn new(url: Url) -> Result<Self> {
        Ok(Self {
            url,
            client: Client::builder()
                .timeout(Duration::from_secs(HISTORY_REQUEST_TIMEOUT_SECS))
                .build()?,
        })
    }

    /// Reads the endpoint from `CCTP_HISTORY_URL`; `None` when unset.
    pub fn from_env() -> Result<Option<Self>> {
        dotenvy::var("CCTP_HISTORY_URL")
            .ok()
            .map(|raw| {
                Url::parse(raw.trim())
                    .map_err(|e| CctpError::InvalidConfig(format!("CCTP_HISTORY_URL={raw}: {e}")))
                    .and_then(Self::new)
            })
            .transpose()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HistorySink for HttpHistorySink {
    async fn record(&self, entry: &HistoryEntry) -> Result<()> {
        let response = self.client.post(self.url.clone()).json(entry).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CctpError::Provider(format!(
                "history endpoint {} returned HTTP {status}",
                self.url
            )));
        }
        info!(order_id = %entry.order_id, status = %entry.status, "Transfer recorded in history");
        Ok(())
    }
}
