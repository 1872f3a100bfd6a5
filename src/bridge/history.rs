// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use super::record::{TransferRecord, TransferState};

/// Terminal outcome of a transfer as reported to a [`HistorySink`](crate::HistorySink).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub order_id: String,
    pub source_chain: NamedChain,
    pub destination_chain: NamedChain,
    pub source_address: Address,
    pub destination_address: Address,
    pub amount: U256,
    pub status: TransferState,
    /// `depositForBurn` hash, absent when the transfer failed before burning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_transaction_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryEntry {
    /// `source_address` is the signer that paid for the burn.
    pub fn from_record(record: &TransferRecord, source_address: Address) -> Self {
        let request = record.request();
        Self {
            order_id: record.id().to_string(),
            source_chain: request.source_chain,
            destination_chain: request.destination_chain,
            source_address,
            destination_address: request.recipient,
            amount: request.amount,
            status: record.state(),
            transaction_hash: record.source_tx_hash(),
            destination_transaction_hash: record.destination_tx_hash(),
            error: record.failure().map(|failure| failure.message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::record::{TransferId, TransferRequest};
    use chrono::Utc;

    #[test]
    fn test_entry_from_fresh_record() {
        let request = TransferRequest::builder()
            .source_chain(NamedChain::Sepolia)
            .destination_chain(NamedChain::ArbitrumSepolia)
            .amount(U256::from(5_000_000u64))
            .recipient(Address::with_last_byte(9))
            .build();
        let record = TransferRecord::new(TransferId::from("sepolia-42"), request, Utc::now());

        let entry = HistoryEntry::from_record(&record, Address::with_last_byte(1));
        assert_eq!(entry.order_id, "sepolia-42");
        assert_eq!(entry.destination_address, Address::with_last_byte(9));
        assert_eq!(entry.status, TransferState::Idle);
        assert!(entry.transaction_hash.is_none());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["orderId"], "sepolia-42");
        assert_eq!(json["status"], "idle");
        assert!(json.get("transactionHash").is_none());
    }
}
