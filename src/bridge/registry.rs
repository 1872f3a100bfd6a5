// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

use super::record::{TransferId, TransferRecord, TransferRequest};
use crate::error::{CctpError, Result};

/// In-memory table of every transfer started by a state machine.
///
/// Each record lives behind a [`watch`] channel: readers get snapshots with
/// [`TransferRegistry::get`] or follow updates with
/// [`TransferRegistry::subscribe`]. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct TransferRegistry {
    transfers: Arc<RwLock<HashMap<TransferId, watch::Sender<TransferRecord>>>>,
}

impl TransferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a unique id for `request` and stores its `Idle` record.
    pub(crate) fn register(&self, request: TransferRequest, now: DateTime<Utc>) -> TransferRecord {
        let mut transfers = self
            .transfers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let base = format!("{}-{}", request.source_chain, now.timestamp());
        let mut id = TransferId::new(base.clone());
        let mut suffix = 2u32;
        while transfers.contains_key(&id) {
            id = TransferId::new(format!("{base}-{suffix}"));
            suffix += 1;
        }

        let record = TransferRecord::new(id.clone(), request, now);
        let (sender, _) = watch::channel(record.clone());
        transfers.insert(id, sender);
        record
    }

    /// Replaces the stored snapshot of `record`.
    ///
    /// A record that already reached a terminal state is never overwritten.
    pub(crate) fn publish(&self, record: &TransferRecord) -> Result<()> {
        let transfers = self
            .transfers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let sender = transfers
            .get(record.id())
            .ok_or_else(|| CctpError::TransferNotFound(record.id().to_string()))?;

        let stored = sender.borrow().state();
        if stored.is_terminal() {
            return Err(CctpError::InvalidStateTransition {
                from: stored,
                to: record.state(),
            });
        }
        sender.send_replace(record.clone());
        Ok(())
    }

    pub fn get(&self, id: &TransferId) -> Option<TransferRecord> {
        self.transfers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|sender| sender.borrow().clone())
    }

    /// Receiver that observes every published update of `id`.
    pub fn subscribe(&self, id: &TransferId) -> Option<watch::Receiver<TransferRecord>> {
        self.transfers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(watch::Sender::subscribe)
    }

    /// Snapshots of all transfers, oldest first.
    pub fn list(&self) -> Vec<TransferRecord> {
        let mut records: Vec<_> = self
            .transfers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|sender| sender.borrow().clone())
            .collect();
        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        records
    }

    /// Number of transfers that have not reached a terminal state.
    pub fn in_flight(&self) -> usize {
        self.transfers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|sender| !sender.borrow().is_terminal())
            .count()
    }

    pub fn len(&self) -> usize {
        self.transfers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::record::TransferState;
    use alloy_chains::NamedChain;
    use alloy_primitives::{Address, U256};

    fn request() -> TransferRequest {
        TransferRequest::builder()
            .source_chain(NamedChain::Sepolia)
            .destination_chain(NamedChain::BaseSepolia)
            .amount(U256::from(1_000_000u64))
            .recipient(Address::with_last_byte(7))
            .build()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_ids_are_unique_within_a_second() {
        let registry = TransferRegistry::new();
        let first = registry.register(request(), at(1_700_000_000));
        let second = registry.register(request(), at(1_700_000_000));
        let third = registry.register(request(), at(1_700_000_000));

        assert_eq!(first.id().as_str(), "sepolia-1700000000");
        assert_eq!(second.id().as_str(), "sepolia-1700000000-2");
        assert_eq!(third.id().as_str(), "sepolia-1700000000-3");
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.in_flight(), 3);
    }

    #[test]
    fn test_id_and_creation_time_agree() {
        let registry = TransferRegistry::new();
        let record = registry.register(request(), at(1_700_000_123));

        assert_eq!(record.id().as_str(), "sepolia-1700000123");
        assert_eq!(record.created_at(), at(1_700_000_123));
        assert_eq!(record.events()[0].at, at(1_700_000_123));
    }

    #[test]
    fn test_publish_notifies_subscribers() {
        let registry = TransferRegistry::new();
        let mut record = registry.register(request(), at(1));
        let mut updates = registry.subscribe(record.id()).unwrap();

        record
            .transition(TransferState::Approving, "approving")
            .unwrap();
        registry.publish(&record).unwrap();

        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().state(), TransferState::Approving);
        assert_eq!(
            registry.get(record.id()).unwrap().state(),
            TransferState::Approving
        );
    }

    #[test]
    fn test_terminal_record_is_never_overwritten() {
        let registry = TransferRegistry::new();
        let mut record = registry.register(request(), at(1));
        let stale = record.clone();

        record.fail(&CctpError::Cancelled).unwrap();
        registry.publish(&record).unwrap();

        assert!(registry.publish(&stale).is_err());
        assert_eq!(registry.get(record.id()).unwrap().state(), TransferState::Error);
        assert_eq!(registry.in_flight(), 0);
    }

    #[test]
    fn test_unknown_transfer() {
        let registry = TransferRegistry::new();
        assert!(registry.get(&TransferId::from("nope")).is_none());
        assert!(registry.subscribe(&TransferId::from("nope")).is_none());
        assert!(registry.is_empty());
    }
}
