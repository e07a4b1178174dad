// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast of terminal transitions driven by completed work

use lifecycle_core::{Entity, OperationResult};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// An entity leaving a transitional state because its work finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// The record after the terminal write
    pub entity: Entity,
    pub result: OperationResult,
}

/// Receiver for settlements
pub type SettlementReceiver = mpsc::UnboundedReceiver<Settlement>;

/// Fan-out of settlements to every live subscriber
#[derive(Clone, Default)]
pub struct SettlementBus {
    subscribers: Arc<RwLock<Vec<mpsc::UnboundedSender<Settlement>>>>,
}

impl SettlementBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every settlement published from now on
    pub fn subscribe(&self) -> SettlementReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Deliver to all subscribers, dropping those whose receiver is gone
    pub fn publish(&self, settlement: Settlement) {
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.retain(|tx| tx.send(settlement.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}
