// SPDX-License-Identifier: Apache-2.0

use std::sync::Mutex;

use radix_node_api::{BuiltTransaction, FinalizedTransaction, PendingTransaction, SignedTransaction, TransactionStatus};
use tokio::sync::broadcast;

use crate::error::ErrorKind;

/// The phase a pipeline was in when a terminal error was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Built,
    AwaitingConfirmation,
    Confirmed,
    Signing,
    Signed,
    Finalizing,
    Finalized,
    Submitting,
    Pending,
    Polling,
    /// A `transaction_status` poll observed a terminal status, matching the
    /// phase tag `TrackingEvent::StatusUpdate` itself carries.
    UpdatingStatusOfPendingTx,
}

/// One tracking event emitted by a running pipeline.
#[derive(Debug, Clone)]
pub enum TrackingEvent {
    BuiltFromIntent(BuiltTransaction),
    AskedForConfirmation(BuiltTransaction),
    Confirmed,
    Signed(SignedTransaction),
    Finalized(FinalizedTransaction),
    Submitted(PendingTransaction),
    StatusUpdate(TransactionStatus),
    Completed { tx_id: String },
    Error { kind: ErrorKind, message: String, in_phase: Phase },
}

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Hot, replayable log of a single transaction's tracking events: every
/// subscriber, however late, sees the full history before any live event.
pub struct EventLog {
    history: Mutex<Vec<TrackingEvent>>,
    sender: broadcast::Sender<TrackingEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            history: Mutex::new(Vec::new()),
            sender,
        }
    }

    pub fn emit(&self, event: TrackingEvent) {
        let mut history = self.history.lock().expect("event log mutex poisoned");
        history.push(event.clone());
        // No active subscribers is not an error: the event is still in history.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> EventSubscription {
        let history = self.history.lock().expect("event log mutex poisoned").clone();
        EventSubscription {
            replayed: history.into_iter(),
            live: self.sender.subscribe(),
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

/// A single subscriber's view of an [`EventLog`]: replayed history, then
/// live events as they're emitted.
pub struct EventSubscription {
    replayed: std::vec::IntoIter<TrackingEvent>,
    live: broadcast::Receiver<TrackingEvent>,
}

impl EventSubscription {
    /// Await the next event, whether replayed or live. Returns `None` once
    /// the pipeline has torn down and no further events will arrive.
    pub async fn next(&mut self) -> Option<TrackingEvent> {
        if let Some(event) = self.replayed.next() {
            return Some(event);
        }
        loop {
            match self.live.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
