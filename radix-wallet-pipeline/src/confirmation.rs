// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use radix_node_api::BuiltTransaction;
use tokio::sync::{watch, Notify};

/// A built transaction awaiting the caller's go-ahead to sign, plus the
/// idempotent acknowledgement that releases it.
pub struct Confirmation {
    built: BuiltTransaction,
    confirmed: AtomicBool,
    notify: Notify,
}

impl Confirmation {
    fn new(built: BuiltTransaction) -> Arc<Self> {
        Arc::new(Self {
            built,
            confirmed: AtomicBool::new(false),
            notify: Notify::new(),
        })
    }

    pub fn built_transaction(&self) -> &BuiltTransaction {
        &self.built
    }

    /// Acknowledge the transaction for signing. Subsequent calls are no-ops.
    pub fn confirm(&self) {
        if !self.confirmed.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    async fn wait(&self) {
        loop {
            if self.confirmed.load(Ordering::SeqCst) {
                return;
            }
            let notified = self.notify.notified();
            if self.confirmed.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

/// Sending half of the confirmation rendezvous, held by the pipeline.
///
/// Backed by a `watch` channel so a subscriber that asks after
/// [`ConfirmationSender::ask`] has already run still observes the pending
/// confirmation, matching the replay semantics the confirmation channel is
/// specified to provide.
#[derive(Clone)]
pub struct ConfirmationSender(watch::Sender<Option<Arc<Confirmation>>>);

/// Receiving half, held by the caller that will eventually confirm.
#[derive(Clone)]
pub struct ConfirmationReceiver(watch::Receiver<Option<Arc<Confirmation>>>);

/// Construct a fresh confirmation rendezvous channel.
pub fn confirmation_channel() -> (ConfirmationSender, ConfirmationReceiver) {
    let (tx, rx) = watch::channel(None);
    (ConfirmationSender(tx), ConfirmationReceiver(rx))
}

impl ConfirmationSender {
    /// Publish a built transaction for confirmation and wait for it to be
    /// acknowledged.
    pub async fn ask(&self, built: BuiltTransaction) {
        let confirmation = Confirmation::new(built);
        // Ignored: no receivers just means nobody is watching yet, which is
        // fine since the watch channel retains the latest value for them.
        let _ = self.0.send(Some(confirmation.clone()));
        confirmation.wait().await;
    }
}

impl ConfirmationReceiver {
    /// The confirmation currently awaiting acknowledgement, if any.
    pub fn current(&self) -> Option<Arc<Confirmation>> {
        self.0.borrow().clone()
    }

    /// Wait until a confirmation request is published, then return it.
    pub async fn wait_for_request(&mut self) -> Arc<Confirmation> {
        loop {
            if let Some(confirmation) = self.0.borrow().clone() {
                return confirmation;
            }
            if self.0.changed().await.is_err() {
                // Sender dropped without ever publishing; park forever rather
                // than fabricate a confirmation.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// How a pipeline should obtain user confirmation before signing.
pub enum UserConfirmation {
    /// Auto-confirm as soon as the built transaction is ready.
    Skip,
    /// Publish the built transaction on this channel and wait for an
    /// external caller to invoke [`Confirmation::confirm`].
    Manual(ConfirmationSender),
}
