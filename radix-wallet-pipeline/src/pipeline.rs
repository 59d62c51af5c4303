// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use radix_node_api::{NodeFacade, TransactionIntent, TxStatus};
use tokio::sync::oneshot;
use tracing::warn;

use crate::confirmation::UserConfirmation;
use crate::error::PipelineError;
use crate::events::{EventLog, EventSubscription, Phase, TrackingEvent};
use crate::poll::{IntervalTrigger, PollTrigger};
use crate::wallet::Wallet;

/// Configuration for a single transaction pipeline run.
pub struct PipelineOptions {
    pub user_confirmation: UserConfirmation,
    pub poll_trigger: Box<dyn PollTrigger>,
}

impl Default for PipelineOptions {
    /// Auto-confirm, polling status once a second.
    fn default() -> Self {
        Self {
            user_confirmation: UserConfirmation::Skip,
            poll_trigger: Box::new(IntervalTrigger::default()),
        }
    }
}

impl PipelineOptions {
    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_trigger = Box::new(IntervalTrigger::new(period));
        self
    }

    pub fn with_manual_confirmation(
        mut self,
        sender: crate::confirmation::ConfirmationSender,
    ) -> Self {
        self.user_confirmation = UserConfirmation::Manual(sender);
        self
    }
}

/// Handle to a running pipeline: a replayable event stream plus a
/// single-value completion result.
///
/// Dropping this handle cancels the pipeline's background task. Any
/// in-flight device frame is left to finish on its own — the wallet's
/// session tracks dirtiness independently of this cancellation.
pub struct TransactionTracking<SignErr: std::error::Error + 'static> {
    events: Arc<EventLog>,
    // `Option` so `completion()` can take it via `&mut self` without moving
    // a field out of a type that implements `Drop`.
    completion: Option<oneshot::Receiver<Result<String, PipelineError<SignErr>>>>,
    task: tokio::task::JoinHandle<()>,
}

impl<SignErr: std::error::Error + 'static> TransactionTracking<SignErr> {
    /// Subscribe to this transaction's tracking events. The subscriber
    /// receives every event emitted so far, then live events as they occur.
    pub fn subscribe(&self) -> EventSubscription {
        self.events.subscribe()
    }

    /// Await the transaction's final outcome: the submitted transaction id
    /// on success, or the first terminal error.
    ///
    /// Panics if called more than once on the same handle.
    pub async fn completion(mut self) -> Result<String, PipelineError<SignErr>> {
        self.completion
            .take()
            .expect("completion already awaited")
            .await
            .unwrap_or_else(|_| panic!("pipeline task dropped without completing"))
    }
}

impl<SignErr: std::error::Error + 'static> Drop for TransactionTracking<SignErr> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drive `intent` through build, confirm, sign, finalize, submit, and status
/// tracking, returning a handle to observe progress and await completion.
pub fn spawn<N, W>(
    intent: TransactionIntent,
    node: Arc<N>,
    wallet: Arc<W>,
    options: PipelineOptions,
) -> TransactionTracking<W::Error>
where
    N: NodeFacade + 'static,
    W: Wallet + 'static,
{
    let events = Arc::new(EventLog::new());
    let (completion_tx, completion_rx) = oneshot::channel();
    let task_events = events.clone();
    let task = tokio::spawn(run(intent, node, wallet, options, task_events, completion_tx));
    TransactionTracking {
        events,
        completion: Some(completion_rx),
        task,
    }
}

fn fail<SignErr: std::error::Error + 'static>(
    events: &EventLog,
    completion: oneshot::Sender<Result<String, PipelineError<SignErr>>>,
    in_phase: Phase,
    error: PipelineError<SignErr>,
) {
    events.emit(TrackingEvent::Error {
        kind: error.kind(),
        message: error.to_string(),
        in_phase,
    });
    let _ = completion.send(Err(error));
}

async fn run<N, W>(
    intent: TransactionIntent,
    node: Arc<N>,
    wallet: Arc<W>,
    mut options: PipelineOptions,
    events: Arc<EventLog>,
    completion: oneshot::Sender<Result<String, PipelineError<W::Error>>>,
) where
    N: NodeFacade + 'static,
    W: Wallet + 'static,
{
    // The Ledger app can disclose at most one non-native resource per
    // signing flow. Rejected up front, before any node or device call, per
    // the resource-count invariant on Ledger-signed intents.
    let distinct_non_native = intent.distinct_non_native_resources();
    if distinct_non_native.len() > 1 {
        fail(
            &events,
            completion,
            Phase::Created,
            PipelineError::MultipleNonNativeRRIs {
                count: distinct_non_native.len(),
            },
        );
        return;
    }
    let non_xrd_hrp = distinct_non_native.first().map(|rri| rri.0.clone());

    // Created -> Built
    let built = match node.build_transaction(&intent).await {
        Ok(built) => {
            events.emit(TrackingEvent::BuiltFromIntent(built.clone()));
            built
        }
        Err(e) => {
            fail(&events, completion, Phase::Built, PipelineError::BuildTxFromIntent(e));
            return;
        }
    };

    // Built -> AwaitingConfirmation -> Confirmed
    events.emit(TrackingEvent::AskedForConfirmation(built.clone()));
    match &options.user_confirmation {
        UserConfirmation::Skip => {}
        UserConfirmation::Manual(sender) => sender.ask(built.clone()).await,
    }
    events.emit(TrackingEvent::Confirmed);

    // Confirmed -> Signing -> Signed
    let signed = match wallet.sign(&built.bytes, non_xrd_hrp.as_deref()).await {
        Ok(material) => {
            let signed = radix_node_api::SignedTransaction {
                built_transaction_bytes: built.bytes.clone(),
                signature: material.signature,
                signer_public_key: material.signer_public_key,
            };
            events.emit(TrackingEvent::Signed(signed.clone()));
            signed
        }
        Err(e) => {
            fail(&events, completion, Phase::Signing, PipelineError::DeviceSigning(e));
            return;
        }
    };

    // Signed -> Finalizing -> Finalized
    let finalized = match node.finalize_transaction(&signed).await {
        Ok(finalized) => {
            events.emit(TrackingEvent::Finalized(finalized.clone()));
            finalized
        }
        Err(e) => {
            fail(&events, completion, Phase::Finalizing, PipelineError::FinalizeTx(e));
            return;
        }
    };

    // Finalized -> Submitting -> Pending
    let pending = match node.submit_signed_transaction(&finalized).await {
        Ok(pending) => {
            events.emit(TrackingEvent::Submitted(pending.clone()));
            pending
        }
        Err(e) => {
            fail(&events, completion, Phase::Submitting, PipelineError::SubmitSignedTx(e));
            return;
        }
    };

    // Pending -> Polling -> Terminal
    let mut last_status: Option<TxStatus> = None;
    loop {
        options.poll_trigger.tick().await;
        let status = match node.transaction_status(&pending.tx_id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, tx_id = %pending.tx_id, "transient failure polling transaction status");
                continue;
            }
        };
        if last_status == Some(status.status) {
            continue;
        }
        last_status = Some(status.status);
        events.emit(TrackingEvent::StatusUpdate(status.clone()));
        match status.status {
            TxStatus::Pending => continue,
            TxStatus::Confirmed => {
                events.emit(TrackingEvent::Completed {
                    tx_id: status.tx_id.clone(),
                });
                let _ = completion.send(Ok(status.tx_id));
                return;
            }
            TxStatus::Failed => {
                fail(
                    &events,
                    completion,
                    Phase::UpdatingStatusOfPendingTx,
                    PipelineError::SubmittedTransactionFailed,
                );
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use radix_node_api::{Address, NodeApiError, Rri, TransactionAction, TransferAction};

    use super::*;
    use crate::error::ErrorKind;
    use crate::wallet::{Account, SignatureMaterial};

    struct FakeNode {
        build_fails: bool,
        statuses: StdMutex<std::collections::VecDeque<TxStatus>>,
    }

    impl FakeNode {
        fn happy_path(statuses: Vec<TxStatus>) -> Self {
            Self {
                build_fails: false,
                statuses: StdMutex::new(statuses.into()),
            }
        }

        fn failing_build() -> Self {
            Self {
                build_fails: true,
                statuses: StdMutex::new(Default::default()),
            }
        }
    }

    fn fake_reqwest_error() -> NodeApiError {
        // Constructing a real reqwest::Error requires a live request; the
        // pipeline only ever inspects these through Display, so a status
        // error carries the same information without a network round-trip.
        NodeApiError::NodeStatus {
            status: 400,
            body: "intent invalid".into(),
        }
    }

    #[async_trait]
    impl NodeFacade for FakeNode {
        async fn build_transaction(
            &self,
            _intent: &TransactionIntent,
        ) -> radix_node_api::NodeApiResult<radix_node_api::BuiltTransaction> {
            if self.build_fails {
                return Err(fake_reqwest_error());
            }
            Ok(radix_node_api::BuiltTransaction {
                bytes: vec![0xAB; 4],
                instructions: vec![vec![0x01]],
            })
        }

        async fn finalize_transaction(
            &self,
            signed: &radix_node_api::SignedTransaction,
        ) -> radix_node_api::NodeApiResult<radix_node_api::FinalizedTransaction> {
            Ok(radix_node_api::FinalizedTransaction {
                signed: signed.clone(),
                tx_id: "tx-1".into(),
            })
        }

        async fn submit_signed_transaction(
            &self,
            finalized: &radix_node_api::FinalizedTransaction,
        ) -> radix_node_api::NodeApiResult<radix_node_api::PendingTransaction> {
            Ok(radix_node_api::PendingTransaction {
                tx_id: finalized.tx_id.clone(),
            })
        }

        async fn transaction_status(
            &self,
            tx_id: &str,
        ) -> radix_node_api::NodeApiResult<radix_node_api::TransactionStatus> {
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(TxStatus::Pending);
            Ok(radix_node_api::TransactionStatus {
                tx_id: tx_id.to_string(),
                status,
            })
        }
    }

    struct FakeWallet;

    #[async_trait]
    impl Wallet for FakeWallet {
        type Error = Infallible;

        async fn sign(
            &self,
            _built_bytes: &[u8],
            _non_xrd_hrp: Option<&str>,
        ) -> Result<SignatureMaterial, Self::Error> {
            Ok(SignatureMaterial {
                signature: vec![0x01; 65],
                signer_public_key: vec![0x02; 65],
            })
        }

        fn observe_active_account(&self) -> tokio::sync::watch::Receiver<Account> {
            let (_tx, rx) = tokio::sync::watch::channel(Account {
                address: Address("account_fake".into()),
            });
            rx
        }
    }

    struct ImmediateTrigger;

    #[async_trait]
    impl PollTrigger for ImmediateTrigger {
        async fn tick(&mut self) {
            tokio::task::yield_now().await;
        }
    }

    fn xrd_transfer_intent() -> TransactionIntent {
        TransactionIntent {
            sender: Address("account_sender".into()),
            actions: vec![TransactionAction::Transfer(TransferAction {
                to: Address("account_recipient".into()),
                resource: Rri("xrd".into()),
                amount: "10".into(),
            })],
        }
    }

    #[tokio::test]
    async fn happy_path_emits_expected_sequence_and_completes() {
        let node = Arc::new(FakeNode::happy_path(vec![TxStatus::Pending, TxStatus::Confirmed]));
        let wallet = Arc::new(FakeWallet);
        let options = PipelineOptions {
            user_confirmation: UserConfirmation::Skip,
            poll_trigger: Box::new(ImmediateTrigger),
        };

        let tracking = spawn(xrd_transfer_intent(), node, wallet, options);
        let mut subscription = tracking.subscribe();

        let mut phases = Vec::new();
        while let Some(event) = subscription.next().await {
            let done = matches!(event, TrackingEvent::Completed { .. });
            phases.push(event);
            if done {
                break;
            }
        }

        assert!(matches!(phases[0], TrackingEvent::BuiltFromIntent(_)));
        assert!(matches!(phases[1], TrackingEvent::AskedForConfirmation(_)));
        assert!(matches!(phases[2], TrackingEvent::Confirmed));
        assert!(matches!(phases[3], TrackingEvent::Signed(_)));
        assert!(matches!(phases[4], TrackingEvent::Finalized(_)));
        assert!(matches!(phases[5], TrackingEvent::Submitted(_)));
        assert!(matches!(
            phases[6],
            TrackingEvent::StatusUpdate(radix_node_api::TransactionStatus {
                status: TxStatus::Pending,
                ..
            })
        ));
        assert!(matches!(
            phases[7],
            TrackingEvent::StatusUpdate(radix_node_api::TransactionStatus {
                status: TxStatus::Confirmed,
                ..
            })
        ));
        assert!(matches!(phases[8], TrackingEvent::Completed { .. }));

        assert_eq!(tracking.completion().await.unwrap(), "tx-1");
    }

    #[tokio::test]
    async fn manual_confirmation_blocks_signing_until_confirmed() {
        let node = Arc::new(FakeNode::happy_path(vec![TxStatus::Confirmed]));
        let wallet = Arc::new(FakeWallet);
        let (sender, mut receiver) = crate::confirmation::confirmation_channel();

        let tracking = spawn(
            xrd_transfer_intent(),
            node,
            wallet,
            PipelineOptions {
                user_confirmation: UserConfirmation::Manual(sender),
                poll_trigger: Box::new(ImmediateTrigger),
            },
        );
        let mut subscription = tracking.subscribe();

        assert!(matches!(
            subscription.next().await.unwrap(),
            TrackingEvent::BuiltFromIntent(_)
        ));
        assert!(matches!(
            subscription.next().await.unwrap(),
            TrackingEvent::AskedForConfirmation(_)
        ));

        // The pipeline must not advance past AskedForConfirmation until the
        // caller acknowledges, however long that takes.
        let confirmation = receiver.wait_for_request().await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        assert!(matches!(
            tokio::time::timeout(Duration::from_millis(20), subscription.next()).await,
            Err(_),
        ));

        confirmation.confirm();

        assert!(matches!(
            subscription.next().await.unwrap(),
            TrackingEvent::Confirmed
        ));
        assert!(matches!(
            subscription.next().await.unwrap(),
            TrackingEvent::Signed(_)
        ));
    }

    #[tokio::test]
    async fn build_failure_emits_single_error_and_fails_completion() {
        let node = Arc::new(FakeNode::failing_build());
        let wallet = Arc::new(FakeWallet);
        let tracking = spawn(
            xrd_transfer_intent(),
            node,
            wallet,
            PipelineOptions {
                user_confirmation: UserConfirmation::Skip,
                poll_trigger: Box::new(ImmediateTrigger),
            },
        );
        let mut subscription = tracking.subscribe();

        let event = subscription.next().await.unwrap();
        assert!(matches!(
            event,
            TrackingEvent::Error {
                kind: ErrorKind::BuildTxFromIntent,
                in_phase: Phase::Built,
                ..
            }
        ));

        assert!(matches!(
            tracking.completion().await,
            Err(PipelineError::BuildTxFromIntent(_))
        ));
    }

    #[tokio::test]
    async fn multiple_non_native_rris_rejected_before_any_signing() {
        let node = Arc::new(FakeNode::happy_path(vec![]));
        let wallet = Arc::new(FakeWallet);
        let intent = TransactionIntent {
            sender: Address("account_sender".into()),
            actions: vec![
                TransactionAction::Transfer(TransferAction {
                    to: Address("account_a".into()),
                    resource: Rri("foo".into()),
                    amount: "1".into(),
                }),
                TransactionAction::Transfer(TransferAction {
                    to: Address("account_b".into()),
                    resource: Rri("bar".into()),
                    amount: "1".into(),
                }),
            ],
        };

        let tracking = spawn(
            intent,
            node,
            wallet,
            PipelineOptions {
                user_confirmation: UserConfirmation::Skip,
                poll_trigger: Box::new(ImmediateTrigger),
            },
        );
        let mut subscription = tracking.subscribe();

        let event = subscription.next().await.unwrap();
        assert!(matches!(
            event,
            TrackingEvent::Error {
                kind: ErrorKind::MultipleNonNativeRRIs,
                in_phase: Phase::Created,
                ..
            }
        ));
    }
}
