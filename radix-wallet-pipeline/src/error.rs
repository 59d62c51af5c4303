// SPDX-License-Identifier: Apache-2.0

use radix_node_api::NodeApiError;
use thiserror::Error;

/// Domain tag for an error surfaced on the event stream, independent of the
/// underlying error type — lets subscribers pattern-match on failure class
/// without depending on the wallet's concrete signing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BuildTxFromIntent,
    FinalizeTx,
    SubmitSignedTx,
    TransactionStatus,
    DeviceSigning,
    MultipleNonNativeRRIs,
}

/// A pipeline failure, generic over the wallet's signing error type so that
/// the device-specific cause is preserved for the `completion` output.
#[derive(Debug, Error)]
pub enum PipelineError<SignErr: std::error::Error + 'static> {
    #[error("failed to build transaction from intent: {0}")]
    BuildTxFromIntent(#[source] NodeApiError),

    #[error("failed to finalize signed transaction: {0}")]
    FinalizeTx(#[source] NodeApiError),

    #[error("failed to submit signed transaction: {0}")]
    SubmitSignedTx(#[source] NodeApiError),

    #[error("failed to poll transaction status: {0}")]
    TransactionStatus(#[source] NodeApiError),

    #[error("device signing failed: {0}")]
    DeviceSigning(#[source] SignErr),

    #[error("intent references {count} distinct non-native resources, at most one is supported")]
    MultipleNonNativeRRIs { count: usize },

    #[error("submitted transaction was reported failed by the node")]
    SubmittedTransactionFailed,
}

impl<SignErr: std::error::Error + 'static> PipelineError<SignErr> {
    /// The domain tag for this failure, for subscribers that only care
    /// about error class rather than the full error chain.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BuildTxFromIntent(_) => ErrorKind::BuildTxFromIntent,
            Self::FinalizeTx(_) => ErrorKind::FinalizeTx,
            Self::SubmitSignedTx(_) => ErrorKind::SubmitSignedTx,
            Self::TransactionStatus(_) | Self::SubmittedTransactionFailed => {
                ErrorKind::TransactionStatus
            }
            Self::DeviceSigning(_) => ErrorKind::DeviceSigning,
            Self::MultipleNonNativeRRIs { .. } => ErrorKind::MultipleNonNativeRRIs,
        }
    }
}

/// Out-of-band failure not tied to any specific transaction: node discovery
/// or keystore loading performed once at startup, outside the pipeline.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to reach node: {0}")]
    GetNode(String),

    #[error("failed to load keystore: {0}")]
    LoadKeystore(String),
}
