//! Serializes access to a single Ledger device handle and tracks whether a
//! partially streamed command may have left the device mid-APDU.

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};

use radix_ledger_transport::{async_trait, APDUAnswer, APDUCommand, Exchange};
use tokio::sync::Mutex;
use tracing::warn;

/// Wraps a single transport so concurrent callers are serialized onto one
/// device handle, and tracks whether the device may be out of sync with the
/// host because a chunked command was abandoned partway through.
///
/// `DeviceSession` itself implements [`Exchange`], so it can stand in for any
/// transport an app-layer command builder expects.
pub struct DeviceSession<E> {
    transport: Mutex<E>,
    dirty: AtomicBool,
}

impl<E> DeviceSession<E> {
    /// Wrap a transport for serialized, dirty-tracked access.
    pub fn new(transport: E) -> Self {
        Self {
            transport: Mutex::new(transport),
            dirty: AtomicBool::new(false),
        }
    }

    /// Whether a previous chunked command may have left the device mid-APDU.
    /// Callers should reissue a single-frame command (e.g. GET_VERSION) to
    /// resynchronize before trusting further responses.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Mark the session dirty, e.g. because a chunked send was cancelled
    /// before its `Last` frame was acknowledged.
    pub fn mark_dirty(&self) {
        warn!("marking ledger device session dirty after an interrupted exchange");
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Clear the dirty flag once the caller has resynchronized.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl<E> Exchange for DeviceSession<E>
where
    E: Exchange + Send + Sync,
{
    type Error = E::Error;
    type AnswerType = E::AnswerType;

    async fn exchange<I>(
        &self,
        command: &APDUCommand<I>,
    ) -> Result<APDUAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        let transport = self.transport.lock().await;
        transport.exchange(command).await
    }
}
