//! Caller-facing notification channel with a single active listener slot.
//!
//! ```rust
//! use lchat::{AnswerChannel, AnswerNotification};
//!
//! let (channel, mut notifications) = AnswerChannel::new();
//! assert!(channel.active_request().is_none());
//! assert!(!channel.cancel());
//!
//! drop(channel);
//! assert!(notifications.try_recv().is_err());
//! # let _ = AnswerNotification::StreamEnd;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lcommon::RequestId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{AnswerNotification, ChatError};

#[derive(Debug)]
struct ActiveListener {
    request_id: RequestId,
    cancellation: CancellationToken,
}

type ListenerSlot = Arc<Mutex<Option<ActiveListener>>>;

#[derive(Debug, Clone)]
pub struct AnswerChannel {
    sender: mpsc::UnboundedSender<AnswerNotification>,
    listener: ListenerSlot,
    sequence: Arc<AtomicU64>,
}

impl AnswerChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AnswerNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let channel = Self {
            sender,
            listener: Arc::new(Mutex::new(None)),
            sequence: Arc::new(AtomicU64::new(0)),
        };

        (channel, receiver)
    }

    /// Stops the in-flight request, if any. Returns whether one was stopped.
    pub fn cancel(&self) -> bool {
        match lock_slot(&self.listener).take() {
            Some(active) => {
                active.cancellation.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_disconnected(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn active_request(&self) -> Option<RequestId> {
        lock_slot(&self.listener)
            .as_ref()
            .map(|active| active.request_id.clone())
    }

    /// Installs a listener for a new request, cancelling the previous one.
    pub(crate) fn attach(&self) -> Result<ListenerGuard, ChatError> {
        if self.is_disconnected() {
            return Err(ChatError::channel("answer channel receiver was dropped"));
        }

        let request_id = RequestId::sequential(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let cancellation = CancellationToken::new();

        let previous = lock_slot(&self.listener).replace(ActiveListener {
            request_id: request_id.clone(),
            cancellation: cancellation.clone(),
        });
        if let Some(previous) = previous {
            tracing::debug!(
                phase = "channel",
                event = "listener_replaced",
                previous_request_id = %previous.request_id,
                request_id = %request_id
            );
            previous.cancellation.cancel();
        }

        Ok(ListenerGuard {
            request_id,
            cancellation,
            listener: Arc::clone(&self.listener),
        })
    }

    /// Returns `false` once the receiver is gone.
    pub(crate) fn post(&self, notification: AnswerNotification) -> bool {
        self.sender.send(notification).is_ok()
    }

    pub(crate) async fn disconnected(&self) {
        self.sender.closed().await
    }
}

/// Scoped ownership of the channel's listener slot for one request.
#[derive(Debug)]
pub(crate) struct ListenerGuard {
    request_id: RequestId,
    cancellation: CancellationToken,
    listener: ListenerSlot,
}

impl ListenerGuard {
    pub(crate) fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut slot = lock_slot(&self.listener);
        if slot
            .as_ref()
            .is_some_and(|active| active.request_id == self.request_id)
        {
            slot.take();
        }
        drop(slot);

        self.cancellation.cancel();
    }
}

fn lock_slot(slot: &ListenerSlot) -> MutexGuard<'_, Option<ActiveListener>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
