// ── Session change streams ──
//
// Subscription types for observing session replacements.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::session::SessionSnapshot;

/// A subscription to the session.
///
/// Holds the snapshot seen at creation and wakes on every login, logout
/// or room refresh.
pub struct SessionStream {
    current: Arc<SessionSnapshot>,
    receiver: watch::Receiver<Arc<SessionSnapshot>>,
}

impl SessionStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<SessionSnapshot>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<SessionSnapshot> {
        &self.current
    }

    /// The latest snapshot, whether or not it has been observed.
    pub fn latest(&self) -> Arc<SessionSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the session is dropped.
    pub async fn changed(&mut self) -> Option<Arc<SessionSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream`. The first item is the current snapshot.
    pub fn into_stream(self) -> SessionWatchStream {
        SessionWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by the session's `watch` channel.
pub struct SessionWatchStream {
    inner: WatchStream<Arc<SessionSnapshot>>,
}

impl Stream for SessionWatchStream {
    type Item = Arc<SessionSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
