//! Caller-controlled cancellation for in-flight conversions.
//!
//! A [`Cancellation`] is a cheap, cloneable handle. Every clone observes the
//! same state, so one task can hand a clone to [`crate::Converter::convert`]
//! while another (a Ctrl-C handler, a request-scoped supervisor) calls
//! [`Cancellation::cancel`]. An optional deadline makes the same handle act
//! as a timeout.
//!
//! ```rust,no_run
//! use edgequake_pdftotext::{Cancellation, ConversionOptions, Converter};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new()?;
//! let cancel = Cancellation::with_timeout(Duration::from_secs(30));
//! let text = converter
//!     .convert(&cancel, "report.pdf", &ConversionOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a [`Cancellation`] fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// [`Cancellation::cancel`] was called.
    Cancelled,
    /// The deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Shared cancellation signal with an optional deadline.
#[derive(Clone)]
pub struct Cancellation {
    inner: Arc<Inner>,
}

struct Inner {
    tx: watch::Sender<bool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    /// A handle that only fires when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Alias for [`Cancellation::new`] for call sites that never cancel.
    pub fn none() -> Self {
        Self::build(None)
    }

    /// Fires `timeout` from now, or earlier if cancelled explicitly.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(Instant::now() + timeout))
    }

    /// Fires at `deadline`, or earlier if cancelled explicitly.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline))
    }

    fn build(deadline: Option<Instant>) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner { tx, deadline }),
        }
    }

    /// Signal every clone of this handle. Idempotent.
    pub fn cancel(&self) {
        self.inner.tx.send_replace(true);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// The reason this handle has fired, or `None` while it is still live.
    ///
    /// An explicit cancel takes precedence over an expired deadline.
    pub fn reason(&self) -> Option<CancelReason> {
        if *self.inner.tx.borrow() {
            return Some(CancelReason::Cancelled);
        }
        match self.inner.deadline {
            Some(d) if Instant::now() >= d => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolves once the handle fires. Returns immediately if it already has.
    pub async fn cancelled(&self) -> CancelReason {
        let mut rx = self.inner.tx.subscribe();
        let explicit = async move {
            // The sender lives in `self`, so the channel cannot close here.
            let _ = rx.wait_for(|cancelled| *cancelled).await;
        };

        match self.inner.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = explicit => CancelReason::Cancelled,
                _ = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
            },
            None => {
                explicit.await;
                CancelReason::Cancelled
            }
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellation")
            .field("cancelled", &*self.inner.tx.borrow())
            .field("deadline", &self.inner.deadline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_handle_is_live() {
        let c = Cancellation::new();
        assert!(!c.is_cancelled());
        assert_eq!(c.reason(), None);
        assert_eq!(c.deadline(), None);
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let c = Cancellation::new();
        let clone = c.clone();
        clone.cancel();
        clone.cancel();
        assert_eq!(c.reason(), Some(CancelReason::Cancelled));
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_when_already_cancelled() {
        let c = Cancellation::new();
        c.cancel();
        let reason = tokio::time::timeout(Duration::from_secs(1), c.cancelled())
            .await
            .expect("should resolve without waiting");
        assert_eq!(reason, CancelReason::Cancelled);
    }

    #[tokio::test]
    async fn cancelled_wakes_on_cancel_from_another_task() {
        let c = Cancellation::new();
        let trigger = c.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });
        let reason = tokio::time::timeout(Duration::from_secs(5), c.cancelled())
            .await
            .expect("cancel should wake the waiter");
        assert_eq!(reason, CancelReason::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fires_with_deadline_reason() {
        let c = Cancellation::with_timeout(Duration::from_secs(10));
        assert!(!c.is_cancelled());
        let reason = c.cancelled().await;
        assert_eq!(reason, CancelReason::DeadlineExceeded);
        assert_eq!(c.reason(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test]
    async fn explicit_cancel_beats_deadline() {
        let c = Cancellation::with_timeout(Duration::from_secs(3600));
        c.cancel();
        assert_eq!(c.cancelled().await, CancelReason::Cancelled);
    }
}
