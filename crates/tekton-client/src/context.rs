//! Per-call cancellation and deadlines
//!
//! Every operation that talks to the cluster takes a `&CallContext`. The
//! context races the in-flight request and turns an expired deadline or an
//! explicit cancel into `TektonError::Cancelled`.

use crate::error::TektonError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation signal and optional deadline for one or more calls
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

/// Handle that cancels every `CallContext` derived from it
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Cancel all calls using the paired context. Idempotent.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl CallContext {
    /// A context that never expires and cannot be cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// A context cancelled through the returned handle
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                deadline: None,
                cancel: Some(rx),
            },
            CancelHandle(tx),
        )
    }

    /// Add a deadline `timeout` from now. An earlier existing deadline wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Add an absolute deadline. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// Instant after which calls fail, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context is already cancelled or past its deadline
    pub fn is_done(&self) -> bool {
        self.done_reason().is_some()
    }

    fn done_reason(&self) -> Option<&'static str> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some("cancellation requested");
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some("deadline exceeded");
        }
        None
    }

    /// Fail fast if the context is already done
    pub fn check(&self) -> Result<(), TektonError> {
        match self.done_reason() {
            Some(reason) => Err(TektonError::Cancelled(reason.to_string())),
            None => Ok(()),
        }
    }

    /// Run `fut` unless the context is cancelled or expires first
    pub async fn run<T, F>(&self, fut: F) -> Result<T, TektonError>
    where
        F: Future<Output = Result<T, TektonError>>,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => {
                    // A dropped handle can never cancel
                    if rx.wait_for(|c| *c).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(TektonError::Cancelled("cancellation requested".to_string())),
            () = deadline => Err(TektonError::Cancelled("deadline exceeded".to_string())),
            result = fut => result,
        }
    }
}
