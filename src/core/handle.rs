//! # Per-run handle.
//!
//! [`RunHandle`] is what [`Scheduler::start`](crate::Scheduler::start)
//! returns: a joinable, cancellable grip on one run. Callers can await the
//! run deterministically instead of relying on timing against a detached
//! background task.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::state::RunStatus;

/// Joinable, cancellable handle to one in-flight run.
#[derive(Debug)]
pub struct RunHandle {
    name: String,
    cancel: CancellationToken,
    status: watch::Receiver<RunStatus>,
    join: JoinHandle<()>,
}

impl RunHandle {
    pub(crate) fn new(
        name: String,
        cancel: CancellationToken,
        status: watch::Receiver<RunStatus>,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            name,
            cancel,
            status,
            join,
        }
    }

    /// Task name this run executes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests cooperative cancellation (monotonic; ignored once Firing).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Current status snapshot.
    pub fn status(&self) -> RunStatus {
        *self.status.borrow()
    }

    /// Awaits the run to completion and returns its terminal status.
    ///
    /// A panicked run task reports [`RunStatus::Cancelled`] only if that was
    /// already observed; otherwise the last published status is returned.
    pub async fn wait(self) -> RunStatus {
        let _ = self.join.await;
        *self.status.borrow()
    }
}
