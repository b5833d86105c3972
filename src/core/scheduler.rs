//! # Scheduler: run admission, registry, and the control surface.
//!
//! The [`Scheduler`] owns the shared pieces — drift clock, time authority,
//! attempt executor, event bus, message log — and a name-keyed registry of
//! runs. `start()` validates synchronously, spawns the run loop, and returns
//! a joinable [`RunHandle`]; `cancel()`/`status()` address runs by name.
//!
//! ## Rules
//! - Invalid tasks are rejected **before** any run state exists; the caller
//!   learns synchronously, nothing is narrated.
//! - One live run per name; a finished (terminal) entry is replaced by a
//!   fresh `start` with the same name.
//! - All runs of one scheduler share the pooled [`DriftClock`]; its pair
//!   replacement is safe under concurrent readers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::core::handle::RunHandle;
use crate::core::run::RunContext;
use crate::core::state::RunStatus;
use crate::error::StartError;
use crate::events::{Bus, Event, MessageLog, Reporter};
use crate::exec::{Execute, HttpExecutor};
use crate::tasks::{ClaimTask, TaskRecord};
use crate::time::{Authority, DriftClock, SntpAuthority};

/// Registry entry: enough to cancel and observe a run by name.
struct RunEntry {
    cancel: CancellationToken,
    status: watch::Receiver<RunStatus>,
}

/// Coordinates timed-claim runs against one time authority and executor.
pub struct Scheduler {
    cfg: SchedulerConfig,
    clock: Arc<DriftClock>,
    authority: Arc<dyn Authority>,
    executor: Arc<dyn Execute>,
    bus: Bus,
    log: Arc<MessageLog>,
    runs: RwLock<HashMap<String, RunEntry>>,
}

impl Scheduler {
    /// Creates a scheduler with the production SNTP authority and HTTP
    /// executor, both bounded by the config's timeouts.
    pub fn new(cfg: SchedulerConfig) -> Self {
        let authority = Arc::new(SntpAuthority::aliyun(cfg.fetch_timeout));
        let executor = Arc::new(HttpExecutor::new(cfg.attempt_timeout));
        Self::with_parts(cfg, authority, executor)
    }

    /// Creates a scheduler over explicit authority/executor implementations.
    ///
    /// This is the seam tests use to inject fakes.
    pub fn with_parts(
        cfg: SchedulerConfig,
        authority: Arc<dyn Authority>,
        executor: Arc<dyn Execute>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        Self {
            cfg,
            clock: Arc::new(DriftClock::new()),
            authority,
            executor,
            bus,
            log: Arc::new(MessageLog::new()),
            runs: RwLock::new(HashMap::new()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// The pooled drift clock (shared by every run of this scheduler).
    pub fn clock(&self) -> &Arc<DriftClock> {
        &self.clock
    }

    /// Subscribes to the structured event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Drains the human-readable message log (read-all-then-clear).
    pub fn drain_messages(&self) -> Vec<String> {
        self.log.drain()
    }

    /// Parses an external task record using this scheduler's reference zone
    /// and default burst size.
    pub fn parse_task(&self, record: TaskRecord) -> Result<ClaimTask, StartError> {
        ClaimTask::from_record(record, self.cfg.reference_offset, self.cfg.default_count)
    }

    /// Admits a task and spawns its run.
    ///
    /// Rejections (`count == 0`, duplicate live name) are synchronous and
    /// leave no partial state behind.
    pub async fn start(&self, task: ClaimTask) -> Result<RunHandle, StartError> {
        if task.count() == 0 {
            return Err(StartError::InvalidCount {
                name: task.name().to_string(),
            });
        }

        let mut runs = self.runs.write().await;
        if let Some(entry) = runs.get(task.name()) {
            if !entry.status.borrow().is_terminal() {
                return Err(StartError::AlreadyRunning {
                    name: task.name().to_string(),
                });
            }
        }

        let name = task.name().to_string();
        let (status_tx, status_rx) = watch::channel(RunStatus::Calibrating);
        let cancel = CancellationToken::new();

        let ctx = RunContext {
            task,
            cfg: self.cfg.clone(),
            clock: Arc::clone(&self.clock),
            authority: Arc::clone(&self.authority),
            executor: Arc::clone(&self.executor),
            reporter: Reporter::new(self.bus.clone(), Arc::clone(&self.log)),
            status: status_tx,
            cancel: cancel.clone(),
        };
        let join = tokio::spawn(ctx.run());

        runs.insert(
            name.clone(),
            RunEntry {
                cancel: cancel.clone(),
                status: status_rx.clone(),
            },
        );
        Ok(RunHandle::new(name, cancel, status_rx, join))
    }

    /// Requests cancellation of the named run. False if the name is unknown.
    ///
    /// Cancellation is cooperative: observed at the next sleep or fetch
    /// boundary, and ignored entirely once the run is Firing.
    pub async fn cancel(&self, name: &str) -> bool {
        match self.runs.read().await.get(name) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Status snapshot for the named run; `NotRunning` if unknown.
    pub async fn status(&self, name: &str) -> RunStatus {
        self.runs
            .read()
            .await
            .get(name)
            .map(|entry| *entry.status.borrow())
            .unwrap_or(RunStatus::NotRunning)
    }

    /// Sorted names of runs the registry still tracks (live and terminal).
    pub async fn list(&self) -> Vec<String> {
        let runs = self.runs.read().await;
        let mut names: Vec<String> = runs.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
