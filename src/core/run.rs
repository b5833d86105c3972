//! # Run loop: the wait-then-fire state machine.
//!
//! Drives one [`ClaimTask`] through
//! `Calibrating → Waiting → Firing → Completed`, with `Cancelled` absorbing
//! from the first two phases.
//!
//! ## Phase flow
//! ```text
//! run()
//!   ├─► Calibrating: fetch reference time
//!   │     ├─ Ok   → clock pair replaced, publish Calibrated
//!   │     └─ Err  → publish CalibrationFailed, sleep backoff, retry
//!   │               (indefinitely; only cancellation exits)
//!   ├─► Waiting: loop {
//!   │     delay = target − corrected_now()
//!   │     ├─ ≤ fire threshold  → sleep remainder − margin, break to Firing
//!   │     ├─ re-check band     → sleep fine interval, recompute
//!   │     └─ recalibrate band  → sleep coarse interval, refetch once
//!   │                            (failure keeps the last good estimate)
//!   │   }
//!   ├─► Firing: spawn count attempts in a JoinSet, publish each resolution
//!   └─► Completed
//! ```
//!
//! ## Rules
//! - Every sleep before Firing is `select!`ed against the cancellation token.
//! - Cancellation is **not** consulted once Firing begins; in-flight attempts
//!   run to resolution (a claim race is one-shot).
//! - A negative or zero remaining delay fires immediately; the loop never
//!   sleeps a negative duration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{SchedulerConfig, WaitTier};
use crate::core::state::RunStatus;
use crate::events::{Event, EventKind, Reporter};
use crate::exec::{AttemptOutcome, AttemptResult, Execute};
use crate::tasks::ClaimTask;
use crate::time::{Authority, DriftClock};

/// How the Waiting phase ended.
enum WaitOutcome {
    Fire,
    Cancelled,
}

/// One fetch attempt, as seen by the calibration loops.
enum FetchOnce {
    Calibrated,
    Unavailable(String),
    Cancelled,
}

/// Everything one run owns.
pub(crate) struct RunContext {
    pub task: ClaimTask,
    pub cfg: SchedulerConfig,
    pub clock: Arc<DriftClock>,
    pub authority: Arc<dyn Authority>,
    pub executor: Arc<dyn Execute>,
    pub reporter: Reporter,
    pub status: watch::Sender<RunStatus>,
    pub cancel: CancellationToken,
}

impl RunContext {
    /// Drives the run to a terminal state.
    pub(crate) async fn run(self) {
        let target_local = self
            .task
            .target()
            .with_timezone(&self.cfg.reference_offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        self.publish(
            Event::now(EventKind::RunStarting)
                .with_task(self.task.name())
                .with_reason(target_local),
        );

        self.set(RunStatus::Calibrating);
        if !self.calibrate_until_ready().await {
            self.finish_cancelled();
            return;
        }

        match self.wait_for_window().await {
            WaitOutcome::Cancelled => self.finish_cancelled(),
            WaitOutcome::Fire => {
                self.fire().await;
                self.set(RunStatus::Completed);
                self.publish(
                    Event::now(EventKind::RunCompleted)
                        .with_task(self.task.name())
                        .with_attempt(self.task.count()),
                );
            }
        }
    }

    fn set(&self, status: RunStatus) {
        let _ = self.status.send(status);
    }

    fn publish(&self, ev: Event) {
        self.reporter.publish(ev);
    }

    fn finish_cancelled(&self) {
        self.set(RunStatus::Cancelled);
        self.publish(Event::now(EventKind::RunCancelled).with_task(self.task.name()));
    }

    /// Sleeps unless cancellation arrives first. True = slept through.
    async fn sleep_cancellable(&self, dur: Duration) -> bool {
        if dur.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = time::sleep(dur) => true,
            _ = self.cancel.cancelled() => false,
        }
    }

    /// One authority round trip, cancellable while awaiting the network.
    async fn fetch_once(&self) -> FetchOnce {
        let fetched = tokio::select! {
            res = self.authority.fetch() => res,
            _ = self.cancel.cancelled() => return FetchOnce::Cancelled,
        };
        match fetched {
            Ok(reference) => {
                self.clock.calibrate(reference, Instant::now());
                self.publish(
                    Event::now(EventKind::Calibrated)
                        .with_task(self.task.name())
                        .with_reason(reference.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string()),
                );
                FetchOnce::Calibrated
            }
            Err(e) => FetchOnce::Unavailable(e.to_string()),
        }
    }

    /// Mandatory initial calibration: retries with fixed backoff until a
    /// fetch succeeds or cancellation is observed. True = calibrated.
    async fn calibrate_until_ready(&self) -> bool {
        loop {
            match self.fetch_once().await {
                FetchOnce::Calibrated => return true,
                FetchOnce::Cancelled => return false,
                FetchOnce::Unavailable(reason) => {
                    self.publish(
                        Event::now(EventKind::CalibrationFailed)
                            .with_task(self.task.name())
                            .with_reason(reason)
                            .with_delay(self.cfg.calibration_backoff),
                    );
                    if !self.sleep_cancellable(self.cfg.calibration_backoff).await {
                        return false;
                    }
                }
            }
        }
    }

    /// Tiered wait: recompute the remaining delay each pass, recalibrate per
    /// tier, and commit to firing inside the fire window.
    async fn wait_for_window(&self) -> WaitOutcome {
        loop {
            if self.cancel.is_cancelled() {
                return WaitOutcome::Cancelled;
            }

            let now = match self.clock.corrected_now() {
                Some(now) => now,
                // Unreachable after calibrate_until_ready; recover anyway.
                None => {
                    if !self.calibrate_until_ready().await {
                        return WaitOutcome::Cancelled;
                    }
                    continue;
                }
            };
            let remaining = (self.task.target() - now).to_std().unwrap_or(Duration::ZERO);
            self.set(RunStatus::Waiting {
                eta_secs: remaining.as_secs(),
            });

            match self.cfg.wait_tier(remaining) {
                WaitTier::Fire => {
                    self.publish(
                        Event::now(EventKind::WaitProgress)
                            .with_task(self.task.name())
                            .with_delay(remaining),
                    );
                    debug!(task = self.task.name(), ?remaining, "entering fire window");
                    if !self.sleep_cancellable(self.cfg.fire_sleep(remaining)).await {
                        return WaitOutcome::Cancelled;
                    }
                    return WaitOutcome::Fire;
                }
                WaitTier::Recheck(interval) => {
                    if !self.sleep_cancellable(interval).await {
                        return WaitOutcome::Cancelled;
                    }
                }
                WaitTier::Recalibrate(interval) => {
                    self.publish(
                        Event::now(EventKind::WaitProgress)
                            .with_task(self.task.name())
                            .with_delay(remaining),
                    );
                    if !self.sleep_cancellable(interval).await {
                        return WaitOutcome::Cancelled;
                    }
                    match self.fetch_once().await {
                        FetchOnce::Cancelled => return WaitOutcome::Cancelled,
                        FetchOnce::Calibrated => {}
                        // Keep the last good pair; a stale-but-bounded
                        // estimate beats blocking the approach.
                        FetchOnce::Unavailable(reason) => {
                            self.publish(
                                Event::now(EventKind::CalibrationFailed)
                                    .with_task(self.task.name())
                                    .with_reason(reason),
                            );
                        }
                    }
                }
            }
        }
    }

    /// The burst: exactly `count` concurrent attempts, each resolution
    /// published individually. Not cancellable.
    async fn fire(&self) {
        self.set(RunStatus::Firing);
        self.publish(
            Event::now(EventKind::FiringStarted)
                .with_task(self.task.name())
                .with_attempt(self.task.count()),
        );

        let mut attempts: JoinSet<AttemptResult> = JoinSet::new();
        for index in 1..=self.task.count() {
            let executor = Arc::clone(&self.executor);
            let payload = self.task.payload().clone();
            attempts.spawn(async move { executor.execute(index, &payload).await });
        }

        while let Some(joined) = attempts.join_next().await {
            let result = joined.unwrap_or_else(|e| AttemptResult {
                index: 0,
                outcome: AttemptOutcome::Failed {
                    reason: format!("attempt task panicked: {e}"),
                },
            });
            self.publish(
                Event::now(EventKind::AttemptResolved)
                    .with_task(self.task.name())
                    .with_attempt(result.index)
                    .with_reason(result.text()),
            );
        }
    }
}
