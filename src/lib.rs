//! # zerohour
//!
//! **zerohour** is a timed-execution scheduler: it claims a
//! limited-availability item at its exact release instant using only
//! network-observed time. The local clock is never trusted — a drift-corrected
//! estimate is maintained from an external authority, a tiered wait loop
//! recalibrates more tightly as the target approaches, and at the instant a
//! bounded burst of concurrent attempts is dispatched and narrated.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐        ┌───────────────────────────────────────┐
//!     │  ClaimTask   │──────► │  Scheduler (admission + registry)     │
//!     │ (descriptor) │ start  │  - validates synchronously            │
//!     └──────────────┘        │  - one RunHandle per admitted task    │
//!                             └──────┬────────────────────────────────┘
//!                                    ▼
//!                       ┌────────────────────────┐
//!                       │  Run loop (per task)   │
//!                       │  Calibrating → Waiting │
//!                       │     → Firing → done    │
//!                       └──┬─────────┬───────┬───┘
//!          fetch reference │         │ sleep │ burst (JoinSet, count×)
//!                          ▼         ▼       ▼
//!                  ┌───────────┐  ┌───────┐ ┌──────────────┐
//!                  │ Authority │  │ Drift │ │   Execute    │
//!                  │ (SNTP/UDP)│─►│ Clock │ │ (HTTP POST)  │
//!                  └───────────┘  └───────┘ └──────┬───────┘
//!                                                  │ per-resolution events
//!                                                  ▼
//!                             ┌────────────────────────────────────┐
//!                             │ Reporter ─► MessageLog (drainable) │
//!                             │          └► Bus (broadcast)        │
//!                             └────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! ```text
//! Idle ─► Calibrating ─► Waiting ─► Firing ─► Completed
//!              │            │
//!              └────────────┴──► Cancelled   (never from Firing)
//! ```
//!
//! - Calibration is mandatory before any delay decision; fetch failures
//!   retry indefinitely with a fixed backoff.
//! - Waiting recalibrates on a tier schedule: the closer the target, the
//!   tighter the interval, bounding accumulated local-clock drift.
//! - Firing dispatches exactly `count` concurrent attempts and waits for
//!   every one; cancellation is ignored once the burst is in flight.
//!
//! ## Example
//! ```no_run
//! use zerohour::{ClaimPayload, ClaimTask, Scheduler, SchedulerConfig};
//! use chrono::{TimeZone, Utc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = Scheduler::new(SchedulerConfig::default());
//!
//!     let payload = ClaimPayload::new(
//!         "https://shop.example/api/claim",
//!         r#"{"goods_id":"2024"}"#,
//!     )
//!     .with_header("cookie", "session=...");
//!
//!     let target = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
//!     let handle = scheduler
//!         .start(ClaimTask::new("launch-day", target, 5, payload))
//!         .await?;
//!
//!     for line in scheduler.drain_messages() {
//!         println!("{line}");
//!     }
//!     let terminal = handle.wait().await;
//!     println!("run ended: {terminal:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types                              |
//! |-----------------|----------------------------------------------------------|----------------------------------------|
//! | **Control**     | Admit, cancel, and observe runs by name.                 | [`Scheduler`], [`RunHandle`], [`RunStatus`] |
//! | **Time**        | Drift-corrected network time, injectable authority.      | [`Authority`], [`SntpAuthority`], [`DriftClock`] |
//! | **Execution**   | Bounded concurrent burst, injectable executor.           | [`Execute`], [`HttpExecutor`], [`AttemptResult`] |
//! | **Events**      | Structured bus plus drainable human-readable log.        | [`Event`], [`Bus`], [`MessageLog`]     |
//! | **Configuration**| Every timing constant in one struct.                    | [`SchedulerConfig`]                    |
//! | **Errors**      | Synchronous admission rejects, fetch failures.           | [`StartError`], [`TimeError`]          |

mod config;
mod core;
mod error;
mod events;
mod exec;
mod tasks;
mod time;

// ---- Public re-exports ----

pub use config::{SchedulerConfig, WaitTier};
pub use core::{RunHandle, RunStatus, Scheduler};
pub use error::{StartError, TimeError};
pub use events::{Bus, Event, EventKind, MessageLog};
pub use exec::{AttemptOutcome, AttemptResult, Execute, HttpExecutor};
pub use tasks::{ClaimPayload, ClaimTask, PayloadRecord, TaskRecord};
pub use time::{Authority, DriftClock, SntpAuthority, TimeEstimate};
