//! Runtime core: admission, the run state machine, and per-run handles.
//!
//! Internal modules:
//! - [`scheduler`]: run admission, registry, control surface;
//! - [`run`]: the calibrate/wait/fire state machine;
//! - [`handle`]: joinable/cancellable per-run handle;
//! - [`state`]: externally observable run status.

mod handle;
mod run;
mod scheduler;
mod state;

pub use handle::RunHandle;
pub use scheduler::Scheduler;
pub use state::RunStatus;
