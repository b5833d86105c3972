//! Event system: structured events, broadcast bus, drainable message log.
//!
//! Internal modules:
//! - [`event`]: event kinds and the seq-numbered [`Event`] record;
//! - [`bus`]: broadcast channel for structured subscribers;
//! - [`sink`]: ordered drain-to-clear log of rendered lines;
//! - [`reporter`]: the single publish site runs go through.

mod bus;
mod event;
mod reporter;
mod sink;

pub use bus::Bus;
pub use event::{Event, EventKind};
pub use sink::MessageLog;

pub(crate) use reporter::Reporter;
