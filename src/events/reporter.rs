//! # Reporter: single publish site for run narration.
//!
//! Every status change goes through [`Reporter::publish`], which appends the
//! rendered line to the [`MessageLog`] and then broadcasts the structured
//! [`Event`] on the [`Bus`]. Doing both at one call site is what gives the
//! message log its ordering guarantee: lines land in the exact order they
//! were produced, even when firing attempts publish concurrently (the log's
//! mutex serializes the appends).

use std::sync::Arc;

use super::{Bus, Event, MessageLog};

/// Publishes events to both consumer surfaces.
#[derive(Clone)]
pub struct Reporter {
    bus: Bus,
    log: Arc<MessageLog>,
}

impl Reporter {
    /// Creates a reporter over the given bus and log.
    pub fn new(bus: Bus, log: Arc<MessageLog>) -> Self {
        Self { bus, log }
    }

    /// Renders the event into the message log, then broadcasts it.
    pub fn publish(&self, ev: Event) {
        self.log.push(ev.render());
        self.bus.publish(ev);
    }
}
