//! Task descriptors: what to claim, when, and how many times.

mod payload;
mod task;

pub use payload::ClaimPayload;
pub use task::{ClaimTask, PayloadRecord, TaskRecord};
