//! Attempt execution: the executor seam, the HTTP implementation, and the
//! per-attempt result types.

mod executor;
mod http;
mod outcome;

pub use executor::Execute;
pub use http::HttpExecutor;
pub use outcome::{AttemptOutcome, AttemptResult};
