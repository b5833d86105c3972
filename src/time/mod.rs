//! Network-observed time: authority seam, SNTP client, drift-corrected clock.
//!
//! Internal modules:
//! - [`authority`]: the injectable fetch seam;
//! - [`sntp`]: the production SNTP v4 client;
//! - [`clock`]: the shared calibration pair and pure corrected-now reads.

mod authority;
mod clock;
mod sntp;

pub use authority::Authority;
pub use clock::{DriftClock, TimeEstimate};
pub use sntp::SntpAuthority;
