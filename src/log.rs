//! Logging for the library side.
//!
//! Library code logs through `crate::log::{debug, info, warn}`. With the
//! `tracing` feature those are the `tracing` macros. Without it they swallow
//! their arguments and the crate carries no logging dependency.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, warn};

#[cfg(not(feature = "tracing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __skillmatch_discard_log {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::__skillmatch_discard_log as debug;
#[cfg(not(feature = "tracing"))]
pub use crate::__skillmatch_discard_log as info;
#[cfg(not(feature = "tracing"))]
pub use crate::__skillmatch_discard_log as warn;
