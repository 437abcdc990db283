//! Platform abstraction layer for reading the current time.
//!
//! Regions read the time through a facade so that the real monotonic clock, a manually
//! driven clock and caller-supplied functions can be used interchangeably.

mod abstractions;
mod facade;
mod real;

pub(crate) use abstractions::TimeSource;
pub(crate) use facade::TimeSourceFacade;
pub(crate) use real::{SYSTEM_TIME_SOURCE, SystemTimeSource};
