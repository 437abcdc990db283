#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Hierarchical timing of named code regions, accumulated per thread.
//!
//! This package lets you mark named regions of execution and accumulates the elapsed time,
//! completion count and mean elapsed time of each region. Regions that are entered while
//! another region is open become its children, so the result is a tree that mirrors the
//! call structure of the measured code.
//!
//! The core functionality includes:
//! - [`region()`] / [`Recorder::region()`] - Opens a [`Region`] that is measured until dropped
//! - [`Timed`] / [`timed()`] - Wraps a function so that every call is measured as a region
//! - [`timings()`] / [`stack()`] - Live views of the current nesting level and open regions
//! - [`post_timing()`] - Process-wide [`Signal`] that fires after each region completes
//! - [`reset()`] - Discards everything recorded on the current thread
//!
//! # Simple usage
//!
//! ```
//! use time_tree::{region, reset, timings};
//!
//! # fn main() {
//! reset();
//!
//! for _ in 0..3 {
//!     let _outer = region("load_config");
//!
//!     {
//!         let _inner = region("parse");
//!         // Parse something.
//!     }
//! }
//!
//! let load_config = timings().get("load_config").unwrap();
//! assert_eq!(load_config.count(), 3);
//! assert!(load_config.child("parse").is_some());
//! # }
//! ```
//!
//! # Deterministic clocks
//!
//! Elapsed time is measured in whatever unit the [`Clock`] returns. The default clock
//! returns seconds from the monotonic platform clock. Tests can use a [`ManualClock`]:
//!
//! ```
//! use time_tree::{ManualClock, Recorder};
//!
//! let clock = ManualClock::starting_at(1000.0);
//! let recorder = Recorder::builder().clock(clock.clone()).build();
//!
//! {
//!     let _region = recorder.region("a");
//!     clock.advance(10.0);
//! }
//! {
//!     let _region = recorder.region("a");
//!     clock.advance(5.0);
//! }
//!
//! let a = recorder.timings().get("a").unwrap();
//! assert_eq!(a.count(), 2);
//! assert!((a.average_elapsed() - 7.5).abs() < f64::EPSILON);
//! ```
//!
//! # Threading
//!
//! The free functions ([`region()`], [`timings()`], [`stack()`], [`reset()`]) operate on a
//! recorder that is created lazily for each thread, so timings never leak between threads.
//! A [`Recorder`] is single-threaded; create one per thread if you prefer passing it around
//! explicitly over relying on the thread-local one.
//!
//! The completion [`Signal`] returned by [`post_timing()`] is shared by all threads. Its
//! subscribers are called on the thread whose region completed.

mod clock;
mod completion;
mod constants;
mod current;
mod error;
mod manual_clock;
mod node;
mod pal;
mod recorder;
mod recorder_builder;
mod region;
mod signal;
mod timed;
mod tree;
mod views;

pub use clock::*;
pub use completion::*;
pub(crate) use constants::*;
pub use current::*;
pub use error::*;
pub use manual_clock::*;
pub use node::*;
pub use recorder::*;
pub use recorder_builder::*;
pub use region::*;
pub use signal::*;
pub use timed::*;
pub(crate) use tree::*;
pub use views::*;
