use std::borrow::Cow;

use thiserror::Error;

/// Errors that can occur when a [`Region`](crate::Region) is exited.
///
/// Both variants indicate that the calling code did not follow the nesting discipline
/// that regions require. When a region exit fails, no statistics are modified.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The region being exited is not the innermost open region.
    ///
    /// This happens when regions are exited in a different order than they were entered,
    /// for example when guards are dropped explicitly out of order.
    #[error(
        "region '{name}' was exited out of order: it was opened at depth {expected_depth} \
         but {actual_depth} regions are currently open"
    )]
    UnbalancedExit {
        /// Name of the region that was being exited.
        name: Cow<'static, str>,

        /// Number of open regions (including this one) when the region was entered.
        expected_depth: usize,

        /// Number of open regions at the time of the exit attempt.
        actual_depth: usize,
    },

    /// The recorder was reset while the region was open.
    #[error("region '{name}' was exited after its recorder was reset")]
    StaleRegion {
        /// Name of the region that was being exited.
        name: Cow<'static, str>,
    },
}

/// A specialized `Result` type for timing operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
