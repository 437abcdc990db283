use std::fmt::Debug;

/// Provides the current time as a floating point timestamp.
///
/// The unit is up to the implementation. Only differences between two timestamps from the
/// same source are meaningful.
pub(crate) trait TimeSource: Debug + Send + Sync + 'static {
    /// Gets the current timestamp.
    fn now(&self) -> f64;
}
