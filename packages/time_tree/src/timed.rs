use std::any;
use std::borrow::Cow;

use tracing::warn;

use crate::{Clock, Recorder, current_recorder};

// Last path segment of the type name of every closure.
const CLOSURE_NAME: &str = "{{closure}}";

/// Wraps a function so that each call is measured as a region named after the function.
///
/// The name is the last path segment of the function's type name, so a function `fn load()`
/// is recorded as `load`. Closures have no name of their own and are all recorded as
/// `{{closure}}` (with a logged warning); use [`Timed::name()`] for them.
///
/// Regions are recorded in the thread-local recorder of the thread that calls the wrapper.
///
/// # Examples
///
/// ```
/// use time_tree::{reset, timed, timings};
///
/// fn load_config() -> u32 {
///     42
/// }
///
/// reset();
///
/// let mut load_config = timed(load_config);
/// assert_eq!(load_config(), 42);
/// assert_eq!(load_config(), 42);
///
/// assert_eq!(timings().get("load_config").unwrap().count(), 2);
/// ```
pub fn timed<F, R>(f: F) -> impl FnMut() -> R
where
    F: FnMut() -> R,
{
    Timed::new().wrap(f)
}

/// Configures how functions are wrapped so that their calls are measured as regions.
///
/// All options are optional:
/// * `name` - defaults to the name of the wrapped function
/// * `clock` - defaults to the clock of the recorder the region is recorded in
///
/// The wrapper closes the region whether the wrapped function returns or panics.
///
/// # Examples
///
/// ```
/// use time_tree::{ManualClock, Timed, reset, timings};
///
/// reset();
///
/// let clock = ManualClock::new();
/// let mut fetch = Timed::new().name("fetch").clock(clock.clone()).wrap_with({
///     let clock = clock.clone();
///     move |url: &str| {
///         clock.advance(10.0);
///         url.len()
///     }
/// });
///
/// assert_eq!(fetch("https://example.com"), 19);
///
/// let fetch = timings().get("fetch").unwrap();
/// assert!((fetch.total_elapsed() - 10.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Timed {
    name: Option<Cow<'static, str>>,
    clock: Option<Clock>,
}

impl Timed {
    /// Creates a configuration with all options at their defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the name of the region.
    #[must_use]
    pub fn name(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Overrides the clock the region is measured with.
    #[must_use]
    pub fn clock(self, clock: impl Into<Clock>) -> Self {
        Self {
            clock: Some(clock.into()),
            ..self
        }
    }

    /// Wraps a function without parameters.
    pub fn wrap<F, R>(self, mut f: F) -> impl FnMut() -> R
    where
        F: FnMut() -> R,
    {
        let name = self.resolve_name::<F>();

        move || self.run_in(&current_recorder(), name.clone(), &mut f)
    }

    /// Wraps a function with one parameter.
    ///
    /// Use a tuple to pass multiple values.
    pub fn wrap_with<F, A, R>(self, mut f: F) -> impl FnMut(A) -> R
    where
        F: FnMut(A) -> R,
    {
        let name = self.resolve_name::<F>();

        move |arg| self.run_in(&current_recorder(), name.clone(), || f(arg))
    }

    /// Calls `f` once, measured as a region in the thread-local recorder.
    pub fn call<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.call_in(&current_recorder(), f)
    }

    /// Calls `f` once, measured as a region in the given recorder.
    pub fn call_in<F, R>(&self, recorder: &Recorder, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let name = self.resolve_name::<F>();
        self.run_in(recorder, name, f)
    }

    fn resolve_name<F>(&self) -> Cow<'static, str> {
        if let Some(name) = &self.name {
            return name.clone();
        }

        let name = function_name::<F>();

        if name == CLOSURE_NAME {
            warn!(
                closure = any::type_name::<F>(),
                "timing an unnamed closure, all unnamed closures at the same level share one region"
            );
        }

        Cow::Borrowed(name)
    }

    fn run_in<F, R>(&self, recorder: &Recorder, name: Cow<'static, str>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _region = match &self.clock {
            Some(clock) => recorder.region_with_clock(name, clock.clone()),
            None => recorder.region(name),
        };

        f()
    }
}

/// Extracts the bare function name from the type name of a function item.
fn function_name<F>() -> &'static str {
    let type_name = any::type_name::<F>();

    // Generic arguments may contain paths of their own, so they go first.
    let without_generics = type_name
        .split_once('<')
        .map_or(type_name, |(path, _)| path);

    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
