use std::fmt;
use std::sync::Arc;

use crate::ManualClock;
use crate::pal::{SYSTEM_TIME_SOURCE, SystemTimeSource, TimeSource};

/// A time source selected at runtime.
#[derive(Clone)]
pub(crate) enum TimeSourceFacade {
    System(&'static SystemTimeSource),
    Manual(ManualClock),
    Function(Arc<dyn Fn() -> f64 + Send + Sync>),
}

impl TimeSourceFacade {
    pub(crate) fn system() -> Self {
        Self::System(&SYSTEM_TIME_SOURCE)
    }
}

impl TimeSource for TimeSourceFacade {
    fn now(&self) -> f64 {
        match self {
            Self::System(source) => source.now(),
            Self::Manual(clock) => clock.now(),
            Self::Function(f) => f(),
        }
    }
}

impl fmt::Debug for TimeSourceFacade {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System(source) => source.fmt(f),
            Self::Manual(clock) => clock.fmt(f),
            Self::Function(_) => f.write_str("Function"),
        }
    }
}
