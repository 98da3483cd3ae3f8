//! Internal logging shim.
//!
//! Events are forwarded to `tracing` when the `tracing` feature is enabled and
//! compile to nothing otherwise.

macro_rules! debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::debug!($($arg)+);
        }
    };
}

macro_rules! trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::trace!($($arg)+);
        }
    };
}

pub(crate) use debug;
pub(crate) use trace;
