#![doc = include_str!("../README.md")]

pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod event;
pub mod flush;
pub mod record;
pub mod session;

pub use clock::{Clock, WallClock};
pub use config::TraceConfig;
pub use decode::{read_log, DecodeError, TraceLine};
pub use error::{Result, TraceError};
pub use event::{EventKind, Subsystem};
pub use record::{TraceBuffer, DEFAULT_CAPACITY, MAX_VALUES};
pub use session::{trace_path, TraceSession, MAX_PATH_LEN};

#[macro_export]
#[cfg(not(feature = "off"))]
/// `iotrace_event!(session, kind, values...)` records an I/O event with up to 5 values
/// that `as u64` works on, e.g. a relation id and a block number.
/// Nothing is recorded while I/O tracing is off.
/// `session` is evaluated more than once, so pass a place, not a constructor.
macro_rules! iotrace_event {
    ($session:expr, $kind:expr $(, $value:expr)* $(,)?) => {
        $session.trace_event($session.io_enabled(), $kind, &[$(($value) as u64),*])
    };
}

#[macro_export]
#[cfg(feature = "off")]
macro_rules! iotrace_event {
    ($session:expr, $kind:expr $(, $value:expr)* $(,)?) => {
        ::core::result::Result::<(), $crate::TraceError>::Ok(())
    };
}

#[macro_export]
#[cfg(not(feature = "off"))]
/// `buckettrace_event!(session, kind, values...)` is [`iotrace_event!`] guarded by the bucket flag.
macro_rules! buckettrace_event {
    ($session:expr, $kind:expr $(, $value:expr)* $(,)?) => {
        $session.trace_event($session.bucket_enabled(), $kind, &[$(($value) as u64),*])
    };
}

#[macro_export]
#[cfg(feature = "off")]
macro_rules! buckettrace_event {
    ($session:expr, $kind:expr $(, $value:expr)* $(,)?) => {
        ::core::result::Result::<(), $crate::TraceError>::Ok(())
    };
}
