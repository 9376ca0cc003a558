use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraceError>;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("invalid trace configuration: {0}")]
    Config(String),

    #[error("failed to load trace configuration: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("too long trace path: {}", .path.display())]
    PathTooLong { path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("wallclock unavailable: {0}")]
    Clock(String),

    #[error("out of memory allocating {len} byte trace buffer")]
    Allocation { len: usize },

    #[error("trace event carries {count} values, at most {max} are allowed", max = crate::MAX_VALUES)]
    TooManyValues { count: usize },

    #[error("malformed event kind {0:?}")]
    MalformedEventKind(String),
}

impl TraceError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        TraceError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for the configuration family (bad values, bad sources, oversized paths).
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            TraceError::Config(_) | TraceError::ConfigSource(_) | TraceError::PathTooLong { .. }
        )
    }
}
