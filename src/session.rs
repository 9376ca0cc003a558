use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::clock::{relative_nanos, Clock, WallClock};
use crate::config::TraceConfig;
use crate::error::{Result, TraceError};
use crate::event::EventKind;
use crate::flush::write_records_text;
use crate::record::{TraceBuffer, MAX_VALUES};

/// longest log path accepted, in bytes
pub const MAX_PATH_LEN: usize = 1024;

/// `<dir>/trace_<pid>.log`
pub fn trace_path(dir: &Path, pid: u32) -> Result<PathBuf> {
    let path = dir.join(format!("trace_{pid}.log"));
    if path.as_os_str().len() > MAX_PATH_LEN {
        return Err(TraceError::PathTooLong { path });
    }
    Ok(path)
}

struct ActiveSession {
    path: PathBuf,
    file: BufWriter<File>,
    buffer: TraceBuffer,
    base: u64,
}

impl ActiveSession {
    fn flush(&mut self) -> Result<usize> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        let written = write_records_text(&mut self.file, &self.buffer).and_then(|n| {
            self.file.flush()?;
            Ok(n)
        });
        // reset even on failure so no record is written twice
        self.buffer.clear();
        written.map_err(|e| {
            TraceError::io(format!("failed to write trace log {}", self.path.display()), e)
        })
    }
}

/// One trace session: an output file plus the record buffer feeding it.
///
/// A session starts out inactive. [`TraceSession::start`] opens the log and
/// allocates the buffer when at least one feature flag is set, and
/// [`TraceSession::stop`] (or dropping the session) drains the buffer and
/// closes the file. Every operation takes `&mut self`; share a session across
/// threads only behind your own lock.
pub struct TraceSession<C: Clock = WallClock> {
    config: TraceConfig,
    clock: C,
    active: Option<ActiveSession>,
}

impl TraceSession<WallClock> {
    pub fn new(config: TraceConfig) -> Self {
        Self::with_clock(config, WallClock)
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(TraceConfig::from_env()?))
    }
}

impl<C: Clock> TraceSession<C> {
    pub fn with_clock(config: TraceConfig, clock: C) -> Self {
        TraceSession {
            config,
            clock,
            active: None,
        }
    }

    /// Builds and starts a session in one step; it is finalized when dropped.
    pub fn started(config: TraceConfig, clock: C) -> Result<Self> {
        let mut session = Self::with_clock(config, clock);
        session.start()?;
        Ok(session)
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    #[inline(always)]
    pub fn io_enabled(&self) -> bool {
        self.config.io_tracing
    }

    #[inline(always)]
    pub fn bucket_enabled(&self) -> bool {
        self.config.bucket_tracing
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// log file of the running session
    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// absolute wallclock nanos captured by the last `start`
    pub fn base_nanos(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.base)
    }

    /// bytes waiting in the buffer
    pub fn buffered_bytes(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.buffer.len())
    }

    pub fn buffer(&self) -> Option<&TraceBuffer> {
        self.active.as_ref().map(|a| &a.buffer)
    }

    pub fn start(&mut self) -> Result<()> {
        if self.active.is_some() || !self.config.enabled() {
            return Ok(());
        }
        let pid = std::process::id();
        debug!(pid, "starting trace session");

        let path = trace_path(&self.config.output_dir, pid)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| {
                TraceError::io(format!("failed to open trace log {}", path.display()), e)
            })?;
        info!(pid, path = %path.display(), "trace log file opened");

        let base = self.clock.now_nanos()?;
        let buffer = TraceBuffer::with_capacity(self.config.capacity)?;

        self.active = Some(ActiveSession {
            path,
            file: BufWriter::new(file),
            buffer,
            base,
        });
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        let flushed = active.flush();
        let ActiveSession {
            path, file, buffer, ..
        } = active;
        drop(buffer);
        let closed = file
            .into_inner()
            .map_err(|e| e.into_error())
            .and_then(|f| f.sync_all())
            .map_err(|e| TraceError::io(format!("failed to close trace log {}", path.display()), e));
        flushed?;
        closed?;
        info!(pid = std::process::id(), path = %path.display(), "trace session stopped");
        Ok(())
    }

    /// Drains buffered records to the log. Returns how many lines were written.
    pub fn flush(&mut self) -> Result<usize> {
        match self.active.as_mut() {
            Some(active) => active.flush(),
            None => Ok(0),
        }
    }

    /// Records one event. Flushes first when the record would not fit in the
    /// space left in the buffer.
    #[inline]
    pub fn append(&mut self, kind: EventKind, values: &[u64]) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if values.len() > MAX_VALUES {
            return Err(TraceError::TooManyValues {
                count: values.len(),
            });
        }
        if !active.buffer.fits(values.len()) {
            debug!(bytes = active.buffer.len(), "trace buffer full, flushing");
            active.flush()?;
        }
        let time = relative_nanos(self.clock.now_nanos()?, active.base);
        active.buffer.push(time, kind, values);
        Ok(())
    }

    /// Call-site entry point: does nothing unless `enabled`.
    #[inline(always)]
    pub fn trace_event(&mut self, enabled: bool, kind: EventKind, values: &[u64]) -> Result<()> {
        if !enabled {
            return Ok(());
        }
        self.append(kind, values)
    }

    fn finalize(&mut self) {
        if let Err(e) = self.stop() {
            warn!(pid = std::process::id(), error = %e, "failed to finalize trace session");
        }
    }
}

impl<C: Clock> Drop for TraceSession<C> {
    fn drop(&mut self) {
        self.finalize();
    }
}
