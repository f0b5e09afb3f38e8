//! Child-process pipe for gnuplot
//!
//! This module provides the one-way command channel used by a session: the
//! [`CommandSink`] trait and [`GnuplotPipe`], which spawns the plotting program
//! and writes into its standard input.

use std::fmt;
use std::io::{self, BufWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PipeError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Child process has no stdin handle")]
    MissingStdin,

    #[error("Failed to write to pipe: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to close pipe: {0}")]
    Close(#[source] io::Error),

    #[error("Pipe is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, PipeError>;

/// One-way line channel to a plotting program.
///
/// Nothing is ever read back. A successful write only means the bytes reached
/// the local buffer or the OS pipe; whether the receiver accepted the command
/// cannot be observed through this interface.
pub trait CommandSink {
    /// Write `line` and a newline, flushing afterwards if `flush` is set
    fn write_line(&mut self, line: fmt::Arguments<'_>, flush: bool) -> io::Result<()>;

    /// Flush and release the channel. Calling it again is a no-op.
    ///
    /// Only local failures are errors; how the receiver ends is not.
    fn close(&mut self) -> Result<()>;
}

/// Pipe to a spawned plotting process
pub struct GnuplotPipe {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    program: String,
}

impl GnuplotPipe {
    /// Spawn `program` (looked up on PATH) with its stdin piped to us.
    ///
    /// `buffer_size` is the capacity of the private write buffer owned by
    /// this pipe.
    pub fn spawn(program: &str, args: &[String], buffer_size: usize) -> Result<Self> {
        debug!(program, ?args, buffer_size, "spawning plotting program");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| PipeError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PipeError::MissingStdin);
        };

        Ok(Self {
            child,
            stdin: Some(BufWriter::with_capacity(buffer_size.max(1), stdin)),
            program: program.to_string(),
        })
    }

    /// OS process id of the child
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Program name this pipe was spawned with
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check if the child process is still running
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl CommandSink for GnuplotPipe {
    fn write_line(&mut self, line: fmt::Arguments<'_>, flush: bool) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "pipe already closed"))?;

        stdin.write_fmt(line)?;
        stdin.write_all(b"\n")?;
        if flush {
            stdin.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut stdin) = self.stdin.take() else {
            return Ok(());
        };

        // The child only sees EOF once the handle is dropped, so flush first
        // and wait afterwards.
        let flushed = stdin.flush();
        drop(stdin);
        let status = self.child.wait();

        flushed.map_err(PipeError::Close)?;
        let status = status.map_err(PipeError::Close)?;
        if !status.success() {
            warn!(program = %self.program, %status, "plotting program exited with failure");
        }
        Ok(())
    }
}

impl Drop for GnuplotPipe {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_spawn_missing_program() {
        let result = GnuplotPipe::spawn("gnupipe-no-such-program", &[], 64);
        match result {
            Err(PipeError::Spawn { program, .. }) => {
                assert_eq!(program, "gnupipe-no-such-program");
            }
            _ => panic!("expected spawn error"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_write_and_close() {
        let mut pipe = GnuplotPipe::spawn("sh", &sh("cat > /dev/null"), 64).unwrap();
        assert_eq!(pipe.program(), "sh");
        assert!(pipe.id() > 0);

        pipe.write_line(format_args!("plot '-' with {}", "points"), true).unwrap();
        for i in 0..100 {
            pipe.write_line(format_args!("{}", i), false).unwrap();
        }
        pipe.write_line(format_args!("e"), true).unwrap();

        assert!(pipe.close().is_ok());
        // Second close is a no-op
        assert!(pipe.close().is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_write_after_close() {
        let mut pipe = GnuplotPipe::spawn("sh", &sh("cat > /dev/null"), 64).unwrap();
        pipe.close().unwrap();

        let err = pipe.write_line(format_args!("replot"), true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    #[cfg(unix)]
    fn test_close_tolerates_failed_exit() {
        let mut pipe = GnuplotPipe::spawn("sh", &sh("exit 3"), 64).unwrap();
        assert!(pipe.close().is_ok());
        assert!(!pipe.is_running());
    }
}
