//! Process relay - run the driver and pass its standard streams through
//!
//! One child, three pipes, one owner each:
//! - `relay-stdout` drains child stdout into our stdout, line by line
//! - `relay-stderr` drains child stderr into our stderr, line by line
//! - `relay-stdin` copies our stdin into the child in fixed-size chunks
//!
//! The calling thread only waits for the child. Output is never allowed to
//! back up: a drain whose sink fails keeps reading and discards, so the
//! child cannot block on a full pipe.

use crate::invocation::CommandLine;
use crate::util::signals;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Bytes read from our stdin per write to the child
pub const CHUNK_SIZE: usize = 256;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Failed to launch {program}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Child {0} was not captured")]
    MissingPipe(Stream),

    #[error("Failed to wait for {program}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start relay thread for {stream}")]
    Thread {
        stream: Stream,
        #[source]
        source: io::Error,
    },

    #[error("Relay thread for {0} panicked")]
    DrainPanicked(Stream),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
    Stderr,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stream::Stdin => "stdin",
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        })
    }
}

/// Result of a finished relay session
#[derive(Debug)]
pub struct RelayOutcome<O, E> {
    pub status: ExitStatus,
    /// The stdout sink, handed back after draining
    pub stdout: O,
    /// The stderr sink, handed back after draining
    pub stderr: E,
    pub stdout_bytes: u64,
    pub stderr_bytes: u64,
    /// Bytes written to the child's stdin by the time it exited
    pub stdin_bytes: u64,
}

impl<O, E> RelayOutcome<O, E> {
    pub fn exit_code(&self) -> i32 {
        exit_code(self.status)
    }
}

/// Exit code to report for a finished child.
/// A child killed by a signal maps to 128 + signal number, as shells do.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

pub struct Relay<O, E> {
    stdout: O,
    stderr: E,
    forward_signals: bool,
}

impl Relay<io::Stdout, io::Stderr> {
    /// Relay into our own stdout/stderr
    pub fn inherit() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O, E> Relay<O, E>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
{
    pub fn new(stdout: O, stderr: E) -> Self {
        Self {
            stdout,
            stderr,
            forward_signals: false,
        }
    }

    /// Run the child in its own process group and pass our signals on to it
    pub fn forward_signals(mut self, enabled: bool) -> Self {
        self.forward_signals = enabled;
        self
    }

    /// Run `command` to completion, feeding it `input`
    pub fn run<R>(self, command: &CommandLine, input: R) -> Result<RelayOutcome<O, E>, RelayError>
    where
        R: Read + Send + 'static,
    {
        let program = command.program().to_string_lossy().to_string();

        let mut cmd = command.to_command();
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if self.forward_signals {
            #[cfg(unix)]
            signals::own_process_group(&mut cmd);
            signals::arm();
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                if self.forward_signals {
                    signals::untrack();
                }
                return Err(RelayError::Launch { program, source });
            }
        };
        tracing::debug!(pid = child.id(), %program, "launched");

        if self.forward_signals {
            signals::track(child.id());
        }

        let child_stdout = child
            .stdout
            .take()
            .ok_or(RelayError::MissingPipe(Stream::Stdout))?;
        let child_stderr = child
            .stderr
            .take()
            .ok_or(RelayError::MissingPipe(Stream::Stderr))?;
        let child_stdin = child
            .stdin
            .take()
            .ok_or(RelayError::MissingPipe(Stream::Stdin))?;

        let forwarded = Arc::new(AtomicU64::new(0));
        let spawned = spawn_drain(Stream::Stdout, child_stdout, self.stdout).and_then(|out| {
            let err = spawn_drain(Stream::Stderr, child_stderr, self.stderr)?;
            spawn_forward(input, child_stdin, CHUNK_SIZE, forwarded.clone())?;
            Ok((out, err))
        });
        let (stdout_handle, stderr_handle) = match spawned {
            Ok(handles) => handles,
            Err(e) => {
                child.kill().ok();
                child.wait().ok();
                if self.forward_signals {
                    signals::untrack();
                }
                return Err(e);
            }
        };

        let status = child.wait();
        if self.forward_signals {
            signals::untrack();
        }
        let status = status.map_err(|source| RelayError::Wait { program, source })?;

        // The forwarder is not joined: it may still be blocked reading an
        // open terminal, and it dies with the process.
        let (stdout, stdout_bytes) = stdout_handle
            .join()
            .map_err(|_| RelayError::DrainPanicked(Stream::Stdout))?;
        let (stderr, stderr_bytes) = stderr_handle
            .join()
            .map_err(|_| RelayError::DrainPanicked(Stream::Stderr))?;

        let stdin_bytes = forwarded.load(Ordering::SeqCst);
        tracing::debug!(%status, "child exited");

        Ok(RelayOutcome {
            status,
            stdout,
            stderr,
            stdout_bytes,
            stderr_bytes,
            stdin_bytes,
        })
    }
}

fn spawn_drain<R, W>(
    stream: Stream,
    source: R,
    mut sink: W,
) -> Result<JoinHandle<(W, u64)>, RelayError>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    thread::Builder::new()
        .name(format!("relay-{}", stream))
        .spawn(move || {
            let relayed = drain(stream, source, &mut sink);
            (sink, relayed)
        })
        .map_err(|source| RelayError::Thread { stream, source })
}

/// Copy `source` into `sink` one line at a time, flushing after each line.
/// Returns the number of bytes read from `source`.
fn drain<R: Read, W: Write>(stream: Stream, source: R, sink: &mut W) -> u64 {
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();
    let mut relayed = 0u64;
    let mut sink_ok = true;

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(n) => {
                relayed += n as u64;
                if !sink_ok {
                    continue;
                }
                if let Err(e) = sink.write_all(&line).and_then(|_| sink.flush()) {
                    tracing::warn!(%stream, error = %e, "cannot relay child output, discarding the rest");
                    sink_ok = false;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(%stream, error = %e, "read from child failed");
                break;
            }
        }
    }

    relayed
}

fn spawn_forward<R, W>(
    input: R,
    sink: W,
    chunk_size: usize,
    forwarded: Arc<AtomicU64>,
) -> Result<(), RelayError>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    thread::Builder::new()
        .name(format!("relay-{}", Stream::Stdin))
        .spawn(move || forward(input, sink, chunk_size, &forwarded))
        .map(|_detached| ())
        .map_err(|source| RelayError::Thread {
            stream: Stream::Stdin,
            source,
        })
}

/// Copy `input` into the child's stdin in `chunk_size` pieces, then close it
fn forward<R: Read, W: Write>(mut input: R, mut sink: W, chunk_size: usize, forwarded: &AtomicU64) {
    let mut buf = vec![0u8; chunk_size];

    loop {
        match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if let Err(e) = sink.write_all(&buf[..n]).and_then(|_| sink.flush()) {
                    tracing::warn!(stream = %Stream::Stdin, error = %e, "child stopped accepting input");
                    break;
                }
                forwarded.fetch_add(n as u64, Ordering::SeqCst);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(stream = %Stream::Stdin, error = %e, "read from our stdin failed");
                break;
            }
        }
    }

    // Dropping the pipe is what signals EOF to the child
    drop(sink);
}
