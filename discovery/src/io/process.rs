//! Bounded child process execution for collaborator CLIs.

use std::io::Read;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Minimum time the output readers get to reach EOF once the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

type ReadResult = Result<(Vec<u8>, usize)>;

/// Output captured from a finished (or killed) child.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes discarded from stdout beyond the limit.
    pub stdout_truncated: usize,
    /// Bytes discarded from stderr beyond the limit.
    pub stderr_truncated: usize,
    /// The child, or a process holding its pipes, outlived the timeout.
    pub timed_out: bool,
}

impl CapturedOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Run `cmd` with no stdin, bounded by `timeout`.
///
/// stdout and stderr are drained on reader threads while the child runs so a
/// chatty child cannot block on a full pipe. At most `output_limit_bytes` of
/// each stream is kept. A grandchild that inherits the pipes can keep them
/// open after the child exits; readers still open at the deadline are
/// abandoned and the call is reported as timed out.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_captured(
    mut cmd: Command,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CapturedOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!(program = ?cmd.get_program(), "spawning child process");
    let deadline = Instant::now() + timeout;
    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawn {}", cmd.get_program().to_string_lossy()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_rx = spawn_reader(stdout, output_limit_bytes);
    let stderr_rx = spawn_reader(stderr, output_limit_bytes);

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => status,
        None => {
            warn!(timeout_secs = timeout.as_secs(), "command timed out, killing");
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
    };

    let drain_until = if timed_out {
        Instant::now() + DRAIN_GRACE
    } else {
        deadline.max(Instant::now() + DRAIN_GRACE)
    };
    let stdout = collect_reader(&stdout_rx, drain_until).context("collect stdout")?;
    let stderr = collect_reader(&stderr_rx, drain_until).context("collect stderr")?;
    if stdout.is_none() || stderr.is_none() {
        warn!("output pipes still open after the child exited, abandoning readers");
        timed_out = true;
    }
    let (stdout, stdout_truncated) = stdout.unwrap_or_default();
    let (stderr, stderr_truncated) = stderr.unwrap_or_default();

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "command output truncated");
    }
    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CapturedOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(reader: R, limit: usize) -> Receiver<ReadResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone once the reader has been abandoned.
        let _ = tx.send(read_limited(reader, limit));
    });
    rx
}

/// Wait for a reader until `until`; `None` means it is still blocked.
fn collect_reader(rx: &Receiver<ReadResult>, until: Instant) -> Result<Option<(Vec<u8>, usize)>> {
    match rx.recv_timeout(until.saturating_duration_since(Instant::now())) {
        Ok(result) => result.map(Some),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_limited<R: Read>(mut reader: R, limit: usize) -> ReadResult {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let keep = n.min(limit.saturating_sub(buf.len()));
        buf.extend_from_slice(&chunk[..keep]);
        truncated += n - keep;
    }

    Ok((buf, truncated))
}
