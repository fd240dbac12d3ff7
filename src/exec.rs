//! Child process execution for the external runtime.

use std::path::Path;
use std::process::{Output, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Flag passed to the runtime binary for the availability probe.
pub(crate) const VERSION_FLAG: &str = "-v";

/// Run the runtime binary and capture its output.
///
/// `input`, when present, is written to the child's stdin and the stream is
/// closed; there is no further interaction. Completion is raced against the
/// cancellation token, and a cancelled token tears the child down and yields
/// `Error::Cancelled`.
pub(crate) async fn run(
    binary: &str,
    args: &[&str],
    input: Option<&str>,
    dir: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<Output> {
    let mut cmd = Command::new(binary);
    cmd.args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(Error::Launch)?;
    debug!(binary, ?args, ?dir, "spawned runtime process");

    if let Some(input) = input {
        if let Some(mut stdin) = child.stdin.take() {
            // A write failure means the child already died; its exit status
            // and captured stderr carry the real story.
            stdin.write_all(input.as_bytes()).await.ok();
        }
    }

    tokio::select! {
        _ = cancel.cancelled() => {
            debug!(binary, "cancelled, killing runtime process");
            Err(Error::Cancelled)
        }
        res = child.wait_with_output() => {
            let output = res.map_err(Error::Launch)?;
            trace!(
                status = ?output.status,
                stdout_len = output.stdout.len(),
                stderr_len = output.stderr.len(),
                "runtime exited"
            );
            Ok(output)
        }
    }
}

/// Concatenate captured stdout and stderr for failure reporting.
pub(crate) fn combined_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut body = String::new();
    if !stdout.is_empty() {
        body.push_str(&String::from_utf8_lossy(stdout));
    }
    if !stderr.is_empty() {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&String::from_utf8_lossy(stderr));
    }
    body
}
