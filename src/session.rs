//! Session lifecycle and the evaluation entry points.

use std::path::PathBuf;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};
use crate::{exec, harness, protocol};

const DEFAULT_BINARY: &str = "node";

/// A handle for evaluating JavaScript through the external runtime.
///
/// Every field is fixed at construction. Each evaluation spawns one fresh
/// runtime process, so sessions may be shared and driven concurrently; the
/// preamble is replayed into every process before the request source runs.
#[derive(Debug, Clone)]
pub struct Session {
    preamble: Option<String>,
    dir: Option<PathBuf>,
    cancel: CancellationToken,
    binary: String,
}

impl Session {
    /// Start configuring a session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Create a session with no preamble, probing the runtime.
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Create a session whose preamble runs before every evaluation.
    pub async fn with_preamble(preamble: impl Into<String>) -> Result<Self> {
        Self::builder().preamble(preamble).build().await
    }

    /// Evaluate an expression and return its value.
    ///
    /// Whitespace-only source evaluates to null. Object literals are fine:
    /// the source is parenthesized before evaluation, so `{a: 1}` is an
    /// expression, not a block.
    pub async fn eval(&self, source: &str) -> Result<Value> {
        self.exec(&harness::eval_expression(source)).await
    }

    /// Call a function by dotted reference with JSON-encoded arguments.
    ///
    /// The reference must be reachable from the preamble or the runtime's
    /// global scope, e.g. `"a.b.id"`.
    pub async fn call(&self, function: &str, args: &[Value]) -> Result<Value> {
        self.eval(&harness::call_expression(function, args)).await
    }

    /// Run statement-level source as the body of the harness function.
    ///
    /// A `return` statement supplies the result; falling off the end yields
    /// null. Unlike [`eval`](Self::eval), the source is inserted verbatim,
    /// so a syntax error aborts the whole program before the driver runs and
    /// surfaces as [`Error::AbnormalExit`].
    pub async fn exec(&self, source: &str) -> Result<Value> {
        let program = harness::build_program(self.preamble.as_deref(), source);
        let output = exec::run(
            &self.binary,
            &[],
            Some(&program),
            self.dir.as_deref(),
            &self.cancel,
        )
        .await?;
        if !output.status.success() {
            return Err(Error::AbnormalExit {
                status: output.status,
                output: exec::combined_output(&output.stdout, &output.stderr),
            });
        }
        protocol::decode(&output.stdout)
    }

    /// Trivial version-query invocation verifying the runtime is usable.
    async fn probe(&self) -> Result<()> {
        let output = exec::run(&self.binary, &[exec::VERSION_FLAG], None, None, &self.cancel)
            .await
            .map_err(|e| match e {
                Error::Cancelled => Error::Cancelled,
                other => Error::Unavailable(other.to_string()),
            })?;
        if !output.status.success() {
            return Err(Error::Unavailable(format!(
                "{} {} exited with {}",
                self.binary,
                exec::VERSION_FLAG,
                output.status
            )));
        }
        debug!(binary = %self.binary, "runtime probe succeeded");
        Ok(())
    }
}

/// Configuration collected before the availability probe runs.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    preamble: Option<String>,
    dir: Option<PathBuf>,
    cancel: Option<CancellationToken>,
    binary: Option<String>,
}

impl SessionBuilder {
    /// Source executed ahead of every evaluation in this session.
    pub fn preamble(mut self, src: impl Into<String>) -> Self {
        self.preamble = Some(src.into());
        self
    }

    /// Working directory for each runtime process.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Cancellation scope covering the probe and every later call.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Runtime binary name or path. Defaults to `node`.
    pub fn binary(mut self, name: impl Into<String>) -> Self {
        self.binary = Some(name.into());
        self
    }

    /// Probe the runtime and construct the session.
    ///
    /// Fails with [`Error::Unavailable`] when the binary cannot be invoked
    /// or the version query exits non-zero; no session is returned then.
    pub async fn build(self) -> Result<Session> {
        let session = Session {
            preamble: self.preamble,
            dir: self.dir,
            cancel: self.cancel.unwrap_or_default(),
            binary: self.binary.unwrap_or_else(|| DEFAULT_BINARY.to_owned()),
        };
        session.probe().await?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_missing_binary_is_unavailable() {
        let err = Session::builder()
            .binary("node-eval-no-such-binary")
            .build()
            .await
            .unwrap_err();
        match err {
            Error::Unavailable(msg) => assert!(msg.contains("failed to launch")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }
}
