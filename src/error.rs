//! Error type covering session construction and per-call failures.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The runtime binary could not be invoked at session construction time.
    #[error("runtime unavailable: {0}")]
    Unavailable(String),

    /// The child process could not be started for a call.
    #[error("failed to launch runtime: {0}")]
    Launch(#[source] std::io::Error),

    /// The child exited with a non-zero status. Carries the combined
    /// stdout/stderr, which typically holds a native syntax or parse error.
    #[error("runtime exited with {status}: {output}")]
    AbnormalExit {
        status: std::process::ExitStatus,
        output: String,
    },

    /// The result tag line was missing or not parseable as a JSON array.
    #[error("malformed result line {line:?}: {reason}")]
    Protocol { line: String, reason: String },

    /// The evaluated source threw; carries the stringified thrown value.
    #[error("evaluation failed: {0}")]
    Eval(String),

    /// The cancellation token fired before the process exited.
    #[error("evaluation cancelled")]
    Cancelled,
}
