//! Evaluate JavaScript snippets and call preamble functions through a
//! Node.js subprocess.
//!
//! Each evaluation builds a self-contained harness program around the user
//! source, feeds it to a fresh `node` process on stdin, and decodes a tagged
//! result line from the captured output into a [`serde_json::Value`] or an
//! [`Error`]. The runtime's `undefined` and values that cannot be serialized
//! both decode to [`Value::Null`]; they are successful evaluations that
//! simply carry no payload.
//!
//! ```no_run
//! use node_eval::Session;
//! use serde_json::json;
//!
//! # async fn demo() -> node_eval::Result<()> {
//! let session = Session::with_preamble("id = function(v) { return v; }").await?;
//!
//! let four = session.eval("2 + 2").await?;
//! assert_eq!(four, json!(4));
//!
//! let echoed = session.call("id", &[json!("bar")]).await?;
//! assert_eq!(echoed, json!("bar"));
//! # Ok(())
//! # }
//! ```
//!
//! There is no process reuse: one process is spawned and torn down per call,
//! and the preamble is replayed each time. Callers needing bounded latency
//! supply a [`CancellationToken`] via [`Session::builder`]; no timeout is
//! applied by default.

mod error;
mod exec;
mod harness;
mod protocol;
mod session;

pub use error::{Error, Result};
pub use serde_json::Value;
pub use session::{Session, SessionBuilder};
pub use tokio_util::sync::CancellationToken;
