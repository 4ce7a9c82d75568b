//! Suspendable effect flows: describe side effects as data, run them live,
//! record them, replay them.
//!
//! Application logic is written as [`Flow`] values — suspendable computations
//! that *describe* I/O calls, state reads and state mutations instead of
//! performing them. An interpreter walks the description and decides what
//! each suspension point means:
//!
//! - [`run()`] executes it against a real [`EffectHandler`] and [`Store`],
//!   driving parallel groups concurrently;
//! - [`record()`] wraps it so the same drive also produces an ordered
//!   [`Trace`] of every suspension point and its answer;
//! - [`replay()`] drives it synchronously from a recorded trace alone and
//!   reports any structural divergence as data.
//!
//! Because the trace of a drive is plain structured data, a computation can
//! be recorded once against the real world and then re-verified forever in
//! tests, without touching any real I/O.
//!
//! ```no_run
//! use anyhow::Result;
//! use async_trait::async_trait;
//! use reprise::{commit, effect, record, replay, run, EffectHandler, Flow, MemoryStore};
//! use serde_json::Value;
//!
//! #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
//! enum Fetch {
//!     Url(String),
//! }
//!
//! struct Client;
//!
//! #[async_trait]
//! impl EffectHandler<Fetch> for Client {
//!     async fn effect(&self, effect: Fetch) -> Result<Value> {
//!         let Fetch::Url(url) = effect;
//!         Ok(Value::from(format!("body of {url}")))
//!     }
//! }
//!
//! fn greet() -> Flow<Fetch, String, (), ()> {
//!     effect(Fetch::Url("http://example".into()))
//!         .and_then(|body| commit(format!("got: {body}")))
//! }
//!
//! # async fn demo() -> Result<()> {
//! let store = MemoryStore::new((), |_state, _commit: String| ());
//! let recording = run(&Client, &store, record(greet())).await?;
//! // Later, in a test: no client, no store, just the trace.
//! assert_eq!(replay(greet(), &recording.trace), recording.trace);
//! # Ok(())
//! # }
//! ```

pub mod flow;
pub mod handler;
pub mod record;
pub mod replay;
pub mod run;
pub mod trace;

pub use flow::{all, all2, all3, commit, effect, lift, lift_opt, select, state, Flow};
pub use handler::{EffectHandler, MemoryStore, Store};
pub use record::{record, Recording};
pub use replay::replay;
pub use run::run;
pub use trace::tape::{read_trace, write_trace, TapeError, TRACE_TAPE_SCHEMA_VERSION};
pub use trace::{StepKind, Trace, TraceItem};
