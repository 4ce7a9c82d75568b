//! The recorded-trace data model.
//!
//! A trace is the ordered record of one complete drive: one item per
//! suspension point, in the temporal order suspension occurred, each carrying
//! the answer that resolved it. Traces are plain structured data so they can
//! be persisted as test fixtures (see [`tape`]).

pub mod tape;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of a suspension point or trace item, used to describe replay
/// divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Effect,
    Commit,
    State,
    All,
    Return,
    Diverged,
    /// The end of a trace — used when a trace runs out while the flow is
    /// still suspended.
    End,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepKind::Effect => "effect",
            StepKind::Commit => "commit",
            StepKind::State => "state",
            StepKind::All => "all",
            StepKind::Return => "return",
            StepKind::Diverged => "diverged",
            StepKind::End => "end",
        };
        write!(f, "{name}")
    }
}

/// One recorded suspension point and its resolved answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceItem<E, C, S> {
    /// An effect and the answer its handler produced. `None` when the answer
    /// was null.
    Effect {
        effect: E,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
    },
    /// A commit that was applied to the store.
    Commit { commit: C },
    /// A state read and the aggregate state it observed.
    State { state: S },
    /// A parallel group: one sub-trace per branch, in submission order.
    All { branches: Vec<Trace<E, C, S>> },
    /// The flow's final result. Omitted entirely for unit results.
    Return { result: Value },
    /// Replay divergence marker: the trace expected one kind of step, the
    /// flow asked for another. Never produced by the recorder.
    Diverged { expected: StepKind, actual: StepKind },
}

/// An ordered record of one complete drive.
pub type Trace<E, C, S> = Vec<TraceItem<E, C, S>>;

impl<E, C, S> TraceItem<E, C, S> {
    pub fn kind(&self) -> StepKind {
        match self {
            TraceItem::Effect { .. } => StepKind::Effect,
            TraceItem::Commit { .. } => StepKind::Commit,
            TraceItem::State { .. } => StepKind::State,
            TraceItem::All { .. } => StepKind::All,
            TraceItem::Return { .. } => StepKind::Return,
            TraceItem::Diverged { .. } => StepKind::Diverged,
        }
    }
}

/// The trailing `Return` item for a finished flow, or `None` when the result
/// is the unit/empty value. Results that cannot be represented as JSON are
/// treated as empty.
pub(crate) fn return_item<E, C, S, A: Serialize>(result: &A) -> Option<TraceItem<E, C, S>> {
    let value = serde_json::to_value(result).unwrap_or(Value::Null);
    if value.is_null() {
        None
    } else {
        Some(TraceItem::Return { result: value })
    }
}

/// `None` for null answers, mirroring how trivial effect results are omitted
/// from recorded items.
pub(crate) fn effect_result(answer: &Value) -> Option<Value> {
    if answer.is_null() {
        None
    } else {
        Some(answer.clone())
    }
}
