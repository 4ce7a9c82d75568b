//! The suspendable computation type and its effect vocabulary.
//!
//! A [`Flow`] describes side effects as data instead of performing them. It
//! suspends at exactly four kinds of points — perform an effect, read the
//! aggregate state, request a commit, fork a parallel group — and an
//! interpreter ([`run()`](crate::run()), [`record()`](crate::record()),
//! [`replay()`](crate::replay())) decides what each suspension actually means.

pub mod lift;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::trace::StepKind;

pub use lift::{lift, lift_opt};

pub(crate) type Resume<In, E, C, S, A> = Box<dyn FnOnce(In) -> Flow<E, C, S, A> + Send>;

/// One step of a suspended computation: either finished, or paused at a
/// single suspension point waiting for exactly one resumption value.
pub(crate) enum Step<E, C, S, A> {
    Done(A),
    Effect {
        effect: E,
        resume: Resume<Value, E, C, S, A>,
    },
    Commit {
        commit: C,
        resume: Resume<(), E, C, S, A>,
    },
    State {
        resume: Resume<S, E, C, S, A>,
    },
    All {
        flows: Vec<Flow<E, C, S, Value>>,
        resume: Resume<Vec<Value>, E, C, S, A>,
    },
}

impl<E, C, S, A> Step<E, C, S, A> {
    pub(crate) fn kind(&self) -> StepKind {
        match self {
            Step::Done(_) => StepKind::Return,
            Step::Effect { .. } => StepKind::Effect,
            Step::Commit { .. } => StepKind::Commit,
            Step::State { .. } => StepKind::State,
            Step::All { .. } => StepKind::All,
        }
    }
}

/// A suspendable computation over effect descriptions `E`, commit
/// descriptions `C` and aggregate state `S`, producing an `A`.
///
/// Flows are inert values. Driving one consumes it, so a completed flow can
/// never be stepped again — re-running means rebuilding the flow from its
/// controller function.
pub struct Flow<E, C, S, A> {
    pub(crate) step: Step<E, C, S, A>,
}

impl<E, C, S, A> Flow<E, C, S, A>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    A: Send + 'static,
{
    /// A flow that suspends nowhere and immediately produces `result`.
    pub fn done(result: A) -> Self {
        Flow {
            step: Step::Done(result),
        }
    }

    /// Sequential composition: run `self`, then feed its result to `next`.
    ///
    /// Composition itself never suspends; only the four primitive
    /// constructors do.
    pub fn and_then<B, F>(self, next: F) -> Flow<E, C, S, B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> Flow<E, C, S, B> + Send + 'static,
    {
        match self.step {
            Step::Done(result) => next(result),
            Step::Effect { effect, resume } => Flow {
                step: Step::Effect {
                    effect,
                    resume: Box::new(move |answer| resume(answer).and_then(next)),
                },
            },
            Step::Commit { commit, resume } => Flow {
                step: Step::Commit {
                    commit,
                    resume: Box::new(move |()| resume(()).and_then(next)),
                },
            },
            Step::State { resume } => Flow {
                step: Step::State {
                    resume: Box::new(move |state| resume(state).and_then(next)),
                },
            },
            Step::All { flows, resume } => Flow {
                step: Step::All {
                    flows,
                    resume: Box::new(move |answers| resume(answers).and_then(next)),
                },
            },
        }
    }

    /// Map the final result without adding a suspension point.
    pub fn map_result<B, F>(self, f: F) -> Flow<E, C, S, B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.and_then(|result| Flow::done(f(result)))
    }
}

/// Suspend once with an effect description; the interpreter's answer becomes
/// the result.
///
/// Answers travel as [`serde_json::Value`] — the effect handler and the
/// controller agree on the shape by convention, the core does not check it.
pub fn effect<E, C, S>(effect: E) -> Flow<E, C, S, Value>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
{
    Flow {
        step: Step::Effect {
            effect,
            resume: Box::new(Flow::done),
        },
    }
}

/// Suspend once with a commit description. Fire-and-forget: the flow resumes
/// with no payload once the mutation has been applied.
pub fn commit<E, C, S>(commit: C) -> Flow<E, C, S, ()>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
{
    Flow {
        step: Step::Commit {
            commit,
            resume: Box::new(Flow::done),
        },
    }
}

/// Suspend once and resume with the current aggregate state.
pub fn state<E, C, S>() -> Flow<E, C, S, S>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
{
    Flow {
        step: Step::State {
            resume: Box::new(Flow::done),
        },
    }
}

/// Read the current state through a selector.
///
/// The selector runs after resumption, so the suspension point (and anything
/// recorded for it) always carries the full aggregate state.
pub fn select<E, C, S, T, F>(selector: F) -> Flow<E, C, S, T>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    T: Send + 'static,
    F: FnOnce(S) -> T + Send + 'static,
{
    state().map_result(selector)
}

/// Fork an ordered group of sub-flows to be driven concurrently.
///
/// Resumes with the results in submission order, regardless of the order in
/// which branches finish. Branch results cross the suspension point as
/// [`Value`]s, which is what allows the recorder to keep them in sub-traces.
pub fn all<E, C, S, T>(flows: Vec<Flow<E, C, S, T>>) -> Flow<E, C, S, Vec<T>>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    T: Serialize + DeserializeOwned + Send + 'static,
{
    let flows = flows
        .into_iter()
        .map(|flow| flow.map_result(into_answer))
        .collect();
    Flow {
        step: Step::All {
            flows,
            resume: Box::new(|answers| {
                Flow::done(answers.into_iter().map(from_answer).collect())
            }),
        },
    }
}

/// Two-branch [`all`] with independently typed results.
pub fn all2<E, C, S, T1, T2>(
    first: Flow<E, C, S, T1>,
    second: Flow<E, C, S, T2>,
) -> Flow<E, C, S, (T1, T2)>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    T1: Serialize + DeserializeOwned + Send + 'static,
    T2: Serialize + DeserializeOwned + Send + 'static,
{
    let flows = vec![
        first.map_result(into_answer),
        second.map_result(into_answer),
    ];
    Flow {
        step: Step::All {
            flows,
            resume: Box::new(|mut answers| {
                let second = answers.pop().unwrap_or(Value::Null);
                let first = answers.pop().unwrap_or(Value::Null);
                Flow::done((from_answer(first), from_answer(second)))
            }),
        },
    }
}

/// Three-branch [`all`] with independently typed results.
pub fn all3<E, C, S, T1, T2, T3>(
    first: Flow<E, C, S, T1>,
    second: Flow<E, C, S, T2>,
    third: Flow<E, C, S, T3>,
) -> Flow<E, C, S, (T1, T2, T3)>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    T1: Serialize + DeserializeOwned + Send + 'static,
    T2: Serialize + DeserializeOwned + Send + 'static,
    T3: Serialize + DeserializeOwned + Send + 'static,
{
    let flows = vec![
        first.map_result(into_answer),
        second.map_result(into_answer),
        third.map_result(into_answer),
    ];
    Flow {
        step: Step::All {
            flows,
            resume: Box::new(|mut answers| {
                let third = answers.pop().unwrap_or(Value::Null);
                let second = answers.pop().unwrap_or(Value::Null);
                let first = answers.pop().unwrap_or(Value::Null);
                Flow::done((from_answer(first), from_answer(second), from_answer(third)))
            }),
        },
    }
}

fn into_answer<T: Serialize>(result: T) -> Value {
    serde_json::to_value(result).unwrap_or(Value::Null)
}

/// Panics when a recorded or handler-supplied answer does not match the
/// branch's declared result type. That is a controller/handler contract
/// violation, not a runtime condition the core can recover from.
fn from_answer<T: DeserializeOwned>(answer: Value) -> T {
    match serde_json::from_value(answer) {
        Ok(result) => result,
        Err(err) => panic!("parallel branch answer does not match its declared result type: {err}"),
    }
}
