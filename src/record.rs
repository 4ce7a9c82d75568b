//! The recorder: wraps a flow so that driving it also builds a trace.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::flow::{Flow, Step};
use crate::trace::{effect_result, return_item, Trace, TraceItem};

/// The outcome of driving a recorded flow: the wrapped flow's result plus the
/// trace of every suspension point it passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording<E, C, S, A> {
    pub result: A,
    pub trace: Trace<E, C, S>,
}

/// Wrap `flow` so that it performs exactly the same suspension sequence and
/// additionally accumulates a [`Trace`].
///
/// The wrapper is itself a flow, so it is driven by the live runner like any
/// other, or nested inside a larger composition. Parallel branches are
/// recorded recursively, one sub-trace per branch, bundled into a single
/// `All` item at the position the group occupied. A trailing `Return` item
/// is appended only when the final result is not the unit/empty value.
pub fn record<E, C, S, A>(flow: Flow<E, C, S, A>) -> Flow<E, C, S, Recording<E, C, S, A>>
where
    E: Clone + Send + 'static,
    C: Clone + Send + 'static,
    S: Clone + Send + 'static,
    A: Serialize + Send + 'static,
{
    record_inner(flow).map_result(|(result, trace)| Recording { result, trace })
}

fn record_inner<E, C, S, A>(flow: Flow<E, C, S, A>) -> Flow<E, C, S, (A, Trace<E, C, S>)>
where
    E: Clone + Send + 'static,
    C: Clone + Send + 'static,
    S: Clone + Send + 'static,
    A: Serialize + Send + 'static,
{
    match flow.step {
        Step::Done(result) => {
            let trace = return_item(&result).into_iter().collect();
            Flow::done((result, trace))
        }
        Step::Effect { effect, resume } => {
            let recorded = effect.clone();
            Flow {
                step: Step::Effect {
                    effect,
                    resume: Box::new(move |answer| {
                        let item = TraceItem::Effect {
                            effect: recorded,
                            result: effect_result(&answer),
                        };
                        prepend(item, record_inner(resume(answer)))
                    }),
                },
            }
        }
        Step::Commit { commit, resume } => {
            let recorded = commit.clone();
            Flow {
                step: Step::Commit {
                    commit,
                    resume: Box::new(move |()| {
                        let item = TraceItem::Commit { commit: recorded };
                        prepend(item, record_inner(resume(())))
                    }),
                },
            }
        }
        Step::State { resume } => Flow {
            step: Step::State {
                resume: Box::new(move |state: S| {
                    let item = TraceItem::State {
                        state: state.clone(),
                    };
                    prepend(item, record_inner(resume(state)))
                }),
            },
        },
        Step::All { flows, resume } => {
            // Each branch records into its own slot; the slots are read back
            // once the whole group has joined, which every interpreter
            // guarantees happens before the parent resumes.
            let slots: Vec<Arc<Mutex<Trace<E, C, S>>>> = flows
                .iter()
                .map(|_| Arc::new(Mutex::new(Vec::new())))
                .collect();
            let recorded: Vec<Flow<E, C, S, Value>> = flows
                .into_iter()
                .zip(slots.iter().cloned())
                .map(|(branch, slot)| {
                    record_inner(branch).map_result(move |(result, trace)| {
                        *slot.lock() = trace;
                        result
                    })
                })
                .collect();
            Flow {
                step: Step::All {
                    flows: recorded,
                    resume: Box::new(move |answers| {
                        let branches = slots
                            .iter()
                            .map(|slot| std::mem::take(&mut *slot.lock()))
                            .collect();
                        let item = TraceItem::All { branches };
                        prepend(item, record_inner(resume(answers)))
                    }),
                },
            }
        }
    }
}

fn prepend<E, C, S, A>(
    item: TraceItem<E, C, S>,
    rest: Flow<E, C, S, (A, Trace<E, C, S>)>,
) -> Flow<E, C, S, (A, Trace<E, C, S>)>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    A: Send + 'static,
{
    rest.map_result(move |(result, mut trace)| {
        trace.insert(0, item);
        (result, trace)
    })
}
