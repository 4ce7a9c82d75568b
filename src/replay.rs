//! The replayer: drives a flow using a recorded trace as the only source of
//! answers, reporting structural divergence as data instead of failing.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::flow::{Flow, Step};
use crate::trace::{return_item, StepKind, Trace, TraceItem};

/// Replay `flow` against a previously recorded trace.
///
/// Synchronous and pure: no handlers are involved, every answer comes from
/// the trace. A faithful replay re-emits exactly the items it consumed, so
/// replaying a flow against its own fresh recording returns an equal trace.
///
/// On divergence the output ends with a single [`TraceItem::Diverged`] item
/// naming the expected (trace-side) and actual (flow-side) kinds, and the
/// walk stops there. A parallel group replays each branch against its
/// positionally matched sub-trace; if any branch diverges, the partial
/// collection of branch traces is surfaced and the parent stops at the group.
/// Items left over after the flow completes are ignored.
pub fn replay<E, C, S, A>(flow: Flow<E, C, S, A>, trace: &[TraceItem<E, C, S>]) -> Trace<E, C, S>
where
    E: Send + 'static,
    C: Send + 'static,
    S: Clone + Send + 'static,
    A: Serialize + Send + 'static,
{
    replay_inner(flow, trace).1
}

fn replay_inner<E, C, S, A>(
    flow: Flow<E, C, S, A>,
    items: &[TraceItem<E, C, S>],
) -> (Option<A>, Trace<E, C, S>)
where
    E: Send + 'static,
    C: Send + 'static,
    S: Clone + Send + 'static,
    A: Serialize + Send + 'static,
{
    let mut output = Vec::new();
    let mut remaining = items;
    let mut current = flow;

    loop {
        let step = match current.step {
            Step::Done(result) => {
                output.extend(return_item(&result));
                return (Some(result), output);
            }
            step => step,
        };

        let Some((item, rest)) = remaining.split_first() else {
            let actual = step.kind();
            warn!(%actual, "trace ended while the flow was still suspended");
            output.push(TraceItem::Diverged {
                expected: StepKind::End,
                actual,
            });
            return (None, output);
        };
        remaining = rest;

        current = match (step, item) {
            (Step::Effect { effect, resume }, TraceItem::Effect { result, .. }) => {
                output.push(TraceItem::Effect {
                    effect,
                    result: result.clone(),
                });
                resume(result.clone().unwrap_or(Value::Null))
            }
            (Step::Commit { commit, resume }, TraceItem::Commit { .. }) => {
                output.push(TraceItem::Commit { commit });
                resume(())
            }
            (Step::State { resume }, TraceItem::State { state }) => {
                output.push(TraceItem::State {
                    state: state.clone(),
                });
                resume(state.clone())
            }
            (Step::All { flows, resume }, TraceItem::All { branches }) => {
                let mut answers = Some(Vec::with_capacity(flows.len()));
                let mut replayed = Vec::new();
                for (index, branch) in flows.into_iter().enumerate() {
                    match branches.get(index) {
                        Some(recorded) => {
                            let (answer, sub_trace) = replay_inner(branch, recorded);
                            replayed.push(sub_trace);
                            match answer {
                                Some(value) => {
                                    if let Some(collected) = answers.as_mut() {
                                        collected.push(value);
                                    }
                                }
                                None => answers = None,
                            }
                        }
                        // A branch with no recorded counterpart cannot be
                        // driven at all; its slot is simply absent.
                        None => answers = None,
                    }
                }
                output.push(TraceItem::All { branches: replayed });
                match answers {
                    Some(answers) => resume(answers),
                    None => {
                        warn!("parallel group diverged during replay");
                        return (None, output);
                    }
                }
            }
            (step, item) => {
                let expected = item.kind();
                let actual = step.kind();
                warn!(%expected, %actual, "replay diverged");
                output.push(TraceItem::Diverged { expected, actual });
                return (None, output);
            }
        };
    }
}
