//! Lifting a flow into a differently-typed parent composition.

use crate::flow::{Flow, Step};

/// Re-type a flow so it can be composed into a parent with wider commit and
/// state types.
///
/// Every `Commit` payload is rewritten through `lift_commit` and every
/// `State` read projects the parent state down through `extract_state`.
/// Effect points and parallel groups pass through structurally unchanged
/// (each branch lifted recursively), so the number and order of suspension
/// points is preserved.
pub fn lift<E, C1, S1, C2, S2, A, FC, FS>(
    flow: Flow<E, C1, S1, A>,
    lift_commit: FC,
    extract_state: FS,
) -> Flow<E, C2, S2, A>
where
    E: Send + 'static,
    C1: Send + 'static,
    C2: Send + 'static,
    S1: Send + 'static,
    S2: Send + 'static,
    A: Send + 'static,
    FC: Fn(C1) -> C2 + Clone + Send + 'static,
    FS: Fn(S2) -> S1 + Clone + Send + 'static,
{
    match flow.step {
        Step::Done(result) => Flow::done(result),
        Step::Effect { effect, resume } => Flow {
            step: Step::Effect {
                effect,
                resume: Box::new(move |answer| {
                    lift(resume(answer), lift_commit, extract_state)
                }),
            },
        },
        Step::Commit { commit, resume } => {
            let lifted = lift_commit(commit);
            Flow {
                step: Step::Commit {
                    commit: lifted,
                    resume: Box::new(move |()| lift(resume(()), lift_commit, extract_state)),
                },
            }
        }
        Step::State { resume } => Flow {
            step: Step::State {
                resume: Box::new(move |outer| {
                    let inner = extract_state(outer);
                    lift(resume(inner), lift_commit, extract_state)
                }),
            },
        },
        Step::All { flows, resume } => {
            let lifted = flows
                .into_iter()
                .map(|branch| lift(branch, lift_commit.clone(), extract_state.clone()))
                .collect();
            Flow {
                step: Step::All {
                    flows: lifted,
                    resume: Box::new(move |answers| {
                        lift(resume(answers), lift_commit, extract_state)
                    }),
                },
            }
        }
    }
}

/// [`lift`] over an optional flow: absence short-circuits to absence instead
/// of being an error.
pub fn lift_opt<E, C1, S1, C2, S2, A, FC, FS>(
    flow: Option<Flow<E, C1, S1, A>>,
    lift_commit: FC,
    extract_state: FS,
) -> Option<Flow<E, C2, S2, A>>
where
    E: Send + 'static,
    C1: Send + 'static,
    C2: Send + 'static,
    S1: Send + 'static,
    S2: Send + 'static,
    A: Send + 'static,
    FC: Fn(C1) -> C2 + Clone + Send + 'static,
    FS: Fn(S2) -> S1 + Clone + Send + 'static,
{
    flow.map(|flow| lift(flow, lift_commit, extract_state))
}
