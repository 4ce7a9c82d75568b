//! The live runner: drives a flow to completion against real handlers.

use anyhow::Result;
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use tracing::trace;

use crate::flow::{Flow, Step};
use crate::handler::{EffectHandler, Store};

/// Drive `flow` to completion, one suspension point at a time.
///
/// Effects go to `handler`, commits and state reads go to `store`. Parallel
/// groups fan out: every branch's pending work is started before any one is
/// awaited, and the group resumes with results in submission order once all
/// branches finish. The first handler error aborts the whole drive; sibling
/// branches in flight are dropped at their next await point.
pub async fn run<H, St, E, C, S, A>(handler: &H, store: &St, flow: Flow<E, C, S, A>) -> Result<A>
where
    H: EffectHandler<E>,
    St: Store<C, S>,
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    A: Send + 'static,
{
    drive(handler, store, flow).await
}

fn drive<'a, H, St, E, C, S, A>(
    handler: &'a H,
    store: &'a St,
    flow: Flow<E, C, S, A>,
) -> BoxFuture<'a, Result<A>>
where
    H: EffectHandler<E>,
    St: Store<C, S>,
    E: Send + 'static,
    C: Send + 'static,
    S: Send + 'static,
    A: Send + 'static,
{
    async move {
        let mut current = flow;
        loop {
            match current.step {
                Step::Done(result) => return Ok(result),
                Step::Effect { effect, resume } => {
                    trace!("performing effect");
                    let answer = handler.effect(effect).await?;
                    current = resume(answer);
                }
                Step::Commit { commit, resume } => {
                    trace!("applying commit");
                    store.commit(commit).await?;
                    current = resume(());
                }
                Step::State { resume } => {
                    trace!("reading state");
                    current = resume(store.state());
                }
                Step::All { flows, resume } => {
                    let branches = flows.len();
                    trace!(branches, "forking parallel group");
                    let answers = try_join_all(
                        flows
                            .into_iter()
                            .map(|branch| drive(handler, store, branch)),
                    )
                    .await?;
                    trace!(branches, "joined parallel group");
                    current = resume(answers);
                }
            }
        }
    }
    .boxed()
}
