//! The collaborator seams the live runner drives against: an effect handler
//! and a store (mutation sink + state reader).

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

/// Executes effect descriptions against the real world.
///
/// The answer shape is a convention between the handler and the controllers
/// that emitted the effect; the core passes it through untouched. Errors
/// abort the whole drive — resilience (retry, backoff, fallback) belongs in
/// the handler, not the core.
#[async_trait]
pub trait EffectHandler<E>: Send + Sync {
    async fn effect(&self, effect: E) -> Result<Value>;
}

/// The external state container: applies commits and exposes state snapshots.
///
/// The core imposes no locking; the store is expected to serialize its own
/// mutations. `state` returns the state at call time, which may already
/// reflect commits applied earlier in the same drive.
#[async_trait]
pub trait Store<C, S>: Send + Sync {
    async fn commit(&self, commit: C) -> Result<()>;

    fn state(&self) -> S;
}

/// Reducer-backed in-memory store.
///
/// The reference `Store` implementation, and the one the crate's own tests
/// drive against.
pub struct MemoryStore<C, S> {
    state: Mutex<S>,
    reduce: Box<dyn Fn(&S, C) -> S + Send + Sync>,
}

impl<C, S> MemoryStore<C, S> {
    pub fn new<F>(initial: S, reduce: F) -> Self
    where
        F: Fn(&S, C) -> S + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(initial),
            reduce: Box::new(reduce),
        }
    }
}

#[async_trait]
impl<C, S> Store<C, S> for MemoryStore<C, S>
where
    C: Send + 'static,
    S: Clone + Send + 'static,
{
    async fn commit(&self, commit: C) -> Result<()> {
        let mut state = self.state.lock();
        let next = (self.reduce)(&state, commit);
        *state = next;
        Ok(())
    }

    fn state(&self) -> S {
        self.state.lock().clone()
    }
}
