//! Debounced, chunked and cancellable search.
//!
//! A [`SearchSession`] owns the last query/result pair and the handle of
//! the search in flight. Starting a search cancels the previous one, so only
//! the newest query ever surfaces results. Cancellation is observed during
//! the debounce wait, between chunks, and before the cache is written.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::{
    item::SearchableItem,
    rank,
    search::{Engine, ScoredResult},
};

#[derive(Default)]
struct State {
    generation: u64,
    in_flight: Option<CancellationToken>,
    last: Option<(String, Arc<[ScoredResult]>)>,
}

/// An independent search context with its own cache and cancellation.
pub struct SearchSession {
    engine: Arc<Engine>,
    state: Mutex<State>,
}

/// Clears the in-flight handle when its search ends, unless a newer search
/// has already replaced it.
struct InFlight<'a> {
    session: &'a SearchSession,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.session.state();
        if state.generation == self.generation {
            state.in_flight = None;
        }
    }
}

impl SearchSession {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            state: Mutex::new(State::default()),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Search `items` for `query`.
    ///
    /// Resolves to an empty list when the search is superseded by a newer
    /// call, cancelled through `signal`, or cancelled with
    /// [`cancel`](Self::cancel). Cancelled searches never touch the cache.
    pub async fn search(
        &self,
        query: &str,
        items: &[SearchableItem],
        signal: Option<&CancellationToken>,
    ) -> Arc<[ScoredResult]> {
        self.try_search(query, items, signal)
            .await
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Like [`search`](Self::search), but returns `None` when the search
    /// was cancelled or superseded, so callers can tell that apart from a
    /// completed search with no results.
    pub async fn try_search(
        &self,
        query: &str,
        items: &[SearchableItem],
        signal: Option<&CancellationToken>,
    ) -> Option<Arc<[ScoredResult]>> {
        let token = CancellationToken::new();
        let generation = {
            let mut state = self.state();
            if let Some(previous) = state.in_flight.replace(token.clone()) {
                previous.cancel();
            }
            state.generation += 1;
            state.generation
        };
        let _in_flight = InFlight {
            session: self,
            generation,
        };
        let executor = &self.engine.config().executor;
        let is_cancelled =
            || token.is_cancelled() || signal.is_some_and(|s| s.is_cancelled());

        if is_cancelled() {
            return None;
        }

        tokio::select! {
            _ = tokio::time::sleep(executor.debounce()) => {}
            _ = token.cancelled() => return None,
            _ = cancelled(signal) => return None,
        }
        if is_cancelled() {
            return None;
        }

        if let Some((last_query, results)) = &self.state().last
            && last_query == query
        {
            tracing::debug!(query, "cache hit");
            return Some(results.clone());
        }

        let plan = self.engine.plan(query);
        let chunk_size = executor.effective_chunk_size();
        let chunk_count = items.len().div_ceil(chunk_size);
        let mut results = Vec::new();

        for (i, chunk) in items.chunks(chunk_size).enumerate() {
            if is_cancelled() {
                return None;
            }
            self.engine.score_chunk(&plan, chunk, &mut results);
            tracing::debug!(
                chunk = i + 1,
                of = chunk_count,
                matched = results.len(),
                "processed chunk"
            );

            if i + 1 < chunk_count {
                tokio::select! {
                    _ = pause(executor.yield_interval()) => {}
                    _ = token.cancelled() => return None,
                    _ = cancelled(signal) => return None,
                }
            }
        }

        let ranked: Arc<[ScoredResult]> =
            rank::apply_intent(results, &plan.intent).into();

        let mut state = self.state();
        if is_cancelled() {
            return None;
        }
        state.last = Some((query.to_string(), ranked.clone()));
        Some(ranked)
    }

    /// Cancel any pending or running search and drop the cache.
    pub fn cancel(&self) {
        let mut state = self.state();
        if let Some(token) = state.in_flight.take() {
            token.cancel();
        }
        state.last = None;
    }

    pub fn is_searching(&self) -> bool {
        self.state().in_flight.is_some()
    }

    pub fn semantic_enabled(&self) -> bool {
        self.engine.semantic_enabled()
    }

    pub fn clear_cache(&self) {
        self.state().last = None;
    }

    /// The query whose results are currently cached.
    pub fn cached_query(&self) -> Option<String> {
        self.state().last.as_ref().map(|(q, _)| q.clone())
    }
}

async fn cancelled(signal: Option<&CancellationToken>) {
    match signal {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn pause(interval: std::time::Duration) {
    if interval.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(interval).await;
    }
}
