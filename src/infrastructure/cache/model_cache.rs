//! Process-wide holder of the serving model

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwapOption;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tracing::{error, info};

use super::ModelSource;
use crate::domain::{LoadedModel, ModelError, ModelUnavailable};
use crate::infrastructure::observability::{record_cache_phase, record_model_load};

type LoadOutcome = Result<Arc<LoadedModel>, Arc<ModelError>>;
type SharedLoad = Shared<BoxFuture<'static, LoadOutcome>>;

enum CacheState {
    Empty,
    Loading(SharedLoad),
    Ready(Arc<LoadedModel>),
    Failed(Arc<ModelError>),
}

impl CacheState {
    fn phase(&self) -> CachePhase {
        match self {
            Self::Empty => CachePhase::Empty,
            Self::Loading(_) => CachePhase::Loading,
            Self::Ready(_) => CachePhase::Ready,
            Self::Failed(_) => CachePhase::Failed,
        }
    }
}

/// Lifecycle stage of the cached model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePhase {
    Empty,
    Loading,
    Ready,
    Failed,
}

impl CachePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// Point-in-time view of the cache
#[derive(Debug, Clone)]
pub struct CacheStatus {
    pub phase: CachePhase,
    pub model: Option<Arc<LoadedModel>>,
    pub error: Option<Arc<ModelError>>,
}

struct CacheInner {
    source: ModelSource,
    state: Mutex<CacheState>,
    /// Mirrors `CacheState::Ready` for the lock-free read path
    ready: ArcSwapOption<LoadedModel>,
}

impl CacheInner {
    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_load(&self) -> LoadOutcome {
        let start = Instant::now();
        info!(
            location = %self.source.location(),
            store = self.source.store_name(),
            "Loading model"
        );

        let outcome = AssertUnwindSafe(self.source.load())
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(ModelError::load_aborted("model load panicked")))
            .map(Arc::new)
            .map_err(Arc::new);

        let elapsed = start.elapsed();
        let mut state = self.lock_state();

        match &outcome {
            Ok(model) => {
                info!(
                    model = %model.identity().name,
                    version = %model.identity().version,
                    features = model.schema().len(),
                    predictor = %model.predictor().describe(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Model ready"
                );
                self.ready.store(Some(Arc::clone(model)));
                *state = CacheState::Ready(Arc::clone(model));
            }
            Err(e) => {
                error!(
                    kind = e.kind(),
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Model load failed"
                );
                *state = CacheState::Failed(Arc::clone(e));
            }
        }

        record_model_load(outcome.is_ok(), elapsed);
        record_cache_phase(state.phase().as_str());

        outcome
    }
}

/// Lazily loads exactly one model and hands it out to concurrent callers.
///
/// At most one load is in flight; callers arriving while it runs await the
/// same outcome. The load runs on its own task, so a caller that goes away
/// never leaves the cache stuck in `Loading`. A failed load stays failed
/// until [`ModelCache::reload`] is called.
#[derive(Clone)]
pub struct ModelCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache")
            .field("location", self.inner.source.location())
            .field("phase", &self.phase())
            .finish()
    }
}

impl ModelCache {
    pub fn new(source: ModelSource) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                source,
                state: Mutex::new(CacheState::Empty),
                ready: ArcSwapOption::empty(),
            }),
        }
    }

    /// Get the serving model, loading it on first use
    pub async fn get_model(&self) -> Result<Arc<LoadedModel>, ModelUnavailable> {
        if let Some(model) = self.inner.ready.load_full() {
            return Ok(model);
        }

        let pending = {
            let mut state = self.inner.lock_state();
            let in_flight = match &*state {
                CacheState::Ready(model) => return Ok(Arc::clone(model)),
                CacheState::Failed(e) => return Err(ModelUnavailable::new(Arc::clone(e))),
                CacheState::Loading(load) => Some(load.clone()),
                CacheState::Empty => None,
            };
            in_flight.unwrap_or_else(|| self.begin_load(&mut state))
        };

        pending.await.map_err(ModelUnavailable::new)
    }

    /// Start a fresh load (or join the one in flight) and wait for it
    pub async fn reload(&self) -> Result<Arc<LoadedModel>, ModelUnavailable> {
        let pending = {
            let mut state = self.inner.lock_state();
            let in_flight = match &*state {
                CacheState::Loading(load) => Some(load.clone()),
                _ => None,
            };
            in_flight.unwrap_or_else(|| self.begin_load(&mut state))
        };

        pending.await.map_err(ModelUnavailable::new)
    }

    pub fn phase(&self) -> CachePhase {
        self.inner.lock_state().phase()
    }

    pub fn status(&self) -> CacheStatus {
        let state = self.inner.lock_state();
        let (model, error) = match &*state {
            CacheState::Ready(model) => (Some(Arc::clone(model)), None),
            CacheState::Failed(e) => (None, Some(Arc::clone(e))),
            CacheState::Empty | CacheState::Loading(_) => (None, None),
        };

        CacheStatus {
            phase: state.phase(),
            model,
            error,
        }
    }

    /// Transition to `Loading`; the caller holds the state lock
    fn begin_load(&self, state: &mut CacheState) -> SharedLoad {
        self.inner.ready.store(None);

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.run_load().await });

        let load = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(Arc::new(ModelError::load_aborted(e.to_string()))))
        }
        .boxed()
        .shared();

        *state = CacheState::Loading(load.clone());
        record_cache_phase(CachePhase::Loading.as_str());

        load
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::artifact::mock::MockArtifactStore;
    use crate::domain::{ArtifactError, ArtifactLocation};
    use crate::infrastructure::model::JsonModelDeserializer;
    use crate::infrastructure::model::fixtures::sum_model_json;

    fn location() -> ArtifactLocation {
        ArtifactLocation::new("risk-appetite-classifier", "model.json")
    }

    fn cache_over(store: Arc<MockArtifactStore>) -> ModelCache {
        ModelCache::new(ModelSource::new(
            store,
            Arc::new(JsonModelDeserializer::new()),
            location(),
        ))
    }

    fn sum_store() -> MockArtifactStore {
        MockArtifactStore::new().with_object(location(), sum_model_json(&["a", "b"]))
    }

    #[tokio::test]
    async fn test_lazy_load_on_first_request() {
        let store = Arc::new(sum_store());
        let cache = cache_over(store.clone());

        assert_eq!(cache.phase(), CachePhase::Empty);
        assert_eq!(store.fetch_count(), 0);

        let model = cache.get_model().await.unwrap();
        assert_eq!(model.schema().ordered_feature_names(), vec!["a", "b"]);
        assert_eq!(cache.phase(), CachePhase::Ready);

        let again = cache.get_model().await.unwrap();
        assert!(Arc::ptr_eq(&model, &again));
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_fetch_once() {
        let store = Arc::new(sum_store().with_delay(Duration::from_millis(50)));
        let cache = cache_over(store.clone());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_model().await })
            })
            .collect();

        let models: Vec<Arc<LoadedModel>> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(store.fetch_count(), 1);
        assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_waiters_share_failure() {
        let store = Arc::new(
            MockArtifactStore::new()
                .with_delay(Duration::from_millis(30))
                .with_failure(ArtifactError::store_unavailable("connection refused")),
        );
        let cache = cache_over(store.clone());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_model().await })
            })
            .collect();

        let errors: Vec<ModelUnavailable> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap_err())
            .collect();

        assert_eq!(store.fetch_count(), 1);
        assert!(errors.iter().all(|e| Arc::ptr_eq(&e.cause, &errors[0].cause)));
    }

    #[tokio::test]
    async fn test_failed_state_is_sticky_until_reload() {
        let store = Arc::new(
            sum_store().with_failure(ArtifactError::transfer(location(), "connection reset")),
        );
        let cache = cache_over(store.clone());

        let err = cache.get_model().await.unwrap_err();
        assert_eq!(err.cause.kind(), "artifact_transfer_error");
        assert_eq!(cache.phase(), CachePhase::Failed);

        // no automatic retry
        assert!(cache.get_model().await.is_err());
        assert_eq!(store.fetch_count(), 1);

        store.fail_with(None);
        let model = cache.reload().await.unwrap();
        assert_eq!(model.identity().name, "sum");
        assert_eq!(cache.phase(), CachePhase::Ready);

        assert!(cache.get_model().await.is_ok());
        assert_eq!(store.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_reported() {
        let store = Arc::new(MockArtifactStore::new());
        let cache = cache_over(store);

        let err = cache.get_model().await.unwrap_err();
        assert!(err.is_artifact_not_found());
    }

    #[tokio::test]
    async fn test_deserialize_failure_distinct_from_transfer() {
        let store = Arc::new(MockArtifactStore::new().with_object(location(), "not a model"));
        let cache = cache_over(store);

        let err = cache.get_model().await.unwrap_err();
        assert!(matches!(err.cause.as_ref(), ModelError::Deserialize { .. }));

        let status = cache.status();
        assert_eq!(status.phase, CachePhase::Failed);
        assert!(status.error.is_some());
        assert!(status.model.is_none());
    }

    #[tokio::test]
    async fn test_stalled_fetch_times_out() {
        let store = Arc::new(sum_store().with_delay(Duration::from_millis(500)));
        let cache = ModelCache::new(
            ModelSource::new(store, Arc::new(JsonModelDeserializer::new()), location())
                .with_fetch_timeout(Duration::from_millis(20)),
        );

        let err = cache.get_model().await.unwrap_err();
        assert!(matches!(
            err.cause.as_ref(),
            ModelError::Artifact(ArtifactError::Transfer { .. })
        ));
        assert_eq!(cache.phase(), CachePhase::Failed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reload_joins_inflight_load() {
        let store = Arc::new(sum_store().with_delay(Duration::from_millis(100)));
        let cache = cache_over(store.clone());

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_model().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.phase(), CachePhase::Loading);

        let reloaded = cache.reload().await.unwrap();
        let first = first.await.unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &reloaded));
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_reload_replaces_ready_model() {
        let store = Arc::new(sum_store());
        let cache = cache_over(store.clone());

        let original = cache.get_model().await.unwrap();
        store.put(location(), sum_model_json(&["a", "b", "c"]));

        let reloaded = cache.reload().await.unwrap();
        assert!(!Arc::ptr_eq(&original, &reloaded));
        assert_eq!(reloaded.schema().len(), 3);
        assert_ne!(original.identity().version, reloaded.identity().version);

        let current = cache.get_model().await.unwrap();
        assert!(Arc::ptr_eq(&current, &reloaded));
    }

    #[tokio::test]
    async fn test_cancelled_caller_does_not_strand_loading() {
        let store = Arc::new(sum_store().with_delay(Duration::from_millis(50)));
        let cache = cache_over(store.clone());

        let waiter = tokio::time::timeout(Duration::from_millis(5), cache.get_model()).await;
        assert!(waiter.is_err());

        let model = cache.get_model().await.unwrap();
        assert_eq!(model.schema().len(), 2);
        assert_eq!(store.fetch_count(), 1);
    }
}
