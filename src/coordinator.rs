// Stale-while-revalidate coordinator.
// Decides cache-hit vs refetch, runs the fetch/persist lifecycle, and drives
// periodic revalidation on a timer.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::{Result, SwrError};
use crate::options::{SwrOptions, SwrOptionsPatch};
use crate::state::{FetchState, StateCell};
use crate::store::{CacheEntry, CacheStore};

type BoxFetcher<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Coordinator for a single cache key.
///
/// Serves the cached value while it is fresh, refetches when it is stale or
/// absent, persists successful fetches, and optionally revalidates on a
/// repeating timer. State changes are published through a watch channel;
/// failures never escape the coordinator, they only show up in
/// [`FetchState::error`].
pub struct Swr<T> {
    inner: Arc<Inner<T>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

struct Inner<T> {
    key: String,
    fetcher: BoxFetcher<T>,
    store: Arc<dyn CacheStore<T>>,
    options: Mutex<SwrOptions>,
    state: StateCell<T>,
    in_flight: AtomicBool,
}

/// Clears the loading flag and releases the in-flight latch on every exit
/// path, including cancellation of a timer-driven fetch at teardown.
struct FetchGuard<'a, T> {
    inner: &'a Inner<T>,
}

impl<T> Drop for FetchGuard<'_, T> {
    fn drop(&mut self) {
        self.inner.state.set_loading(false);
        self.inner.in_flight.store(false, Ordering::Release);
    }
}

impl<T> Swr<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a coordinator for `key`.
    ///
    /// The fetcher is invoked whenever the cached entry is missing or stale;
    /// it must report failures through its `Result`, not by panicking.
    /// `patch` overrides the process-wide default options field by field.
    pub fn new<F, Fut>(
        key: impl Into<String>,
        fetcher: F,
        store: Arc<dyn CacheStore<T>>,
        patch: SwrOptionsPatch,
    ) -> Result<Self>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(SwrError::Other("cache key must not be empty".to_string()));
        }

        let options = SwrOptions::default().merged(patch);
        Ok(Self {
            inner: Arc::new(Inner {
                key,
                fetcher: Box::new(move || Box::pin(fetcher())),
                store,
                options: Mutex::new(options),
                state: StateCell::new(),
                in_flight: AtomicBool::new(false),
            }),
            timer: Mutex::new(None),
        })
    }

    /// The cache key this coordinator serves.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Options currently in effect.
    pub fn options(&self) -> SwrOptions {
        *lock(&self.inner.options)
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.snapshot()
    }

    /// Fetch unconditionally, bypassing the cache check. A no-op if a fetch
    /// is already in flight.
    pub async fn fetch(&self) {
        self.inner.fetch().await;
    }

    /// Serve from cache when the entry is fresh, otherwise fetch.
    pub async fn fetch_if_needed(&self) {
        self.inner.fetch_if_needed().await;
    }

    /// Run the activation protocol: one immediate revalidation check, then a
    /// repeating timer when `refresh_interval` is non-zero. Calling `start`
    /// on a started coordinator restarts the timer.
    pub async fn start(&self) {
        self.stop();
        self.inner.fetch_if_needed().await;

        let interval = self.options().refresh_interval;
        if interval.is_zero() {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // No catch-up bursts after a slow fetch.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The activation fetch above covers the immediate first tick.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                inner.fetch_if_needed().await;
            }
        });
        *lock(&self.timer) = Some(handle);
    }

    /// Cancel the periodic timer, if one is running. A fetch executing inside
    /// the timer task is cancelled at its next await point, so timer-driven
    /// fetches stop mutating state after teardown.
    pub fn stop(&self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }

    /// Replace the options and re-run the activation protocol.
    pub async fn reconfigure(&self, patch: SwrOptionsPatch) {
        self.stop();
        *lock(&self.inner.options) = SwrOptions::default().merged(patch);
        self.start().await;
    }
}

impl<T> Drop for Swr<T> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch(&self) {
        // In-flight latch: a trigger while a fetch is outstanding is a no-op.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(key = %self.key, "fetch already in flight, skipping");
            return;
        }
        let _guard = FetchGuard { inner: self };

        self.state.set_loading(true);
        match (self.fetcher)().await {
            Ok(data) => {
                debug!(key = %self.key, "fetch succeeded");
                self.state.set_success(data.clone());
                self.spawn_persist(data);
            }
            Err(err) => {
                debug!(key = %self.key, error = %err, "fetch failed");
                self.state.set_error(err);
            }
        }
    }

    async fn fetch_if_needed(&self) {
        let ttl = lock(&self.options).ttl;
        let entry = match self.store.get(&self.key).await {
            Ok(entry) => entry,
            Err(err) => {
                // A failed read is treated the same as a miss.
                warn!(key = %self.key, error = %err, "cache read failed, refetching");
                None
            }
        };

        match entry {
            Some(entry) if entry.is_valid(ttl) => {
                debug!(key = %self.key, "cache hit");
                // A fresh hit only replaces data; error and is_loading stay
                // as they are until the next real fetch.
                self.state.set_data(entry.data);
            }
            _ => {
                debug!(key = %self.key, "cache miss or stale entry");
                self.fetch().await;
            }
        }
    }

    /// Persist a successful fetch on a detached task. Failures are logged
    /// and never reach the observable state.
    fn spawn_persist(&self, data: T) {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        tokio::spawn(async move {
            if let Err(err) = store.set(&key, CacheEntry::new(data)).await {
                warn!(key = %key, error = %err, "failed to persist cache entry");
            }
        });
    }
}

/// Lock a mutex, recovering the guard if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
