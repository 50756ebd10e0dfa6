// Observable fetch state.
// The coordinator owns the watch sender; consumers subscribe to receivers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::SwrError;

/// Live result of a keyed fetch: last value, last failure, in-flight flag.
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    /// Last known value. `None` until the first successful fetch or cache hit.
    pub data: Option<T>,
    /// Last fetch failure, or `None` if the most recent attempt succeeded.
    pub error: Option<Arc<SwrError>>,
    /// True strictly while a fetch is in flight.
    pub is_loading: bool,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }
}

/// Watch-backed cell holding a [`FetchState`]. Every mutation notifies
/// subscribers; only the coordinator holds the sender side.
pub(crate) struct StateCell<T> {
    tx: watch::Sender<FetchState<T>>,
}

impl<T> StateCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FetchState::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.tx.subscribe()
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.tx.send_modify(|state| state.is_loading = is_loading);
    }

    /// Replace `data` only. Used on cache hits, which leave `error` and
    /// `is_loading` untouched.
    pub fn set_data(&self, data: T) {
        self.tx.send_modify(|state| state.data = Some(data));
    }

    /// Record a successful fetch: new data, error cleared.
    pub fn set_success(&self, data: T) {
        self.tx.send_modify(|state| {
            state.data = Some(data);
            state.error = None;
        });
    }

    /// Record a failed fetch: error set, data left untouched.
    pub fn set_error(&self, error: SwrError) {
        self.tx.send_modify(|state| state.error = Some(Arc::new(error)));
    }
}

impl<T: Clone> StateCell<T> {
    pub fn snapshot(&self) -> FetchState<T> {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mutations_notify_subscribers() {
        let cell: StateCell<i32> = StateCell::new();
        let mut rx = cell.subscribe();

        cell.set_loading(true);
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_loading);

        cell.set_success(7);
        rx.changed().await.unwrap();
        {
            let state = rx.borrow();
            assert_eq!(state.data, Some(7));
            assert!(state.error.is_none());
        }

        cell.set_loading(false);
        rx.changed().await.unwrap();
        assert!(!rx.borrow().is_loading);
    }

    #[tokio::test]
    async fn test_error_leaves_data_in_place() {
        let cell: StateCell<i32> = StateCell::new();
        cell.set_success(7);
        cell.set_error(SwrError::Fetch("boom".into()));

        let state = cell.snapshot();
        assert_eq!(state.data, Some(7));
        assert!(matches!(
            state.error.as_deref(),
            Some(SwrError::Fetch(msg)) if msg == "boom"
        ));
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let cell: StateCell<i32> = StateCell::new();
        cell.set_error(SwrError::Fetch("boom".into()));
        cell.set_success(1);

        let state = cell.snapshot();
        assert_eq!(state.data, Some(1));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_cache_hit_keeps_stale_error() {
        let cell: StateCell<i32> = StateCell::new();
        cell.set_error(SwrError::Fetch("boom".into()));
        cell.set_data(42);

        let state = cell.snapshot();
        assert_eq!(state.data, Some(42));
        assert!(state.error.is_some());
    }
}
