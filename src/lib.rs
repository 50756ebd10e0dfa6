// Stale-while-revalidate fetch coordination.
// Serves cached data while fresh, refetches when stale, persists successes,
// and revalidates periodically on a timer.

pub mod coordinator;
pub mod error;
pub mod options;
pub mod state;
pub mod store;

pub use coordinator::Swr;
pub use error::{Result, SwrError};
pub use options::{SwrOptions, SwrOptionsPatch};
pub use state::FetchState;
pub use store::{CacheEntry, CacheStore, FileStore, MemoryStore};
