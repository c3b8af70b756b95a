//! # wyrd-ql
//!
//! Read side of the Wyrdness catalog: a caching client over the generated
//! static API, in-memory search, debounced incremental search, the user's
//! favorites, and the first-reported timeline.

pub mod client;
pub mod debounce;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod timeline;
pub mod transport;

pub use client::ApiClient;
pub use debounce::{DebouncedSearch, SearchOutcome};
pub use error::RetrievalError;
pub use favorites::{FavoritesEvent, FavoritesStore, FileStorage, MemoryStorage, PersistenceError, Storage};
pub use filters::SearchFilters;
pub use timeline::{timeline, TimelineEntry};
pub use transport::{HttpTransport, Transport, TransportResponse};
