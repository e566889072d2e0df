pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod storage;
pub mod store;

pub use error::SenbetsuError;
pub use filter::{ReleaseGroupFilter, Verdict};
pub use models::{Candidate, EntityId, ListKind, SearchResult};
pub use storage::Storage;
pub use store::{KeywordStore, MemoryStore, StoreError};
