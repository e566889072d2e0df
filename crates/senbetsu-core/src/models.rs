pub mod candidate;
pub mod entity;

pub use candidate::{Candidate, SearchResult};
pub use entity::{EntityId, ListKind};
