use serde::{Deserialize, Serialize};

/// Anything that can be checked against a release group filter.
pub trait Candidate {
    /// The release group tag, if one was detected.
    fn release_group(&self) -> Option<&str>;
}

/// A search result found by a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Raw release name.
    pub name: String,
    pub release_group: Option<String>,
}

impl SearchResult {
    pub fn new(name: impl Into<String>, release_group: Option<&str>) -> Self {
        Self {
            name: name.into(),
            release_group: release_group.map(str::to_string),
        }
    }
}

impl Candidate for SearchResult {
    fn release_group(&self) -> Option<&str> {
        self.release_group.as_deref()
    }
}

impl Candidate for str {
    fn release_group(&self) -> Option<&str> {
        Some(self)
    }
}

impl Candidate for Option<&str> {
    fn release_group(&self) -> Option<&str> {
        *self
    }
}

impl<C: Candidate + ?Sized> Candidate for &C {
    fn release_group(&self) -> Option<&str> {
        (**self).release_group()
    }
}
