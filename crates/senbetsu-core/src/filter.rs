//! Per-show release group allow/deny filtering.
//!
//! A [`ReleaseGroupFilter`] caches the allow and deny lists of one show and
//! decides whether a search result's release group is acceptable.

use crate::error::SenbetsuError;
use crate::models::{Candidate, EntityId, ListKind};
use crate::store::{KeywordStore, StoreError};

/// Why a candidate was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Neither list has any keywords.
    Unfiltered,
    /// Passed both lists.
    Accepted,
    /// Filtering is configured but the candidate has no release group.
    MissingGroup,
    /// The allow list is non-empty and does not contain the group.
    NotAllowed,
    /// The deny list contains the group.
    Denied,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Unfiltered | Self::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unfiltered => write!(f, "accepted (no filter)"),
            Self::Accepted => write!(f, "accepted"),
            Self::MissingGroup => write!(f, "rejected (no release group)"),
            Self::NotAllowed => write!(f, "rejected (not in allow list)"),
            Self::Denied => write!(f, "rejected (in deny list)"),
        }
    }
}

/// Allow/deny list filter bound to one show.
#[derive(Debug)]
pub struct ReleaseGroupFilter<S> {
    entity: EntityId,
    store: S,
    allow: Vec<String>,
    deny: Vec<String>,
}

impl<S: KeywordStore> ReleaseGroupFilter<S> {
    /// Create a filter for `entity_id` and load its lists from `store`.
    pub fn new(entity_id: &str, store: S) -> Result<Self, SenbetsuError> {
        let entity = EntityId::new(entity_id)?;
        Self::for_entity(entity, store)
    }

    /// Same as [`new`](Self::new) for an already validated id.
    pub fn for_entity(entity: EntityId, store: S) -> Result<Self, SenbetsuError> {
        let mut filter = Self {
            entity,
            store,
            allow: Vec::new(),
            deny: Vec::new(),
        };
        filter.load()?;
        Ok(filter)
    }

    /// Reload both lists from the store, replacing the cached copies.
    pub fn load(&mut self) -> Result<(), SenbetsuError> {
        tracing::debug!(entity = %self.entity, "loading release group lists");
        let deny = self.load_list(ListKind::Deny)?;
        let allow = self.load_list(ListKind::Allow)?;
        self.deny = deny;
        self.allow = allow;
        Ok(())
    }

    fn load_list(&self, kind: ListKind) -> Result<Vec<String>, SenbetsuError> {
        let keywords = match self.store.query(&self.entity, kind) {
            Ok(keywords) => keywords,
            Err(StoreError::NotFound) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(entity = %self.entity, %kind, ?keywords, "loaded keywords");
        Ok(keywords)
    }

    /// Replace the allow list with exactly `values`.
    pub fn set_allow(&mut self, values: Vec<String>) -> Result<(), SenbetsuError> {
        self.store.replace(&self.entity, ListKind::Allow, &values)?;
        tracing::debug!(entity = %self.entity, allow = ?values, "allow list set");
        self.allow = values;
        Ok(())
    }

    /// Replace the deny list with exactly `values`.
    pub fn set_deny(&mut self, values: Vec<String>) -> Result<(), SenbetsuError> {
        self.store.replace(&self.entity, ListKind::Deny, &values)?;
        tracing::debug!(entity = %self.entity, deny = ?values, "deny list set");
        self.deny = values;
        Ok(())
    }
}

impl<S> ReleaseGroupFilter<S> {
    pub fn entity_id(&self) -> &EntityId {
        &self.entity
    }

    pub fn allow_list(&self) -> &[String] {
        &self.allow
    }

    pub fn deny_list(&self) -> &[String] {
        &self.deny
    }

    /// Whether either list has keywords.
    pub fn is_active(&self) -> bool {
        !self.allow.is_empty() || !self.deny.is_empty()
    }

    /// Evaluate a candidate and report the reason.
    ///
    /// Deny wins over allow. Keywords match the whole release group,
    /// ignoring case.
    pub fn evaluate<C: Candidate + ?Sized>(&self, candidate: &C) -> Verdict {
        if !self.is_active() {
            tracing::debug!(entity = %self.entity, "no allow or deny list defined");
            return Verdict::Unfiltered;
        }

        let group = match candidate.release_group().filter(|g| !g.is_empty()) {
            Some(group) => group.to_lowercase(),
            None => {
                tracing::debug!(entity = %self.entity, "failed to detect release group");
                return Verdict::MissingGroup;
            }
        };

        let allowed = self.allow.is_empty() || contains_keyword(&self.allow, &group);
        let denied = contains_keyword(&self.deny, &group);
        tracing::debug!(entity = %self.entity, %group, allowed, denied, "release group checked");

        if denied {
            Verdict::Denied
        } else if !allowed {
            Verdict::NotAllowed
        } else {
            Verdict::Accepted
        }
    }

    /// Whether the candidate passes both lists.
    pub fn is_accepted<C: Candidate + ?Sized>(&self, candidate: &C) -> bool {
        self.evaluate(candidate).is_accepted()
    }

    /// Keep only the candidates that pass both lists.
    pub fn retain_accepted<C: Candidate>(&self, candidates: Vec<C>) -> Vec<C> {
        let total = candidates.len();
        let kept: Vec<C> = candidates
            .into_iter()
            .filter(|c| self.is_accepted(c))
            .collect();
        if kept.len() < total {
            tracing::debug!(
                entity = %self.entity,
                discarded = total - kept.len(),
                "release group filter discarded results"
            );
        }
        kept
    }
}

fn contains_keyword(keywords: &[String], lowered_group: &str) -> bool {
    keywords.iter().any(|k| k.to_lowercase() == lowered_group)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::models::SearchResult;
    use crate::storage::Storage;
    use crate::store::MemoryStore;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn filter_with<'a>(
        store: &'a MemoryStore,
        allow: &[&str],
        deny: &[&str],
    ) -> ReleaseGroupFilter<&'a MemoryStore> {
        let mut filter = ReleaseGroupFilter::new("42", store).unwrap();
        filter.set_allow(strings(allow)).unwrap();
        filter.set_deny(strings(deny)).unwrap();
        filter
    }

    /// Store whose writes always fail.
    struct FailingStore;

    impl KeywordStore for FailingStore {
        fn query(&self, _: &EntityId, _: ListKind) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
        fn delete_all(&self, _: &EntityId, _: ListKind) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
        fn insert(&self, _: &EntityId, _: ListKind, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
    }

    #[test]
    fn test_new_rejects_empty_entity() {
        let store = MemoryStore::new();
        assert!(matches!(
            ReleaseGroupFilter::new("", &store),
            Err(SenbetsuError::InvalidEntity)
        ));
    }

    #[test]
    fn test_entity_id_not_normalized() {
        let store = MemoryStore::new();
        let mut padded = ReleaseGroupFilter::new("42 ", &store).unwrap();
        padded.set_deny(strings(&["badgroup"])).unwrap();
        assert_eq!(padded.entity_id().as_str(), "42 ");

        let plain = ReleaseGroupFilter::new("42", &store).unwrap();
        assert!(plain.deny_list().is_empty());
        assert!(plain.is_accepted("badgroup"));
    }

    #[test]
    fn test_new_treats_not_found_as_empty() {
        let store = MemoryStore::new();
        let filter = ReleaseGroupFilter::new("42", &store).unwrap();
        assert!(filter.allow_list().is_empty());
        assert!(filter.deny_list().is_empty());
        assert!(!filter.is_active());
    }

    #[test]
    fn test_load_propagates_other_store_errors() {
        struct BrokenStore;

        impl KeywordStore for BrokenStore {
            fn query(&self, _: &EntityId, _: ListKind) -> Result<Vec<String>, StoreError> {
                Err(StoreError::Unavailable("permission denied".into()))
            }
            fn delete_all(&self, _: &EntityId, _: ListKind) -> Result<(), StoreError> {
                Ok(())
            }
            fn insert(&self, _: &EntityId, _: ListKind, _: &str) -> Result<(), StoreError> {
                Ok(())
            }
        }

        assert!(matches!(
            ReleaseGroupFilter::new("42", BrokenStore),
            Err(SenbetsuError::Persistence(StoreError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_no_lists_accepts_everything() {
        let store = MemoryStore::new();
        let filter = ReleaseGroupFilter::new("42", &store).unwrap();
        assert_eq!(filter.evaluate("anything"), Verdict::Unfiltered);
        assert!(filter.is_accepted(""));
        assert!(filter.is_accepted(&None::<&str>));
        assert!(filter.is_accepted(&SearchResult::new("Show - 01", None)));
    }

    #[test]
    fn test_allow_list_case_insensitive() {
        let store = MemoryStore::new();
        let filter = filter_with(&store, &["ELITE"], &[]);
        assert_eq!(filter.evaluate("elite"), Verdict::Accepted);
        assert_eq!(filter.evaluate("OTHER"), Verdict::NotAllowed);
    }

    #[test]
    fn test_deny_list_case_insensitive() {
        let store = MemoryStore::new();
        let filter = filter_with(&store, &[], &["badgroup"]);
        assert_eq!(filter.evaluate("BadGroup"), Verdict::Denied);
        assert!(filter.is_accepted("goodgroup"));
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let store = MemoryStore::new();
        let filter = filter_with(&store, &["A"], &["A"]);
        assert_eq!(filter.evaluate("A"), Verdict::Denied);
        assert!(!filter.is_accepted("a"));
    }

    #[test]
    fn test_missing_group_rejected_when_active() {
        let store = MemoryStore::new();
        let deny_only = filter_with(&store, &[], &["badgroup"]);
        assert_eq!(deny_only.evaluate(""), Verdict::MissingGroup);
        assert_eq!(deny_only.evaluate(&None::<&str>), Verdict::MissingGroup);

        let result = SearchResult::new("Show - 01 [1080p]", None);
        assert!(!deny_only.is_accepted(&result));
    }

    #[test]
    fn test_exact_match_only() {
        let store = MemoryStore::new();
        let filter = filter_with(&store, &["Sub"], &[]);
        assert!(!filter.is_accepted("SubsPlease"));
        assert!(!filter.is_accepted("Su"));
        assert!(filter.is_accepted("SUB"));
    }

    #[test]
    fn test_set_allow_replaces_and_survives_reload() {
        let db = Storage::open_memory().unwrap();
        let mut filter = ReleaseGroupFilter::new("42", &db).unwrap();
        filter.set_allow(strings(&["old"])).unwrap();
        filter.set_allow(strings(&["VTV", "QxR"])).unwrap();
        assert_eq!(filter.allow_list(), ["VTV", "QxR"]);

        filter.load().unwrap();
        let loaded: HashSet<&str> = filter.allow_list().iter().map(String::as_str).collect();
        assert_eq!(loaded, HashSet::from(["VTV", "QxR"]));

        let fresh = ReleaseGroupFilter::new("42", &db).unwrap();
        assert_eq!(fresh.allow_list().len(), 2);
        assert!(fresh.deny_list().is_empty());
    }

    #[test]
    fn test_set_deny_with_empty_clears() {
        let db = Storage::open_memory().unwrap();
        let mut filter = ReleaseGroupFilter::new("42", &db).unwrap();
        filter.set_deny(strings(&["badgroup"])).unwrap();
        filter.set_deny(Vec::new()).unwrap();
        filter.load().unwrap();
        assert!(!filter.is_active());
    }

    #[test]
    fn test_failed_set_leaves_cache_unchanged() {
        let mut filter = ReleaseGroupFilter::new("42", FailingStore).unwrap();
        let err = filter.set_allow(strings(&["ELITE"])).unwrap_err();
        assert!(matches!(err, SenbetsuError::Persistence(_)));
        assert!(filter.allow_list().is_empty());
        assert!(filter.set_deny(strings(&["bad"])).is_err());
        assert!(filter.deny_list().is_empty());
    }

    #[test]
    fn test_filters_are_independent_per_entity() {
        let store = MemoryStore::new();
        let mut a = ReleaseGroupFilter::new("1", &store).unwrap();
        a.set_deny(strings(&["x"])).unwrap();

        let b = ReleaseGroupFilter::new("2", &store).unwrap();
        assert!(b.deny_list().is_empty());
        assert_eq!(a.deny_list(), ["x"]);
    }

    #[test]
    fn test_cache_not_refreshed_until_load() {
        let store = MemoryStore::new();
        let mut filter = ReleaseGroupFilter::new("42", &store).unwrap();

        let mut other = ReleaseGroupFilter::new("42", &store).unwrap();
        other.set_deny(strings(&["late"])).unwrap();

        assert!(filter.is_accepted("late"));
        filter.load().unwrap();
        assert!(!filter.is_accepted("late"));
    }

    #[test]
    fn test_retain_accepted() {
        let store = MemoryStore::new();
        let filter = filter_with(&store, &["VTV", "QxR"], &["QxR"]);
        let results = vec![
            SearchResult::new("Show.S01E01.VTV", Some("vtv")),
            SearchResult::new("Show.S01E01.QxR", Some("QxR")),
            SearchResult::new("Show.S01E01", None),
            SearchResult::new("Show.S01E01.Other", Some("Other")),
        ];

        let kept = filter.retain_accepted(results);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Show.S01E01.VTV");
    }
}
