//! Library resolver: walks candidate ecosystems against the lookup service.

use crate::client::{codes, LibraryLookup, LibraryMatch, LibraryQuery, LookupOutcome};
use crate::error::{ImportError, LookupErrorKind, Result};
use crate::model::catalog::EcosystemType;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Result of walking one candidate list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveAttempt {
    /// A candidate matched
    Found {
        found: LibraryMatch,
        ecosystem: &'static EcosystemType,
    },
    /// Every candidate failed
    Exhausted {
        /// Best explanation: the ambiguous-match message when one was seen,
        /// otherwise the last attempt's message
        reason: String,
    },
}

/// Within-run memo of lookup outcomes.
///
/// Keys are `(lookup code, name folded per ecosystem, version)`. Transport
/// failures are not memoized.
#[derive(Debug, Default)]
pub struct LookupCache {
    entries: Mutex<HashMap<(String, String, String), LookupOutcome>>,
    hits: AtomicUsize,
}

impl LookupCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(ecosystem: &EcosystemType, name: &str, version: &str) -> (String, String, String) {
        (
            ecosystem.lookup_code.to_string(),
            ecosystem.fold_name(name),
            version.to_string(),
        )
    }

    fn get(&self, ecosystem: &EcosystemType, name: &str, version: &str) -> Option<LookupOutcome> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let hit = entries.get(&Self::key(ecosystem, name, version)).cloned();
        if hit.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        hit
    }

    fn put(&self, ecosystem: &EcosystemType, name: &str, version: &str, outcome: &LookupOutcome) {
        if matches!(outcome, LookupOutcome::Failed { code: None, .. }) {
            return;
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::key(ecosystem, name, version), outcome.clone());
    }

    /// Lookups answered from the memo
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Memoized entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tries candidates in order against a [`LibraryLookup`].
///
/// Shareable across worker threads; counters are atomic.
pub struct LibraryResolver<'a, L: LibraryLookup + ?Sized> {
    lookup: &'a L,
    cache: Option<&'a LookupCache>,
    abort: Option<&'a AtomicBool>,
    calls: AtomicUsize,
}

impl<'a, L: LibraryLookup + ?Sized> LibraryResolver<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            cache: None,
            abort: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer repeated lookups from a memo
    #[must_use]
    pub fn with_cache(mut self, cache: &'a LookupCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Stop before the next attempt once the flag is raised
    #[must_use]
    pub fn with_abort_flag(mut self, abort: &'a AtomicBool) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Lookup service calls made so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Try each candidate until one yields a checksum.
    ///
    /// A no-permission answer aborts with an error; every other failure
    /// moves on to the next candidate.
    pub fn resolve(
        &self,
        name: &str,
        version: &str,
        candidates: &[&'static EcosystemType],
    ) -> Result<ResolveAttempt> {
        let mut ambiguous: Option<String> = None;
        let mut last_message = String::from("no candidate ecosystems");

        for &ecosystem in candidates {
            if self.abort.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(ImportError::Lookup {
                    context: format!("resolving {name}"),
                    source: LookupErrorKind::Cancelled,
                });
            }

            let outcome = self.attempt(ecosystem, name, version);
            match outcome {
                LookupOutcome::Found(found) => {
                    tracing::debug!(
                        library = name,
                        version,
                        ecosystem = ecosystem.lookup_code,
                        "Library found"
                    );
                    return Ok(ResolveAttempt::Found { found, ecosystem });
                }
                LookupOutcome::Failed {
                    code: Some(code),
                    message,
                } if code == codes::NO_PERMISSION => {
                    tracing::error!("Lookup service refused the credentials: {message}");
                    return Err(ImportError::permission_denied(code, message));
                }
                LookupOutcome::Failed { code, message } => {
                    tracing::debug!(
                        library = name,
                        ecosystem = ecosystem.lookup_code,
                        ?code,
                        "Lookup failed: {message}"
                    );
                    if code == Some(codes::AMBIGUOUS_MATCH) {
                        ambiguous = Some(message.clone());
                    }
                    last_message = message;
                }
            }
        }

        Ok(ResolveAttempt::Exhausted {
            reason: ambiguous.unwrap_or(last_message),
        })
    }

    fn attempt(&self, ecosystem: &'static EcosystemType, name: &str, version: &str) -> LookupOutcome {
        if let Some(cached) = self.cache.and_then(|c| c.get(ecosystem, name, version)) {
            return cached;
        }

        self.calls.fetch_add(1, Ordering::Relaxed);
        let outcome = self.lookup.lookup_library(&LibraryQuery {
            lookup_code: ecosystem.lookup_code,
            name,
            version,
        });

        if let Some(cache) = self.cache {
            cache.put(ecosystem, name, version, &outcome);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog;

    /// Answers from a fixed table keyed by lookup code; records calls.
    struct TableLookup {
        answers: HashMap<&'static str, LookupOutcome>,
        calls: Mutex<Vec<String>>,
    }

    impl TableLookup {
        fn new(answers: Vec<(&'static str, LookupOutcome)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LibraryLookup for TableLookup {
        fn lookup_library(&self, query: &LibraryQuery<'_>) -> LookupOutcome {
            self.calls.lock().unwrap().push(query.lookup_code.to_string());
            self.answers
                .get(query.lookup_code)
                .cloned()
                .unwrap_or_else(|| LookupOutcome::error(2010, "Library not found"))
        }
    }

    fn eco(key: &str) -> &'static EcosystemType {
        catalog::by_key(key).unwrap()
    }

    #[test]
    fn test_stops_at_first_success() {
        let lookup = TableLookup::new(vec![("cdnjs", LookupOutcome::found("abc", "jquery"))]);
        let resolver = LibraryResolver::new(&lookup);
        let result = resolver
            .resolve("jquery", "3.0.0", &[eco("npm"), eco("cdnjs"), eco("maven")])
            .unwrap();

        assert!(matches!(result, ResolveAttempt::Found { ecosystem, .. } if ecosystem.key == "cdnjs"));
        assert_eq!(lookup.calls(), vec!["npm", "cdnjs"]);
        assert_eq!(resolver.calls(), 2);
    }

    #[test]
    fn test_ambiguous_message_is_preferred() {
        let lookup = TableLookup::new(vec![(
            "npm",
            LookupOutcome::error(3028, "Too many libraries were found"),
        )]);
        let result = LibraryResolver::new(&lookup)
            .resolve("x", "1.0", &[eco("npm"), eco("maven")])
            .unwrap();

        assert_eq!(
            result,
            ResolveAttempt::Exhausted {
                reason: "Too many libraries were found".to_string()
            }
        );
        // The ambiguous answer did not stop the walk
        assert_eq!(lookup.calls(), vec!["npm", "maven"]);
    }

    #[test]
    fn test_no_permission_aborts() {
        let lookup = TableLookup::new(vec![("npm", LookupOutcome::error(5001, "No permission"))]);
        let err = LibraryResolver::new(&lookup)
            .resolve("x", "1.0", &[eco("npm"), eco("maven")])
            .unwrap_err();

        assert!(err.is_permission_denied());
        assert_eq!(lookup.calls(), vec!["npm"]);
    }

    #[test]
    fn test_transport_failure_falls_through() {
        let lookup = TableLookup::new(vec![
            ("npm", LookupOutcome::transport("connection reset")),
            ("maven", LookupOutcome::found("abc", "x")),
        ]);
        let result = LibraryResolver::new(&lookup)
            .resolve("x", "1.0", &[eco("npm"), eco("maven")])
            .unwrap();
        assert!(matches!(result, ResolveAttempt::Found { .. }));
    }

    #[test]
    fn test_cache_answers_repeats_with_case_folding() {
        let lookup = TableLookup::new(vec![("npm", LookupOutcome::found("abc", "left-pad"))]);
        let cache = LookupCache::new();
        let resolver = LibraryResolver::new(&lookup).with_cache(&cache);

        resolver.resolve("Left-Pad", "1.3.0", &[eco("npm")]).unwrap();
        resolver.resolve("left-pad", "1.3.0", &[eco("npm")]).unwrap();

        assert_eq!(lookup.calls().len(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_respects_case_sensitive_ecosystems() {
        let lookup = TableLookup::new(vec![("pypi", LookupOutcome::found("abc", "Django"))]);
        let cache = LookupCache::new();
        let resolver = LibraryResolver::new(&lookup).with_cache(&cache);

        resolver.resolve("Django", "4.2", &[eco("pypi")]).unwrap();
        resolver.resolve("django", "4.2", &[eco("pypi")]).unwrap();

        assert_eq!(lookup.calls().len(), 2);
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn test_raised_abort_flag_cancels() {
        let lookup = TableLookup::new(vec![]);
        let abort = AtomicBool::new(true);
        let err = LibraryResolver::new(&lookup)
            .with_abort_flag(&abort)
            .resolve("x", "1.0", &[eco("npm")])
            .unwrap_err();

        assert!(matches!(
            err,
            ImportError::Lookup {
                source: LookupErrorKind::Cancelled,
                ..
            }
        ));
        assert!(lookup.calls().is_empty());
    }
}
