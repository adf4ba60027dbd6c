//! Resolution engine: checksums for every package, then the dependency tree.
//!
//! Two phases:
//! 1. Resolve a checksum per package: declared SHA-1, or candidate lookup.
//!    Sequential with stickiness (one worker), or on a rayon pool.
//! 2. Build the tree sequentially in input order, so the output does not
//!    depend on the worker count.

use super::candidates::{infer_candidates, InferenceHints};
use super::context::{ChecksumSource, Resolution, ResolutionContext, ResolveStats, ResolvedPackage};
use super::naming::CreatorHint;
use super::resolver::{LibraryResolver, LookupCache, ResolveAttempt};
use super::tree::TreeBuilder;
use crate::client::LibraryLookup;
use crate::error::{ImportError, Result};
use crate::model::catalog::EcosystemType;
use crate::model::{DependencyIndex, Package, ResolvedDependency, SbomDocument};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Search every ecosystem instead of narrowing by extension or hint
    pub multilingual: bool,
    /// Resolver threads; 1 keeps the sequential order and stickiness
    pub workers: usize,
    /// Memoize identical lookups within the run
    pub cache_lookups: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            multilingual: false,
            workers: 1,
            cache_lookups: true,
        }
    }
}

/// Output of one resolution pass
#[derive(Debug, Clone, Default)]
pub struct ResolutionOutcome {
    /// Top-level dependency trees, in input order
    pub dependencies: Vec<ResolvedDependency>,
    pub stats: ResolveStats,
}

/// Resolves an SBOM document against a [`LibraryLookup`].
pub struct ResolutionEngine<'a, L: LibraryLookup + ?Sized> {
    lookup: &'a L,
    options: EngineOptions,
}

impl<'a, L: LibraryLookup + ?Sized> ResolutionEngine<'a, L> {
    pub fn new(lookup: &'a L, options: EngineOptions) -> Self {
        Self { lookup, options }
    }

    /// Run a full resolution pass.
    ///
    /// Fails only on authorization errors from the lookup service; every
    /// other per-package failure leaves the package out of the output.
    pub fn run(&self, document: &SbomDocument) -> Result<ResolutionOutcome> {
        let hint = CreatorHint::from_document(&document.document);
        let cache = LookupCache::new();
        let abort = AtomicBool::new(false);

        let mut resolver = LibraryResolver::new(self.lookup).with_abort_flag(&abort);
        if self.options.cache_lookups {
            resolver = resolver.with_cache(&cache);
        }

        let packages: Vec<&Package> = document.packages.values().collect();
        tracing::info!(
            packages = packages.len(),
            workers = self.options.workers,
            multilingual = self.options.multilingual,
            "Resolving package checksums"
        );

        let context = if self.options.workers > 1 {
            self.resolve_parallel(&packages, &hint, &resolver, &abort)?
        } else {
            self.resolve_sequential(&packages, &hint, &resolver)?
        };

        let index = DependencyIndex::build(&document.edges);
        tracing::debug!(edges = index.edge_count(), "Dependency index built");
        let (dependencies, duplicates) = TreeBuilder::new(document, &index, &context)
            .with_creator_hint(hint)
            .build();

        let mut stats = *context.stats();
        stats.lookup_calls = resolver.calls();
        stats.cache_hits = cache.hits();
        stats.duplicates = duplicates;
        stats.log_summary();

        Ok(ResolutionOutcome {
            dependencies,
            stats,
        })
    }

    fn resolve_sequential(
        &self,
        packages: &[&Package],
        hint: &CreatorHint,
        resolver: &LibraryResolver<'_, L>,
    ) -> Result<ResolutionContext> {
        let mut context = ResolutionContext::new();
        for package in packages {
            let resolution = self.resolve_package(package, hint, context.sticky(), resolver)?;
            context.record(&package.id, resolution);
        }
        Ok(context)
    }

    fn resolve_parallel(
        &self,
        packages: &[&Package],
        hint: &CreatorHint,
        resolver: &LibraryResolver<'_, L>,
        abort: &AtomicBool,
    ) -> Result<ResolutionContext> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .build()
            .map_err(|e| ImportError::config(format!("failed to start resolver pool: {e}")))?;

        let fatal: Mutex<Option<ImportError>> = Mutex::new(None);
        let results: Vec<Option<Resolution>> = pool.install(|| {
            packages
                .par_iter()
                .map(|package| {
                    if abort.load(Ordering::Relaxed) {
                        return None;
                    }
                    match self.resolve_package(package, hint, None, resolver) {
                        Ok(resolution) => Some(resolution),
                        Err(err) => {
                            let mut slot = fatal.lock().unwrap_or_else(PoisonError::into_inner);
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            abort.store(true, Ordering::Relaxed);
                            None
                        }
                    }
                })
                .collect()
        });

        if let Some(err) = fatal.into_inner().unwrap_or_else(PoisonError::into_inner) {
            return Err(err);
        }

        let mut context = ResolutionContext::new();
        for (package, resolution) in packages.iter().zip(results) {
            if let Some(resolution) = resolution {
                context.record(&package.id, resolution);
            }
        }
        Ok(context)
    }

    /// Resolve one package's checksum.
    fn resolve_package(
        &self,
        package: &Package,
        hint: &CreatorHint,
        sticky: Option<&'static EcosystemType>,
        resolver: &LibraryResolver<'_, L>,
    ) -> Result<Resolution> {
        if package.is_no_assertion() {
            tracing::debug!(id = %package.id, "Skipping NOASSERTION package");
            return Ok(Resolution::Sentinel);
        }

        if let Some(sha1) = package.sha1() {
            return Ok(Resolution::Resolved(ResolvedPackage {
                artifact_id: package.artifact_name().to_string(),
                version: package.version.clone().unwrap_or_default(),
                checksum: sha1.to_string(),
                file_name: package.artifact_name().to_string(),
                source: ChecksumSource::Declared,
            }));
        }

        let normalized = hint.normalize(&package.name, package.version.as_deref());
        let Some(version) = normalized.version.as_deref() else {
            let reason = "no version declared".to_string();
            tracing::info!("Library not found: {}. {reason}", package.identity());
            return Ok(Resolution::Unresolved { reason });
        };

        let hints = InferenceHints {
            creator: normalized.ecosystem.or(hint.ecosystem),
            sticky,
            multilingual: self.options.multilingual,
        };
        let candidates = infer_candidates(package, &hints);
        tracing::info!("Library search: {}-{version}", normalized.name);
        tracing::debug!(
            tier = %candidates.tier,
            candidates = ?candidates.lookup_codes(),
            "Candidate ecosystems"
        );

        match resolver.resolve(&normalized.name, version, &candidates.candidates)? {
            ResolveAttempt::Found { found, ecosystem } => {
                let file_name = format!(
                    "{}-{version}.{}",
                    found.artifact_id, ecosystem.file_extension
                );
                Ok(Resolution::Resolved(ResolvedPackage {
                    artifact_id: found.artifact_id,
                    version: version.to_string(),
                    checksum: found.checksum,
                    file_name,
                    source: ChecksumSource::Lookup(ecosystem),
                }))
            }
            ResolveAttempt::Exhausted { reason } => {
                tracing::info!("Library not found: {}. {reason}", package.identity());
                Ok(Resolution::Unresolved { reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LibraryQuery, LookupOutcome};
    use crate::model::{Creator, RelationshipEdge};
    use std::collections::HashMap;

    /// Answers by (lookup code, name); records every call.
    #[derive(Default)]
    struct StubLookup {
        answers: HashMap<(String, String), LookupOutcome>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl StubLookup {
        fn answer(mut self, code: &str, name: &str, outcome: LookupOutcome) -> Self {
            self.answers
                .insert((code.to_string(), name.to_string()), outcome);
            self
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LibraryLookup for StubLookup {
        fn lookup_library(&self, query: &LibraryQuery<'_>) -> LookupOutcome {
            let key = (query.lookup_code.to_string(), query.name.to_string());
            self.calls.lock().unwrap().push(key.clone());
            self.answers
                .get(&key)
                .cloned()
                .unwrap_or_else(|| LookupOutcome::error(2010, "Library not found"))
        }
    }

    fn doc_with(packages: Vec<Package>) -> SbomDocument {
        let mut doc = SbomDocument::default();
        for pkg in packages {
            doc.add_package(pkg);
        }
        doc
    }

    fn sequential() -> EngineOptions {
        EngineOptions::default()
    }

    #[test]
    fn test_left_pad_end_to_end() {
        let lookup =
            StubLookup::default().answer("npm", "left-pad", LookupOutcome::found("abc123", "left-pad"));
        let doc = doc_with(vec![Package::new("SPDXRef-left-pad", "left-pad")
            .with_version("1.3.0")
            .with_external_ref("PACKAGE-MANAGER", "pkg:npm/left-pad")]);

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();

        assert_eq!(outcome.dependencies.len(), 1);
        let dep = &outcome.dependencies[0];
        assert_eq!(dep.artifact_id, "left-pad");
        assert_eq!(dep.version, "1.3.0");
        assert_eq!(dep.checksum, "abc123");
        assert_eq!(dep.file_name, "left-pad-1.3.0.js");
        assert!(dep.child_dependencies.is_empty());
        assert_eq!(lookup.calls().len(), 1);
    }

    #[test]
    fn test_declared_sha1_never_looks_up() {
        let lookup = StubLookup::default();
        let doc = doc_with(vec![Package::new("SPDXRef-a", "guava")
            .with_version("31.1")
            .with_file_name("guava-31.1.jar")
            .with_checksum("sha1", "deadbeef")]);

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();

        assert!(lookup.calls().is_empty());
        assert_eq!(outcome.dependencies[0].checksum, "deadbeef");
        assert_eq!(outcome.dependencies[0].artifact_id, "guava-31.1.jar");
        assert_eq!(outcome.stats.declared, 1);
    }

    #[test]
    fn test_noassertion_is_skipped_silently() {
        let lookup = StubLookup::default();
        let doc = doc_with(vec![Package::new("SPDXRef-x", "NOASSERTION").with_version("1.0")]);

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();

        assert!(outcome.dependencies.is_empty());
        assert!(lookup.calls().is_empty());
        assert_eq!(outcome.stats.sentinels, 1);
        assert_eq!(outcome.stats.not_found, 0);
    }

    #[test]
    fn test_missing_version_skips_lookup() {
        let lookup = StubLookup::default();
        let doc = doc_with(vec![Package::new("SPDXRef-x", "left-pad")
            .with_external_ref("PACKAGE-MANAGER", "pkg:npm/left-pad")]);

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();

        assert!(outcome.dependencies.is_empty());
        assert!(lookup.calls().is_empty());
        assert_eq!(outcome.stats.not_found, 1);
    }

    #[test]
    fn test_stickiness_promotes_previous_success() {
        // Neither package has a reference or extension: both use the fallback tier
        let lookup = StubLookup::default()
            .answer("ruby", "rack", LookupOutcome::found("r1", "rack"))
            .answer("ruby", "rake", LookupOutcome::found("r2", "rake"));
        let doc = doc_with(vec![
            Package::new("SPDXRef-1", "rack").with_version("2.0"),
            Package::new("SPDXRef-2", "rake").with_version("13.0"),
        ]);

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();
        assert_eq!(outcome.dependencies.len(), 2);

        let rake_calls: Vec<String> = lookup
            .calls()
            .into_iter()
            .filter(|(_, name)| name == "rake")
            .map(|(code, _)| code)
            .collect();
        assert_eq!(rake_calls, vec!["ruby".to_string()]);
    }

    #[test]
    fn test_permission_failure_aborts_run() {
        let lookup = StubLookup::default().answer(
            "npm",
            "a",
            LookupOutcome::error(5001, "User is not allowed to perform this action"),
        );
        let doc = doc_with(vec![
            Package::new("SPDXRef-a", "a")
                .with_version("1.0")
                .with_external_ref("PACKAGE-MANAGER", "pkg:npm/a"),
            Package::new("SPDXRef-b", "b")
                .with_version("1.0")
                .with_external_ref("PACKAGE-MANAGER", "pkg:npm/b"),
        ]);

        let err = ResolutionEngine::new(&lookup, sequential())
            .run(&doc)
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(lookup.calls().len(), 1);
    }

    #[test]
    fn test_permission_failure_aborts_parallel_run() {
        let lookup = StubLookup::default().answer("npm", "a", LookupOutcome::error(5001, "denied"));
        let packages = (0..20)
            .map(|i| {
                let name = if i == 0 { "a".to_string() } else { format!("p{i}") };
                Package::new(format!("SPDXRef-{i}"), name.clone())
                    .with_version("1.0")
                    .with_external_ref("PACKAGE-MANAGER", format!("pkg:npm/{name}"))
            })
            .collect();
        let options = EngineOptions {
            workers: 4,
            ..EngineOptions::default()
        };

        let err = ResolutionEngine::new(&lookup, options)
            .run(&doc_with(packages))
            .unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_parallel_output_matches_sequential() {
        let mut lookup = StubLookup::default();
        let mut packages = Vec::new();
        for i in 0..12 {
            let name = format!("lib{i}");
            if i % 3 != 0 {
                lookup = lookup.answer("npm", &name, LookupOutcome::found(format!("sha{i}"), &name));
            }
            packages.push(
                Package::new(format!("SPDXRef-{i}"), name.clone())
                    .with_version("1.0")
                    .with_external_ref("PACKAGE-MANAGER", format!("pkg:npm/{name}")),
            );
        }
        let mut doc = doc_with(packages);
        doc.add_edge(RelationshipEdge::depends_on("SPDXRef-1", "SPDXRef-2"));
        doc.add_edge(RelationshipEdge::depends_on("SPDXRef-2", "SPDXRef-4"));

        let seq = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();
        let par = ResolutionEngine::new(
            &lookup,
            EngineOptions {
                workers: 4,
                ..EngineOptions::default()
            },
        )
        .run(&doc)
        .unwrap();

        assert_eq!(seq.dependencies, par.dependencies);
        assert_eq!(seq.stats.looked_up, 8);
        assert_eq!(seq.dependencies[0].artifact_id, "lib1");
        assert_eq!(seq.dependencies[0].child_dependencies[0].artifact_id, "lib2");
    }

    #[test]
    fn test_github_template_normalizes_name() {
        let lookup = StubLookup::default().answer(
            "npm",
            "left-pad",
            LookupOutcome::found("abc123", "left-pad"),
        );
        let mut doc = doc_with(vec![Package::new("SPDXRef-1", "npm:left-pad").with_version("^1.3.0")]);
        doc.document.creators = vec![Creator::parse("Tool: GitHub.com-Dependency-Graph")];

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();

        assert_eq!(lookup.calls(), vec![("npm".to_string(), "left-pad".to_string())]);
        assert_eq!(outcome.dependencies[0].version, "1.3.0");
    }

    #[test]
    fn test_github_prefixed_and_bare_names_emit_once() {
        let lookup = StubLookup::default().answer(
            "npm",
            "left-pad",
            LookupOutcome::found("abc123", "left-pad"),
        );
        let mut doc = doc_with(vec![
            Package::new("SPDXRef-1", "npm:left-pad").with_version("^1.3.0"),
            Package::new("SPDXRef-2", "left-pad").with_version("1.3.0"),
        ]);
        doc.document.creators = vec![Creator::parse("Tool: GitHub.com-Dependency-Graph")];

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();

        assert_eq!(outcome.stats.looked_up, 2);
        assert_eq!(outcome.dependencies.len(), 1);
        assert_eq!(outcome.stats.duplicates, 1);
    }

    #[test]
    fn test_repeat_lookup_is_memoized() {
        let lookup =
            StubLookup::default().answer("npm", "left-pad", LookupOutcome::found("abc", "left-pad"));
        let pkg = |id: &str| {
            Package::new(id, "left-pad")
                .with_version("1.3.0")
                .with_external_ref("PACKAGE-MANAGER", "pkg:npm/left-pad")
        };
        let doc = doc_with(vec![pkg("SPDXRef-1"), pkg("SPDXRef-2")]);

        let outcome = ResolutionEngine::new(&lookup, sequential()).run(&doc).unwrap();

        assert_eq!(lookup.calls().len(), 1);
        assert_eq!(outcome.stats.cache_hits, 1);
        // Same identity: emitted once
        assert_eq!(outcome.dependencies.len(), 1);
        assert_eq!(outcome.stats.duplicates, 1);
    }
}
