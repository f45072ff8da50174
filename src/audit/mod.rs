// src/audit/mod.rs
// =============================================================================
// The audit pipeline.
//
//   profile  -> scan (sequential) -> external probes (concurrent)
//                                 -> orphan analysis
//                                 -> score
//
// Each phase takes what the previous one returned and hands back its own
// results; there is no shared mutable state between phases. External
// checking and orphan analysis both start only after the scan has returned,
// so they always see the complete graph.
// =============================================================================

mod issues;
mod score;
mod structure;

pub use issues::{Issue, IssueCollector, IssueKind, Severity};
pub use score::{compute_score, rank_pages, score, RankedPage, Scorecard};
pub use structure::find_orphans;

use crate::checker::{ExternalLinkVerifier, VerifierOptions};
use crate::config::AuditConfig;
use crate::site::{resolve_profile, scan, AuditMode, PathResolver, ScanOptions, SiteProfile};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Everything a finished audit produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub root: String,
    pub mode: AuditMode,
    pub profile: SiteProfile,
    pub documents_scanned: usize,
    pub external_checked: usize,
    pub issues: Vec<Issue>,
    pub score: u32,
    pub top_pages: Vec<RankedPage>,
}

impl AuditReport {
    /// True when any internal or external link is dead.
    pub fn has_broken_links(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i.kind, IssueKind::BrokenLink | IssueKind::ExternalDead))
    }
}

/// Audits the site under `root`.
///
/// Only setup problems (an unusable root, an HTTP client that can't be
/// built) are errors. Everything wrong with the site itself ends up as an
/// issue in the report.
pub async fn run_audit(root: &Path, config: &AuditConfig) -> Result<AuditReport> {
    let resolver = PathResolver::new(root, &config.document_suffix, &config.index_document)
        .with_context(|| format!("cannot open site root {}", root.display()))?;

    let (mode, profile) = resolve_profile(resolver.root(), config);
    // Reduced mode: no ignore-file gating anywhere
    let ignore_file_patterns: &[String] = match mode {
        AuditMode::Full => config.ignore_file_patterns.as_slice(),
        AuditMode::Reduced => &[],
    };

    // Phase 1: build the graph, one document at a time
    let outcome = scan(
        &resolver,
        &ScanOptions {
            ignore_dirs: &config.ignore_dirs,
            ignore_file_patterns,
            ignore_url_patterns: &config.ignore_url_patterns,
            base_url: profile.base_url.as_deref(),
            document_suffix: &config.document_suffix,
            index_document: &config.index_document,
        },
    );
    let mut issues = outcome.issues;

    // Phase 2: external links, with a join barrier inside verify()
    let mut external_checked = 0;
    if config.check_external && !outcome.external_links.is_empty() {
        let verifier = ExternalLinkVerifier::new(&VerifierOptions::from(config))?;
        let failures = verifier.verify(&outcome.external_links).await;
        external_checked = outcome.external_links.len();
        issues.extend(failures.iter().map(|f| f.to_issue()));
    } else if !outcome.external_links.is_empty() {
        info!("Skipping {} external link(s)", outcome.external_links.len());
    }

    // Phase 3: structure, on the finished graph
    issues.extend(find_orphans(
        &outcome.graph,
        &outcome.documents,
        &config.entry_identity(),
        ignore_file_patterns,
    ));

    let issues = issues.into_vec();
    let card = score(&issues, &outcome.graph, &outcome.documents);

    Ok(AuditReport {
        root: resolver.root().display().to_string(),
        mode,
        profile,
        documents_scanned: outcome.documents.len(),
        external_checked,
        issues,
        score: card.score,
        top_pages: card.top_pages,
    })
}
