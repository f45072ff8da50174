// src/audit/structure.rs
// =============================================================================
// Post-pass over the finished link graph: pages nothing links to.
//
// This only makes sense once every document has been scanned. Run against a
// half-built graph, every page not yet linked to would look orphaned, so the
// function takes a finished ScanOutcome's pieces by reference and is only
// called by the pipeline after the scan has returned.
// =============================================================================

use crate::audit::{Issue, IssueKind};
use crate::site::{Document, LinkGraph};
use std::collections::BTreeMap;

/// Flags every scanned page with zero inbound links.
///
/// The entry point is exempt whatever its count, and so is any identity that
/// contains one of `ignore_file_patterns`. Graph nodes that were never
/// scanned as documents (assets reached through links) are skipped.
pub fn find_orphans(
    graph: &LinkGraph,
    documents: &BTreeMap<String, Document>,
    entry_point: &str,
    ignore_file_patterns: &[String],
) -> Vec<Issue> {
    graph
        .iter()
        .filter(|(identity, _)| *identity != entry_point)
        .filter(|(_, inbound)| *inbound == 0)
        .filter(|(identity, _)| documents.contains_key(*identity))
        .filter(|(identity, _)| {
            !ignore_file_patterns
                .iter()
                .any(|p| !p.is_empty() && identity.contains(p.as_str()))
        })
        .map(|(identity, _)| Issue::new(IssueKind::OrphanPage, format!("Orphan page (0 inbound): {}", identity)))
        .collect()
}
