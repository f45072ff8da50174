// src/audit/score.rs
// =============================================================================
// Turns the final issue list into a 0-100 score and ranks pages by how many
// internal links point at them.
// =============================================================================

use crate::audit::Issue;
use crate::site::{Document, LinkGraph};
use serde::Serialize;
use std::collections::BTreeMap;

pub const BASELINE_SCORE: i64 = 100;
pub const TOP_PAGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPage {
    pub identity: String,
    pub inbound: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scorecard {
    pub score: u32,
    pub top_pages: Vec<RankedPage>,
}

/// 100 minus the sum of all weights, clamped to `0..=100`.
pub fn compute_score(issues: &[Issue]) -> u32 {
    let deductions: i64 = issues.iter().map(|i| i64::from(i.weight)).sum();
    (BASELINE_SCORE - deductions).clamp(0, BASELINE_SCORE) as u32
}

/// Scanned documents by inbound count, highest first, at most ten.
///
/// Ties keep the graph's identity order. Link targets that were never
/// scanned as documents (images, PDFs) don't appear, whatever their count.
pub fn rank_pages(graph: &LinkGraph, documents: &BTreeMap<String, Document>) -> Vec<RankedPage> {
    let mut ranked: Vec<RankedPage> = graph
        .iter()
        .filter(|(identity, _)| documents.contains_key(*identity))
        .map(|(identity, inbound)| RankedPage {
            identity: identity.to_string(),
            inbound,
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.inbound.cmp(&a.inbound));
    ranked.truncate(TOP_PAGES);
    ranked
}

pub fn score(issues: &[Issue], graph: &LinkGraph, documents: &BTreeMap<String, Document>) -> Scorecard {
    Scorecard {
        score: compute_score(issues),
        top_pages: rank_pages(graph, documents),
    }
}
