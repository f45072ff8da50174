// src/site/mod.rs
// =============================================================================
// This module handles the site on disk.
//
// Features:
// - Learning the site's base URL from its entry point (profile)
// - Deciding what kind of link an href is (classify)
// - Mapping hrefs to files under several URL conventions (resolve)
// - Walking every document and building the inbound-link graph (scan)
// - Rewriting relative links to clean root-relative ones (fix)
// =============================================================================

pub mod classify;
pub mod fix;
pub mod profile;
pub mod resolve;
pub mod scan;

pub use profile::{resolve_profile, AuditMode, SiteProfile};
pub use resolve::{PathResolver, Resolution};
pub use scan::{enumerate_documents, scan, Document, LinkGraph, ScanOptions, ScanOutcome};
