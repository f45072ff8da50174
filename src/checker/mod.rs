// src/checker/mod.rs
// =============================================================================
// This module contains the document and network checks.
//
// Submodules:
// - http: Probes external URLs to see if they are still alive
// - html: Extracts headings, structured data, links and metadata from a page
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

// Declare submodules (tells Rust to include these files)
mod html;
mod http;

// Re-export public items from submodules
// This lets users write `checker::extract_page_facts()` instead of
// `checker::html::extract_page_facts()`
pub use html::{extract_page_facts, PageFacts};
pub use http::{ExternalFailure, ExternalLinkVerifier, FailureReason, VerifierOptions};
