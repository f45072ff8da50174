// src/site/profile.rs
// =============================================================================
// Reads the site's entry point (usually index.html) to learn about the site
// before the scan starts: its canonical base URL and its keyword metadata.
//
// The base URL decides which absolute links count as same-site. If the entry
// point doesn't exist at all the audit still runs, in a reduced mode without
// same-site detection or ignore-file filtering.
// =============================================================================

use crate::checker::extract_page_facts;
use crate::config::AuditConfig;
use crate::site::classify::normalize_base_url;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    Full,
    /// The entry point is missing.
    Reduced,
}

/// What the entry point tells us about the site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteProfile {
    /// Normalized (no trailing slash).
    pub base_url: Option<String>,
    pub keywords: Vec<String>,
}

/// Reads `entry_point` under `root`. Returns `None` only when the file does
/// not exist; an unreadable entry point gives an empty profile.
pub fn detect_profile(root: &Path, entry_point: &str) -> Option<SiteProfile> {
    let path = root.join(entry_point.trim_start_matches('/'));
    if !path.is_file() {
        return None;
    }

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not read entry point {}: {}", path.display(), e);
            return Some(SiteProfile::default());
        }
    };
    let facts = extract_page_facts(&String::from_utf8_lossy(&bytes));

    let base_url = facts.canonical.as_deref().and_then(checked_base_url);
    if let Some(base) = &base_url {
        info!("Detected base URL: {}", base);
    }
    if !facts.keywords.is_empty() {
        info!("Keywords: {}", facts.keywords.join(", "));
    }

    Some(SiteProfile {
        base_url,
        keywords: facts.keywords,
    })
}

/// Decides the audit mode and the effective profile for a run.
///
/// A base URL from the config is only a fallback for an entry point without
/// a canonical link. Reduced mode never has a base URL.
pub fn resolve_profile(root: &Path, config: &AuditConfig) -> (AuditMode, SiteProfile) {
    match detect_profile(root, &config.entry_point) {
        None => {
            warn!("{} not found, running in reduced mode", config.entry_point);
            (AuditMode::Reduced, SiteProfile::default())
        }
        Some(mut profile) => {
            if profile.base_url.is_none() {
                profile.base_url = config.base_url.as_deref().and_then(checked_base_url);
            }
            (AuditMode::Full, profile)
        }
    }
}

// Only absolute http(s) URLs can serve as a same-site prefix.
fn checked_base_url(raw: &str) -> Option<String> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(normalize_base_url(raw)),
        _ => {
            warn!("Ignoring unusable base URL: {}", raw);
            None
        }
    }
}
