// src/config.rs
// =============================================================================
// Audit settings: built-in defaults, an optional site-guardian.toml, and the
// command-line flags on top.
//
// Every field has a default, so a config file only needs the keys a site
// actually wants to change:
//
//   ignore_file_patterns = ["google", "404.html", "drafts"]
//   concurrency = 4
// =============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Name of the config file picked up automatically from the site root.
pub const CONFIG_FILE_NAME: &str = "site-guardian.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// The site's root document, relative to the site root.
    pub entry_point: String,
    /// File suffix of documents, appended when resolving clean URLs.
    pub document_suffix: String,
    /// Document served for directory-style URLs.
    pub index_document: String,
    /// Directory names never descended into.
    pub ignore_dirs: Vec<String>,
    /// Filename fragments excluded from scanning and orphan checks.
    pub ignore_file_patterns: Vec<String>,
    /// Href fragments that take a link out of the audit entirely.
    pub ignore_url_patterns: Vec<String>,
    /// Used when the entry point declares no canonical URL.
    pub base_url: Option<String>,
    /// Maximum number of external probes in flight.
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub check_external: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            entry_point: "index.html".to_string(),
            document_suffix: ".html".to_string(),
            index_document: "index.html".to_string(),
            ignore_dirs: strings(&[".git", "node_modules", "__pycache__"]),
            ignore_file_patterns: strings(&["google", "404.html"]),
            ignore_url_patterns: strings(&["/go/", "cdn-cgi", "javascript:", "mailto:", "tel:"]),
            base_url: None,
            concurrency: 10,
            timeout_secs: 5,
            user_agent: "Mozilla/5.0 (compatible; site-guardian/0.1)".to_string(),
            check_external: true,
        }
    }
}

impl AuditConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Identity of the entry point, e.g. "/index.html".
    pub fn entry_identity(&self) -> String {
        format!("/{}", self.entry_point.trim_start_matches('/'))
    }

    /// Parses a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: AuditConfig = toml::from_str(text).context("invalid audit configuration")?;
        Ok(config)
    }

    /// Loads the configuration for a site.
    ///
    /// An explicit path must exist and parse. Without one, `site-guardian.toml`
    /// in the site root is used if present; a broken auto-detected file is
    /// only warned about, the defaults still apply.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let config = Self::from_toml(&text)
                .with_context(|| format!("failed to load {}", path.display()))?;
            debug!("Loaded config from {}", path.display());
            return Ok(config);
        }

        let auto = root.join(CONFIG_FILE_NAME);
        if !auto.is_file() {
            return Ok(Self::default());
        }

        match std::fs::read_to_string(&auto)
            .map_err(anyhow::Error::from)
            .and_then(|text| Self::from_toml(&text))
        {
            Ok(config) => {
                debug!("Loaded config from {}", auto.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring {}: {:#}", auto.display(), e);
                Ok(Self::default())
            }
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
