// src/site/scan.rs
// =============================================================================
// This module walks the site and builds the inbound-link graph.
//
// How it works:
// 1. Enumerate every document under the root (skipping .git, node_modules,
//    and files matching the ignore-file patterns)
// 2. For each document, one at a time:
//    - check its <h1> count and structured data
//    - classify every <a href> (see classify.rs)
//    - resolve internal links to files (see resolve.rs) and count them as
//      inbound links of the target
// 3. Return the documents, the graph, the findings and the external URLs
//
// Documents are processed strictly sequentially. Nothing here is shared
// with another thread, so the graph needs no locking.
// =============================================================================

use crate::audit::{IssueCollector, IssueKind};
use crate::checker::extract_page_facts;
use crate::site::classify::{Classifier, LinkClass, LinkContext};
use crate::site::resolve::{PathResolver, Resolution};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A scanned page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Root-relative path, e.g. "/blog/post.html".
    pub identity: String,
    pub has_heading: bool,
    pub has_structured_data: bool,
    pub title: Option<String>,
    pub keywords: Vec<String>,
}

/// Inbound internal-link counts, keyed by identity.
///
/// Keys are either scanned documents (added with a count of zero when
/// scanned) or any other file a link resolved to, such as an image.
/// Counts only ever go up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    inbound: BTreeMap<String, usize>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node without adding a link to it.
    pub fn discover(&mut self, identity: &str) {
        self.inbound.entry(identity.to_string()).or_insert(0);
    }

    /// Records one more internal link pointing at `identity`.
    pub fn add_inbound(&mut self, identity: &str) {
        *self.inbound.entry(identity.to_string()).or_insert(0) += 1;
    }

    pub fn inbound(&self, identity: &str) -> Option<usize> {
        self.inbound.get(identity).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.inbound.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all inbound counts.
    pub fn total_links(&self) -> usize {
        self.inbound.values().sum()
    }
}

/// Everything that drives one scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    pub ignore_dirs: &'a [String],
    pub ignore_file_patterns: &'a [String],
    pub ignore_url_patterns: &'a [String],
    /// Normalized site URL; `None` disables same-site detection.
    pub base_url: Option<&'a str>,
    pub document_suffix: &'a str,
    pub index_document: &'a str,
}

/// The result of a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub documents: BTreeMap<String, Document>,
    pub graph: LinkGraph,
    pub issues: IssueCollector,
    pub external_links: BTreeSet<String>,
}

/// Lists the documents under `root` in a stable (sorted) order.
///
/// Directories named in `ignore_dirs` are not entered. Files whose name
/// contains one of `ignore_file_patterns` are left out. Entries that can't
/// be read are logged and skipped.
pub fn enumerate_documents(
    root: &Path,
    ignore_dirs: &[String],
    ignore_file_patterns: &[String],
    document_suffix: &str,
) -> Vec<PathBuf> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && ignore_dirs.iter().any(|d| entry.file_name().to_string_lossy() == d.as_str()))
        });

    let mut documents = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(document_suffix) {
            continue;
        }
        if ignore_file_patterns.iter().any(|p| !p.is_empty() && name.contains(p.as_str())) {
            debug!("Ignoring {}", entry.path().display());
            continue;
        }
        documents.push(entry.into_path());
    }
    documents
}

/// Scans every document under the resolver's root.
pub fn scan(resolver: &PathResolver, options: &ScanOptions<'_>) -> ScanOutcome {
    let files = enumerate_documents(
        resolver.root(),
        options.ignore_dirs,
        options.ignore_file_patterns,
        options.document_suffix,
    );
    info!("Scanning {} document(s)...", files.len());

    let classifier = Classifier::new(options.ignore_url_patterns);
    let mut outcome = ScanOutcome::default();

    for path in files {
        let Some(identity) = resolver.identity_of(&path) else {
            warn!("Skipping {}: outside the site root", path.display());
            continue;
        };
        let html = match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                continue;
            }
        };
        scan_document(&identity, &html, resolver, &classifier, options, &mut outcome);
    }

    outcome
}

// Folds one document into the outcome.
fn scan_document(
    identity: &str,
    html: &str,
    resolver: &PathResolver,
    classifier: &Classifier,
    options: &ScanOptions<'_>,
    outcome: &mut ScanOutcome,
) {
    outcome.graph.discover(identity);
    let facts = extract_page_facts(html);

    match facts.heading_count {
        0 => outcome
            .issues
            .report(IssueKind::MissingHeading, format!("Missing H1: {}", identity)),
        1 => {}
        n => outcome.issues.report(
            IssueKind::MultipleHeadings,
            format!("Multiple H1s ({}): {}", n, identity),
        ),
    }
    if !facts.has_structured_data {
        outcome.issues.report(
            IssueKind::MissingStructuredData,
            format!("Missing structured data: {}", identity),
        );
    }

    let ctx = LinkContext {
        origin: identity,
        base_url: options.base_url,
        document_suffix: options.document_suffix,
        index_document: options.index_document,
    };

    for raw in &facts.hrefs {
        let classified = classifier.classify(raw, &ctx);
        outcome.issues.extend(classified.findings);

        let href = match classified.class {
            LinkClass::Ignored => continue,
            LinkClass::External(url) => {
                outcome.external_links.insert(url);
                continue;
            }
            LinkClass::Internal(href) => href,
        };

        match resolver.resolve(identity, &href) {
            Resolution::Found(target) => outcome.graph.add_inbound(&target),
            Resolution::NotFound => outcome
                .issues
                .report(IssueKind::BrokenLink, format!("Dead link: {} -> {}", identity, href)),
            Resolution::OutsideRoot => outcome.issues.report(
                IssueKind::BrokenLink,
                format!("Dead link (outside site root): {} -> {}", identity, href),
            ),
        }
    }

    outcome.documents.insert(
        identity.to_string(),
        Document {
            identity: identity.to_string(),
            has_heading: facts.heading_count > 0,
            has_structured_data: facts.has_structured_data,
            title: facts.title,
            keywords: facts.keywords,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use std::fs;

    const SCHEMA: &str = r#"<script type="application/ld+json">{}</script>"#;

    fn page(body: &str) -> String {
        format!("<html><head>{}</head><body><h1>T</h1>{}</body></html>", SCHEMA, body)
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn run(root: &Path, base_url: Option<&str>) -> ScanOutcome {
        let config = AuditConfig::default();
        let resolver = PathResolver::new(root, &config.document_suffix, &config.index_document).unwrap();
        let options = ScanOptions {
            ignore_dirs: &config.ignore_dirs,
            ignore_file_patterns: &config.ignore_file_patterns,
            ignore_url_patterns: &config.ignore_url_patterns,
            base_url,
            document_suffix: &config.document_suffix,
            index_document: &config.index_document,
        };
        scan(&resolver, &options)
    }

    #[test]
    fn test_clean_url_link_counts_as_inbound() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.html", &page(r#"<a href="/b">B</a>"#));
        write(dir.path(), "b.html", &page(""));

        let outcome = run(dir.path(), None);
        assert_eq!(outcome.graph.inbound("/b.html"), Some(1));
        assert_eq!(outcome.graph.inbound("/a.html"), Some(0));
        assert_eq!(outcome.issues.count_of(IssueKind::BrokenLink), 0);
    }

    #[test]
    fn test_missing_target_is_one_broken_link() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.html", &page(r#"<a href="missing">?</a>"#));

        let outcome = run(dir.path(), None);
        let broken: Vec<_> = outcome
            .issues
            .issues()
            .iter()
            .filter(|i| i.kind == IssueKind::BrokenLink)
            .collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].weight, 10);
        assert_eq!(broken[0].message, "Dead link: /a.html -> missing");
        // Relative link is also flagged, but only as advice
        assert_eq!(outcome.issues.count_of(IssueKind::RelativePathUsage), 1);
    }

    #[test]
    fn test_every_internal_link_is_counted_or_broken() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "index.html",
            &page(r#"<a href="/a">a</a><a href="blog/">blog</a><a href="/nope">x</a><a href="/img/logo.png">img</a>"#),
        );
        write(dir.path(), "a.html", &page(r#"<a href="/">home</a><a href="../../../etc">x</a>"#));
        write(dir.path(), "blog/index.html", &page(r#"<a href="../a.html">a</a>"#));
        write(dir.path(), "img/logo.png", "png");

        let outcome = run(dir.path(), None);
        let internal_links = 7;
        let broken = outcome.issues.count_of(IssueKind::BrokenLink);
        assert_eq!(broken, 2);
        assert_eq!(outcome.graph.total_links() + broken, internal_links);
        assert_eq!(outcome.graph.inbound("/a.html"), Some(2));
        assert_eq!(outcome.graph.inbound("/img/logo.png"), Some(1));
        // Assets are link targets but not documents
        assert!(!outcome.documents.contains_key("/img/logo.png"));
    }

    #[test]
    fn test_heading_findings_are_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "none.html", &format!("<head>{}</head><p>x</p>", SCHEMA));
        write(dir.path(), "two.html", &format!("<head>{}</head><h1>a</h1><h1>b</h1>", SCHEMA));

        let outcome = run(dir.path(), None);
        let for_page = |id: &str| -> Vec<IssueKind> {
            outcome
                .issues
                .issues()
                .iter()
                .filter(|i| i.message.ends_with(id))
                .map(|i| i.kind)
                .collect()
        };
        assert_eq!(for_page("/none.html"), vec![IssueKind::MissingHeading]);
        assert_eq!(for_page("/two.html"), vec![IssueKind::MultipleHeadings]);
        assert!(!outcome.documents["/none.html"].has_heading);
        assert!(outcome.documents["/two.html"].has_heading);
    }

    #[test]
    fn test_missing_structured_data() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plain.html", "<h1>Plain</h1>");
        let outcome = run(dir.path(), None);
        assert_eq!(outcome.issues.count_of(IssueKind::MissingStructuredData), 1);
        assert!(!outcome.documents["/plain.html"].has_structured_data);
    }

    #[test]
    fn test_external_links_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "a.html",
            &page(r#"<a href="https://rust-lang.org">1</a><a href="https://rust-lang.org">2</a>"#),
        );
        write(dir.path(), "b.html", &page(r#"<a href="https://rust-lang.org">3</a>"#));

        let outcome = run(dir.path(), None);
        assert_eq!(outcome.external_links.len(), 1);
        assert_eq!(outcome.graph.total_links(), 0);
    }

    #[test]
    fn test_same_site_absolute_link_resolves() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.html", &page(r#"<a href="https://example.com/b">b</a>"#));
        write(dir.path(), "b.html", &page(""));

        let outcome = run(dir.path(), Some("https://example.com"));
        assert_eq!(outcome.issues.count_of(IssueKind::AbsoluteInternalUrl), 1);
        assert_eq!(outcome.graph.inbound("/b.html"), Some(1));
        assert!(outcome.external_links.is_empty());
    }

    #[test]
    fn test_ignored_dirs_and_files_are_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", &page(""));
        write(dir.path(), "404.html", &page(""));
        write(dir.path(), "google1234.html", "google-site-verification");
        write(dir.path(), "node_modules/pkg/readme.html", &page(""));
        write(dir.path(), ".git/x.html", &page(""));
        write(dir.path(), "notes.txt", "not a document");

        let outcome = run(dir.path(), None);
        let scanned: Vec<_> = outcome.documents.keys().cloned().collect();
        assert_eq!(scanned, vec!["/index.html"]);
    }

    #[test]
    fn test_invalid_utf8_document_is_still_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = page(r#"<a href="/b">b</a>"#).into_bytes();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        fs::write(dir.path().join("a.html"), bytes).unwrap();
        write(dir.path(), "b.html", &page(""));

        let outcome = run(dir.path(), None);
        assert_eq!(outcome.graph.inbound("/b.html"), Some(1));
    }
}
