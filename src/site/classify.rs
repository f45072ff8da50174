// src/site/classify.rs
// =============================================================================
// Decides what kind of link an href is before anything touches the disk.
//
// The decision is an ordered list of rules. Each rule looks at the href and
// either settles it (ignore it, or hand it to the external checker) or lets
// it through to the next rule, possibly rewriting it or recording an
// advisory finding on the way. Whatever survives every rule is an internal
// link and goes to the resolver.
//
//   1. IgnorePatterns / PureFragment   -> Ignore
//   2. ExternalScheme                  -> External
//   3. SameSiteAbsolute                -> rewrite to "/path", Absolute_Internal_URL
//   4. RelativePath                    -> Relative_Path_Usage
//   5. DirtyUrl                        -> Dirty_URL
// =============================================================================

use crate::audit::{Issue, IssueKind};
use crate::site::resolve::strip_query_and_fragment;

/// Where an href is being classified from.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// Identity of the document containing the link.
    pub origin: &'a str,
    /// Normalized site URL without trailing slash; `None` in reduced mode.
    pub base_url: Option<&'a str>,
    pub document_suffix: &'a str,
    pub index_document: &'a str,
}

/// Result of running one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Ignore,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    IgnorePatterns(Vec<String>),
    PureFragment,
    ExternalScheme,
    SameSiteAbsolute,
    RelativePath,
    DirtyUrl,
}

impl Rule {
    /// Runs this rule against `href`, which it may rewrite in place.
    pub fn apply(&self, href: &mut String, ctx: &LinkContext<'_>, findings: &mut Vec<Issue>) -> Step {
        match self {
            Rule::IgnorePatterns(patterns) => {
                if patterns.iter().any(|p| !p.is_empty() && href.contains(p.as_str())) {
                    return Step::Ignore;
                }
            }
            Rule::PureFragment => {
                if href.starts_with('#') {
                    return Step::Ignore;
                }
            }
            Rule::ExternalScheme => {
                let same_site = ctx.base_url.and_then(|base| same_site_path(href, base)).is_some();
                if has_network_scheme(href) && !same_site {
                    return Step::External;
                }
            }
            Rule::SameSiteAbsolute => {
                if let Some(path) = ctx.base_url.and_then(|base| same_site_path(href, base)) {
                    findings.push(Issue::new(
                        IssueKind::AbsoluteInternalUrl,
                        format!("Absolute internal URL: {} -> {}", ctx.origin, href),
                    ));
                    *href = path;
                }
            }
            Rule::RelativePath => {
                if !href.starts_with('/') {
                    findings.push(Issue::new(
                        IssueKind::RelativePathUsage,
                        format!("Relative path usage: {} -> {}", ctx.origin, href),
                    ));
                }
            }
            Rule::DirtyUrl => {
                let path = strip_query_and_fragment(href);
                if path.ends_with(ctx.document_suffix) || path.contains(ctx.index_document) {
                    findings.push(Issue::new(
                        IssueKind::DirtyUrl,
                        format!("Dirty URL: {} -> {}", ctx.origin, href),
                    ));
                }
            }
        }
        Step::Next
    }
}

/// How a link ended up after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    Ignored,
    External(String),
    /// A site-internal href, rewritten to root-relative form when it was an
    /// absolute same-site URL.
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub class: LinkClass,
    /// Advisory findings raised on the way (never for ignored links).
    pub findings: Vec<Issue>,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// The standard rule order with the given ignore patterns.
    pub fn new(ignore_url_patterns: &[String]) -> Self {
        Classifier {
            rules: vec![
                Rule::IgnorePatterns(ignore_url_patterns.to_vec()),
                Rule::PureFragment,
                Rule::ExternalScheme,
                Rule::SameSiteAbsolute,
                Rule::RelativePath,
                Rule::DirtyUrl,
            ],
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Decodes a raw href attribute and runs it through every rule.
    pub fn classify(&self, raw_href: &str, ctx: &LinkContext<'_>) -> Classified {
        let mut href = decode_href(raw_href);
        let mut findings = Vec::new();

        for rule in &self.rules {
            match rule.apply(&mut href, ctx, &mut findings) {
                Step::Next => continue,
                Step::Ignore => {
                    return Classified {
                        class: LinkClass::Ignored,
                        findings: Vec::new(),
                    }
                }
                Step::External => {
                    return Classified {
                        class: LinkClass::External(href),
                        findings,
                    }
                }
            }
        }

        Classified {
            class: LinkClass::Internal(href),
            findings,
        }
    }
}

/// Trims and percent-decodes an href. Invalid UTF-8 sequences are replaced
/// rather than rejected.
pub fn decode_href(raw: &str) -> String {
    let trimmed = raw.trim();
    let bytes = urlencoding::decode_binary(trimmed.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Trailing slashes removed so "https://a.com/" and "https://a.com" agree.
pub fn normalize_base_url(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// If `href` points into the site at `base`, returns its root-relative path.
///
/// The prefix must end at a path boundary: with base "https://a.com",
/// "https://a.com.evil.net/x" is not same-site.
pub fn same_site_path(href: &str, base: &str) -> Option<String> {
    if base.is_empty() {
        return None;
    }
    let rest = href.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
        Some(format!("/{}", rest.trim_start_matches('/')))
    } else {
        None
    }
}

fn has_network_scheme(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(base_url: Option<&str>) -> LinkContext<'_> {
        LinkContext {
            origin: "/blog/post.html",
            base_url,
            document_suffix: ".html",
            index_document: "index.html",
        }
    }

    fn defaults() -> Classifier {
        let patterns: Vec<String> = ["/go/", "cdn-cgi", "javascript:", "mailto:", "tel:"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Classifier::new(&patterns)
    }

    fn kinds(findings: &[Issue]) -> Vec<IssueKind> {
        findings.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_ignore_rule_alone() {
        let rule = Rule::IgnorePatterns(vec!["mailto:".into()]);
        let mut href = "mailto:me@example.com".to_string();
        let mut findings = Vec::new();
        assert_eq!(rule.apply(&mut href, &ctx(None), &mut findings), Step::Ignore);
        let mut other = "/about".to_string();
        assert_eq!(rule.apply(&mut other, &ctx(None), &mut findings), Step::Next);
    }

    #[test]
    fn test_same_site_rule_rewrites() {
        let mut href = "https://example.com/blog/a".to_string();
        let mut findings = Vec::new();
        let step = Rule::SameSiteAbsolute.apply(&mut href, &ctx(Some("https://example.com")), &mut findings);
        assert_eq!(step, Step::Next);
        assert_eq!(href, "/blog/a");
        assert_eq!(kinds(&findings), vec![IssueKind::AbsoluteInternalUrl]);
    }

    #[test]
    fn test_ignored_links_produce_nothing() {
        let classifier = defaults();
        for href in ["mailto:a@b.c", "javascript:void(0)", "/go/partner", "#top", "tel:123", "/cdn-cgi/l/email"] {
            let result = classifier.classify(href, &ctx(None));
            assert_eq!(result.class, LinkClass::Ignored, "{href}");
            assert!(result.findings.is_empty());
        }
    }

    #[test]
    fn test_external_link() {
        let result = defaults().classify("https://rust-lang.org/learn", &ctx(Some("https://example.com")));
        assert_eq!(result.class, LinkClass::External("https://rust-lang.org/learn".into()));
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_same_site_absolute_becomes_internal() {
        let result = defaults().classify("https://example.com/about", &ctx(Some("https://example.com")));
        assert_eq!(result.class, LinkClass::Internal("/about".into()));
        assert_eq!(kinds(&result.findings), vec![IssueKind::AbsoluteInternalUrl]);
    }

    #[test]
    fn test_same_site_requires_path_boundary() {
        assert_eq!(same_site_path("https://example.com", "https://example.com").as_deref(), Some("/"));
        assert_eq!(same_site_path("https://example.com/x", "https://example.com").as_deref(), Some("/x"));
        assert_eq!(same_site_path("https://example.com.evil.net/x", "https://example.com"), None);

        let result = defaults().classify("https://example.com.evil.net/x", &ctx(Some("https://example.com")));
        assert!(matches!(result.class, LinkClass::External(_)));
    }

    #[test]
    fn test_without_base_url_absolute_links_are_external() {
        let result = defaults().classify("https://example.com/about", &ctx(None));
        assert!(matches!(result.class, LinkClass::External(_)));
    }

    #[test]
    fn test_relative_and_dirty_are_advisory() {
        let result = defaults().classify("other.html", &ctx(None));
        assert_eq!(result.class, LinkClass::Internal("other.html".into()));
        assert_eq!(kinds(&result.findings), vec![IssueKind::RelativePathUsage, IssueKind::DirtyUrl]);

        let result = defaults().classify("/blog/index.html", &ctx(None));
        assert_eq!(kinds(&result.findings), vec![IssueKind::DirtyUrl]);

        let result = defaults().classify("/blog/post", &ctx(None));
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_href_is_trimmed_and_decoded() {
        let result = defaults().classify("  /caf%C3%A9  ", &ctx(None));
        assert_eq!(result.class, LinkClass::Internal("/café".into()));
        assert_eq!(decode_href("%E4%B8%AD%E6%96%87"), "中文");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://example.com/"), "https://example.com");
        assert_eq!(normalize_base_url(" https://example.com "), "https://example.com");
    }

    #[test]
    fn test_rule_order_is_documented_priority() {
        let classifier = Classifier::new(&[]);
        assert_eq!(
            classifier.rules(),
            &[
                Rule::IgnorePatterns(vec![]),
                Rule::PureFragment,
                Rule::ExternalScheme,
                Rule::SameSiteAbsolute,
                Rule::RelativePath,
                Rule::DirtyUrl,
            ]
        );
    }
}
