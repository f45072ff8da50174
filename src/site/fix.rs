// src/site/fix.rs
// =============================================================================
// Rewrites relative links into clean, root-relative ones.
//
//   in /blog/a.html:   post.html        -> /blog/post
//                      index.html       -> /blog/
//                      ../about.html#me -> /about#me
//
// This is the cure for the Relative_Path_Usage and Dirty_URL findings. By
// default nothing is written; the caller gets the list of rewrites that
// would be made.
// =============================================================================

use crate::checker::extract_page_facts;
use crate::config::AuditConfig;
use crate::site::resolve::PathResolver;
use crate::site::scan::enumerate_documents;
use anyhow::{Context, Result};
use serde::Serialize;
use std::ops::Range;
use tracing::{info, warn};

/// Rewrites for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFix {
    pub identity: String,
    /// (old href, new href) pairs, in first-seen order.
    pub rewrites: Vec<(String, String)>,
}

const LEFT_ALONE: [&str; 6] = ["/", "http", "#", "mailto:", "tel:", "javascript:"];

/// Computes the root-relative clean form of `href` as written in the
/// document `origin`. Returns `None` when the href is already absolute,
/// external or special, or when nothing would change.
pub fn normalize_href(origin: &str, href: &str, document_suffix: &str, index_document: &str) -> Option<String> {
    if LEFT_ALONE.iter().any(|prefix| href.starts_with(prefix)) {
        return None;
    }

    let split = href.find(['?', '#']).unwrap_or(href.len());
    let (path, tail) = href.split_at(split);

    let dir = match origin.rfind('/') {
        Some(pos) => &origin[..=pos],
        None => "/",
    };
    let mut joined = collapse_dot_segments(&format!("{}{}", dir, path));

    if let Some(stripped) = joined.strip_suffix(document_suffix) {
        joined = stripped.to_string();
    }
    let index_stem = index_document.strip_suffix(document_suffix).unwrap_or(index_document);
    if let Some(stripped) = joined.strip_suffix(index_stem) {
        if stripped.ends_with('/') {
            joined = stripped.to_string();
        }
    }

    let normalized = format!("{}{}", joined, tail);
    (normalized != href).then_some(normalized)
}

// Lexically resolves "." and ".." and drops empty segments, keeping a
// trailing slash. ".." never climbs above the root.
fn collapse_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    let mut out = format!("/{}", segments.join("/"));
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Finds (and with `write`, applies) the rewrites for every document.
///
/// Only quoted `href` attributes of `<a>` tags are rewritten.
pub fn fix_links(resolver: &PathResolver, config: &AuditConfig, write: bool) -> Result<Vec<FileFix>> {
    let files = enumerate_documents(
        resolver.root(),
        &config.ignore_dirs,
        &config.ignore_file_patterns,
        &config.document_suffix,
    );

    let mut fixes = Vec::new();
    for path in files {
        let Some(identity) = resolver.identity_of(&path) else {
            continue;
        };
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                // Also covers invalid UTF-8, which we refuse to rewrite
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let anchors = anchor_tags(&text);
        let mut rewrites: Vec<(String, String)> = Vec::new();
        for href in extract_page_facts(&text).hrefs {
            if rewrites.iter().any(|(old, _)| *old == href) {
                continue;
            }
            let Some(new) = normalize_href(&identity, &href, &config.document_suffix, &config.index_document) else {
                continue;
            };
            // Only hrefs that appear verbatim in an anchor tag can be replaced
            let forms = quoted_forms(&href);
            if anchors.iter().any(|tag| forms.iter().any(|form| text[tag.clone()].contains(form.as_str()))) {
                rewrites.push((href, new));
            }
        }
        if rewrites.is_empty() {
            continue;
        }

        if write {
            let updated = rewrite_anchors(&text, &anchors, &rewrites);
            std::fs::write(&path, updated).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Fixed {} link(s) in {}", rewrites.len(), identity);
        }

        fixes.push(FileFix { identity, rewrites });
    }

    Ok(fixes)
}

fn quoted_forms(href: &str) -> [String; 2] {
    [format!("href=\"{}\"", href), format!("href='{}'", href)]
}

// Byte ranges of the `<a ...>` start tags in `text`. Other elements with an
// href (<link>, <area>, <base>) are never touched.
fn anchor_tags(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('<') {
        let start = pos + offset;
        let is_anchor = matches!(bytes.get(start + 1), Some(b'a' | b'A'))
            && bytes.get(start + 2).is_some_and(|b| b.is_ascii_whitespace());
        if !is_anchor {
            pos = start + 1;
            continue;
        }
        match text[start..].find('>') {
            Some(len) => {
                pos = start + len + 1;
                tags.push(start..pos);
            }
            None => break,
        }
    }
    tags
}

// Applies the rewrites inside anchor tags only; everything else is copied as is.
fn rewrite_anchors(text: &str, anchors: &[Range<usize>], rewrites: &[(String, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    for tag in anchors {
        out.push_str(&text[copied..tag.start]);
        let mut tag_text = text[tag.clone()].to_string();
        for (old, new) in rewrites {
            for (from, to) in quoted_forms(old).iter().zip(quoted_forms(new).iter()) {
                tag_text = tag_text.replace(from.as_str(), to);
            }
        }
        out.push_str(&tag_text);
        copied = tag.end;
    }
    out.push_str(&text[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn norm(origin: &str, href: &str) -> Option<String> {
        normalize_href(origin, href, ".html", "index.html")
    }

    #[test]
    fn test_relative_links_become_root_relative() {
        assert_eq!(norm("/blog/a.html", "post.html").as_deref(), Some("/blog/post"));
        assert_eq!(norm("/a.html", "about").as_deref(), Some("/about"));
        assert_eq!(norm("/blog/a.html", "index.html").as_deref(), Some("/blog/"));
        assert_eq!(norm("/blog/a.html", "../about.html#me").as_deref(), Some("/about#me"));
        assert_eq!(norm("/blog/a.html", "./sub//page.html?x=1").as_deref(), Some("/blog/sub/page?x=1"));
    }

    #[test]
    fn test_special_links_are_left_alone() {
        for href in ["/already", "https://x.com", "#top", "mailto:a@b.c", "tel:1", "javascript:void(0)"] {
            assert_eq!(norm("/blog/a.html", href), None, "{href}");
        }
    }

    #[test]
    fn test_dot_segments_never_escape_root() {
        assert_eq!(collapse_dot_segments("/../../x"), "/x");
        assert_eq!(collapse_dot_segments("/a/b/../"), "/a/");
        assert_eq!(collapse_dot_segments("/a/./b"), "/a/b");
    }

    #[test]
    fn test_index_stem_only_stripped_as_whole_segment() {
        assert_eq!(norm("/a.html", "reindex.html").as_deref(), Some("/reindex"));
    }

    #[test]
    fn test_dry_run_leaves_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let original = r#"<a href="b.html">b</a><a href="/c">c</a>"#;
        fs::write(dir.path().join("a.html"), original).unwrap();
        let resolver = PathResolver::new(dir.path(), ".html", "index.html").unwrap();

        let fixes = fix_links(&resolver, &AuditConfig::default(), false).unwrap();
        assert_eq!(
            fixes,
            vec![FileFix {
                identity: "/a.html".into(),
                rewrites: vec![("b.html".into(), "/b".into())],
            }]
        );
        assert_eq!(fs::read_to_string(dir.path().join("a.html")).unwrap(), original);
    }

    #[test]
    fn test_write_rewrites_both_quote_styles() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        let path = dir.path().join("blog/a.html");
        fs::write(&path, r#"<a href="post.html">1</a><a href='post.html'>2</a><a href="/keep">3</a>"#).unwrap();
        let resolver = PathResolver::new(dir.path(), ".html", "index.html").unwrap();

        fix_links(&resolver, &AuditConfig::default(), true).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"<a href="/blog/post">1</a><a href='/blog/post'>2</a><a href="/keep">3</a>"#
        );
    }

    #[test]
    fn test_write_leaves_non_anchor_elements_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.html");
        fs::write(
            &path,
            r#"<link rel="alternate" href="feed.html"><map><area href="feed.html"></map><A HREF="x"></A><a class="nav" href="feed.html">feed</a>"#,
        )
        .unwrap();
        let resolver = PathResolver::new(dir.path(), ".html", "index.html").unwrap();

        let fixes = fix_links(&resolver, &AuditConfig::default(), true).unwrap();
        assert_eq!(fixes[0].rewrites, vec![("feed.html".to_string(), "/feed".to_string())]);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"<link rel="alternate" href="feed.html"><map><area href="feed.html"></map><A HREF="x"></A><a class="nav" href="/feed">feed</a>"#
        );
    }

    #[test]
    fn test_href_only_outside_anchors_is_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        // The anchor spells its href with unquoted syntax, so only <link> carries the quoted form
        fs::write(dir.path().join("a.html"), r#"<link href="b.html"><a href=b.html>b</a>"#).unwrap();
        let resolver = PathResolver::new(dir.path(), ".html", "index.html").unwrap();

        assert!(fix_links(&resolver, &AuditConfig::default(), false).unwrap().is_empty());
    }
}
