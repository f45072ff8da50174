// src/checker/html.rs
// =============================================================================
// This module pulls the facts the audit needs out of one HTML document.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so it never rejects a
//   page: broken markup is repaired the same way a browser would repair it
//
// What we extract:
// - how many <h1> elements the page has
// - whether it carries a JSON-LD structured-data block
// - every <a href> value, exactly as written
// - head metadata: <title>, canonical link, keywords
// =============================================================================

use scraper::{Html, Selector};

/// Everything the scanner needs to know about one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFacts {
    pub heading_count: usize,
    pub has_structured_data: bool,
    /// Raw href values in document order (not yet trimmed or decoded).
    pub hrefs: Vec<String>,
    pub title: Option<String>,
    pub canonical: Option<String>,
    pub keywords: Vec<String>,
}

// The selectors are constants, so parsing them can only fail if we typo one
// here. That is a programmer error, hence expect() instead of a Result.
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector must parse")
}

/// Parses an HTML document and collects its [`PageFacts`].
pub fn extract_page_facts(html: &str) -> PageFacts {
    let document = Html::parse_document(html);

    let heading_count = document.select(&selector("h1")).count();

    let has_structured_data = document
        .select(&selector(r#"script[type="application/ld+json"]"#))
        .next()
        .is_some();

    let hrefs = document
        .select(&selector("a[href]"))
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect();

    let title = document
        .select(&selector("title"))
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let canonical = document
        .select(&selector(r#"link[rel~="canonical"][href]"#))
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());

    let keywords = document
        .select(&selector(r#"meta[name="keywords"]"#))
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(split_keywords)
        .unwrap_or_default();

    PageFacts {
        heading_count,
        has_structured_data,
        hrefs,
        title,
        canonical,
        keywords,
    }
}

// "seo, rust ,, audit" -> ["seo", "rust", "audit"]
fn split_keywords(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why collect raw hrefs instead of absolute URLs?
//    - The audit works on files, not on a live server
//    - Whether "/blog" is fine depends on which files exist on disk, which
//      is the resolver's job (see site/resolve.rs)
//    - Keeping the raw value also lets us flag URL hygiene problems
//
// 2. What does [rel~="canonical"] mean?
//    - ~= matches one word in a space-separated list
//    - So rel="canonical alternate" still counts as canonical
//
// 3. Why .filter(|t| !t.is_empty())?
//    - An empty <title></title> is as good as no title for our purposes
//    - Turning it into None keeps callers from special-casing ""
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_headings() {
        assert_eq!(extract_page_facts("<p>none</p>").heading_count, 0);
        assert_eq!(extract_page_facts("<h1>One</h1><h2>sub</h2>").heading_count, 1);
        assert_eq!(extract_page_facts("<h1>One</h1><section><h1>Two</h1></section>").heading_count, 2);
    }

    #[test]
    fn test_detects_structured_data() {
        let html = r#"<head><script type="application/ld+json">{"@type":"Article"}</script></head>"#;
        assert!(extract_page_facts(html).has_structured_data);
        assert!(!extract_page_facts("<script>var x = 1;</script>").has_structured_data);
    }

    #[test]
    fn test_collects_hrefs_in_order() {
        let html = r#"
            <a href="/docs">Docs</a>
            <a>no href</a>
            <a href=" ../about ">About</a>
            <a href="https://rust-lang.org">Rust</a>
        "#;
        let facts = extract_page_facts(html);
        assert_eq!(facts.hrefs, vec!["/docs", " ../about ", "https://rust-lang.org"]);
    }

    #[test]
    fn test_reads_head_metadata() {
        let html = r#"
            <html><head>
              <title> My Site </title>
              <link rel="canonical" href="https://example.com/">
              <meta name="keywords" content="seo, rust ,, audit">
            </head><body></body></html>
        "#;
        let facts = extract_page_facts(html);
        assert_eq!(facts.title.as_deref(), Some("My Site"));
        assert_eq!(facts.canonical.as_deref(), Some("https://example.com/"));
        assert_eq!(facts.keywords, vec!["seo", "rust", "audit"]);
    }

    #[test]
    fn test_missing_metadata_is_none() {
        let facts = extract_page_facts("<html><head><title></title></head></html>");
        assert_eq!(facts.title, None);
        assert_eq!(facts.canonical, None);
        assert!(facts.keywords.is_empty());
    }
}
