// src/site/resolve.rs
// =============================================================================
// Maps an href found in a document to the file it points at on disk.
//
// Static hosts serve the same file under several URL shapes, so a link is
// tried three ways, in this order:
//
//   1. literally             /img/logo.png  -> img/logo.png
//   2. with the doc suffix   /blog/post     -> blog/post.html   ("clean URL")
//   3. as a directory        /blog/         -> blog/index.html  ("pretty URL")
//
// A trailing slash is dropped before adding the suffix, so `/blog/` can also
// land on blog.html.
//
// The literal shape comes first so a real asset is never shadowed by a
// synthetic "<asset>.html" twin.
// =============================================================================

use std::io;
use std::path::{Component, Path, PathBuf};

/// Outcome of resolving one href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The href names an existing regular file; holds its identity ("/blog/a.html").
    Found(String),
    /// No shape matched anything inside the site.
    NotFound,
    /// No shape matched, and at least one shape pointed outside the site root.
    OutsideRoot,
}

impl Resolution {
    pub fn found(&self) -> Option<&str> {
        match self {
            Resolution::Found(identity) => Some(identity),
            _ => None,
        }
    }
}

/// What a single candidate path turned out to be.
enum ShapeCheck {
    File(PathBuf),
    Missing,
    Escaped,
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    document_suffix: String,
    index_document: String,
}

impl PathResolver {
    /// Creates a resolver for the site at `root`. The root is canonicalized
    /// once here so every containment check compares like with like.
    pub fn new(root: &Path, document_suffix: &str, index_document: &str) -> io::Result<Self> {
        Ok(PathResolver {
            root: root.canonicalize()?,
            document_suffix: document_suffix.to_string(),
            index_document: index_document.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `href` as written inside the document `origin` (an identity).
    pub fn resolve(&self, origin: &str, href: &str) -> Resolution {
        let clean = strip_query_and_fragment(href);
        let candidate = self.candidate(origin, clean);

        let mut shapes = Vec::with_capacity(3);
        shapes.push(candidate.clone());
        // `/blog/` may still be served by `blog.html`.
        let stem = clean.trim_end_matches('/');
        if !stem.is_empty() {
            let mut suffixed = self.candidate(origin, stem).into_os_string();
            suffixed.push(&self.document_suffix);
            shapes.push(PathBuf::from(suffixed));
        }
        shapes.push(candidate.join(&self.index_document));

        let mut escaped = false;
        for shape in shapes {
            match self.check_shape(&shape) {
                ShapeCheck::File(path) => {
                    if let Some(identity) = self.identity_of(&path) {
                        return Resolution::Found(identity);
                    }
                }
                ShapeCheck::Escaped => escaped = true,
                ShapeCheck::Missing => {}
            }
        }

        if escaped {
            Resolution::OutsideRoot
        } else {
            Resolution::NotFound
        }
    }

    /// Root-relative identity of a path inside the site, with forward
    /// slashes on every platform. `None` for paths outside the root.
    pub fn identity_of(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Some(format!("/{}", parts.join("/")))
    }

    // Root-relative paths start at the root, everything else at the origin's directory.
    fn candidate(&self, origin: &str, path: &str) -> PathBuf {
        if path.starts_with('/') {
            self.root.join(path.trim_start_matches('/'))
        } else {
            self.origin_dir(origin).join(path)
        }
    }

    fn origin_dir(&self, origin: &str) -> PathBuf {
        let origin_path = self.root.join(origin.trim_start_matches('/'));
        match origin_path.parent() {
            Some(dir) => dir.to_path_buf(),
            None => self.root.clone(),
        }
    }

    // Filesystem errors (missing components, permission problems, symlink
    // loops) all mean "this shape doesn't match".
    fn check_shape(&self, shape: &Path) -> ShapeCheck {
        let canonical = match shape.canonicalize() {
            Ok(path) => path,
            Err(_) => return ShapeCheck::Missing,
        };
        if !canonical.starts_with(&self.root) {
            return ShapeCheck::Escaped;
        }
        if canonical.is_file() {
            ShapeCheck::File(canonical)
        } else {
            ShapeCheck::Missing
        }
    }
}

/// Drops everything from the first `?` or `#` onwards.
pub fn strip_query_and_fragment(href: &str) -> &str {
    match href.find(['?', '#']) {
        Some(pos) => &href[..pos],
        None => href,
    }
}
