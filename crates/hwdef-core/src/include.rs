//! Include flattening with a shared, hash-tracked cache
//!
//! A definition file may pull in other files with `include <relative-path>`.
//! [`IncludeResolver`] replaces each include line, in place, with the
//! recursively resolved lines of the referenced file. Comment and blank lines
//! are kept (header comments are extracted from them later).
//!
//! Resolved files are stored in an [`IncludeCache`] keyed by canonical path.
//! Each entry records the SHA256 of the bytes it was built from, so stale
//! entries can be dropped explicitly with [`IncludeCache::invalidate_stale`].

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::source::SourceTree;

/// Include recursion cap used when no configuration says otherwise
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// A fully resolved file as stored in the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    /// SHA256 of the file's own bytes
    pub sha: String,
    /// Flattened lines, includes expanded
    pub lines: Vec<String>,
    /// Files pulled in (transitively), first-seen order
    pub includes: Vec<PathBuf>,
    /// Diagnostics raised while resolving this file's includes
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolved-file store shared between board parses
#[derive(Debug, Default)]
pub struct IncludeCache {
    entries: RwLock<HashMap<PathBuf, Arc<CachedFile>>>,
}

impl IncludeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved file by canonical path
    pub fn get(&self, path: &Path) -> Option<Arc<CachedFile>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).cloned()
    }

    /// Store a resolved file. Concurrent inserts of the same path are harmless;
    /// the last one wins and both hold identical content.
    pub fn insert(&self, path: PathBuf, file: CachedFile) -> Arc<CachedFile> {
        let file = Arc::new(file);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(path, Arc::clone(&file));
        file
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Drop every entry whose file, or any file it includes, changed or vanished.
    /// Returns the number of entries removed.
    pub fn invalidate_stale(&self, tree: &dyn SourceTree) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let stale: Vec<PathBuf> = entries
            .keys()
            .filter(|path| match tree.read(path) {
                Ok(bytes) => entries.get(*path).map(|e| e.sha != sha256_hex(&bytes)).unwrap_or(true),
                Err(_) => true,
            })
            .cloned()
            .collect();

        // An entry that embeds a stale file is stale as well
        let dependents: Vec<PathBuf> = entries
            .iter()
            .filter(|(_, file)| file.includes.iter().any(|inc| stale.contains(inc)))
            .map(|(path, _)| path.clone())
            .collect();

        let mut removed = 0;
        for path in stale.iter().chain(dependents.iter()) {
            if entries.remove(path).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "Invalidated stale include cache entries");
        }
        removed
    }
}

/// Output of resolving one top-level definition file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLines {
    pub lines: Vec<String>,
    pub includes: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Flattens a definition file and everything it includes
pub struct IncludeResolver<'a> {
    tree: &'a dyn SourceTree,
    cache: &'a IncludeCache,
    max_depth: usize,
}

/// Per-file intermediate; `truncated` marks results cut short by the depth cap
struct Partial {
    lines: Vec<String>,
    includes: Vec<PathBuf>,
    diagnostics: Vec<Diagnostic>,
    truncated: bool,
}

impl Partial {
    fn empty(diagnostic: Diagnostic, truncated: bool) -> Self {
        Self {
            lines: Vec::new(),
            includes: Vec::new(),
            diagnostics: vec![diagnostic],
            truncated,
        }
    }

    fn from_cached(file: &CachedFile) -> Self {
        Self {
            lines: file.lines.clone(),
            includes: file.includes.clone(),
            diagnostics: file.diagnostics.clone(),
            truncated: false,
        }
    }
}

impl<'a> IncludeResolver<'a> {
    pub fn new(tree: &'a dyn SourceTree, cache: &'a IncludeCache) -> Self {
        Self {
            tree,
            cache,
            max_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve `path` and all of its includes into one ordered line sequence.
    /// Never fails: missing files and over-deep nesting become diagnostics.
    pub fn resolve(&self, path: &Path) -> ResolvedLines {
        let path = self.tree.canonicalize(path);
        let partial = self.resolve_at(&path, 0);
        ResolvedLines {
            lines: partial.lines,
            includes: partial.includes,
            diagnostics: partial.diagnostics,
        }
    }

    fn resolve_at(&self, path: &Path, depth: usize) -> Partial {
        if depth > self.max_depth {
            warn!(path = %path.display(), max_depth = self.max_depth, "Include depth exceeded, stopping");
            return Partial::empty(
                Diagnostic::new(
                    DiagnosticKind::IncludeDepth,
                    format!("include depth > {} at {}", self.max_depth, path.display()),
                ),
                true,
            );
        }

        if let Some(cached) = self.cache.get(path) {
            return Partial::from_cached(&cached);
        }

        if !self.tree.is_file(path) {
            warn!(path = %path.display(), "File not found");
            return Partial::empty(
                Diagnostic::new(DiagnosticKind::MissingFile, format!("file not found: {}", path.display())),
                false,
            );
        }

        let bytes = match self.tree.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read file");
                return Partial::empty(
                    Diagnostic::new(
                        DiagnosticKind::UnreadableFile,
                        format!("cannot read {}: {}", path.display(), e),
                    ),
                    false,
                );
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut out = Partial {
            lines: Vec::new(),
            includes: Vec::new(),
            diagnostics: Vec::new(),
            truncated: false,
        };

        for raw_line in text.lines() {
            let line = raw_line.trim();

            let mut parts = line.splitn(2, char::is_whitespace);
            if parts.next() != Some("include") {
                out.lines.push(line.to_string());
                continue;
            }

            let Some(target) = parts.next().map(str::trim).filter(|t| !t.is_empty()) else {
                out.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::MalformedInclude,
                    format!("include without a path in {}", path.display()),
                ));
                continue;
            };

            let resolved = self.tree.canonicalize(&base_dir.join(target));
            debug!(from = %path.display(), include = %resolved.display(), depth, "Resolving include");

            let nested = self.resolve_at(&resolved, depth + 1);
            if !out.includes.contains(&resolved) {
                out.includes.push(resolved);
            }
            for inc in nested.includes {
                if !out.includes.contains(&inc) {
                    out.includes.push(inc);
                }
            }
            out.lines.extend(nested.lines);
            out.diagnostics.extend(nested.diagnostics);
            out.truncated |= nested.truncated;
        }

        if !out.truncated {
            self.cache.insert(
                path.to_path_buf(),
                CachedFile {
                    sha: sha256_hex(&bytes),
                    lines: out.lines.clone(),
                    includes: out.includes.clone(),
                    diagnostics: out.diagnostics.clone(),
                },
            );
        }
        out
    }
}

/// Compute SHA256 hash of data and return as hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
