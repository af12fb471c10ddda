//! # Filesystem Walker
//!
//! Read-only traversal behind list_directory, find_files, search_code and
//! explore_codebase. Walks are synchronous; the executor wraps them. All
//! returned paths are relative to the walked root, in traversal order.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::errors::ExecutionError;
use crate::domain::result::{DirNode, DirSummary, FileMatches, MatchLine, NodeKind};

/// Directories never descended into.
const SKIP_DIRS: &[&str] = &["__pycache__", "node_modules", "target", ".git", "venv"];

/// Extensions search_code considers source text.
const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "toml", "py", "js", "jsx", "ts", "tsx", "html", "css", "json",
];

/// Filenames explore_codebase always treats as relevant project config.
const CONFIG_GLOBS: &[&str] = &[
    "*.json",
    "*.toml",
    "*.yaml",
    "*.yml",
    "requirements.txt",
    "package.json",
];

/// Words too common to count as query keywords.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "in", "on", "at", "to", "for", "with", "by", "about", "like", "that", "this",
];

/// Files above this size are skipped by content scans.
const MAX_SCAN_BYTES: u64 = 1024 * 1024;

/// Bounded-depth directory tree. Directories sort before files, both
/// alphabetical; hidden entries and skip-listed directories are omitted.
pub fn directory_tree(root: &Path, max_depth: usize) -> Result<DirNode, ExecutionError> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    build_node(root, &name, ".".to_string(), max_depth)
}

fn build_node(
    path: &Path,
    name: &str,
    rel: String,
    depth_left: usize,
) -> Result<DirNode, ExecutionError> {
    let mut node = DirNode {
        name: name.to_string(),
        path: rel.clone(),
        kind: NodeKind::Directory,
        children: Vec::new(),
    };
    if depth_left == 0 {
        return Ok(node);
    }

    let mut dirs: Vec<(String, std::path::PathBuf)> = Vec::new();
    let mut files: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let entry_name = entry.file_name().to_string_lossy().to_string();
        if skip_entry(&entry_name) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            dirs.push((entry_name, entry.path()));
        } else {
            files.push(entry_name);
        }
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    files.sort();

    for (dir_name, dir_path) in dirs {
        let child_rel = join_rel(&rel, &dir_name);
        node.children
            .push(build_node(&dir_path, &dir_name, child_rel, depth_left - 1)?);
    }
    for file_name in files {
        let child_rel = join_rel(&rel, &file_name);
        node.children.push(DirNode {
            name: file_name,
            path: child_rel,
            kind: NodeKind::File,
            children: Vec::new(),
        });
    }
    Ok(node)
}

/// Recursive glob match over file names. Results are root-relative, in
/// traversal order; identical inputs always produce identical output.
pub fn find_files(root: &Path, pattern: &str) -> Result<Vec<String>, ExecutionError> {
    let matcher = glob_to_regex(pattern)?;
    let mut found = Vec::new();
    walk_files(root, root, &mut |rel, path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if matcher.is_match(&name) {
            found.push(rel.to_string());
        }
        Ok(())
    })?;
    Ok(found)
}

/// Case-insensitive substring search across source files. Zero matches is a
/// successful empty result, not an error.
pub fn search_code(root: &Path, pattern: &str) -> Result<Vec<FileMatches>, ExecutionError> {
    let needle = pattern.to_lowercase();
    let mut results = Vec::new();

    walk_files(root, root, &mut |rel, path| {
        if !is_source_file(path) || !scannable(path) {
            return Ok(());
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            // binary or unreadable, skip silently
            Err(_) => return Ok(()),
        };
        let lines: Vec<&str> = content.lines().collect();
        let mut matches = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if line.to_lowercase().contains(&needle) {
                let start = i.saturating_sub(2);
                let end = (i + 3).min(lines.len());
                matches.push(MatchLine {
                    line_number: i + 1,
                    line: line.to_string(),
                    context: lines[start..end].iter().map(|l| l.to_string()).collect(),
                });
            }
        }
        if !matches.is_empty() {
            results.push(FileMatches {
                file: rel.to_string(),
                matches,
            });
        }
        Ok(())
    })?;
    Ok(results)
}

/// Output of one exploration pass.
pub struct Exploration {
    /// Relevant files, highest keyword score first, capped.
    pub files: Vec<String>,
    /// Relevant files found before the cap.
    pub files_found: usize,
    /// Per-directory census of the whole tree.
    pub structure: BTreeMap<String, DirSummary>,
}

/// Keyword-driven relevance scan. Files score one point per distinct query
/// keyword in their name or content; project config files are always
/// relevant. Ties keep traversal order, output capped at `limit`.
pub fn explore(root: &Path, query: &str, limit: usize) -> Result<Exploration, ExecutionError> {
    let keywords = query_keywords(query);
    let config_matchers: Vec<Regex> = CONFIG_GLOBS
        .iter()
        .map(|glob| glob_to_regex(glob))
        .collect::<Result<_, _>>()?;

    let mut scored: Vec<(usize, String)> = Vec::new();
    let mut structure: BTreeMap<String, DirSummary> = BTreeMap::new();

    walk_files(root, root, &mut |rel, path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let dir_key = match rel.rsplit_once('/') {
            Some((dir, _)) => dir.to_string(),
            None => "root".to_string(),
        };
        let summary = structure.entry(dir_key).or_default();
        summary.file_count += 1;
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        *summary.file_types.entry(ext).or_insert(0) += 1;

        let mut score = 0usize;
        let lower_name = name.to_lowercase();
        if config_matchers.iter().any(|m| m.is_match(&name)) {
            score += 1;
        }
        for keyword in &keywords {
            if lower_name.contains(keyword.as_str()) {
                score += 1;
            }
        }
        if !keywords.is_empty() && is_source_file(path) && scannable(path) {
            if let Ok(content) = std::fs::read_to_string(path) {
                let lower = content.to_lowercase();
                for keyword in &keywords {
                    if lower.contains(keyword.as_str()) {
                        score += 1;
                    }
                }
            }
        }
        if score > 0 {
            scored.push((score, rel.to_string()));
        }
        Ok(())
    })?;

    let files_found = scored.len();
    // stable sort preserves traversal order among equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    let files = scored
        .into_iter()
        .take(limit)
        .map(|(_, file)| file)
        .collect();

    Ok(Exploration {
        files,
        files_found,
        structure,
    })
}

/// Lowercased query words longer than three characters, stop words removed.
/// Order follows the query; duplicates are dropped.
fn query_keywords(query: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in query.to_lowercase().split_whitespace() {
        let word: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if word.len() > 3 && !STOP_WORDS.contains(&word.as_str()) && !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}

/// Translate a shell glob (`*`, `?`) into an anchored case-sensitive regex.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, ExecutionError> {
    let mut regex = String::with_capacity(pattern.len() + 4);
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| ExecutionError::External(format!("Invalid pattern: {}", e)))
}

/// Depth-first walk in sorted order, directories first, calling `visit` for
/// every kept file with its root-relative path.
fn walk_files(
    root: &Path,
    dir: &Path,
    visit: &mut dyn FnMut(&str, &Path) -> Result<(), ExecutionError>,
) -> Result<(), ExecutionError> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if skip_entry(&name) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }
    dirs.sort();
    files.sort();

    for file in files {
        let rel = relative(root, &file);
        visit(&rel, &file)?;
    }
    for sub in dirs {
        walk_files(root, &sub, visit)?;
    }
    Ok(())
}

fn skip_entry(name: &str) -> bool {
    name.starts_with('.') || SKIP_DIRS.contains(&name)
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            SOURCE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn scannable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.len() <= MAX_SCAN_BYTES)
        .unwrap_or(false)
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn join_rel(base: &str, name: &str) -> String {
    if base == "." {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}
