//! Removal of documentation build artefacts, by glob, after confirmation.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use glob::Pattern;
use thiserror::Error;
use walkdir::WalkDir;

/// Pattern groups offered for deletion, one confirmation each.
pub const TEX_PATTERN_GROUPS: &[&str] = &[
    "*.ps",
    "*.log",
    "*.bbl;comment.cut",
    "*.bbl;*.sav;*.bak;*.synctex;*.log;*.svn",
    "*.blg;*.dfn;*.smb;*.bak;*.aux;*.out;*.lot;*.lof;*.toc;*.tex.bak;*.dvi;*.efc;Backup_of_*.*;*.abr",
];

pub const PROMPT: &str = "Delete these files? (y/n)";

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compile `;`-separated glob patterns.
pub fn parse_patterns(patterns: &str) -> Result<Vec<Pattern>, CleanupError> {
    patterns
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Pattern::new(p).map_err(CleanupError::from))
        .collect()
}

/// Files (and folders, if asked) under `root` whose name matches any pattern.
/// Only the file name is matched, never the directory part.
pub fn list_files(
    root: &Path,
    patterns: &str,
    recurse: bool,
    return_folders: bool,
) -> Result<Vec<PathBuf>, CleanupError> {
    let patterns = parse_patterns(patterns)?;
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !recurse {
        walker = walker.max_depth(1);
    }

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        let is_file = entry.file_type().is_file();
        if !is_file && !(return_folders && entry.file_type().is_dir()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if patterns.iter().any(|p| p.matches(&name)) {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// List matching files on `output`, ask for confirmation on `input`, and delete
/// them only on an exact `y`. Returns the number of files removed.
pub fn query_delete(
    recurse: bool,
    dir: &Path,
    patterns: &str,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<usize, CleanupError> {
    let files = list_files(dir, patterns, recurse, false)?;
    if files.is_empty() {
        return Ok(0);
    }

    for file in &files {
        writeln!(output, "{}", file.display())?;
    }
    write!(output, "{PROMPT}")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    if answer.trim_end_matches(['\r', '\n']) != "y" {
        tracing::debug!("Kept {} file(s) matching '{}'", files.len(), patterns);
        return Ok(0);
    }

    let mut removed = 0;
    for file in &files {
        match std::fs::remove_file(file) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Cannot delete {:?}: {}", file, e),
        }
    }
    tracing::info!("Deleted {} file(s) matching '{}'", removed, patterns);
    Ok(removed)
}
