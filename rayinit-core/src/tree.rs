//! Selective recursive copy and recursive removal of directory trees.
//!
//! Both walks are permissive: a source that is not a readable directory is a
//! silent no-op, entries that are neither directories nor regular files are
//! skipped, and per-entry I/O failures are logged and skipped rather than
//! aborting the walk.

use serde::Deserialize;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, ScaffoldError};

/// Which built-in exclusion rules a [`TreeFilter`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPolicy {
    /// Only exclude an entry named like the destination path.
    #[default]
    FormatOnly,
    /// Also exclude `index` and anything whose name contains `.sh` or `.txt`.
    Vendor,
}

const VENDOR_EXCLUDED_NAMES: &[&str] = &["index"];
const VENDOR_EXCLUDED_SUBSTRINGS: &[&str] = &[".sh", ".txt"];

/// Per-entry exclusion predicate. Rules compose by OR.
#[derive(Debug, Clone, Default)]
pub struct TreeFilter {
    excluded_names: Vec<String>,
    excluded_substrings: Vec<String>,
    excluded_globs: Vec<glob::Pattern>,
}

impl TreeFilter {
    /// Builds the filter for a copy into `dest`. The destination is matched
    /// against entry names as given, so a copy of `.` into `build` never
    /// descends into `build` itself.
    pub fn new(policy: FilterPolicy, dest: &Path) -> Self {
        let mut filter = TreeFilter {
            excluded_names: vec![dest.to_string_lossy().into_owned()],
            ..Default::default()
        };
        if policy == FilterPolicy::Vendor {
            filter
                .excluded_names
                .extend(VENDOR_EXCLUDED_NAMES.iter().map(|s| s.to_string()));
            filter.excluded_substrings = VENDOR_EXCLUDED_SUBSTRINGS
                .iter()
                .map(|s| s.to_string())
                .collect();
        }
        filter
    }

    /// Adds glob patterns matched against entry names. Invalid patterns are
    /// dropped with a warning.
    pub fn with_globs(mut self, patterns: &[String]) -> Self {
        for p in patterns {
            match glob::Pattern::new(p) {
                Ok(gp) => self.excluded_globs.push(gp),
                Err(e) => tracing::warn!("Ignoring invalid exclude pattern '{}': {}", p, e),
            }
        }
        self
    }

    pub fn excludes(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.excluded_names.iter().any(|n| *n == name)
            || self
                .excluded_substrings
                .iter()
                .any(|s| name.contains(s.as_str()))
            || self.excluded_globs.iter().any(|g| g.matches(&name))
    }
}

/// An entry the copier could not handle, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub directories_created: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl CopyReport {
    pub fn skip(&mut self, path: &Path, reason: impl ToString) {
        let reason = reason.to_string();
        tracing::warn!("Skipping {}: {}", path.display(), reason);
        self.skipped.push(SkippedEntry {
            path: path.to_path_buf(),
            reason,
        });
    }

    pub fn merge(&mut self, other: CopyReport) {
        self.files_copied += other.files_copied;
        self.bytes_copied += other.bytes_copied;
        self.directories_created += other.directories_created;
        self.skipped.extend(other.skipped);
    }
}

/// Byte-for-byte copy of a regular file. The destination is created or
/// truncated; no metadata is carried over.
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    let mut src_file = File::open(src)?;
    let mut dest_file = File::create(dest)?;
    tracing::debug!("Copying file: {} to {}", src.display(), dest.display());
    io::copy(&mut src_file, &mut dest_file)
}

fn ensure_dir(path: &Path) -> io::Result<bool> {
    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

/// Recursively copies the entries of `source` accepted by `filter` into
/// `dest`, mirroring the directory structure.
///
/// Returns an error only when `dest` itself cannot be created.
pub fn copy_tree(source: &Path, dest: &Path, filter: &TreeFilter) -> Result<CopyReport> {
    let mut report = CopyReport::default();

    if let Err(e) = fs::read_dir(source) {
        tracing::debug!("Nothing to copy from {}: {}", source.display(), e);
        return Ok(report);
    }

    if ensure_dir(dest).map_err(|source| ScaffoldError::CopyDestination {
        path: dest.to_path_buf(),
        source,
    })? {
        report.directories_created += 1;
    }

    let mut entries = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !filter.excludes(e.file_name()));

    while let Some(entry) = entries.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().unwrap_or(source).to_path_buf();
                report.skip(&path, e);
                continue;
            }
        };
        let rel = match entry.path().strip_prefix(source) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let target = dest.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            match ensure_dir(&target) {
                Ok(true) => report.directories_created += 1,
                Ok(false) => {}
                Err(e) => {
                    report.skip(entry.path(), format!("cannot create {}: {}", target.display(), e));
                    entries.skip_current_dir();
                }
            }
        } else if file_type.is_file() {
            match copy_file(entry.path(), &target) {
                Ok(bytes) => {
                    report.files_copied += 1;
                    report.bytes_copied += bytes;
                }
                Err(e) => report.skip(entry.path(), e),
            }
        }
    }

    tracing::info!(
        "Copied {} files ({} bytes) from {} to {}",
        report.files_copied,
        report.bytes_copied,
        source.display(),
        dest.display()
    );
    Ok(report)
}

/// Deletes every regular file and directory below `path`, leaving `path`
/// itself in place. Other entry types are left untouched. Returns the number
/// of entries removed.
pub fn remove_tree(path: &Path) -> usize {
    if fs::read_dir(path).is_err() {
        return 0;
    }

    let mut removed = 0;
    for entry in WalkDir::new(path)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Cannot read entry under {}: {}", path.display(), e);
                continue;
            }
        };
        let file_type = entry.file_type();
        let result = if file_type.is_dir() {
            fs::remove_dir(entry.path())
        } else if file_type.is_file() {
            fs::remove_file(entry.path())
        } else {
            continue;
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => tracing::debug!("Cannot remove {}: {}", entry.path().display(), e),
        }
    }
    removed
}
