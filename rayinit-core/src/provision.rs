use regex::Regex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Result, ScaffoldError};
use crate::templates::Template;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// Rejects empty names always, and names that would break the generated
/// scripts or CMake identifiers when `strict` is set.
pub fn validate_project_name(name: &str, strict: bool) -> Result<()> {
    if name.is_empty() {
        return Err(ScaffoldError::InvalidProjectName {
            name: name.to_string(),
            reason: "name cannot be empty".to_string(),
        });
    }
    if !strict {
        return Ok(());
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(ScaffoldError::InvalidProjectName {
            name: name.to_string(),
            reason: "only letters, digits, '_' and '-' are allowed, starting with a letter or '_'"
                .to_string(),
        });
    }
    Ok(())
}

/// Directories every project gets, followed by each ancestor of
/// `vendor_dest` so parents are always created before children.
pub fn project_directories(vendor_dest: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("src"), PathBuf::from("res")];
    let mut current = PathBuf::new();
    for component in vendor_dest.components() {
        if let Component::Normal(part) = component {
            current.push(part);
            if !dirs.contains(&current) {
                dirs.push(current.clone());
            }
        }
    }
    dirs
}

/// Creates each directory in order. Any failure is fatal, including a
/// directory that already exists.
pub fn create_directories(root: &Path, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut created = Vec::with_capacity(paths.len());
    for rel in paths {
        let path = root.join(rel);
        fs::create_dir(&path).map_err(|source| ScaffoldError::CreateDirectory {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Created directory: {}", rel.display());
        created.push(path);
    }
    Ok(created)
}

/// Creates or truncates `path` and writes every template line followed by a
/// newline, substituting `project_name` into placeholder lines.
pub fn create_templated_file(path: &Path, lines: &[&str], project_name: &str) -> Result<()> {
    let write_err = |source| ScaffoldError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    tracing::info!("Creating {}...", path.display());

    let mut writer = BufWriter::new(file);
    for line in lines {
        writer
            .write_all(Template::render_line(line, project_name).as_bytes())
            .map_err(write_err)?;
        writer.write_all(b"\n").map_err(write_err)?;
    }
    writer.flush().map_err(write_err)
}

#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        ScaffoldError::Permissions {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
