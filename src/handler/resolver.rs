//! Request path resolution
//!
//! Maps a request path onto the served root and decides what the client
//! gets to see: a file, a directory listing, nothing (404) or a refusal
//! (403). Only filesystem reads happen here.

use percent_encoding::percent_decode_str;
use std::fs::Metadata;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::config::ServerConfig;
use crate::logger;

/// File served in place of a directory listing
pub const INDEX_FILE: &str = "index.html";

/// What a request path resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A regular file inside the root
    File(PathBuf),
    /// A directory without an index file, with its visible entries
    Directory(PathBuf, Vec<ListingEntry>),
    /// Missing, ignored, or not something that can be served
    NotFound,
    /// Traversal attempt, symlink escaping the root, or permission denied
    Forbidden,
}

/// One visible entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Why a request path was rejected before touching the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRejection {
    InvalidEncoding,
    ParentSegment,
    ReservedCharacter,
}

/// A path that exists inside the root and is not ignored
struct Located {
    path: PathBuf,
    metadata: Metadata,
    segments: Vec<String>,
}

/// Resolve `request_path` (the raw, still percent-encoded URI path)
/// against the configured root.
pub async fn resolve(config: &ServerConfig, request_path: &str) -> Resolution {
    let segments = match decode_segments(request_path) {
        Ok(segments) => segments,
        Err(rejection) => {
            if rejection == PathRejection::ParentSegment {
                logger::log_traversal_blocked(request_path);
            }
            return Resolution::Forbidden;
        }
    };

    let candidate = segments
        .iter()
        .fold(config.root.clone(), |path, segment| path.join(segment));

    let located = match locate(config, &segments, &candidate, request_path).await {
        Ok(located) => located,
        Err(resolution) => return resolution,
    };

    if located.metadata.is_file() {
        return Resolution::File(located.path);
    }
    if !located.metadata.is_dir() {
        // Sockets, FIFOs and devices are never served
        return Resolution::NotFound;
    }

    let mut index_segments = segments;
    index_segments.push(INDEX_FILE.to_string());
    let index_candidate = located.path.join(INDEX_FILE);
    match locate(config, &index_segments, &index_candidate, request_path).await {
        Ok(index) if index.metadata.is_file() => return Resolution::File(index.path),
        Ok(_) | Err(Resolution::NotFound) => {}
        Err(resolution) => return resolution,
    }

    match list_directory(config, &located.path, &located.segments).await {
        Ok(entries) => Resolution::Directory(located.path, entries),
        Err(e) => from_io_error(&e, &located.path),
    }
}

/// Percent-decode a request path and split it into root-relative segments.
///
/// Empty and `.` segments are dropped; `..` anywhere is a rejection.
pub fn decode_segments(request_path: &str) -> Result<Vec<String>, PathRejection> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| PathRejection::InvalidEncoding)?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(PathRejection::ParentSegment),
            s if s.contains(['\\', '\0']) => return Err(PathRejection::ReservedCharacter),
            s => segments.push(s.to_string()),
        }
    }
    Ok(segments)
}

/// Follow symlinks and apply the root and ignore-list checks, both to the
/// path as requested and to where it really points.
async fn locate(
    config: &ServerConfig,
    segments: &[String],
    candidate: &Path,
    request_path: &str,
) -> Result<Located, Resolution> {
    // Ancestors are directories, the last segment is checked again below
    // once its type is known
    if config.ignore.is_ignored(segments, false) {
        return Err(Resolution::NotFound);
    }

    let real = fs::canonicalize(candidate)
        .await
        .map_err(|e| from_io_error(&e, candidate))?;

    let Some(real_segments) = relative_segments(&config.root, &real) else {
        logger::log_traversal_blocked(request_path);
        return Err(Resolution::Forbidden);
    };

    let metadata = fs::metadata(&real)
        .await
        .map_err(|e| from_io_error(&e, &real))?;

    let is_dir = metadata.is_dir();
    if config.ignore.is_ignored(segments, is_dir) || config.ignore.is_ignored(&real_segments, is_dir)
    {
        return Err(Resolution::NotFound);
    }

    Ok(Located {
        path: real,
        metadata,
        segments: real_segments,
    })
}

/// Segments of `path` below `root`, `None` if it lies outside
fn relative_segments(root: &Path, path: &Path) -> Option<Vec<String>> {
    let relative = path.strip_prefix(root).ok()?;
    Some(
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect(),
    )
}

/// Visible entries of `dir`, directories first, each group sorted by name
async fn list_directory(
    config: &ServerConfig,
    dir: &Path,
    dir_segments: &[String],
) -> io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        // Names that are not UTF-8 cannot be linked to
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };

        // Entries removed between readdir and stat are skipped
        let Ok(file_type) = entry.file_type().await else {
            continue;
        };

        let mut entry_segments = dir_segments.to_vec();
        entry_segments.push(name.clone());

        let is_dir = if file_type.is_symlink() {
            match symlink_target(config, &entry.path()).await {
                Some(target) if !config.ignore.is_ignored(&target.segments, target.is_dir) => {
                    target.is_dir
                }
                // Links a client could not follow are left out
                _ => continue,
            }
        } else {
            file_type.is_dir()
        };

        if config.ignore.is_ignored(&entry_segments, is_dir) {
            continue;
        }

        entries.push(ListingEntry { name, is_dir });
    }

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

/// Where a listed symlink really points, relative to the root
struct SymlinkTarget {
    segments: Vec<String>,
    is_dir: bool,
}

/// `None` when the link is broken or leaves the root
async fn symlink_target(config: &ServerConfig, link: &Path) -> Option<SymlinkTarget> {
    let real = fs::canonicalize(link).await.ok()?;
    let segments = relative_segments(&config.root, &real)?;
    let metadata = fs::metadata(&real).await.ok()?;
    Some(SymlinkTarget {
        segments,
        is_dir: metadata.is_dir(),
    })
}

fn from_io_error(err: &io::Error, path: &Path) -> Resolution {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => Resolution::NotFound,
        ErrorKind::PermissionDenied => Resolution::Forbidden,
        _ => {
            logger::log_error(&format!("Failed to resolve '{}': {err}", path.display()));
            Resolution::Forbidden
        }
    }
}
