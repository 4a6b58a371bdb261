//! Persistence layer for question collections.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary) formats,
//! and loading every collection file below a corpus directory.

use crate::collection::Collection;
use crate::error::{RankerError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Save format for collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json, // Default to JSON
        }
    }

    /// Whether `path` has an extension this module can read.
    pub fn is_supported(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("bin") | Some("bincode")
        )
    }
}

/// Save a collection to a file.
pub fn save_collection(collection: &Collection, path: &Path) -> Result<()> {
    let format = SaveFormat::from_path(path);
    save_collection_with_format(collection, path, format)
}

/// Save a collection with specific format.
pub fn save_collection_with_format(
    collection: &Collection,
    path: &Path,
    format: SaveFormat,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| RankerError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(collection)?.into_bytes(),
        SaveFormat::Bincode => bincode::encode_to_vec(collection, bincode::config::standard())?,
    };

    fs::write(path, &data).map_err(|e| RankerError::io(path, e))?;

    Ok(())
}

/// Load a collection from a file.
pub fn load_collection(path: &Path) -> Result<Collection> {
    if !path.is_file() {
        return Err(RankerError::CollectionNotFound(path.to_path_buf()));
    }

    let format = SaveFormat::from_path(path);
    load_collection_with_format(path, format)
}

/// Load a collection with specific format.
pub fn load_collection_with_format(path: &Path, format: SaveFormat) -> Result<Collection> {
    let data = fs::read(path).map_err(|e| RankerError::io(path, e))?;

    let collection = match format {
        SaveFormat::Json => serde_json::from_slice(&data)?,
        SaveFormat::Bincode => {
            let (collection, _): (Collection, usize) =
                bincode::decode_from_slice(&data, bincode::config::standard())?;
            collection
        }
    };

    Ok(collection)
}

/// Load and merge every collection file below `dir`, in path order.
///
/// The merged collection is named after the directory.
pub fn load_collection_dir(dir: &Path) -> Result<Collection> {
    if !dir.is_dir() {
        return Err(RankerError::InvalidCorpusPath(dir.to_path_buf()));
    }

    let name = dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("corpus")
        .to_string();
    let mut merged = Collection::new(name);
    let mut files = 0;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            RankerError::io(path, e.into())
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !SaveFormat::is_supported(path) {
            continue;
        }

        debug!(path = %path.display(), "loading collection file");
        merged.merge(load_collection(path)?);
        files += 1;
    }

    if files == 0 {
        return Err(RankerError::EmptyCorpus(dir.to_path_buf()));
    }

    Ok(merged)
}

/// Load a collection from a file or a corpus directory.
pub fn load_collection_path(path: &Path) -> Result<Collection> {
    if path.is_dir() {
        load_collection_dir(path)
    } else {
        load_collection(path)
    }
}

/// Get the size of a collection file in bytes.
pub fn collection_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| RankerError::io(path, e))?;
    Ok(metadata.len())
}
