//! Model and tessdata fetching shared by the engines
//!
//! Files are cached under the user cache directory and only downloaded when
//! missing. Downloads land in a `.part` file first so an interrupted fetch
//! never leaves a truncated model behind.

use crate::error::OcrEngineError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cache directory for downloaded engine data, optionally nested
pub fn cache_dir(subdir: Option<&str>) -> PathBuf {
    let base = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("nutriscan-ocr");

    match subdir {
        Some(sub) => base.join(sub),
        None => base,
    }
}

/// Ensure `filename` exists in `dir`, downloading it from `url` if needed
pub fn ensure_cached(url: &str, dir: &Path, filename: &str) -> Result<PathBuf, OcrEngineError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        OcrEngineError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    let path = dir.join(filename);

    if !path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &path)?;
        tracing::info!("Downloaded {} to {:?}", filename, path);
    } else {
        tracing::debug!("Using cached {} from {:?}", filename, path);
    }

    Ok(path)
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), OcrEngineError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrEngineError::InitializationError(format!("Failed to download {}: {}", url, e)))?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrEngineError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    let partial = partial_path(path);
    let mut file = File::create(&partial).map_err(|e| {
        OcrEngineError::InitializationError(format!("Failed to create {:?}: {}", partial, e))
    })?;

    file.write_all(&buffer).map_err(|e| {
        OcrEngineError::InitializationError(format!("Failed to write {:?}: {}", partial, e))
    })?;

    std::fs::rename(&partial, path).map_err(|e| {
        OcrEngineError::InitializationError(format!("Failed to move {:?} into place: {}", partial, e))
    })?;

    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_nesting() {
        let base = cache_dir(None);
        assert!(base.ends_with("nutriscan-ocr"));
        assert_eq!(cache_dir(Some("tessdata")), base.join("tessdata"));
    }

    #[test]
    fn test_partial_path() {
        let p = partial_path(Path::new("/tmp/models/text-detection.rten"));
        assert_eq!(p, Path::new("/tmp/models/text-detection.rten.part"));
    }

    #[test]
    fn test_cached_file_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eng.traineddata"), b"cached").unwrap();

        // The URL is unreachable on purpose: a cache hit must not touch it
        let path = ensure_cached("http://127.0.0.1:9/eng", dir.path(), "eng.traineddata").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"cached");
    }
}
