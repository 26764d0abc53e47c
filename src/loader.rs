//! Document loading and writing.
//!
//! Handles loading documents from files, strings, and HTTP URLs, listing
//! input directories, and writing output files atomically.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{LoadError, OutputError};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file doesn't parse as `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content, &path.display().to_string())
}

/// Load a JSON document from a string. `origin` names the source in errors.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string doesn't parse as `T`.
pub fn load_document_str<T: DeserializeOwned>(content: &str, origin: &str) -> Result<T, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson {
        origin: origin.to_string(),
        source,
    })
}

/// Load a JSON document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails,
/// or `LoadError::InvalidJson` if the body doesn't parse as `T`.
#[cfg(feature = "remote")]
pub fn load_document_url<T: DeserializeOwned>(url: &str) -> Result<T, LoadError> {
    let network = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    // Check for HTTP errors before parsing
    let response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(network)?;

    let body = response.text().map_err(network)?;
    load_document_str(&body, url)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load from a URL or a file path, whichever `source` looks like.
/// URL loading requires the `remote` feature.
pub fn load_document_auto<T: DeserializeOwned>(source: &str) -> Result<T, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// `*.json` files in `dir`, sorted by path.
///
/// With `recursive`, subdirectories are descended into as well.
pub fn collect_json_files(dir: &Path, recursive: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(dir, recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect_into(&path, recursive, files)?;
            }
        } else if path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `content` to `path` through a sibling temp file and a rename, so
/// readers never observe a partially written file.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).map_err(|source| OutputError::Write {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        OutputError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn load_document_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"swagger": "2.0"}}"#).unwrap();

        let doc: Value = load_document(file.path()).unwrap();
        assert_eq!(doc["swagger"], "2.0");
    }

    #[test]
    fn load_document_file_not_found() {
        let result = load_document::<Value>(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_document_invalid_json_names_origin() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let err = load_document::<Value>(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidJson { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn load_document_str_invalid() {
        let result = load_document_str::<Value>("not json", "inline");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn is_url_schemes() {
        assert!(is_url("https://example.com/openapi.json"));
        assert!(is_url("http://example.com/openapi.json"));
        assert!(!is_url("/path/to/openapi.json"));
        assert!(!is_url("openapi.json"));
    }

    #[test]
    fn collect_json_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.json"), "{}").unwrap();

        let names = |files: Vec<PathBuf>| -> Vec<String> {
            files
                .iter()
                .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
                .collect()
        };

        let flat = collect_json_files(dir.path(), false).unwrap();
        assert_eq!(names(flat), ["a.json", "b.json"]);

        let deep = collect_json_files(dir.path(), true).unwrap();
        assert_eq!(names(deep), ["a.json", "b.json", "nested/c.json"]);
    }

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/openapi-2.4.json");

        write_atomic(&path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, ["openapi-2.4.json"]);
    }

    #[cfg(feature = "remote")]
    mod remote {
        use super::*;

        #[test]
        fn load_document_url_valid() {
            let mut server = mockito::Server::new();
            let mock = server
                .mock("GET", "/openapi.json")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(r#"{"swagger": "2.0", "paths": {}}"#)
                .create();

            let url = format!("{}/openapi.json", server.url());
            let doc: Value = load_document_url(&url).unwrap();
            assert_eq!(doc["swagger"], "2.0");
            mock.assert();
        }

        #[test]
        fn load_document_url_404() {
            let mut server = mockito::Server::new();
            let _mock = server.mock("GET", "/missing.json").with_status(404).create();

            let url = format!("{}/missing.json", server.url());
            let result = load_document_url::<Value>(&url);
            assert!(matches!(result, Err(LoadError::NetworkError { .. })));
        }

        #[test]
        fn load_document_url_invalid_body() {
            let mut server = mockito::Server::new();
            let _mock = server
                .mock("GET", "/broken.json")
                .with_status(200)
                .with_body("<html>")
                .create();

            let url = format!("{}/broken.json", server.url());
            let result = load_document_url::<Value>(&url);
            assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
        }
    }
}
