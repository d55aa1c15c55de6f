//! Specification loading from files, strings, and HTTP URLs.
//!
//! Every loader returns a fully dereferenced document: `$ref` pointers are
//! replaced by the content they point to, so later lookups never have to
//! chase references.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ConfigError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load and dereference a specification file.
///
/// Relative file references are resolved against the file's directory.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if the file doesn't exist,
/// `ConfigError::InvalidJson` if the file isn't valid JSON, or
/// `ConfigError::RefError` if a `$ref` cannot be resolved.
pub fn load_spec(path: &Path) -> Result<Value, ConfigError> {
    let mut document = read_json(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    dereference(&mut document, base_dir)?;
    tracing::debug!(path = %path.display(), "loaded specification");
    Ok(document)
}

/// Load and dereference a specification from a JSON string.
///
/// Relative file references are resolved against the current directory.
pub fn load_spec_str(content: &str) -> Result<Value, ConfigError> {
    let mut document: Value =
        serde_json::from_str(content).map_err(|source| ConfigError::InvalidJson { source })?;
    dereference(&mut document, Path::new("."))?;
    Ok(document)
}

/// Load and dereference a specification from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default). Only internal
/// (`#/...`) references are resolved for remote documents.
///
/// # Errors
///
/// Returns `ConfigError::NetworkError` if the request fails or the
/// response isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_spec_url(url: &str) -> Result<Value, ConfigError> {
    let network_error = |source| ConfigError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    // Check for HTTP errors before parsing
    let mut document: Value = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network_error)?;

    dereference(&mut document, Path::new("."))?;
    tracing::debug!(url, "loaded remote specification");
    Ok(document)
}

/// Load a specification from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_spec_auto(source: &str) -> Result<Value, ConfigError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_spec_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ConfigError::FileNotFound {
                path: PathBuf::from(source),
            })
        }
    } else {
        load_spec(Path::new(source))
    }
}

/// Read a JSON file without touching its references.
pub fn read_json(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::InvalidJson { source })
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Navigate a JSON Pointer fragment (e.g., "#/definitions/Book").
///
/// The fragment may start with '#'. An empty fragment returns the whole document.
pub fn navigate_fragment(document: &Value, fragment: &str) -> Result<Value, ConfigError> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Ok(document.clone());
    }

    let mut current = document;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        let next = match current {
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(&key),
        };
        current = next.ok_or_else(|| ConfigError::RefError {
            message: format!("fragment not found: {}", fragment),
        })?;
    }
    Ok(current.clone())
}

/// Replace every `$ref` in `document` with the content it points to.
///
/// Internal refs (`#/...`) resolve against the document that contains them;
/// relative file refs resolve against `base_dir`. Self-root refs
/// (`$ref: "#"`) are left as-is since they describe recursive types.
/// Keys next to a `$ref` are dereferenced too and override the target's keys.
///
/// # Errors
///
/// Returns `ConfigError::RefError` for missing targets, circular references,
/// and absolute `http(s)` refs, which are never fetched.
pub fn dereference(document: &mut Value, base_dir: &Path) -> Result<(), ConfigError> {
    let root = document.clone();
    let context = RefContext {
        root: &root,
        base_dir,
        file_key: String::from("<root>"),
    };
    dereference_inner(document, &context, &mut HashSet::new())
}

/// The document that internal refs currently resolve against.
struct RefContext<'a> {
    root: &'a Value,
    base_dir: &'a Path,
    file_key: String,
}

fn dereference_inner(
    value: &mut Value,
    context: &RefContext<'_>,
    visited: &mut HashSet<String>,
) -> Result<(), ConfigError> {
    if let Some(ref_val) = value.get("$ref").and_then(Value::as_str).map(str::to_owned) {
        if ref_val != "#" {
            if let Value::Object(obj) = value {
                for (key, child) in obj.iter_mut() {
                    if key != "$ref" {
                        dereference_inner(child, context, visited)?;
                    }
                }
            }
            let target = resolve_ref(&ref_val, context, visited)?;
            inline(value, target);
            return Ok(());
        }
    }

    match value {
        Value::Object(obj) => {
            for child in obj.values_mut() {
                dereference_inner(child, context, visited)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                dereference_inner(item, context, visited)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn resolve_ref(
    ref_val: &str,
    context: &RefContext<'_>,
    visited: &mut HashSet<String>,
) -> Result<Value, ConfigError> {
    let (file_part, fragment) = match ref_val.find('#') {
        Some(idx) => (&ref_val[..idx], &ref_val[idx..]),
        None => (ref_val, ""),
    };

    if file_part.is_empty() {
        let visit_key = format!("{}|{}", context.file_key, fragment);
        enter(visited, &visit_key, ref_val)?;
        let mut target = navigate_fragment(context.root, fragment)?;
        dereference_inner(&mut target, context, visited)?;
        visited.remove(&visit_key);
        return Ok(target);
    }

    if is_url(file_part) {
        return Err(ConfigError::RefError {
            message: format!("remote reference not supported: {}", ref_val),
        });
    }

    let ref_path = context.base_dir.join(file_part);
    let canonical = ref_path.canonicalize().unwrap_or_else(|_| ref_path.clone());
    let file_key = canonical.display().to_string();
    let visit_key = format!("{}|{}", file_key, fragment);
    enter(visited, &visit_key, ref_val)?;

    let loaded = read_json(&ref_path)?;
    let mut target = navigate_fragment(&loaded, fragment)?;
    let child = RefContext {
        root: &loaded,
        base_dir: ref_path.parent().unwrap_or(context.base_dir),
        file_key,
    };
    dereference_inner(&mut target, &child, visited)?;
    visited.remove(&visit_key);
    Ok(target)
}

fn enter(visited: &mut HashSet<String>, key: &str, ref_val: &str) -> Result<(), ConfigError> {
    if visited.insert(key.to_string()) {
        Ok(())
    } else {
        Err(ConfigError::RefError {
            message: format!("circular reference detected: {}", ref_val),
        })
    }
}

/// Merge the resolved target into the referencing object.
///
/// Sibling keys next to `$ref` win over keys from the target.
fn inline(value: &mut Value, target: Value) {
    match (value, target) {
        (Value::Object(obj), Value::Object(resolved)) => {
            obj.remove("$ref");
            for (k, v) in resolved {
                obj.entry(k).or_insert(v);
            }
        }
        (value, target) => *value = target,
    }
}

/// Default specification location relative to an application root.
pub fn default_spec_path(root: &Path) -> PathBuf {
    root.join("schemas").join("oas.json")
}
