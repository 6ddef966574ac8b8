//! `.env` file loading.
//!
//! `KEY=VALUE` per line; blank lines and lines starting with `#` are
//! skipped, as are lines without `=`. Keys and values are trimmed. A missing
//! file is not an error.

use crate::error::AppResult;
use std::path::Path;

/// Parse `.env` content into key/value pairs, in file order.
pub fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Load `path` into the process environment.
///
/// Returns the number of variables set; 0 when the file does not exist.
/// Call before any other thread is started.
pub fn load_env_file(path: impl AsRef<Path>) -> AppResult<usize> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let pairs = parse_env(&content);
    for (key, value) in &pairs {
        std::env::set_var(key, value);
    }
    Ok(pairs.len())
}
