//! Locating, reading and decoding config files.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::reader::CommentFilter;
use super::ConfigError;

/// Extra places to look for a relative config path that does not exist
/// relative to the working directory.
#[derive(Debug, Clone, Copy)]
pub struct SearchDirs {
    pub exe_dir: bool,
    pub home_dir: bool,
}

impl Default for SearchDirs {
    fn default() -> Self {
        Self {
            exe_dir: true,
            home_dir: true,
        }
    }
}

/// Resolves the path a config file should be read from.
///
/// Absolute paths are returned unchanged. A relative path is tried against
/// the working directory, then the directory of the running executable,
/// then the user's home directory. If none of them has the file, the path
/// is made absolute against the working directory anyway; opening it will
/// then fail with "not found", which callers treat as an empty config.
pub fn find_path(path: &Path, search: SearchDirs) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if path.exists() {
        return absolute(path);
    }

    let exe_dir = search
        .exe_dir
        .then(|| std::env::current_exe().ok())
        .flatten()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let home_dir = search.home_dir.then(dirs::home_dir).flatten();

    exe_dir
        .into_iter()
        .chain(home_dir)
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| absolute(path))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Reads and decodes a config file.
///
/// Returns `Ok(None)` if the file doesn't exist. The file handle is closed
/// before this returns, whatever the outcome.
pub fn read_tree(path: &Path) -> Result<Option<Map<String, Value>>, ConfigError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let mut contents = String::new();
    CommentFilter::new(BufReader::new(file))
        .read_to_string(&mut contents)
        .map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    let value: Value = json5::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(ConfigError::NotAnObject(path.to_path_buf())),
    }
}
