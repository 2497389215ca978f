use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use super::file::{find_path, read_tree, SearchDirs};
use super::include::resolve_includes;
use super::{Config, ConfigError, LoadError};

/// Loads config files with non-default options.
///
/// [`Config::load`] covers the common case; use a `Loader` to restrict where
/// relative paths are searched for, or to change how includes are handled.
///
/// ## Example
///
/// ```no_run
/// use looseconf::Config;
///
/// let config = Config::loader()
///     .search_home_dir(false)
///     .load("app.conf")
///     .unwrap_or_else(|e| e.into_config());
///
/// let port = config.int("http.port", 80);
/// ```
#[derive(Debug, Clone)]
#[must_use = "loaders do nothing until .load() is called"]
pub struct Loader {
    search: SearchDirs,
    includes: bool,
    detect_cycles: bool,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            search: SearchDirs::default(),
            includes: true,
            detect_cycles: true,
        }
    }
}

impl Loader {
    /// Creates a loader with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a relative path missing from the working directory is looked
    /// up next to the running executable. Enabled by default.
    pub fn search_exe_dir(mut self, enabled: bool) -> Self {
        self.search.exe_dir = enabled;
        self
    }

    /// Whether a relative path is also looked up in the user's home
    /// directory. Enabled by default.
    pub fn search_home_dir(mut self, enabled: bool) -> Self {
        self.search.home_dir = enabled;
        self
    }

    /// Whether `#include#` directives are resolved. Enabled by default; when
    /// disabled the directives stay in the tree as ordinary keys.
    pub fn resolve_includes(mut self, enabled: bool) -> Self {
        self.includes = enabled;
        self
    }

    /// Whether a file that (directly or indirectly) includes itself is
    /// skipped. Enabled by default. With detection off, an include cycle
    /// recurses until the stack overflows.
    pub fn detect_cycles(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// Loads the config file at `path`.
    ///
    /// A file that does not exist is not an error: the result is an empty
    /// config. Read and parse errors are returned as a [`LoadError`], which
    /// still carries a usable empty config.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Config, LoadError> {
        let path = find_path(path.as_ref(), self.search);
        let mut loading = Vec::new();

        match self.load_tree(&path, &mut loading) {
            Ok(map) => Ok(Config::new(path, map)),
            Err(e) => Err(LoadError::new(Config::new(path, Map::new()), e)),
        }
    }

    /// Reads `path` and resolves its includes. `loading` holds the files
    /// whose includes are being resolved further up the stack.
    fn load_tree(
        &self,
        path: &Path,
        loading: &mut Vec<PathBuf>,
    ) -> Result<Map<String, Value>, ConfigError> {
        let id = self.detect_cycles.then(|| canonical(path));
        if let Some(id) = &id {
            if loading.contains(id) {
                return Err(ConfigError::IncludeCycle(path.to_path_buf()));
            }
        }

        let Some(mut map) = read_tree(path)? else {
            debug!(path = %path.display(), "config file not found, using empty config");
            return Ok(Map::new());
        };

        if self.includes {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            let pushed = id.is_some();
            loading.extend(id);
            resolve_includes(&mut map, dir, &mut |target: &Path| {
                self.load_tree(&find_path(target, self.search), loading)
            });
            if pushed {
                loading.pop();
            }
        }

        debug!(path = %path.display(), keys = map.len(), "loaded config file");
        Ok(map)
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
