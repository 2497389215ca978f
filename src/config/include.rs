//! `#include#` directive resolution.
//!
//! A mapping may name other config files under the reserved key:
//!
//! ```text
//! {
//!     http: { addr: "www.example.com" },
//!     "#include#": ["base.conf", "local.conf"],
//! }
//! ```
//!
//! Each named file is loaded relative to the including file's directory and
//! its top-level keys are copied into the mapping that holds the directive.
//! Included keys replace existing ones; with several files, later files win.

use std::collections::HashSet;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::ConfigError;

/// Reserved key holding include directives.
pub const INCLUDE_KEY: &str = "#include#";

/// Resolves every include directive in `map` and below it.
///
/// `load` is called with the full path of each included file and must
/// return that file's own fully resolved tree. A file that fails to load is
/// logged and skipped. The directive key is removed either way.
pub fn resolve_includes<F>(map: &mut Map<String, Value>, dir: &Path, load: &mut F)
where
    F: FnMut(&Path) -> Result<Map<String, Value>, ConfigError>,
{
    let mut included = HashSet::new();

    if let Some(directive) = map.remove(INCLUDE_KEY) {
        for target in include_targets(&directive) {
            let path = dir.join(target);
            match load(&path) {
                Ok(sub) => {
                    debug!(path = %path.display(), keys = sub.len(), "merged include");
                    for (key, value) in sub {
                        included.insert(key.clone());
                        map.insert(key, value);
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping include"),
            }
        }
    }

    // Included trees were resolved by their own load.
    for (key, value) in map.iter_mut() {
        if !included.contains(key) {
            resolve_value(value, dir, load);
        }
    }
}

fn resolve_value<F>(value: &mut Value, dir: &Path, load: &mut F)
where
    F: FnMut(&Path) -> Result<Map<String, Value>, ConfigError>,
{
    match value {
        Value::Object(map) => resolve_includes(map, dir, load),
        Value::Array(items) => {
            for item in items.iter_mut() {
                resolve_value(item, dir, load);
            }
        }
        _ => {}
    }
}

fn include_targets(directive: &Value) -> Vec<&str> {
    match directive {
        Value::String(path) => vec![path.as_str()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let path = item.as_str();
                if path.is_none() {
                    debug!(entry = %item, "ignoring non-string include entry");
                }
                path
            })
            .collect(),
        other => {
            warn!(directive = %other, "include directive must be a path or a list of paths");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    /// Loader backed by an in-memory set of files; records every request.
    struct FakeFiles {
        files: HashMap<PathBuf, Map<String, Value>>,
        requested: Vec<PathBuf>,
    }

    impl FakeFiles {
        fn new(files: &[(&str, Value)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(path, value)| (PathBuf::from(path), object(value.clone())))
                    .collect(),
                requested: Vec::new(),
            }
        }

        fn resolve(&mut self, map: &mut Map<String, Value>, dir: &str) {
            let files = &self.files;
            let requested = &mut self.requested;
            resolve_includes(map, Path::new(dir), &mut |path: &Path| {
                requested.push(path.to_path_buf());
                files
                    .get(path)
                    .cloned()
                    .ok_or_else(|| ConfigError::ReadError {
                        path: path.to_path_buf(),
                        source: std::io::ErrorKind::NotFound.into(),
                    })
            });
        }
    }

    #[test]
    fn test_no_directive_is_noop() {
        let original = object(json!({
            "a": {"b": [1, {"c": true}]},
            "d": "text"
        }));
        let mut map = original.clone();
        let mut files = FakeFiles::new(&[]);
        files.resolve(&mut map, "/conf");

        assert_eq!(map, original);
        assert!(files.requested.is_empty());
    }

    #[test]
    fn test_single_include_overwrites_host() {
        let mut map = object(json!({"v": 1, "host": "kept", "#include#": "sub.conf"}));
        let mut files = FakeFiles::new(&[("/conf/sub.conf", json!({"v": 2, "extra": "x"}))]);
        files.resolve(&mut map, "/conf");

        assert_eq!(map, object(json!({"v": 2, "host": "kept", "extra": "x"})));
    }

    #[test]
    fn test_include_list_later_wins() {
        let mut map = object(json!({"#include#": ["a.conf", 7, "b.conf"]}));
        let mut files = FakeFiles::new(&[
            ("/conf/a.conf", json!({"v": "a", "only_a": 1})),
            ("/conf/b.conf", json!({"v": "b"})),
        ]);
        files.resolve(&mut map, "/conf");

        assert_eq!(map, object(json!({"v": "b", "only_a": 1})));
        assert_eq!(
            files.requested,
            vec![PathBuf::from("/conf/a.conf"), PathBuf::from("/conf/b.conf")]
        );
    }

    #[test]
    fn test_failed_include_still_removes_directive() {
        let mut map = object(json!({"v": 1, "#include#": "missing.conf"}));
        let mut files = FakeFiles::new(&[]);
        files.resolve(&mut map, "/conf");

        assert_eq!(map, object(json!({"v": 1})));
    }

    #[test]
    fn test_partial_failure_in_list() {
        let mut map = object(json!({"#include#": ["missing.conf", "b.conf"]}));
        let mut files = FakeFiles::new(&[("/conf/b.conf", json!({"v": "b"}))]);
        files.resolve(&mut map, "/conf");

        assert_eq!(map, object(json!({"v": "b"})));
    }

    #[test]
    fn test_nested_directives() {
        let mut map = object(json!({
            "http": {"#include#": "http.conf", "port": 80},
            "entries": [{"#include#": "entry.conf"}, [{"#include#": "entry.conf"}], "plain"]
        }));
        let mut files = FakeFiles::new(&[
            ("/conf/http.conf", json!({"port": 8080})),
            ("/conf/entry.conf", json!({"name": "e"})),
        ]);
        files.resolve(&mut map, "/conf");

        assert_eq!(
            map,
            object(json!({
                "http": {"port": 8080},
                "entries": [{"name": "e"}, [{"name": "e"}], "plain"]
            }))
        );
    }

    #[test]
    fn test_invalid_directive_value_removed() {
        let mut map = object(json!({"#include#": {"path": "a.conf"}, "v": 1}));
        let mut files = FakeFiles::new(&[]);
        files.resolve(&mut map, "/conf");

        assert_eq!(map, object(json!({"v": 1})));
        assert!(files.requested.is_empty());
    }

    #[test]
    fn test_included_content_not_walked_again() {
        // An included tree comes back already resolved; a leftover directive
        // in it would mean the loader chose not to resolve it.
        let mut map = object(json!({"#include#": "raw.conf"}));
        let mut files = FakeFiles::new(&[(
            "/conf/raw.conf",
            json!({"inner": {"#include#": "other.conf"}}),
        )]);
        files.resolve(&mut map, "/conf");

        assert_eq!(map, object(json!({"inner": {"#include#": "other.conf"}})));
        assert_eq!(files.requested, vec![PathBuf::from("/conf/raw.conf")]);
    }
}
