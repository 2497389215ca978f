use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::builder::Loader;
use super::coerce;
use super::path::{lookup, lookup_mut};
use super::{ConfigError, LoadError};

/// A loaded configuration tree.
///
/// Values are addressed with path expressions: keys separated by `.`, with
/// optional array indexes, e.g. `http.ports[1]` or `entries[2][0].name`.
/// The empty path addresses the whole tree.
///
/// Lookups never fail. Every accessor takes a default that is returned when
/// the path does not exist or the value there cannot be converted.
///
/// Cloning a `Config` is cheap and yields a handle on the same tree.
/// [`section`](Self::section) handles also share their parent's tree, so a
/// change made through [`modify`](Self::modify) on one handle is seen by all
/// of them. Sections follow their path, not a particular node.
///
/// ## Example
///
/// ```no_run
/// use looseconf::Config;
///
/// let config = Config::load("app.conf").unwrap_or_else(|e| e.into_config());
///
/// let addr = config.string("http.addr", "localhost");
/// let port = config.int("http.ports[0]", 80);
/// let users = config.string_list("http.users", Vec::new());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    root: Arc<RwLock<Value>>,
    anchor: String,
}

impl Config {
    /// Loads a config file with the default [`Loader`] options.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Loader::new().load(path)
    }

    /// Creates a [`Loader`] for loading with custom options.
    pub fn loader() -> Loader {
        Loader::new()
    }

    /// An empty config with no origin file.
    pub fn empty() -> Self {
        Self::from_map(Map::new())
    }

    /// Wraps an in-memory tree. Include directives in it are not resolved.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self::new(PathBuf::new(), map)
    }

    pub(crate) fn new(path: PathBuf, map: Map<String, Value>) -> Self {
        Self {
            path,
            root: Arc::new(RwLock::new(Value::Object(map))),
            anchor: String::new(),
        }
    }

    /// The file this config was loaded from. Sections report their parent's
    /// file.
    pub fn conf_path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` on the value at `key`. `None` if the key is absent or `f`
    /// rejects the value.
    fn get<T>(&self, key: &str, f: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let base = lookup(&root, &self.anchor).filter(|base| base.is_object())?;
        lookup(base, key).and_then(f)
    }

    /// The raw value at `key`.
    pub fn value(&self, key: &str, default: Value) -> Value {
        self.get(key, |v| Some(v.clone())).unwrap_or(default)
    }

    /// A string, number or boolean as text. Numbers and booleans are
    /// formatted (`8080`, `2.5`, `true`).
    pub fn string(&self, key: &str, default: &str) -> String {
        self.get(key, coerce::to_text)
            .unwrap_or_else(|| default.to_string())
    }

    /// A filesystem path, read as with [`string`](Self::string).
    pub fn path(&self, key: &str, default: impl AsRef<Path>) -> PathBuf {
        self.get(key, coerce::to_text)
            .map(PathBuf::from)
            .unwrap_or_else(|| default.as_ref().to_path_buf())
    }

    /// A boolean, or a string such as `"true"`, `"F"` or `"1"`.
    pub fn bool(&self, key: &str, default: bool) -> bool {
        self.get(key, coerce::to_bool).unwrap_or(default)
    }

    /// A number rounded to the nearest integer (halves away from zero), or a
    /// string holding an integer literal (`"42"`, `"0x2a"`, `"052"`).
    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.get(key, coerce::to_int).unwrap_or(default)
    }

    /// A number, or a string holding a float literal.
    pub fn float(&self, key: &str, default: f64) -> f64 {
        self.get(key, coerce::to_float).unwrap_or(default)
    }

    /// An object.
    pub fn object(&self, key: &str, default: Map<String, Value>) -> Map<String, Value> {
        self.get(key, |v| v.as_object().cloned()).unwrap_or(default)
    }

    /// An array, elements unconverted.
    pub fn list(&self, key: &str, default: Vec<Value>) -> Vec<Value> {
        self.get(key, |v| v.as_array().cloned()).unwrap_or(default)
    }

    /// An array with every element as text. Nested arrays and objects are
    /// rendered as JSON.
    pub fn string_list(&self, key: &str, default: Vec<String>) -> Vec<String> {
        self.get(key, |v| {
            v.as_array()
                .map(|items| items.iter().map(coerce::to_text_lossy).collect())
        })
        .unwrap_or(default)
    }

    /// An array with every element converted as by [`int`](Self::int).
    /// Booleans become 1 or 0; elements that cannot be converted become 0.
    pub fn int_list(&self, key: &str, default: Vec<i64>) -> Vec<i64> {
        self.get(key, |v| {
            v.as_array()
                .map(|items| items.iter().map(coerce::to_int_or_zero).collect())
        })
        .unwrap_or(default)
    }

    /// A duration string such as `"1m2s"` or `"250ms"`.
    pub fn duration(&self, key: &str, default: Duration) -> Duration {
        self.get(key, coerce::to_duration).unwrap_or(default)
    }

    /// A timestamp string parsed with a chrono `strftime` layout, e.g.
    /// `"%Y-%m-%d %H:%M:%S"`. Timestamps without an offset are taken as UTC.
    pub fn time(&self, key: &str, layout: &str, default: DateTime<Utc>) -> DateTime<Utc> {
        self.get(key, |v| coerce::to_time(v, layout))
            .unwrap_or(default)
    }

    /// Deserializes the value at `key` into `T`.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self
            .get(key, |v| Some(v.clone()))
            .ok_or_else(|| ConfigError::SectionNotFound(key.to_string()))?;
        serde_json::from_value(value).map_err(|source| ConfigError::Decode {
            key: key.to_string(),
            source,
        })
    }

    /// A handle on the object at `key`.
    ///
    /// The section views the same tree as `self`; it is not a copy. Keys in
    /// the section are relative to `key`.
    ///
    /// A section is anchored to the path `key`, not to the object found
    /// there when it was created: every read re-resolves `key` in the shared
    /// tree. If the parent later replaces the object under `key`, the section
    /// sees the replacement; if an element is inserted before an indexed
    /// section such as `list[0]`, the section moves to whatever element is
    /// now at that index. When `key` no longer resolves to an object the
    /// section reads as empty.
    pub fn section(&self, key: &str) -> Result<Config, ConfigError> {
        if self.get(key, |v| v.as_object().map(|_| ())).is_none() {
            return Err(ConfigError::SectionNotFound(key.to_string()));
        }

        let anchor = match (self.anchor.is_empty(), key.is_empty()) {
            (true, _) => key.to_string(),
            (false, true) => self.anchor.clone(),
            (false, false) => format!("{}.{}", self.anchor, key),
        };

        Ok(Config {
            path: self.path.clone(),
            root: Arc::clone(&self.root),
            anchor,
        })
    }

    /// Runs `f` with mutable access to this handle's object.
    ///
    /// Returns `None` without calling `f` when a section no longer points at
    /// an object, e.g. after its parent replaced it.
    pub fn modify<R>(&self, f: impl FnOnce(&mut Map<String, Value>) -> R) -> Option<R> {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        lookup_mut(&mut root, &self.anchor)
            .and_then(Value::as_object_mut)
            .map(f)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}
