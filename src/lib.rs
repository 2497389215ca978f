//! Configuration files in relaxed JSON, with includes and path lookups.
//!
//! Files are JSON5 (comments, unquoted keys, trailing commas) where lines
//! starting with `//` or `;` are also comments. A mapping can pull in other
//! files with the reserved `#include#` key:
//!
//! ```text
//! {
//!     // http settings
//!     http: {
//!         addr: "www.example.com",
//!         ports: [80, 8080],
//!     },
//!     "#include#": "others.conf",
//! }
//! ```
//!
//! The key must be written quoted, as `"#include#"`: an unquoted
//! `#include#` is not a valid JSON5 key and fails to parse.
//!
//! Values are read with typed accessors that take a path expression and a
//! default:
//!
//! ```no_run
//! use looseconf::Config;
//!
//! let config = Config::load("app.conf").unwrap_or_else(|e| e.into_config());
//! let addr = config.string("http.addr", "localhost");
//! let port = config.int("http.ports[1]", 80);
//! ```

pub mod config;

pub use config::{Config, ConfigError, LoadError, Loader};
