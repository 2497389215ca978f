//! Configuration loading and lookup.

mod builder;
mod coerce;
mod error;
mod file;
mod handle;
mod include;
mod path;
mod reader;

pub use builder::Loader;
pub use coerce::{parse_bool, parse_duration, parse_int, parse_time};
pub use error::{ConfigError, LoadError};
pub use handle::Config;
pub use include::INCLUDE_KEY;
pub use reader::CommentFilter;
