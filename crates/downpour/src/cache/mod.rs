//! # Cache System
//!
//! On-disk layout, key mapping, lookup and age-based eviction of cache
//! entries. An entry is a single file named after its URL directly under the
//! cache root; in-progress downloads live under `temp/` until promoted.

mod engine;
mod key;
mod layout;
mod sweep;

pub use engine::DownpourCache;
pub use key::CacheKey;
pub use layout::{CacheLayout, TEMP_DIR_NAME};
pub use sweep::{SweepReport, sweep};
