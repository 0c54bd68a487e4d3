//! On-disk layout of the event store.
//!
//! ```text
//! <root>/
//!     all/                        -- every event, in commit order
//!         01768471200000000000    -- one JSON envelope per file
//!         01768471200000000001
//!     <aggregate id>/             -- the events of one aggregate
//!         01768471200000000000
//! ```
//!
//! File names are ordering keys: nanoseconds since the Unix epoch at commit
//! time, bumped so that every key is strictly greater than the previous one,
//! and zero-padded so that lexical and numeric order agree.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Number of digits in a record file name.
pub const KEY_WIDTH: usize = 20;

/// Path helpers for a store rooted at one directory.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the records of `stream`.
    #[must_use]
    pub fn stream_dir(&self, stream: &str) -> PathBuf {
        self.root.join(stream)
    }

    /// Final path of the record stored under `key` in `stream`.
    #[must_use]
    pub fn record_path(&self, stream: &str, key: u64) -> PathBuf {
        self.stream_dir(stream).join(key_name(key))
    }

    /// Path a record is written to before it is renamed into place. Hidden,
    /// and never parsed as a key, so loaders skip it.
    #[must_use]
    pub fn temp_path(&self, stream: &str, key: u64) -> PathBuf {
        self.stream_dir(stream)
            .join(format!(".{}.tmp", key_name(key)))
    }
}

/// File name for `key`.
#[must_use]
pub fn key_name(key: u64) -> String {
    format!("{key:0width$}", width = KEY_WIDTH)
}

/// Parses a record file name back into its key. Anything that is not exactly
/// [`KEY_WIDTH`] ASCII digits is not a record.
#[must_use]
pub fn parse_key(name: &str) -> Option<u64> {
    if name.len() != KEY_WIDTH || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// Next ordering key: the commit time in nanoseconds, or `last + 1` when the
/// clock has not moved past the previous key.
#[must_use]
pub fn next_key(last: u64, now: DateTime<Utc>) -> u64 {
    let nanos = now
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0);
    nanos.max(last.saturating_add(1))
}
