//! Cache abstraction layer for mdrun.
//!
//! Two traits decouple cache consumers from the underlying storage:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Byte-level key-value store
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use mdrun_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("images");
//! bucket.set("https://example.com/a.png", b"\x89PNG");
//! assert_eq!(bucket.get("https://example.com/a.png"), None); // NullCache always misses
//! ```

mod file;

pub use file::FileCache;

/// A named partition within a [`Cache`].
///
/// Keys are arbitrary strings (URLs included); implementations map them onto
/// their own storage layout.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value, or `None` on miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, overwriting any existing entry for the same key.
    ///
    /// Storage failures are logged and otherwise ignored.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets from one cache are logically isolated from each other.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name may return
    /// independent handles that share the same underlying storage.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when persistent caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
