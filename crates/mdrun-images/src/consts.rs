//! Internal constants for image loading.

/// Default in-memory cache capacity in payload bytes (50 MiB).
pub const DEFAULT_MEMORY_CAPACITY: usize = 50 * 1024 * 1024;

/// Default maximum display width in points.
pub const DEFAULT_MAX_WIDTH: f32 = 300.0;

/// Placeholder height as a fraction of its width.
pub const PLACEHOLDER_ASPECT: f32 = 0.6;

/// Largest response body accepted from the network (20 MiB).
pub const DEFAULT_BODY_LIMIT: u64 = 20 * 1024 * 1024;

/// Bucket holding raw image payloads in a persistent cache.
pub const PAYLOAD_BUCKET: &str = "images";

/// Default `User-Agent` header for image requests.
pub const DEFAULT_USER_AGENT: &str = concat!("mdrun/", env!("CARGO_PKG_VERSION"));
