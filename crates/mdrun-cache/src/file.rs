//! File-based cache implementation.
//!
//! [`FileCache`] stores cache entries as files on disk, organized into buckets
//! (subdirectories). Keys are hashed into file names, so URLs and other keys
//! with separators are safe. Each entry is a single file with a binary header
//! followed by the data:
//!
//! ```text
//! [key_len: u32 LE][key bytes][data bytes]
//! ```
//!
//! On read, the stored key is compared with the requested one before the data
//! is read, so a hash collision reads as a miss.
//!
//! On construction, [`FileCache`] validates a `VERSION` file in the cache root.
//! If the version mismatches or is missing, the entire cache directory is wiped
//! and recreated.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::{Cache, CacheBucket};

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # contains the cache version string
/// +-- images/            # bucket "images"
///     +-- 3f2a...e1      # entry, named by SHA-256 of its key
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        self.dir.join(hex::encode(hasher.finalize()))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut file = File::open(self.entry_path(key)).ok()?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf).ok()?;
        let key_len = u32::from_le_bytes(len_buf) as usize;
        if key_len != key.len() {
            return None;
        }

        let mut stored_key = vec![0u8; key_len];
        file.read_exact(&mut stored_key).ok()?;
        if stored_key != key.as_bytes() {
            tracing::debug!(key, "cache key collision, treating as miss");
            return None;
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, value: &[u8]) {
        let Ok(key_len) = u32::try_from(key.len()) else {
            return;
        };
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!("failed to create cache bucket directory: {e}");
            return;
        }

        let mut buf = Vec::with_capacity(4 + key.len() + value.len());
        buf.extend_from_slice(&key_len.to_le_bytes());
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(value);

        if let Err(e) = fs::write(self.entry_path(key), &buf) {
            tracing::warn!(key, "failed to write cache entry: {e}");
        }
    }
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://example.com/images/logo.png?size=large";

    #[test]
    fn test_file_bucket_set_and_get_url_key() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("images");

        bucket.set(URL, b"\x89PNG payload");
        assert_eq!(bucket.get(URL), Some(b"\x89PNG payload".to_vec()));
    }

    #[test]
    fn test_file_bucket_entry_is_hashed() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        cache.bucket("images").set(URL, b"data");

        let names: Vec<_> = fs::read_dir(tmp.path().join("cache/images"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].len(), 64);
        assert!(names[0].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_file_bucket_get_nonexistent_key() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        assert_eq!(cache.bucket("images").get("missing"), None);
    }

    #[test]
    fn test_file_bucket_overwrite() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("images");

        bucket.set("key", b"first");
        bucket.set("key", b"second");
        assert_eq!(bucket.get("key"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_file_bucket_rejects_foreign_key() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = FileCacheBucket {
            dir: tmp.path().join("cache/images"),
        };
        bucket.set("real", b"data");

        // Move the entry under another key's file name.
        fs::rename(bucket.entry_path("real"), bucket.entry_path("other")).unwrap();
        assert_eq!(bucket.get("other"), None);
        assert_eq!(cache.bucket("images").get("real"), None);
    }

    #[test]
    fn test_file_cache_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");

        let bucket_a = cache.bucket("alpha");
        let bucket_b = cache.bucket("beta");
        bucket_a.set("key", b"alpha-data");
        bucket_b.set("key", b"beta-data");

        assert_eq!(bucket_a.get("key"), Some(b"alpha-data".to_vec()));
        assert_eq!(bucket_b.get("key"), Some(b"beta-data".to_vec()));
    }

    #[test]
    fn test_file_bucket_binary_data() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let bucket = cache.bucket("images");

        let binary_data: Vec<u8> = vec![0x00, 0x01, 0x0A, 0x0D, 0xFF, 0xFE, 0x80, 0x7F];
        bucket.set("binary", &binary_data);
        assert_eq!(bucket.get("binary"), Some(binary_data));
    }

    #[test]
    fn test_version_match_keeps_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "v1")
            .bucket("images")
            .set("key", b"preserved");

        let cache = FileCache::new(root, "v1");
        assert_eq!(cache.bucket("images").get("key"), Some(b"preserved".to_vec()));
    }

    #[test]
    fn test_version_mismatch_wipes_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "v1")
            .bucket("images")
            .set("key", b"will-be-wiped");

        let cache = FileCache::new(root.clone(), "v2");
        assert_eq!(cache.bucket("images").get("key"), None);
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v2");
    }

    #[test]
    fn test_nonexistent_root_creates_version() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/cache");
        assert!(!root.exists());

        let cache = FileCache::new(root.clone(), "v1");

        assert_eq!(cache.root(), root);
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v1");
    }
}
