//! Cache-aside image store.
//!
//! [`ImageCache`] maps normalized URLs to decoded images held in a
//! weight-bounded `moka` cache with LRU eviction. [`lookup`] is a synchronous
//! memory probe; [`fetch`] falls through to an optional persistent payload
//! cache and then the network, decoding and storing the result. Failures are
//! returned to the caller and never cached.
//!
//! Concurrent fetches of one URL are independent: each performs its own
//! retrieval, and the last to finish wins the slot.
//!
//! [`lookup`]: ImageCache::lookup
//! [`fetch`]: ImageCache::fetch

use std::sync::Arc;

use mdrun_cache::{Cache, CacheBucket, NullCacheBucket};
use moka::policy::EvictionPolicy;
use url::Url;

use crate::consts::{DEFAULT_MEMORY_CAPACITY, PAYLOAD_BUCKET};
use crate::decode::DecodedImage;
use crate::error::FetchError;
use crate::source::ImageSource;

/// Normalize `url` into the form used as cache key.
///
/// Scheme and host are lowercased, default ports dropped and the path
/// normalized.
pub fn normalize_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_owned(),
        source,
    })
}

fn byte_capacity(bytes: usize) -> u64 {
    u64::try_from(bytes).unwrap_or(u64::MAX)
}

fn weight(image: &DecodedImage) -> u64 {
    byte_capacity(image.byte_len())
}

fn memory_store(capacity: u64) -> moka::sync::Cache<String, Arc<DecodedImage>> {
    moka::sync::Cache::builder()
        .max_capacity(capacity)
        .weigher(|_url: &String, image: &Arc<DecodedImage>| {
            u32::try_from(weight(image)).unwrap_or(u32::MAX)
        })
        .eviction_policy(EvictionPolicy::lru())
        .build()
}

/// Process-lifetime image cache, created once and passed explicitly.
pub struct ImageCache {
    entries: moka::sync::Cache<String, Arc<DecodedImage>>,
    capacity: u64,
    source: Arc<dyn ImageSource>,
    payloads: Arc<dyn CacheBucket>,
}

impl ImageCache {
    /// Create a cache with the default memory capacity and no persistent layer.
    pub fn new(source: impl ImageSource) -> Self {
        let capacity = byte_capacity(DEFAULT_MEMORY_CAPACITY);
        Self {
            entries: memory_store(capacity),
            capacity,
            source: Arc::new(source),
            payloads: Arc::new(NullCacheBucket),
        }
    }

    /// Bound the memory store to `bytes`, weighing each image by
    /// [`DecodedImage::byte_len`].
    ///
    /// Replaces the memory store, dropping any entries.
    #[must_use]
    pub fn with_memory_capacity(self, bytes: usize) -> Self {
        let capacity = byte_capacity(bytes);
        Self {
            entries: memory_store(capacity),
            capacity,
            ..self
        }
    }

    /// Persist raw payloads in `cache` so later processes skip the network.
    #[must_use]
    pub fn with_payload_cache(self, cache: &dyn Cache) -> Self {
        Self {
            payloads: Arc::from(cache.bucket(PAYLOAD_BUCKET)),
            ..self
        }
    }

    /// Return the cached image for `url`, without any I/O.
    ///
    /// Unparsable URLs are never cached and read as a miss.
    pub fn lookup(&self, url: &str) -> Option<Arc<DecodedImage>> {
        let key = normalize_url(url).ok()?;
        self.entries.get(key.as_str())
    }

    /// Return the image for `url`, retrieving and decoding it on a miss.
    ///
    /// An image heavier than the whole memory capacity is returned but not
    /// retained, so every fetch of it goes back to the payload cache or the
    /// network.
    pub async fn fetch(&self, url: &str) -> Result<Arc<DecodedImage>, FetchError> {
        let url = normalize_url(url)?;
        let key = url.as_str().to_owned();

        if let Some(image) = self.entries.get(&key) {
            tracing::debug!(url = %key, "image cache hit");
            return Ok(image);
        }
        tracing::debug!(url = %key, "image cache miss");

        let source = Arc::clone(&self.source);
        let payloads = Arc::clone(&self.payloads);
        let image = tokio::task::spawn_blocking(move || load(&*source, &*payloads, &url))
            .await
            .map_err(|e| FetchError::Join(e.to_string()))?
            .inspect_err(|e| tracing::warn!(url = %key, "image fetch failed: {e}"))?;

        let image = Arc::new(image);
        self.store(key, Arc::clone(&image));
        Ok(image)
    }

    fn store(&self, key: String, image: Arc<DecodedImage>) {
        let weight = weight(&image);
        if weight > self.capacity {
            tracing::warn!(
                url = %key,
                weight,
                capacity = self.capacity,
                "image exceeds memory cache capacity, not retained"
            );
            return;
        }
        self.entries.insert(key, image);
    }

    /// Drop all in-memory entries. In-flight fetches are not cancelled.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        tracing::info!("image cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weighted bytes held in memory.
    pub fn memory_usage(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.weighted_size()).unwrap_or(usize::MAX)
    }
}

/// Blocking part of a fetch: persistent payload first, then the source.
fn load(
    source: &dyn ImageSource,
    payloads: &dyn CacheBucket,
    url: &Url,
) -> Result<DecodedImage, FetchError> {
    if let Some(bytes) = payloads.get(url.as_str()) {
        match DecodedImage::decode(bytes) {
            Ok(image) => {
                tracing::debug!(url = %url, "image payload cache hit");
                return Ok(image);
            }
            Err(e) => tracing::debug!(url = %url, "ignoring cached payload: {e}"),
        }
    }

    let image = DecodedImage::decode(source.get(url)?)?;
    payloads.set(url.as_str(), image.data());
    Ok(image)
}
