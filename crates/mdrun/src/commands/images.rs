//! `mdrun images` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mdrun_cache::FileCache;
use mdrun_config::{CliSettings, ImagesConfig};
use mdrun_images::{
    DEFAULT_BODY_LIMIT, DisplayDocument, HttpSource, ImageCache, ImageContent, Segment,
    load_pending,
};

use super::{load_config, render_input};
use crate::error::CliError;
use crate::output::Output;

/// Payload cache version; bump when the stored layout changes.
const CACHE_VERSION: &str = concat!("images-", env!("CARGO_PKG_VERSION"));

/// Arguments for the images command.
#[derive(Args)]
pub(crate) struct ImagesArgs {
    /// Markdown file to scan (default: stdin).
    file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdrun.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum display width in points (overrides config).
    #[arg(long)]
    max_width: Option<f32>,

    /// Disable the persistent payload cache.
    #[arg(long)]
    no_cache: bool,

    /// Enable verbose output (cache hits, misses and fetch logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ImagesArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            max_width: self.max_width,
            cache_enabled: self.no_cache.then_some(false),
            ..Default::default()
        };
        let config = load_config(self.config.as_deref(), &cli_settings)?;

        if !config.images.enabled {
            output.warning("Image loading is disabled ([images] enabled = false)");
            return Ok(());
        }

        let document = render_input(&config, self.file.as_deref())?;

        let cache = Arc::new(build_cache(&config.images, &output));
        let (mut display, pending) =
            DisplayDocument::prepare(&document, &cache, config.images.max_width);

        let total = document.image_refs().count();
        if total == 0 {
            output.info("No images found");
            return Ok(());
        }
        output.highlight(&format!("{total} image(s), {} to fetch", pending.len()));

        let failures = load_pending(Arc::clone(&cache), pending, |update| {
            let url = update.url.clone();
            if display.apply(update) {
                output.success(&format!("Loaded {url}"));
            }
        })
        .await;

        for failure in &failures {
            output.warning(&format!("Failed {}: {}", failure.url, failure.error));
        }

        for line in summarize(&display) {
            output.print(&line)?;
        }
        output.detail(&format!(
            "Memory cache: {} image(s), {} bytes",
            cache.len(),
            cache.memory_usage()
        ));

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CliError::Validation(format!(
                "{} of {total} image(s) failed to load",
                failures.len()
            )))
        }
    }
}

fn build_cache(images: &ImagesConfig, output: &Output) -> ImageCache {
    let mut source = HttpSource::new(images.timeout()).with_body_limit(body_limit(images));
    if let Some(user_agent) = &images.user_agent {
        source = source.with_user_agent(user_agent.as_str());
    }

    let cache = ImageCache::new(source).with_memory_capacity(images.memory_capacity);
    match &images.cache_dir {
        Some(dir) => {
            output.detail(&format!("Payload cache: {}", dir.display()));
            cache.with_payload_cache(&FileCache::new(dir.clone(), CACHE_VERSION))
        }
        None => cache,
    }
}

/// Response bodies larger than the memory cache could never be retained.
fn body_limit(images: &ImagesConfig) -> u64 {
    u64::try_from(images.memory_capacity)
        .map_or(DEFAULT_BODY_LIMIT, |capacity| capacity.min(DEFAULT_BODY_LIMIT))
}

/// One line per image segment: URL, display size and state.
fn summarize(display: &DisplayDocument) -> Vec<String> {
    display
        .segments()
        .iter()
        .filter_map(|segment| match segment {
            Segment::Image { url, content, .. } => {
                let size = content.size();
                let state = match content {
                    ImageContent::Loaded { image, .. } => {
                        format!("{:?} {}x{}", image.format, image.width, image.height)
                    }
                    ImageContent::Placeholder(_) => "placeholder".to_owned(),
                };
                Some(format!("{url}\t{}x{}\t{state}", size.width, size.height))
            }
            Segment::Text(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use mdrun_images::ImageSource;
    use mdrun_renderer::StyledRenderer;
    use pretty_assertions::assert_eq;

    use super::*;

    struct Offline;

    impl ImageSource for Offline {
        fn get(&self, url: &url::Url) -> Result<Vec<u8>, mdrun_images::FetchError> {
            Err(mdrun_images::FetchError::Http(format!("offline: {url}")))
        }
    }

    #[test]
    fn test_summarize_placeholders() {
        let doc = StyledRenderer::new()
            .render_markdown("Logo: ![logo](https://example.com/logo.png)");
        let cache = ImageCache::new(Offline);
        let (display, pending) = DisplayDocument::prepare(&doc, &cache, 300.0);

        assert_eq!(pending.len(), 1);
        assert_eq!(summarize(&display), vec![
            "https://example.com/logo.png\t300x180\tplaceholder"
        ]);
    }

    #[test]
    fn test_body_limit_follows_memory_capacity() {
        let mut images = ImagesConfig {
            memory_capacity: 1024,
            ..ImagesConfig::default()
        };
        assert_eq!(body_limit(&images), 1024);

        images.memory_capacity = usize::MAX;
        assert_eq!(body_limit(&images), DEFAULT_BODY_LIMIT);
    }
}
