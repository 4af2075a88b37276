//! CLI command implementations.

pub(crate) mod images;
pub(crate) mod render;

use std::io::Read;
use std::path::Path;

use mdrun_config::{CliSettings, Config};
use mdrun_renderer::{MentionRule, StyledDocument, StyledRenderer};

use crate::error::CliError;

pub(crate) use images::ImagesArgs;
pub(crate) use render::RenderArgs;

/// Read markdown from `file`, or from stdin when absent or `-`.
fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) if path != Path::new("-") => {
            tracing::debug!(path = %path.display(), "reading markdown file");
            Ok(std::fs::read_to_string(path)?)
        }
        _ => {
            tracing::debug!("reading markdown from stdin");
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn load_config(path: Option<&Path>, settings: &CliSettings) -> Result<Config, CliError> {
    let config = Config::load(path, Some(settings))?;
    match &config.config_path {
        Some(path) => tracing::debug!(path = %path.display(), "loaded configuration"),
        None => tracing::debug!("no configuration file, using defaults"),
    }
    Ok(config)
}

/// Read `file` and render it with the configured renderer.
fn render_input(config: &Config, file: Option<&Path>) -> Result<StyledDocument, CliError> {
    let markdown = read_input(file)?;
    let document = build_renderer(config).render_markdown(&markdown);
    tracing::debug!(
        runs = document.len(),
        images = document.image_refs().count(),
        "rendered markdown"
    );
    Ok(document)
}

fn build_renderer(config: &Config) -> StyledRenderer {
    let render = &config.render;
    StyledRenderer::new()
        .with_base_font_size(render.base_font_size)
        .with_unescape_newlines(render.unescape_newlines)
        .with_mentions(MentionRule::new(
            render.mentions.path_prefix.as_str(),
            render.mentions.scheme.as_str(),
        ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_build_renderer_uses_config() {
        let mut config = Config::default();
        config.render.base_font_size = 20.0;
        config.render.mentions.path_prefix = "/people/".to_owned();

        let renderer = build_renderer(&config);
        assert_eq!(renderer.base_font_size(), 20.0);

        let doc = renderer.render_markdown("[Ann](/people/ann)");
        let mentions: Vec<_> = doc.mentions().map(|(_, id)| id.to_owned()).collect();
        assert_eq!(mentions, vec!["ann"]);
    }

    #[test]
    fn test_read_input_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("doc.md");
        std::fs::write(&path, "# Title").unwrap();

        assert_eq!(read_input(Some(&path)).unwrap(), "# Title");
    }

    #[test]
    fn test_read_input_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_input(Some(&tmp.path().join("missing.md"))).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_render_input_uses_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("doc.md");
        std::fs::write(&path, "Hello ![logo](https://example.com/logo.png)").unwrap();

        let mut config = Config::default();
        config.render.base_font_size = 18.0;
        let doc = render_input(&config, Some(&path)).unwrap();
        assert_eq!(doc.image_refs().count(), 1);
        assert_eq!(doc.runs()[0].style.font_size, 18.0);
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mdrun.toml");
        std::fs::write(&path, "[render]\nbase_font_size = 12.0\n").unwrap();

        let config = load_config(Some(&path), &CliSettings::default()).unwrap();
        assert_eq!(config.render.base_font_size, 12.0);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }
}
