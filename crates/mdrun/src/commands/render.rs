//! `mdrun render` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use mdrun_config::CliSettings;
use mdrun_renderer::{FontFamily, StyleAttributes, StyledDocument};

use super::{load_config, render_input};
use crate::error::CliError;
use crate::output::Output;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum Format {
    /// One line per run with its attributes.
    #[default]
    Text,
    /// The run sequence as JSON.
    Json,
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdrun.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base font size (overrides config).
    #[arg(long)]
    base_font_size: Option<f32>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    format: Format,

    /// Print only the rendered text, without attributes.
    #[arg(long, conflicts_with = "format")]
    raw: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_font_size: self.base_font_size,
            ..Default::default()
        };
        let config = load_config(self.config.as_deref(), &cli_settings)?;

        let document = render_input(&config, self.file.as_deref())?;

        if self.raw {
            output.print(&document.text())?;
            return Ok(());
        }

        match self.format {
            Format::Text => {
                for line in format_runs(&document) {
                    output.print(&line)?;
                }
            }
            Format::Json => output.print(&serde_json::to_string_pretty(&document)?)?,
        }
        Ok(())
    }
}

fn format_runs(document: &StyledDocument) -> Vec<String> {
    document
        .runs()
        .iter()
        .enumerate()
        .map(|(index, run)| format!("{index:>4}  {:?}  {}", run.text, describe(&run.style)))
        .collect()
}

/// Compact attribute summary, omitting defaults.
fn describe(style: &StyleAttributes) -> String {
    let mut attrs = vec![format!("size={}", style.font_size)];
    if style.is_bold() {
        attrs.push("bold".to_owned());
    }
    if style.is_italic() {
        attrs.push("italic".to_owned());
    }
    match style.family {
        FontFamily::Proportional => {}
        FontFamily::Monospace => attrs.push("mono".to_owned()),
        FontFamily::MonospaceDigits => attrs.push("mono-digits".to_owned()),
    }
    if style.strikethrough {
        attrs.push("strike".to_owned());
    }
    if let Some(color) = style.foreground {
        attrs.push(format!("fg={color:?}"));
    }
    if let Some(color) = style.background {
        attrs.push(format!("bg={color:?}"));
    }
    if let Some(link) = &style.link {
        attrs.push(format!("link={link}"));
    }
    if let Some(image) = &style.image {
        attrs.push(format!("image={}", image.url));
    }
    if let Some(mention) = &style.mention {
        attrs.push(format!("mention={mention}"));
    }
    if let Some(depth) = style.list_depth {
        attrs.push(format!("list={depth}"));
    }
    if let Some(depth) = style.quote_depth {
        attrs.push(format!("quote={depth}"));
    }
    attrs.join(" ")
}

#[cfg(test)]
mod tests {
    use mdrun_renderer::StyledRenderer;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_describe_plain_run() {
        assert_eq!(describe(&StyleAttributes::base(15.0)), "size=15");
    }

    #[test]
    fn test_format_runs_bold_italic() {
        let doc = StyledRenderer::new().render_markdown("***both***");
        assert_eq!(format_runs(&doc), vec![r#"   0  "both"  size=15 bold italic"#]);
    }

    #[test]
    fn test_describe_image_run() {
        let doc = StyledRenderer::new().render_markdown("![Logo](https://example.com/l.png)");
        let line = describe(&doc.runs()[0].style);
        assert!(line.contains("image=https://example.com/l.png"));
        assert!(line.contains("link=https://example.com/l.png"));
        assert!(line.contains("fg=Link"));
    }

    #[test]
    fn test_json_output_is_run_array() {
        let doc = StyledRenderer::new().render_markdown("Hello");
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        let runs = json.as_array().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0]["text"], "Hello");
    }
}
