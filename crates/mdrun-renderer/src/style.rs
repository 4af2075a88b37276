//! Style attributes attached to every text run.
//!
//! These are plain value types. All behavior (composition, layout) lives in the
//! renderer; a consumer widget maps the semantic tags below onto its own fonts
//! and palette.

#[cfg(feature = "serde")]
use serde::Serialize;

/// Font weight of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font slant of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
}

/// Typeface family of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "kebab-case"))]
pub enum FontFamily {
    /// Body text.
    #[default]
    Proportional,
    /// Inline code and code blocks.
    Monospace,
    /// Proportional text with fixed-width digits (ordered list markers).
    MonospaceDigits,
}

/// Font description used both for styling and for measuring marker widths.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FontSpec {
    pub size: f32,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub family: FontFamily,
}

impl FontSpec {
    /// Regular proportional font at `size`.
    #[must_use]
    pub fn regular(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
            family: FontFamily::Proportional,
        }
    }

    /// Same font with a different family.
    #[must_use]
    pub fn with_family(self, family: FontFamily) -> Self {
        Self { family, ..self }
    }
}

/// Semantic color tag. The consumer picks the concrete color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "kebab-case"))]
pub enum ColorTag {
    Link,
    CodeText,
    CodeBackground,
    QuoteText,
    QuoteBackground,
}

/// Alignment of a tab stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum TabAlignment {
    Left,
    Right,
}

/// A tab stop at an absolute horizontal location (points).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TabStop {
    pub location: f32,
    pub alignment: TabAlignment,
}

/// Paragraph-level layout carried by marker runs and code blocks.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ParagraphStyle {
    pub tab_stops: Vec<TabStop>,
    /// Indent of wrapped lines.
    pub head_indent: f32,
    pub first_line_head_indent: f32,
    /// Negative values are measured from the trailing margin.
    pub tail_indent: f32,
    pub line_spacing: f32,
    pub paragraph_spacing: f32,
}

/// Marks a run as the textual stand-in for an image.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ImageMarker {
    /// Source URL exactly as written in the document.
    pub url: String,
    pub title: Option<String>,
    /// Tree node of the image; all runs of one image share it.
    pub node: usize,
}

/// Full attribute set of one [`StyledRun`](crate::StyledRun).
///
/// Composition is additive: emphasis sets the slant, strong sets the weight,
/// and neither touches the other, so bold and italic combine regardless of
/// nesting order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StyleAttributes {
    pub font_size: f32,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub family: FontFamily,
    pub strikethrough: bool,
    pub foreground: Option<ColorTag>,
    pub background: Option<ColorTag>,
    /// Tappable target (URL or synthetic mention URI).
    pub link: Option<String>,
    pub image: Option<ImageMarker>,
    pub image_title: Option<String>,
    /// Entity identifier extracted from an internal mention link.
    pub mention: Option<String>,
    pub list_depth: Option<usize>,
    pub quote_depth: Option<usize>,
    pub paragraph: Option<ParagraphStyle>,
}

impl StyleAttributes {
    /// Body text style at `font_size`.
    #[must_use]
    pub fn base(font_size: f32) -> Self {
        Self::from_font(FontSpec::regular(font_size))
    }

    /// Attributes carrying only the given font.
    #[must_use]
    pub fn from_font(font: FontSpec) -> Self {
        Self {
            font_size: font.size,
            weight: font.weight,
            slant: font.slant,
            family: font.family,
            strikethrough: false,
            foreground: None,
            background: None,
            link: None,
            image: None,
            image_title: None,
            mention: None,
            list_depth: None,
            quote_depth: None,
            paragraph: None,
        }
    }

    /// The font part of these attributes.
    #[must_use]
    pub fn font(&self) -> FontSpec {
        FontSpec {
            size: self.font_size,
            weight: self.weight,
            slant: self.slant,
            family: self.family,
        }
    }

    #[must_use]
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    #[must_use]
    pub fn is_italic(&self) -> bool {
        self.slant == FontSlant::Italic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_style_is_plain() {
        let style = StyleAttributes::base(15.0);
        assert_eq!(style.font_size, 15.0);
        assert!(!style.is_bold());
        assert!(!style.is_italic());
        assert_eq!(style.family, FontFamily::Proportional);
        assert!(style.link.is_none());
        assert!(style.paragraph.is_none());
    }

    #[test]
    fn test_font_round_trips_through_attributes() {
        let font = FontSpec::regular(12.0).with_family(FontFamily::MonospaceDigits);
        let style = StyleAttributes::from_font(font);
        assert_eq!(style.font(), font);
    }
}
