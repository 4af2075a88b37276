//! Indentation layout for list items and block quotes.
//!
//! A marker sits right-aligned in a column ending at the first tab stop; the
//! content starts at the second tab stop and wrapped lines align under it.

use crate::style::{FontFamily, FontSpec, FontWeight, ParagraphStyle, TabAlignment, TabStop};

/// Left margin of a root-level list or quote.
pub const BASE_MARGIN: f32 = 15.0;
/// Extra indentation per nesting level.
pub const DEPTH_STEP: f32 = 20.0;
/// Space between a marker column and the content.
pub const MARKER_GAP: f32 = 8.0;
/// Width reserved for the quote border.
pub const QUOTE_BORDER_WIDTH: f32 = 4.0;
/// Spacing after each paragraph inside a quote.
pub const QUOTE_PARAGRAPH_SPACING: f32 = 4.0;

/// Measures rendered text width in points.
///
/// Marker widths must come from the same metrics that will draw the marker,
/// so consumers with a real text engine plug it in here.
pub trait TextMeasure {
    fn width(&self, text: &str, font: &FontSpec) -> f32;

    /// Width rounded up to whole points.
    fn marker_width(&self, text: &str, font: &FontSpec) -> f32 {
        self.width(text, font).ceil()
    }
}

/// Approximate metrics from per-character advance factors.
///
/// Good enough for terminal output and tests. Digits are fixed-width in every
/// family so ordinal markers of equal length measure equally.
#[derive(Clone, Copy, Debug, Default)]
pub struct EstimatedMetrics;

impl EstimatedMetrics {
    fn advance(ch: char, family: FontFamily) -> f32 {
        if family == FontFamily::Monospace {
            return 0.6;
        }
        match ch {
            '0'..='9' => 0.6,
            '\t' | '\n' => 0.0,
            ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | 'i' | 'l' | 'j' | '|' => 0.28,
            '•' => 0.35,
            'A'..='Z' | 'm' | 'w' => 0.7,
            _ => 0.5,
        }
    }
}

impl TextMeasure for EstimatedMetrics {
    fn width(&self, text: &str, font: &FontSpec) -> f32 {
        let units: f32 = text
            .chars()
            .map(|ch| Self::advance(ch, font.family))
            .sum();
        let weight = match font.weight {
            FontWeight::Normal => 1.0,
            FontWeight::Bold => 1.05,
        };
        units * font.size * weight
    }
}

/// Horizontal positions for one marker-prefixed paragraph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndentLayout {
    pub left_offset: f32,
    /// Right edge of the marker column.
    pub first_tab_stop: f32,
    /// Start of the content.
    pub second_tab_stop: f32,
    /// Indent of wrapped lines.
    pub head_indent: f32,
}

impl IndentLayout {
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn compute(
        depth: usize,
        base_margin: f32,
        depth_step: f32,
        marker_width: f32,
        gap: f32,
    ) -> Self {
        let left_offset = base_margin + depth_step * depth as f32;
        let first_tab_stop = left_offset + marker_width;
        let second_tab_stop = first_tab_stop + gap;
        Self {
            left_offset,
            first_tab_stop,
            second_tab_stop,
            head_indent: second_tab_stop,
        }
    }

    /// Layout of a list item at `depth` with the default margins.
    #[must_use]
    pub fn list(depth: usize, marker_width: f32) -> Self {
        Self::compute(depth, BASE_MARGIN, DEPTH_STEP, marker_width, MARKER_GAP)
    }

    /// Layout of a block quote child at `depth` with the default margins.
    #[must_use]
    pub fn quote(depth: usize) -> Self {
        Self::compute(depth, BASE_MARGIN, DEPTH_STEP, QUOTE_BORDER_WIDTH, MARKER_GAP)
    }

    /// Paragraph style for a list marker: right-aligned marker, left-aligned content.
    #[must_use]
    pub fn list_paragraph_style(&self) -> ParagraphStyle {
        ParagraphStyle {
            tab_stops: vec![
                TabStop {
                    location: self.first_tab_stop,
                    alignment: TabAlignment::Right,
                },
                TabStop {
                    location: self.second_tab_stop,
                    alignment: TabAlignment::Left,
                },
            ],
            head_indent: self.head_indent,
            ..ParagraphStyle::default()
        }
    }

    /// Paragraph style for a quote border marker.
    #[must_use]
    pub fn quote_paragraph_style(&self) -> ParagraphStyle {
        ParagraphStyle {
            tab_stops: vec![TabStop {
                location: self.first_tab_stop,
                alignment: TabAlignment::Left,
            }],
            head_indent: self.head_indent,
            first_line_head_indent: self.head_indent,
            paragraph_spacing: QUOTE_PARAGRAPH_SPACING,
            ..ParagraphStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_positions() {
        let layout = IndentLayout::compute(2, 15.0, 20.0, 10.0, 8.0);
        assert_eq!(layout.left_offset, 55.0);
        assert_eq!(layout.first_tab_stop, 65.0);
        assert_eq!(layout.second_tab_stop, 73.0);
        assert_eq!(layout.head_indent, 73.0);
    }

    #[test]
    fn test_list_depth_increases_tab_stops() {
        let outer = IndentLayout::list(0, 6.0);
        let inner = IndentLayout::list(1, 6.0);
        assert!(inner.first_tab_stop > outer.first_tab_stop);
        assert!(inner.second_tab_stop > outer.second_tab_stop);
    }

    #[test]
    fn test_list_paragraph_style_tab_stops() {
        let style = IndentLayout::list(0, 6.0).list_paragraph_style();
        assert_eq!(
            style.tab_stops,
            vec![
                TabStop {
                    location: 21.0,
                    alignment: TabAlignment::Right
                },
                TabStop {
                    location: 29.0,
                    alignment: TabAlignment::Left
                },
            ]
        );
        assert_eq!(style.head_indent, 29.0);
    }

    #[test]
    fn test_quote_paragraph_style() {
        let style = IndentLayout::quote(0).quote_paragraph_style();
        assert_eq!(style.tab_stops[0].location, 19.0);
        assert_eq!(style.first_line_head_indent, 27.0);
        assert_eq!(style.head_indent, 27.0);
        assert_eq!(style.paragraph_spacing, QUOTE_PARAGRAPH_SPACING);
    }

    #[test]
    fn test_digits_are_fixed_width() {
        let font = FontSpec::regular(15.0).with_family(FontFamily::MonospaceDigits);
        let metrics = EstimatedMetrics;
        assert_eq!(metrics.width("11.", &font), metrics.width("88.", &font));
    }

    #[test]
    fn test_marker_width_rounds_up() {
        let font = FontSpec::regular(15.0);
        let width = EstimatedMetrics.marker_width("•", &font);
        assert_eq!(width, 6.0);
        assert!(width >= EstimatedMetrics.width("•", &font));
    }

    #[test]
    fn test_wider_ordinal_measures_wider() {
        let font = FontSpec::regular(15.0).with_family(FontFamily::MonospaceDigits);
        assert!(EstimatedMetrics.width("10.", &font) > EstimatedMetrics.width("9.", &font));
    }
}
