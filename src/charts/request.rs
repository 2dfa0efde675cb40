//! Chart Request Module
//! Immutable description of one render: family, kind, axes and style.

use crate::charts::ChartError;
use plotters::style::RGBColor;
use serde::Deserialize;
use std::ops::RangeInclusive;

/// Dimensionality of a chart, which fixes how many axis columns it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFamily {
    OneD,
    TwoD,
    ThreeD,
}

impl ChartFamily {
    pub const ALL: [ChartFamily; 3] = [ChartFamily::OneD, ChartFamily::TwoD, ChartFamily::ThreeD];

    pub fn axis_count(&self) -> usize {
        match self {
            ChartFamily::OneD => 1,
            ChartFamily::TwoD => 2,
            ChartFamily::ThreeD => 3,
        }
    }

    /// Kinds offered by this family, in menu order.
    pub fn kinds(&self) -> &'static [ChartKind] {
        match self {
            ChartFamily::OneD => &[ChartKind::Histogram, ChartKind::Line, ChartKind::Bar],
            ChartFamily::TwoD => &[ChartKind::Scatter, ChartKind::Box, ChartKind::Line],
            ChartFamily::ThreeD => &[ChartKind::Scatter, ChartKind::Surface],
        }
    }

    pub fn supports(&self, kind: ChartKind) -> bool {
        self.kinds().contains(&kind)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartFamily::OneD => "1D",
            ChartFamily::TwoD => "2D",
            ChartFamily::ThreeD => "3D",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Histogram,
    Line,
    Bar,
    Scatter,
    Box,
    Surface,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::Line => "Line Plot",
            ChartKind::Bar => "Bar Plot",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Box => "Box Plot",
            ChartKind::Surface => "Surface Plot",
        }
    }
}

/// Stroke pattern for line charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LineStyle {
    #[default]
    #[serde(rename = "-", alias = "solid")]
    Solid,
    #[serde(rename = "--", alias = "dashed")]
    Dashed,
    #[serde(rename = "-.", alias = "dashdot")]
    DashDot,
    #[serde(rename = ":", alias = "dotted")]
    Dotted,
}

impl LineStyle {
    pub const ALL: [LineStyle; 4] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::DashDot,
        LineStyle::Dotted,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            LineStyle::Solid => "-",
            LineStyle::Dashed => "--",
            LineStyle::DashDot => "-.",
            LineStyle::Dotted => ":",
        }
    }
}

/// Visual parameters for a chart. Sizes are clamped into their ranges on
/// construction; the color must be a `#RRGGBB` hex string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleConfig {
    color: String,
    rgb: (u8, u8, u8),
    marker_size: u32,
    line_style: LineStyle,
    bin_count: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color: Self::DEFAULT_COLOR.to_string(),
            rgb: (0xFF, 0x63, 0x47),
            marker_size: Self::DEFAULT_MARKER_SIZE,
            line_style: LineStyle::Solid,
            bin_count: Self::DEFAULT_BIN_COUNT,
        }
    }
}

impl StyleConfig {
    pub const DEFAULT_COLOR: &'static str = "#FF6347";
    pub const DEFAULT_MARKER_SIZE: u32 = 50;
    pub const MARKER_SIZE_RANGE: RangeInclusive<u32> = 10..=200;
    pub const DEFAULT_BIN_COUNT: u32 = 20;
    pub const BIN_COUNT_RANGE: RangeInclusive<u32> = 5..=50;

    pub fn new(
        color: &str,
        marker_size: u32,
        line_style: LineStyle,
        bin_count: u32,
    ) -> Result<Self, ChartError> {
        Ok(Self::default()
            .with_color(color)?
            .with_marker_size(marker_size)
            .with_line_style(line_style)
            .with_bin_count(bin_count))
    }

    pub fn with_color(self, color: &str) -> Result<Self, ChartError> {
        let rgb = parse_hex_color(color)?;
        Ok(Self {
            color: format!("#{:02X}{:02X}{:02X}", rgb.0, rgb.1, rgb.2),
            rgb,
            ..self
        })
    }

    pub fn with_marker_size(self, marker_size: u32) -> Self {
        Self {
            marker_size: clamp(marker_size, &Self::MARKER_SIZE_RANGE),
            ..self
        }
    }

    pub fn with_line_style(self, line_style: LineStyle) -> Self {
        Self { line_style, ..self }
    }

    pub fn with_bin_count(self, bin_count: u32) -> Self {
        Self {
            bin_count: clamp(bin_count, &Self::BIN_COUNT_RANGE),
            ..self
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn rgb(&self) -> RGBColor {
        RGBColor(self.rgb.0, self.rgb.1, self.rgb.2)
    }

    pub fn rgb_tuple(&self) -> (u8, u8, u8) {
        self.rgb
    }

    /// Marker area, as on a matplotlib scatter.
    pub fn marker_size(&self) -> u32 {
        self.marker_size
    }

    /// Marker radius in pixels for the given area.
    pub fn marker_radius(&self) -> u32 {
        ((self.marker_size as f64).sqrt() / 2.0).round().max(1.0) as u32
    }

    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    pub fn bin_count(&self) -> u32 {
        self.bin_count
    }
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(color: &str) -> Result<(u8, u8, u8), ChartError> {
    let hex = color.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChartError::InvalidStyle(format!(
            "'{}' is not a #RRGGBB color",
            color
        )));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|e| ChartError::InvalidStyle(e.to_string()))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

/// Everything needed to render one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub family: ChartFamily,
    pub kind: ChartKind,
    pub axis_columns: Vec<String>,
    pub style: StyleConfig,
}

impl ChartRequest {
    pub fn new(
        family: ChartFamily,
        kind: ChartKind,
        axis_columns: Vec<String>,
        style: StyleConfig,
    ) -> Self {
        Self {
            family,
            kind,
            axis_columns,
            style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_axis_counts_and_kinds() {
        assert_eq!(ChartFamily::OneD.axis_count(), 1);
        assert_eq!(ChartFamily::TwoD.axis_count(), 2);
        assert_eq!(ChartFamily::ThreeD.axis_count(), 3);
        assert!(ChartFamily::OneD.supports(ChartKind::Histogram));
        assert!(!ChartFamily::OneD.supports(ChartKind::Scatter));
        assert!(ChartFamily::TwoD.supports(ChartKind::Line));
        assert!(!ChartFamily::ThreeD.supports(ChartKind::Box));
    }

    #[test]
    fn test_style_clamps_sizes() {
        let style = StyleConfig::new("#00ff00", 5000, LineStyle::Dotted, 1).unwrap();
        assert_eq!(style.marker_size(), 200);
        assert_eq!(style.bin_count(), 5);
        assert_eq!(style.color(), "#00FF00");
        assert_eq!(style.rgb_tuple(), (0, 255, 0));
        assert_eq!(style.line_style(), LineStyle::Dotted);
    }

    #[test]
    fn test_style_rejects_bad_color() {
        assert!(matches!(
            StyleConfig::new("#12345", 50, LineStyle::Solid, 20),
            Err(ChartError::InvalidStyle(_))
        ));
        assert!(StyleConfig::new("#GGGGGG", 50, LineStyle::Solid, 20).is_err());
    }

    #[test]
    fn test_default_style_matches_default_color() {
        let parsed = StyleConfig::new(
            StyleConfig::DEFAULT_COLOR,
            StyleConfig::DEFAULT_MARKER_SIZE,
            LineStyle::Solid,
            StyleConfig::DEFAULT_BIN_COUNT,
        )
        .unwrap();
        assert_eq!(parsed, StyleConfig::default());
    }

    #[test]
    fn test_line_style_from_json() {
        for style in LineStyle::ALL {
            let json = format!("\"{}\"", style.symbol());
            assert_eq!(serde_json::from_str::<LineStyle>(&json).unwrap(), style);
        }
        assert!(serde_json::from_str::<LineStyle>("\"~\"").is_err());
    }

    #[test]
    fn test_marker_radius() {
        let style = StyleConfig::default().with_marker_size(100);
        assert_eq!(style.marker_radius(), 5);
    }
}
