//! Flow map appearance, loadable from TOML.

use std::path::{Path, PathBuf};

use plotters::style::{RGBAColor, RGBColor};
use ride_map_flow::WidthScale;
use serde::{Deserialize, Serialize};

use crate::RenderError;

/// A `#rrggbb` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl HexColor {
    /// Builds a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque drawing color.
    #[must_use]
    pub const fn rgb(self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }

    /// Drawing color with the given opacity.
    #[must_use]
    pub const fn with_alpha(self, alpha: f64) -> RGBAColor {
        RGBAColor(self.r, self.g, self.b, alpha)
    }
}

/// Error for strings that are not `#rrggbb`.
#[derive(Debug, thiserror::Error)]
#[error("invalid color '{0}': expected #rrggbb")]
pub struct InvalidColorError(String);

impl TryFrom<String> for HexColor {
    type Error = InvalidColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| InvalidColorError(value.clone()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| InvalidColorError(value.clone()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    }
}

/// Everything that controls how a flow map looks.
///
/// Sizes ending in `_pt` are typographic points; they are converted to
/// pixels with [`Self::dpi`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowMapStyle {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixels per inch used for point conversions.
    pub dpi: f64,
    /// Padding around the map in pixels.
    pub margin: u32,
    /// Canvas color.
    pub background: HexColor,
    /// District polygon fill.
    pub district_fill: HexColor,
    /// District polygon border.
    pub district_border: HexColor,
    /// District border width.
    pub border_width_pt: f64,
    /// Opacity of flow lines.
    pub line_alpha: f64,
    /// Volume to line-width mapping.
    pub widths: WidthScale,
    /// District label size.
    pub label_font_size_pt: f64,
    /// Label text color.
    pub label_color: HexColor,
    /// Color of the plate behind labels.
    pub label_plate: HexColor,
    /// Opacity of the plate behind labels.
    pub label_plate_alpha: f64,
    /// Heading drawn above the map.
    pub title: String,
    /// Heading size.
    pub title_font_size_pt: f64,
    /// Caption under the volume colorbar.
    pub colorbar_label: String,
    /// Caption and tick size.
    pub colorbar_font_size_pt: f64,
    /// TrueType/OpenType font for all text. The first font registered in
    /// a process is used for every later render.
    pub font_path: Option<PathBuf>,
}

impl Default for FlowMapStyle {
    fn default() -> Self {
        Self {
            width: 1800,
            height: 1500,
            dpi: 150.0,
            margin: 40,
            background: HexColor::new(0xff, 0xff, 0xff),
            district_fill: HexColor::new(0xf0, 0xf0, 0xf0),
            district_border: HexColor::new(0x80, 0x80, 0x80),
            border_width_pt: 0.8,
            line_alpha: 0.7,
            widths: WidthScale::default(),
            label_font_size_pt: 9.0,
            label_color: HexColor::new(0x00, 0x00, 0x00),
            label_plate: HexColor::new(0xff, 0xff, 0xff),
            label_plate_alpha: 0.7,
            title: "Uber rides between Delhi districts".to_string(),
            title_font_size_pt: 16.0,
            colorbar_label: "Ride volume (number of trips)".to_string(),
            colorbar_font_size_pt: 10.0,
            font_path: None,
        }
    }
}

impl FlowMapStyle {
    /// Loads a style from a TOML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let contents = std::fs::read_to_string(path)?;
        let style = toml::de::from_str(&contents)?;
        log::info!("Loaded flow map style from {}", path.display());
        Ok(style)
    }

    /// Converts points to pixels, never below one pixel.
    #[must_use]
    pub fn points_to_px(&self, points: f64) -> f64 {
        (points * self.dpi / 72.0).max(1.0)
    }

    /// Checks the canvas can be allocated and laid out.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidSize`] for a zero-sized canvas or one
    /// with no room left inside the margins.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0
            || self.height == 0
            || self.margin.saturating_mul(2) >= self.width.min(self.height)
            || !(self.dpi > 0.0)
        {
            return Err(RenderError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
