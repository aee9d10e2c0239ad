//! Draw-op recording and PNG encoding.
//!
//! A [`MapFrame`] collects drawing operations in paint order and replays
//! them onto an in-memory RGB bitmap only when encoded, so layout code
//! never touches the backend directly.

use plotters::backend::BitMapBackend;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{PathElement, Polygon, Rectangle, Text};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{
    Color, FontDesc, FontFamily, FontStyle, FontTransform, RGBAColor, RGBColor, ShapeStyle,
    TextStyle,
};

use crate::RenderError;
use crate::font::{LABEL_FONT_FAMILY, approximate_text_size};

/// Pixel coordinate, origin top-left.
pub type PixelPoint = (i32, i32);

/// A text backing plate drawn behind a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plate {
    /// Plate color.
    pub color: RGBAColor,
    /// Padding around the text in pixels.
    pub padding: i32,
}

/// Where the anchor point of a text sits relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Centered both ways.
    Center,
    /// Left edge, vertically centered.
    CenterLeft,
}

impl Anchor {
    fn pos(self) -> Pos {
        match self {
            Self::Center => Pos::new(HPos::Center, VPos::Center),
            Self::CenterLeft => Pos::new(HPos::Left, VPos::Center),
        }
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled polygon without a border. Holes are painted with the
    /// background color.
    Polygon {
        exterior: Vec<PixelPoint>,
        interiors: Vec<Vec<PixelPoint>>,
        fill: RGBAColor,
    },
    /// Closed ring outline.
    Outline {
        ring: Vec<PixelPoint>,
        color: RGBAColor,
        width: u32,
    },
    /// Straight segment.
    Line {
        from: PixelPoint,
        to: PixelPoint,
        color: RGBAColor,
        width: u32,
    },
    /// Filled axis-aligned rectangle. `bottom_right` is exclusive.
    Rect {
        top_left: PixelPoint,
        bottom_right: PixelPoint,
        fill: RGBAColor,
    },
    /// Text anchored at a point. Vertical text reads bottom to top.
    Text {
        text: String,
        at: PixelPoint,
        size: f64,
        color: RGBAColor,
        anchor: Anchor,
        vertical: bool,
        plate: Option<Plate>,
    },
}

/// A canvas under construction.
#[derive(Debug, Clone)]
pub struct MapFrame {
    width: u32,
    height: u32,
    background: RGBColor,
    text_enabled: bool,
    ops: Vec<DrawOp>,
}

impl MapFrame {
    /// Empty canvas of the given size.
    #[must_use]
    pub const fn new(width: u32, height: u32, background: RGBColor) -> Self {
        Self {
            width,
            height,
            background,
            text_enabled: true,
            ops: Vec::new(),
        }
    }

    /// Disables glyph drawing. Label plates are still painted.
    #[must_use]
    pub const fn with_text(mut self, enabled: bool) -> Self {
        self.text_enabled = enabled;
        self
    }

    /// Appends an operation; later operations paint over earlier ones.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Recorded operations in paint order.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Rasterizes every operation and encodes the result as an RGB PNG.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if drawing or PNG encoding fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let mut pixels = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (self.width, self.height))
                .into_drawing_area();
            root.fill(&self.background).map_err(RenderError::drawing)?;
            for op in &self.ops {
                self.replay(&root, op)?;
            }
            root.present().map_err(RenderError::drawing)?;
        }
        encode_rgb(&pixels, self.width, self.height)
    }

    fn replay(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        op: &DrawOp,
    ) -> Result<(), RenderError> {
        match op {
            DrawOp::Polygon {
                exterior,
                interiors,
                fill,
            } => {
                root.draw(&Polygon::new(exterior.clone(), fill.filled()))
                    .map_err(RenderError::drawing)?;
                for hole in interiors {
                    root.draw(&Polygon::new(hole.clone(), self.background.filled()))
                        .map_err(RenderError::drawing)?;
                }
            }
            DrawOp::Outline { ring, color, width } => {
                let stroke = ShapeStyle {
                    color: *color,
                    filled: false,
                    stroke_width: *width,
                };
                root.draw(&PathElement::new(ring.clone(), stroke))
                    .map_err(RenderError::drawing)?;
            }
            DrawOp::Line {
                from,
                to,
                color,
                width,
            } => {
                let stroke = ShapeStyle {
                    color: *color,
                    filled: false,
                    stroke_width: *width,
                };
                root.draw(&PathElement::new(vec![*from, *to], stroke))
                    .map_err(RenderError::drawing)?;
            }
            DrawOp::Rect {
                top_left,
                bottom_right,
                fill,
            } => {
                root.draw(&Rectangle::new([*top_left, *bottom_right], fill.filled()))
                    .map_err(RenderError::drawing)?;
            }
            DrawOp::Text {
                text,
                at,
                size,
                color,
                anchor,
                vertical,
                plate,
            } => {
                let mut font =
                    FontDesc::new(FontFamily::Name(LABEL_FONT_FAMILY), *size, FontStyle::Normal);
                if *vertical {
                    font = font.transform(FontTransform::Rotate270);
                }
                let style = TextStyle {
                    font,
                    color: color.to_backend_color(),
                    pos: anchor.pos(),
                };
                if let Some(plate) = plate {
                    let extent = if self.text_enabled {
                        root.estimate_text_size(text, &style).map_err(RenderError::drawing)?
                    } else {
                        approximate_text_size(text, *size)
                    };
                    let (top_left, bottom_right) = plate_bounds(*at, extent, *anchor, plate.padding);
                    root.draw(&Rectangle::new([top_left, bottom_right], plate.color.filled()))
                        .map_err(RenderError::drawing)?;
                }
                if self.text_enabled {
                    root.draw(&Text::new(text.as_str(), *at, style))
                        .map_err(RenderError::drawing)?;
                }
            }
        }
        Ok(())
    }
}

/// Rectangle covering text of `extent` anchored at `at`, grown by
/// `padding` on every side. The bottom-right corner is exclusive.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn plate_bounds(
    at: PixelPoint,
    (width, height): (u32, u32),
    anchor: Anchor,
    padding: i32,
) -> (PixelPoint, PixelPoint) {
    let (w, h) = (width as i32, height as i32);
    let left = match anchor {
        Anchor::Center => at.0 - w / 2,
        Anchor::CenterLeft => at.0,
    };
    let top = at.1 - h / 2;
    (
        (left - padding, top - padding),
        (left + w + padding, top + h + padding),
    )
}

fn encode_rgb(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let mut png = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixels)?;
        writer.finish()?;
    }
    Ok(png)
}
