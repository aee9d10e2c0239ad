#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static flow map rendering.
//!
//! Produces one PNG per request: district polygons, one line per flow
//! whose width and color encode volume, a label at every district
//! centroid, a title, and a vertical volume colorbar. The PNG can be
//! wrapped in a self-contained HTML fragment for embedding.

pub mod colormap;
pub mod font;
pub mod frame;
pub mod projection;
pub mod style;

use std::fmt::Display;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use geo::{Contains, Coord, Polygon};
use plotters::style::RGBAColor;
use ride_map_district::DistrictSet;
use ride_map_flow::FlowCollection;

pub use frame::{Anchor, DrawOp, MapFrame};
pub use projection::{PixelArea, Viewport};
pub use style::{FlowMapStyle, HexColor};

const COLORBAR_STEPS: u32 = 128;

/// Errors that can occur while loading a style or rendering a map.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The style file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The style file is not valid TOML for [`FlowMapStyle`].
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The rasterized image could not be encoded.
    #[error("PNG error: {0}")]
    Png(#[from] png::EncodingError),

    /// The drawing backend rejected an operation.
    #[error("Drawing error: {0}")]
    Drawing(String),

    /// The canvas leaves no room for the map.
    #[error("Invalid canvas size {width}x{height}")]
    InvalidSize {
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
    },
}

impl RenderError {
    fn drawing(e: impl Display) -> Self {
        Self::Drawing(e.to_string())
    }
}

/// Pixel regions of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    title_center: (i32, i32),
    map: PixelArea,
    colorbar: PixelArea,
}

impl Layout {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    fn new(style: &FlowMapStyle) -> Self {
        let width = style.width;
        let height = style.height;
        let margin = style.margin;

        let title_band = (style.points_to_px(style.title_font_size_pt) * 2.0).round() as u32;
        let colorbar_band = (style.points_to_px(style.colorbar_font_size_pt) * 6.0).round() as u32;

        let map_width = (width - 2 * margin).saturating_sub(colorbar_band).max(1);
        let map_height = (height - 2 * margin).saturating_sub(title_band).max(1);
        let map_x = margin;
        let map_y = margin + title_band;

        let bar_width = (colorbar_band * 3 / 20).max(1);
        let bar_height = (map_height * 4 / 5).max(1);

        Self {
            title_center: ((width / 2) as i32, (margin + title_band / 2) as i32),
            map: PixelArea {
                x: map_x as i32,
                y: map_y as i32,
                width: map_width,
                height: map_height,
            },
            colorbar: PixelArea {
                x: (map_x + map_width + colorbar_band / 10) as i32,
                y: (map_y + map_height / 10) as i32,
                width: bar_width,
                height: bar_height,
            },
        }
    }
}

/// Renders the districts and flows of one request to PNG bytes.
///
/// Zero flows still produce a complete image: the district polygons,
/// labels and title are drawn and the colorbar is omitted. Zero
/// districts produce a blank map with the title.
///
/// # Errors
///
/// Returns [`RenderError`] if the style describes an unusable canvas or
/// rasterization/encoding fails.
pub fn render_flow_map(
    districts: &DistrictSet,
    flows: &FlowCollection,
    style: &FlowMapStyle,
) -> Result<Vec<u8>, RenderError> {
    style.validate()?;
    let text_enabled = font::ensure_label_font(style.font_path.as_deref());

    let layout = Layout::new(style);
    let viewport = Viewport::fit(districts.bounding_rect(), layout.map);
    let mut frame = MapFrame::new(style.width, style.height, style.background.rgb())
        .with_text(text_enabled);

    draw_districts(&mut frame, districts, &viewport, style);
    draw_flows(&mut frame, flows, &viewport, style);
    draw_labels(&mut frame, districts, &viewport, style);
    draw_title(&mut frame, &layout, style);
    if let Some(range) = flows.volume_range() {
        draw_colorbar(&mut frame, &layout, range, style);
    }

    let png = frame.encode_png()?;
    log::debug!(
        "Rendered flow map with {} districts and {} flows ({} bytes)",
        districts.len(),
        flows.len(),
        png.len()
    );
    Ok(png)
}

/// Wraps PNG bytes in a minimal HTML document that shows the image at
/// full container width.
#[must_use]
pub fn embed_png_html(png: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(png);
    format!(
        "<html><head><style>body {{ margin:0; padding:0; overflow:hidden; background:#fafafa; }}</style></head>\
         <body><img src=\"data:image/png;base64,{encoded}\" \
         style=\"width:100%;height:auto;display:block;margin:0 auto;\"/></body></html>"
    )
}

/// Renders a flow map and wraps it with [`embed_png_html`].
///
/// # Errors
///
/// Returns [`RenderError`] if rendering fails.
pub fn render_flow_map_html(
    districts: &DistrictSet,
    flows: &FlowCollection,
    style: &FlowMapStyle,
) -> Result<String, RenderError> {
    let png = render_flow_map(districts, flows, style)?;
    Ok(embed_png_html(&png))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn px_width(style: &FlowMapStyle, points: f64) -> u32 {
    style.points_to_px(points).round() as u32
}

fn project_ring<'a>(
    viewport: &Viewport,
    coords: impl Iterator<Item = &'a Coord<f64>>,
) -> Vec<(i32, i32)> {
    coords.map(|c| viewport.project(*c)).collect()
}

fn project_polygon(viewport: &Viewport, polygon: &Polygon<f64>, fill: RGBAColor) -> DrawOp {
    DrawOp::Polygon {
        exterior: project_ring(viewport, polygon.exterior().coords()),
        interiors: polygon
            .interiors()
            .iter()
            .map(|ring| project_ring(viewport, ring.coords()))
            .collect(),
        fill,
    }
}

/// Fills every polygon, then fills again the polygons that sit inside
/// another polygon's hole (enclaves), then draws every border.
fn draw_districts(
    frame: &mut MapFrame,
    districts: &DistrictSet,
    viewport: &Viewport,
    style: &FlowMapStyle,
) {
    let fill = style.district_fill.with_alpha(1.0);
    let border = style.district_border.with_alpha(1.0);
    let border_width = px_width(style, style.border_width_pt);

    let polygons: Vec<&Polygon<f64>> = districts
        .iter()
        .flat_map(|district| district.geometry.iter())
        .collect();
    let holes: Vec<(usize, Polygon<f64>)> = polygons
        .iter()
        .enumerate()
        .flat_map(|(i, polygon)| {
            polygon
                .interiors()
                .iter()
                .map(move |ring| (i, Polygon::new(ring.clone(), Vec::new())))
        })
        .collect();

    for polygon in &polygons {
        frame.push(project_polygon(viewport, polygon, fill));
    }

    for (i, polygon) in polygons.iter().enumerate() {
        let in_hole = holes
            .iter()
            .any(|(owner, hole)| *owner != i && hole.contains(*polygon));
        if in_hole {
            frame.push(project_polygon(viewport, polygon, fill));
        }
    }

    for polygon in &polygons {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            frame.push(DrawOp::Outline {
                ring: project_ring(viewport, ring.coords()),
                color: border,
                width: border_width,
            });
        }
    }
}

fn draw_flows(
    frame: &mut MapFrame,
    flows: &FlowCollection,
    viewport: &Viewport,
    style: &FlowMapStyle,
) {
    let Some(range) = flows.volume_range() else {
        return;
    };
    let widths = style.widths.widths(flows);

    // Quiet flows first so the busiest lines stay on top.
    let mut order: Vec<usize> = (0..flows.len()).collect();
    order.sort_by_key(|&i| flows.edges()[i].volume);

    for i in order {
        let edge = &flows.edges()[i];
        let color = colormap::volume_color(edge.volume, range);
        frame.push(DrawOp::Line {
            from: viewport.project(edge.geometry.start),
            to: viewport.project(edge.geometry.end),
            color: RGBAColor(color.0, color.1, color.2, style.line_alpha),
            width: px_width(style, widths[i]),
        });
    }
}

fn label_plate(style: &FlowMapStyle, size: f64) -> frame::Plate {
    #[allow(clippy::cast_possible_truncation)]
    let padding = (size * 0.25).round() as i32;
    frame::Plate {
        color: style.label_plate.with_alpha(style.label_plate_alpha),
        padding,
    }
}

fn draw_labels(
    frame: &mut MapFrame,
    districts: &DistrictSet,
    viewport: &Viewport,
    style: &FlowMapStyle,
) {
    let size = style.points_to_px(style.label_font_size_pt);
    for district in districts {
        frame.push(DrawOp::Text {
            text: district.name.clone(),
            at: viewport.project(district.centroid.0),
            size,
            color: style.label_color.with_alpha(1.0),
            anchor: Anchor::Center,
            vertical: false,
            plate: Some(label_plate(style, size)),
        });
    }
}

fn draw_title(frame: &mut MapFrame, layout: &Layout, style: &FlowMapStyle) {
    if style.title.is_empty() {
        return;
    }
    frame.push(DrawOp::Text {
        text: style.title.clone(),
        at: layout.title_center,
        size: style.points_to_px(style.title_font_size_pt),
        color: style.label_color.with_alpha(1.0),
        anchor: Anchor::Center,
        vertical: false,
        plate: None,
    });
}

/// Vertical gradient from `vmin` at the bottom to `vmax` at the top,
/// with both ends labelled and the caption running alongside.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]
fn draw_colorbar(frame: &mut MapFrame, layout: &Layout, range: (u64, u64), style: &FlowMapStyle) {
    let bar = layout.colorbar;
    let steps = COLORBAR_STEPS.min(bar.height).max(1);
    let step_height = f64::from(bar.height) / f64::from(steps);
    let last = f64::from((steps - 1).max(1));
    let bar_bottom = bar.y + bar.height as i32;

    for step in 0..steps {
        let top = bar.y + (f64::from(step) * step_height).round() as i32;
        let bottom = if step + 1 == steps {
            bar_bottom
        } else {
            bar.y + (f64::from(step + 1) * step_height).round() as i32
        };
        let color = colormap::plasma(1.0 - f64::from(step) / last);
        frame.push(DrawOp::Rect {
            top_left: (bar.x, top),
            bottom_right: (bar.x + bar.width as i32, bottom),
            fill: RGBAColor(color.0, color.1, color.2, 1.0),
        });
    }

    let size = style.points_to_px(style.colorbar_font_size_pt);
    let color = style.label_color.with_alpha(1.0);
    let (vmin, vmax) = range;
    let tick_x = bar.x + bar.width as i32 + (size * 0.3).round() as i32;

    for (value, y) in [(vmax, bar.y), (vmin, bar_bottom - 1)] {
        frame.push(DrawOp::Text {
            text: value.to_string(),
            at: (tick_x, y),
            size,
            color,
            anchor: Anchor::CenterLeft,
            vertical: false,
            plate: None,
        });
    }

    if !style.colorbar_label.is_empty() {
        let digits = vmax.to_string().len() as f64;
        let caption_x = tick_x + (size * 0.6).mul_add(digits, size * 0.9).round() as i32;
        frame.push(DrawOp::Text {
            text: style.colorbar_label.clone(),
            at: (caption_x, bar.y + bar.height as i32 / 2),
            size,
            color,
            anchor: Anchor::Center,
            vertical: true,
            plate: None,
        });
    }
}
