//! Fitting district coordinates into the pixel map area.

use geo::{Coord, Rect, coord};

/// Pixel rectangle of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelArea {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Uniform-scale transform from data coordinates to pixels, y flipped
/// so north is up.
///
/// Bounds that look like longitude/latitude get their x axis shrunk by
/// the cosine of the middle latitude, which keeps districts from being
/// stretched east-west. Projected bounds are used as they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    min: Coord<f64>,
    max_y: f64,
    x_factor: f64,
    scale: f64,
    origin: Coord<f64>,
}

impl Viewport {
    /// Fits `bounds` into `area`, centered. With no bounds (no districts)
    /// a unit square is used.
    #[must_use]
    pub fn fit(bounds: Option<Rect<f64>>, area: PixelArea) -> Self {
        let bounds = bounds
            .unwrap_or_else(|| Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }));
        let (min, max) = (bounds.min(), bounds.max());

        let x_factor = if is_geographic(&bounds) {
            ((min.y + max.y) / 2.0).to_radians().cos()
        } else {
            1.0
        };

        let world_width = (max.x - min.x) * x_factor;
        let world_height = max.y - min.y;
        let area_width = f64::from(area.width);
        let area_height = f64::from(area.height);

        let scale = match (world_width > 0.0, world_height > 0.0) {
            (true, true) => (area_width / world_width).min(area_height / world_height),
            (true, false) => area_width / world_width,
            (false, true) => area_height / world_height,
            (false, false) => 1.0,
        };

        let origin = coord! {
            x: f64::from(area.x) + world_width.mul_add(-scale, area_width) / 2.0,
            y: f64::from(area.y) + world_height.mul_add(-scale, area_height) / 2.0,
        };

        Self {
            min,
            max_y: max.y,
            x_factor,
            scale,
            origin,
        }
    }

    /// Pixel position of a data coordinate, unrounded.
    #[must_use]
    pub fn project_f64(&self, c: Coord<f64>) -> (f64, f64) {
        (
            ((c.x - self.min.x) * self.x_factor).mul_add(self.scale, self.origin.x),
            (self.max_y - c.y).mul_add(self.scale, self.origin.y),
        )
    }

    /// Pixel position of a data coordinate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn project(&self, c: Coord<f64>) -> (i32, i32) {
        let (x, y) = self.project_f64(c);
        (x.round() as i32, y.round() as i32)
    }
}

fn is_geographic(bounds: &Rect<f64>) -> bool {
    let (min, max) = (bounds.min(), bounds.max());
    min.x >= -180.0 && max.x <= 180.0 && min.y >= -90.0 && max.y <= 90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const AREA: PixelArea = PixelArea {
        x: 10,
        y: 20,
        width: 200,
        height: 100,
    };

    #[test]
    fn projected_bounds_fit_and_center() {
        // 1000 m square in a 200x100 area: height limits, x is centered.
        let bounds = Rect::new(
            coord! { x: 700_000.0, y: 3_100_000.0 },
            coord! { x: 701_000.0, y: 3_101_000.0 },
        );
        let viewport = Viewport::fit(Some(bounds), AREA);

        assert_eq!(viewport.project(coord! { x: 700_000.0, y: 3_101_000.0 }), (60, 20));
        assert_eq!(viewport.project(coord! { x: 701_000.0, y: 3_100_000.0 }), (160, 120));
    }

    #[test]
    fn north_is_up() {
        let bounds = Rect::new(
            coord! { x: 1000.0, y: 1000.0 },
            coord! { x: 2000.0, y: 2000.0 },
        );
        let viewport = Viewport::fit(Some(bounds), AREA);
        let (_, south) = viewport.project(coord! { x: 1500.0, y: 1000.0 });
        let (_, north) = viewport.project(coord! { x: 1500.0, y: 2000.0 });
        assert!(north < south);
    }

    #[test]
    fn geographic_bounds_shrink_longitude() {
        // One degree square at 60N is half as wide as it is tall.
        let bounds = Rect::new(coord! { x: 10.0, y: 59.5 }, coord! { x: 11.0, y: 60.5 });
        let viewport = Viewport::fit(Some(bounds), AREA);
        let (left, top) = viewport.project_f64(coord! { x: 10.0, y: 60.5 });
        let (right, bottom) = viewport.project_f64(coord! { x: 11.0, y: 59.5 });
        let ratio = (right - left) / (bottom - top);
        assert!((ratio - 60f64.to_radians().cos()).abs() < 1e-3);
    }

    #[test]
    fn empty_bounds_do_not_panic() {
        let viewport = Viewport::fit(None, AREA);
        let (x, y) = viewport.project(coord! { x: 0.5, y: 0.5 });
        assert_eq!((x, y), (110, 70));

        let point = Rect::new(coord! { x: 5.0, y: 5.0 }, coord! { x: 5.0, y: 5.0 });
        let viewport = Viewport::fit(Some(point), AREA);
        assert_eq!(viewport.project(coord! { x: 5.0, y: 5.0 }), (110, 70));
    }
}
