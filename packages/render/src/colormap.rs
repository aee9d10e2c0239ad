//! Sequential colormap for flow volumes.

use plotters::style::RGBColor;

/// Samples of the perceptually uniform "plasma" map at equal spacing.
const PLASMA: [(u8, u8, u8); 9] = [
    (13, 8, 135),
    (75, 3, 161),
    (125, 3, 168),
    (168, 34, 150),
    (203, 70, 121),
    (229, 107, 93),
    (248, 148, 65),
    (253, 195, 40),
    (240, 249, 33),
];

/// Color at position `t` in `[0, 1]`; out-of-range values are clamped.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn plasma(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let segments = (PLASMA.len() - 1) as f64;
    let scaled = t * segments;
    let index = (scaled.floor() as usize).min(PLASMA.len() - 2);
    let frac = scaled - index as f64;

    let (r0, g0, b0) = PLASMA[index];
    let (r1, g1, b1) = PLASMA[index + 1];
    let lerp = |a: u8, b: u8| (f64::from(b) - f64::from(a)).mul_add(frac, f64::from(a)).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Position of `volume` within `(vmin, vmax)`. A degenerate range maps
/// to the top of the scale, matching the width of such flows.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normalize(volume: u64, (vmin, vmax): (u64, u64)) -> f64 {
    if vmax <= vmin {
        return 1.0;
    }
    (volume.saturating_sub(vmin) as f64 / (vmax - vmin) as f64).clamp(0.0, 1.0)
}

/// Color for `volume` within `range`.
#[must_use]
pub fn volume_color(volume: u64, range: (u64, u64)) -> RGBColor {
    plasma(normalize(volume, range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_match_table() {
        assert_eq!(plasma(0.0), RGBColor(13, 8, 135));
        assert_eq!(plasma(1.0), RGBColor(240, 249, 33));
        assert_eq!(plasma(0.5), RGBColor(203, 70, 121));
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(plasma(-2.0), plasma(0.0));
        assert_eq!(plasma(3.0), plasma(1.0));
        assert_eq!(plasma(f64::NAN), plasma(0.0));
    }

    #[test]
    fn normalizes_volumes() {
        assert!((normalize(1, (1, 3)) - 0.0).abs() < 1e-12);
        assert!((normalize(2, (1, 3)) - 0.5).abs() < 1e-12);
        assert!((normalize(3, (1, 3)) - 1.0).abs() < 1e-12);
        assert!((normalize(7, (7, 7)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn busier_flows_are_brighter() {
        let low = volume_color(1, (1, 10));
        let high = volume_color(10, (1, 10));
        let luma = |c: RGBColor| u32::from(c.0) + u32::from(c.1) + u32::from(c.2);
        assert!(luma(high) > luma(low));
    }
}
