//! Font registration for map text.
//!
//! Text is rasterized with `ab_glyph`, which needs font bytes registered
//! under a family name before the first draw. Registration happens once
//! per process. When no font can be found the map is still rendered,
//! without text.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::FontStyle;

/// Family name every text element is drawn with.
pub const LABEL_FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<bool> = OnceLock::new();

/// Registers the label font if that has not happened yet and reports
/// whether text can be drawn.
///
/// `preferred` is tried before the system locations. Only the first call
/// in a process decides which font is used.
pub fn ensure_label_font(preferred: Option<&Path>) -> bool {
    *REGISTERED.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match plotters::style::register_font(LABEL_FONT_FAMILY, FontStyle::Normal, bytes) {
                Ok(()) => {
                    log::debug!("Registered label font {}", path.display());
                    return true;
                }
                Err(_) => log::warn!("Ignoring unreadable font {}", path.display()),
            }
        }

        log::warn!("No usable font found; flow maps will be drawn without text");
        false
    })
}

/// Rough text extent for when no font is available.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn approximate_text_size(text: &str, size_px: f64) -> (u32, u32) {
    let chars = text.chars().count() as f64;
    ((chars * size_px * 0.55).ceil() as u32, size_px.ceil() as u32)
}
