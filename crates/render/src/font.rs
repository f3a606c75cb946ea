//! TrueType font registration for chart text.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Family name charts use for all text.
pub const FONT_FAMILY: &str = "deckgen-sans";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Register the chart font once per process. `preferred` is tried before the
/// common system locations. Returns whether text can be drawn.
///
/// Only the first call chooses the font; later calls report that outcome.
pub fn load_chart_font(preferred: Option<&Path>) -> bool {
    REGISTERED.get_or_init(|| register(preferred)).is_some()
}

fn register(preferred: Option<&Path>) -> Option<PathBuf> {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters keeps registered fonts for the life of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                log::debug!("Using chart font {}", path.display());
                return Some(path);
            }
            Err(_) => log::warn!("Skipping font {}: invalid font", path.display()),
        }
    }

    log::warn!("No TrueType font found; charts will be rendered without text");
    None
}
