//! Font registration for the PNG backend

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lazy_static::lazy_static;
use plotters::style::{register_font, FontStyle};
use tracing::{debug, info};

use crate::error::{ReportError, ReportResult};

/// Family name every chart element is drawn with.
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

lazy_static! {
    static ref REGISTERED_FONT: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Pick the configured font, or the first system font that exists.
pub fn locate_font(configured: Option<&Path>) -> ReportResult<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ReportError::FontError(format!(
            "configured font {} does not exist",
            path.display()
        )));
    }

    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            ReportError::FontError(format!(
                "no usable font found, searched: {}",
                SYSTEM_FONT_CANDIDATES.join(", ")
            ))
        })
}

/// Register a font under [`FONT_FAMILY`]. Only the first successful call loads a font;
/// later calls return the path already in use.
pub fn ensure_font_registered(configured: Option<&Path>) -> ReportResult<PathBuf> {
    let mut registered = REGISTERED_FONT
        .lock()
        .map_err(|_| ReportError::InternalError("font registry lock poisoned".to_string()))?;

    if let Some(path) = registered.as_ref() {
        debug!("Font already registered from {:?}", path);
        return Ok(path.clone());
    }

    let path = locate_font(configured)?;
    let bytes = std::fs::read(&path)
        .map_err(|e| ReportError::FontError(format!("{}: {}", path.display(), e)))?;

    // The backend keeps glyph data for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| {
        ReportError::FontError(format!("{} is not a valid TrueType font", path.display()))
    })?;

    info!("Registered chart font {:?}", path);
    *registered = Some(path.clone());
    Ok(path)
}
