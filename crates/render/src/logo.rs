//! Logo padding onto a fixed transparent canvas.

use crate::asset::{encode_png, RenderedAsset};
use deckgen_core::{Error, Result};
use image::{imageops, RgbaImage};
use std::path::Path;

/// Centers a logo on a transparent canvas without scaling it.
///
/// The canvas is the base box, or twice the box when the logo is taller or
/// wider than it.
#[derive(Debug, Clone, Copy)]
pub struct LogoNormalizer {
    width: u32,
    height: u32,
}

impl LogoNormalizer {
    pub fn new(logo_box: (u32, u32)) -> Self {
        Self {
            width: logo_box.0,
            height: logo_box.1,
        }
    }

    /// Canvas size for a logo of `size` pixels.
    pub fn canvas_size(&self, size: (u32, u32)) -> (u32, u32) {
        let (w, h) = size;
        if h > self.height || w > self.width {
            (self.width * 2, self.height * 2)
        } else {
            (self.width, self.height)
        }
    }

    /// Decode a logo and paste it centered on the canvas. Logos larger than
    /// the doubled box are cropped evenly on both sides.
    pub fn normalize(&self, bytes: &[u8]) -> Result<RgbaImage> {
        let logo = image::load_from_memory(bytes)
            .map_err(|e| Error::LogoFetch(format!("Logo is not a readable image: {}", e)))?
            .to_rgba8();

        let (w, h) = logo.dimensions();
        let (canvas_w, canvas_h) = self.canvas_size((w, h));
        let x = (canvas_w as i64 - w as i64).div_euclid(2);
        let y = (canvas_h as i64 - h as i64).div_euclid(2);

        let mut canvas = RgbaImage::new(canvas_w, canvas_h);
        imageops::overlay(&mut canvas, &logo, x, y);
        log::debug!(
            "Placed {}x{} logo at ({}, {}) on {}x{} canvas",
            w,
            h,
            x,
            y,
            canvas_w,
            canvas_h
        );
        Ok(canvas)
    }

    pub fn normalize_png(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        encode_png(&self.normalize(bytes)?)
    }

    /// Normalize a logo into a temporary file in `dir`.
    pub fn render(&self, bytes: &[u8], dir: &Path) -> Result<RenderedAsset> {
        let png = self.normalize_png(bytes)?;
        RenderedAsset::write(dir, "logo-", &png)
    }
}
