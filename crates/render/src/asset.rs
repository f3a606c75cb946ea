//! Temporary image files.

use deckgen_core::{Error, Result};
use image::{ImageFormat, RgbaImage};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// A PNG written to the working directory. The file is removed when the
/// asset is dropped, whether or not the run succeeded.
#[derive(Debug)]
pub struct RenderedAsset {
    file: NamedTempFile,
}

impl RenderedAsset {
    /// Write `png` to a new file named `{prefix}XXXX.png` inside `dir`.
    pub fn write(dir: &Path, prefix: &str, png: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".png")
            .tempfile_in(dir)?;
        file.write_all(png)?;
        file.flush()?;
        log::debug!("Wrote {} bytes to {}", png.len(), file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::Render(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let asset = RenderedAsset::write(dir.path(), "chart-", b"png bytes").unwrap();
        let path = asset.path().to_path_buf();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png bytes");

        drop(asset);
        assert!(!path.exists());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            RenderedAsset::write(&missing, "logo-", b"x"),
            Err(Error::IoError(_))
        ));
    }
}
