//! In-memory OPC package: the parts of a `.pptx` ZIP archive.

use deckgen_core::{Error, Result};
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// A single file inside the package.
#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// All parts of a presentation, kept in archive order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    /// Read every part of a ZIP archive into memory.
    pub fn open<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", index, e)))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;
            parts.push(Part { name, data });
        }

        log::debug!("Opened package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// Read a package from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::open(Cursor::new(bytes))
    }

    /// Whether a part with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    /// Raw bytes of a part.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Read a part as UTF-8 text.
    pub fn read_string(&self, name: &str) -> Result<String> {
        let data = self
            .get(name)
            .ok_or_else(|| Error::ZipError(format!("File not found in archive '{}'", name)))?;
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::XmlError(format!("'{}' is not valid UTF-8: {}", name, e)))
    }

    /// Insert or replace a part. New parts go to the end of the archive.
    pub fn set(&mut self, name: &str, data: impl Into<Vec<u8>>) {
        let data = data.into();
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// Remove a part, returning whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.parts.len();
        self.parts.retain(|p| p.name != name);
        self.parts.len() != before
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Write the package as a ZIP archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            writer
                .start_file(part.name.as_str(), options)
                .map_err(|e| Error::Serialization(format!("Failed to add '{}': {}", part.name, e)))?;
            writer
                .write_all(&part.data)
                .map_err(|e| Error::Serialization(format!("Failed to write '{}': {}", part.name, e)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Serialization(format!("Failed to finish ZIP: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut package = Package::default();
        package.set("a.xml", "<a/>");
        package.set("b.xml", "<b/>");
        package.set("a.xml", "<a2/>");

        assert_eq!(package.len(), 2);
        assert_eq!(package.read_string("a.xml").unwrap(), "<a2/>");
        assert!(package.remove("b.xml"));
        assert!(!package.remove("b.xml"));
        assert!(package.read_string("b.xml").is_err());
    }

    #[test]
    fn test_zip_preserves_parts_and_order() {
        let mut package = Package::default();
        package.set("[Content_Types].xml", "<Types/>");
        package.set("ppt/media/image1.png", vec![0u8, 1, 2, 3]);

        let reopened = Package::from_bytes(&package.to_bytes().unwrap()).unwrap();
        let names: Vec<&str> = reopened.part_names().collect();
        assert_eq!(names, vec!["[Content_Types].xml", "ppt/media/image1.png"]);
        assert_eq!(reopened.get("ppt/media/image1.png"), Some(&[0u8, 1, 2, 3][..]));
    }

    #[test]
    fn test_open_rejects_non_zip() {
        assert!(matches!(
            Package::from_bytes(b"not a zip"),
            Err(Error::ZipError(_))
        ));
    }
}
