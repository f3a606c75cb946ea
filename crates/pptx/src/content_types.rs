//! The `[Content_Types].xml` part.

use crate::xml::{attribute, local_name, parse_error};
use deckgen_core::Result;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Default (by extension) and override (by part name) content types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"Default" => {
                            if let (Some(ext), Some(ct)) =
                                (attribute(e, b"Extension"), attribute(e, b"ContentType"))
                            {
                                types.defaults.push((ext.to_ascii_lowercase(), ct));
                            }
                        }
                        b"Override" => {
                            if let (Some(part), Some(ct)) =
                                (attribute(e, b"PartName"), attribute(e, b"ContentType"))
                            {
                                types.overrides.push((part, ct));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(parse_error("content types", e)),
                _ => {}
            }
        }

        Ok(types)
    }

    /// Register a default for `extension` unless one exists.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        let extension = extension.to_ascii_lowercase();
        if !self.defaults.iter().any(|(ext, _)| *ext == extension) {
            self.defaults.push((extension, content_type.to_string()));
        }
    }

    /// Set the override for a package part (`ppt/slides/slide1.xml`).
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        match self.overrides.iter_mut().find(|(p, _)| *p == part_name) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((part_name, content_type.to_string())),
        }
    }

    pub fn remove_override(&mut self, part: &str) -> bool {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        let before = self.overrides.len();
        self.overrides.retain(|(p, _)| *p != part_name);
        before != self.overrides.len()
    }

    /// Content type of a part, by override first and then by extension.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        if let Some((_, ct)) = self.overrides.iter().find(|(p, _)| *p == part_name) {
            return Some(ct);
        }
        let extension = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
        );
        xml.push_str(&format!("<Types xmlns=\"{}\">", CONTENT_TYPES_NS));
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                "<Default Extension=\"{}\" ContentType=\"{}\"/>",
                escape(ext.as_str()),
                escape(ct.as_str())
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                "<Override PartName=\"{}\" ContentType=\"{}\"/>",
                escape(part.as_str()),
                escape(ct.as_str())
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/></Types>"#;

    #[test]
    fn test_lookup() {
        let types = ContentTypes::parse(TYPES).unwrap();
        assert_eq!(types.content_type_of("ppt/slides/slide1.xml"), Some(CT_SLIDE));
        assert_eq!(types.content_type_of("docProps/app.xml"), Some("application/xml"));
        assert_eq!(types.content_type_of("ppt/media/image1.png"), None);
    }

    #[test]
    fn test_ensure_default_and_remove_override() {
        let mut types = ContentTypes::parse(TYPES).unwrap();
        types.ensure_default("PNG", "image/png");
        types.ensure_default("png", "image/other");
        assert_eq!(types.content_type_of("ppt/media/image1.png"), Some("image/png"));

        assert!(types.remove_override("ppt/slides/slide1.xml"));
        assert!(!types.remove_override("ppt/slides/slide1.xml"));

        let reparsed = ContentTypes::parse(&types.to_xml()).unwrap();
        assert_eq!(reparsed, types);
    }
}
