//! An editable presentation: slide lookup, text substitution, pictures and
//! slide removal on top of the raw package.

use crate::content_types::{ContentTypes, CONTENT_TYPES_PART};
use crate::package::Package;
use crate::picture::{insert_picture, Frame};
use crate::reader::{paragraph_texts, picture_embeds, slide_id_list};
use crate::rels::{
    rels_path_for, resolve_target, Relationships, REL_IMAGE, REL_NOTES_SLIDE,
    REL_OFFICE_DOCUMENT,
};
use crate::text::replace_placeholders;
use crate::xml::{into_string, local_name, parse_error, prefixed_attribute, write};
use deckgen_core::{Error, PlaceholderMap, Placement, Result};
use image::ImageFormat;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::collections::{BTreeSet, HashSet};
use std::io::Cursor;
use std::path::Path;

const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
const MEDIA_DIR: &str = "ppt/media/";

/// A slide in deck order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SlideRef {
    /// Relationship id in the presentation rels.
    rel_id: String,
    /// Package part name, e.g. `ppt/slides/slide3.xml`.
    part: String,
}

/// A presentation loaded into memory for editing.
#[derive(Debug, Clone)]
pub struct Deck {
    package: Package,
    content_types: ContentTypes,
    presentation_part: String,
    presentation_rels: Relationships,
    slides: Vec<SlideRef>,
}

impl Deck {
    /// Load a deck from the bytes of a `.pptx` file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    /// Load a `.pptx` template from disk. Read failures are template errors.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Template(format!("Failed to read template '{}': {}", path.display(), e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// The bundled six-slide template.
    pub fn builtin() -> Result<Self> {
        Self::from_bytes(&crate::template::builtin_template()?)
    }

    pub fn from_package(package: Package) -> Result<Self> {
        let content_types = ContentTypes::parse(&package.read_string(CONTENT_TYPES_PART)?)?;

        let presentation_part = match package.read_string("_rels/.rels") {
            Ok(xml) => Relationships::parse(&xml)?
                .first_of_type(REL_OFFICE_DOCUMENT)
                .map(|r| resolve_target("", &r.target))
                .unwrap_or_else(|| DEFAULT_PRESENTATION_PART.to_string()),
            Err(_) => DEFAULT_PRESENTATION_PART.to_string(),
        };
        if !package.contains(&presentation_part) {
            return Err(Error::Template(format!(
                "Presentation part '{}' is missing",
                presentation_part
            )));
        }

        let presentation_rels =
            Relationships::parse(&package.read_string(&rels_path_for(&presentation_part))?)?;

        let mut slides = Vec::new();
        for rel_id in slide_id_list(&package.read_string(&presentation_part)?)? {
            let rel = presentation_rels.get(&rel_id).ok_or_else(|| {
                Error::Template(format!("Slide relationship '{}' not found", rel_id))
            })?;
            let part = resolve_target(&presentation_part, &rel.target);
            if !package.contains(&part) {
                return Err(Error::Template(format!("Slide part '{}' is missing", part)));
            }
            slides.push(SlideRef { rel_id, part });
        }

        log::debug!(
            "Loaded deck '{}' with {} slides",
            presentation_part,
            slides.len()
        );

        Ok(Self {
            package,
            content_types,
            presentation_part,
            presentation_rels,
            slides,
        })
    }

    /// Number of slides listed in `presentation.xml`.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Package part of the slide at `index` (zero-based, deck order).
    pub fn slide_part(&self, index: usize) -> Option<&str> {
        self.slides.get(index).map(|s| s.part.as_str())
    }

    fn slide(&self, index: usize) -> Result<&SlideRef> {
        self.slides.get(index).ok_or_else(|| {
            Error::Template(format!(
                "Slide {} does not exist (deck has {} slides)",
                index + 1,
                self.slides.len()
            ))
        })
    }

    /// Paragraph texts of a slide.
    pub fn slide_texts(&self, index: usize) -> Result<Vec<String>> {
        let slide = self.slide(index)?;
        paragraph_texts(&self.package.read_string(&slide.part)?)
    }

    /// Media parts embedded as pictures on a slide, in shape order.
    pub fn slide_media(&self, index: usize) -> Result<Vec<String>> {
        let slide = self.slide(index)?;
        let rels = self.part_rels(&slide.part)?;
        let embeds = picture_embeds(&self.package.read_string(&slide.part)?)?;
        Ok(embeds
            .iter()
            .filter_map(|id| rels.get(id))
            .map(|r| resolve_target(&slide.part, &r.target))
            .collect())
    }

    /// Substitute placeholder tokens on one slide. Returns the number of
    /// paragraphs that changed.
    pub fn replace_text(&mut self, index: usize, map: &PlaceholderMap) -> Result<usize> {
        let part = self.slide(index)?.part.clone();
        let substitution = replace_placeholders(&self.package.read_string(&part)?, map)?;
        if substitution.paragraphs > 0 {
            self.package.set(&part, substitution.xml);
        }
        log::debug!(
            "Replaced placeholders in {} paragraph(s) of {}",
            substitution.paragraphs,
            part
        );
        Ok(substitution.paragraphs)
    }

    /// Embed an image on a slide at `placement`, keeping its aspect ratio.
    pub fn add_picture(&mut self, index: usize, bytes: &[u8], placement: Placement) -> Result<Frame> {
        let part = self.slide(index)?.part.clone();

        let format = image::guess_format(bytes)
            .map_err(|e| Error::Render(format!("Unrecognised image data: {}", e)))?;
        let (extension, mime) = media_type(format)?;
        let dimensions = image::io::Reader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(|e| Error::Render(format!("Failed to read image size: {}", e)))?;
        let frame = Frame::fit(placement, dimensions)?;

        let media_part = self.next_media_part(extension);
        self.package.set(&media_part, bytes.to_vec());
        self.content_types.ensure_default(extension, mime);

        let mut rels = self.part_rels(&part)?;
        let rel_id = rels.add(REL_IMAGE, &relative_target(&part, &media_part));
        self.package.set(&rels_path_for(&part), rels.to_xml());

        let file_name = media_part.rsplit('/').next().unwrap_or(&media_part).to_string();
        let slide_xml = insert_picture(&self.package.read_string(&part)?, &file_name, &rel_id, frame)?;
        self.package.set(&part, slide_xml);
        self.flush();

        log::debug!("Added {} to {} as {}", media_part, part, rel_id);
        Ok(frame)
    }

    /// Embed an image file on a slide.
    pub fn add_picture_file(&mut self, index: usize, path: &Path, placement: Placement) -> Result<Frame> {
        let bytes = std::fs::read(path)?;
        self.add_picture(index, &bytes, placement)
    }

    /// Remove the slides at the given zero-based indices.
    ///
    /// All indices are resolved against the current order before anything is
    /// removed, so the remaining slides keep their relative order.
    pub fn remove_slides(&mut self, indices: &BTreeSet<usize>) -> Result<()> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.slides.len()) {
            return Err(Error::Template(format!(
                "Cannot remove slide {}: deck has {} slides",
                bad + 1,
                self.slides.len()
            )));
        }
        if indices.is_empty() {
            return Ok(());
        }

        let removed: Vec<SlideRef> = indices.iter().map(|&i| self.slides[i].clone()).collect();
        let removed_ids: HashSet<&str> = removed.iter().map(|s| s.rel_id.as_str()).collect();

        let presentation_xml = self.package.read_string(&self.presentation_part)?;
        let rewritten = drop_slide_ids(&presentation_xml, &removed_ids)?;
        self.package.set(&self.presentation_part, rewritten);

        for slide in &removed {
            self.presentation_rels.remove(&slide.rel_id);
            let rels_path = rels_path_for(&slide.part);
            if let Ok(xml) = self.package.read_string(&rels_path) {
                for rel in Relationships::parse(&xml)?.iter() {
                    if rel.rel_type == REL_NOTES_SLIDE && !rel.external {
                        let notes = resolve_target(&slide.part, &rel.target);
                        self.remove_part(&notes);
                    }
                }
            }
            self.remove_part(&slide.part);
            log::debug!("Removed slide {}", slide.part);
        }

        let mut index = 0;
        self.slides.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });

        self.collect_unused_media()?;
        self.flush();
        Ok(())
    }

    /// Keep only the slides for which `keep` returns true.
    pub fn retain_slides(&mut self, keep: impl Fn(usize) -> bool) -> Result<()> {
        let remove: BTreeSet<usize> = (0..self.slides.len()).filter(|&i| !keep(i)).collect();
        self.remove_slides(&remove)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package.to_bytes()
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    fn part_rels(&self, part: &str) -> Result<Relationships> {
        match self.package.read_string(&rels_path_for(part)) {
            Ok(xml) => Relationships::parse(&xml),
            Err(_) => Ok(Relationships::new()),
        }
    }

    fn remove_part(&mut self, part: &str) {
        self.package.remove(part);
        self.package.remove(&rels_path_for(part));
        self.content_types.remove_override(part);
    }

    fn next_media_part(&self, extension: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{}image{}.{}", MEDIA_DIR, n, extension);
            if !self.package.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Delete media parts that no remaining relationship points at.
    fn collect_unused_media(&mut self) -> Result<()> {
        let mut referenced = HashSet::new();
        for rels_path in self.package.part_names().filter(|n| n.ends_with(".rels")) {
            let source = source_part_for(rels_path);
            for rel in Relationships::parse(&self.package.read_string(rels_path)?)?.iter() {
                if !rel.external {
                    referenced.insert(resolve_target(&source, &rel.target));
                }
            }
        }

        let unused: Vec<String> = self
            .package
            .part_names()
            .filter(|n| n.starts_with(MEDIA_DIR) && !referenced.contains(*n))
            .map(str::to_string)
            .collect();
        for part in unused {
            log::debug!("Dropping unreferenced media {}", part);
            self.remove_part(&part);
        }
        Ok(())
    }

    fn flush(&mut self) {
        self.package
            .set(CONTENT_TYPES_PART, self.content_types.to_xml());
        self.package.set(
            &rels_path_for(&self.presentation_part),
            self.presentation_rels.to_xml(),
        );
    }
}

fn media_type(format: ImageFormat) -> Result<(&'static str, &'static str)> {
    match format {
        ImageFormat::Png => Ok(("png", "image/png")),
        ImageFormat::Jpeg => Ok(("jpeg", "image/jpeg")),
        ImageFormat::Gif => Ok(("gif", "image/gif")),
        ImageFormat::Bmp => Ok(("bmp", "image/bmp")),
        other => Err(Error::Render(format!(
            "Image format {:?} cannot be embedded in a presentation",
            other
        ))),
    }
}

/// Part that owns a `.rels` file (`ppt/slides/_rels/slide1.xml.rels` →
/// `ppt/slides/slide1.xml`, `_rels/.rels` → the package root).
fn source_part_for(rels_path: &str) -> String {
    let file = rels_path.trim_end_matches(".rels");
    match file.rsplit_once("_rels/") {
        Some((dir, name)) => format!("{}{}", dir, name),
        None => file.to_string(),
    }
}

/// Relative target from the directory of `from` to `to`.
fn relative_target(from: &str, to: &str) -> String {
    let from_dir: Vec<&str> = match from.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let to_segments: Vec<&str> = to.split('/').collect();

    let common = from_dir
        .iter()
        .zip(to_segments.iter())
        .take_while(|(a, b)| a == b)
        .count()
        .min(to_segments.len().saturating_sub(1));

    let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
    parts.extend(&to_segments[common..]);
    parts.join("/")
}

/// Rewrite `p:sldIdLst` without the entries whose `r:id` is in `removed`.
fn drop_slide_ids(presentation_xml: &str, removed: &HashSet<&str>) -> Result<String> {
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(presentation_xml.len()));
    let mut skip_depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error("presentation", e))?;

        if skip_depth > 0 {
            match &event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            continue;
        }

        let drop = match &event {
            Event::Empty(e) | Event::Start(e) if local_name(e.name().as_ref()) == b"sldId" => {
                prefixed_attribute(e, b"id").is_some_and(|id| removed.contains(id.as_str()))
            }
            Event::Eof => break,
            _ => false,
        };
        if drop {
            if matches!(event, Event::Start(_)) {
                skip_depth = 1;
            }
            continue;
        }
        write(&mut writer, event)?;
    }

    into_string(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_core::{Metric, Selection, SlidePlan};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_builtin_deck_slides() {
        let deck = Deck::builtin().unwrap();
        assert_eq!(deck.slide_count(), 6);
        assert_eq!(deck.slide_part(0), Some("ppt/slides/slide1.xml"));
        assert_eq!(deck.slide_texts(2).unwrap(), vec!["Stock Price"]);
        assert!(deck.slide_part(6).is_none());
    }

    #[test]
    fn test_replace_text_on_title_slide() {
        let mut deck = Deck::builtin().unwrap();
        let map = PlaceholderMap::new()
            .with("{company}", "Apple Inc.")
            .with("{date}", "2024-01-31");
        assert_eq!(deck.replace_text(0, &map).unwrap(), 2);
        assert_eq!(
            deck.slide_texts(0).unwrap(),
            vec!["Apple Inc.", "Company profile as of 2024-01-31"]
        );
        assert_eq!(deck.replace_text(0, &map).unwrap(), 0);
    }

    #[test]
    fn test_add_picture_registers_media() {
        let mut deck = Deck::builtin().unwrap();
        let frame = deck
            .add_picture(2, &png(700, 500), Placement::from_inches(2.5, 1.0, 8.0))
            .unwrap();
        assert_eq!(frame.cy, 5_225_143);
        deck.add_picture(3, &png(10, 10), Placement::from_inches(2.5, 1.0, 8.0))
            .unwrap();

        assert_eq!(deck.slide_media(2).unwrap(), vec!["ppt/media/image1.png"]);
        assert_eq!(deck.slide_media(3).unwrap(), vec!["ppt/media/image2.png"]);

        let reopened = Deck::from_bytes(&deck.to_bytes().unwrap()).unwrap();
        let types = ContentTypes::parse(
            &reopened.package().read_string(CONTENT_TYPES_PART).unwrap(),
        )
        .unwrap();
        assert_eq!(types.content_type_of("ppt/media/image1.png"), Some("image/png"));
        assert_eq!(reopened.slide_media(2).unwrap(), vec!["ppt/media/image1.png"]);
    }

    #[test]
    fn test_add_picture_rejects_garbage() {
        let mut deck = Deck::builtin().unwrap();
        let result = deck.add_picture(0, b"not an image", Placement::from_inches(0.0, 0.0, 1.0));
        assert!(matches!(result, Err(Error::Render(_))));
    }

    #[test]
    fn test_remove_slides_keeps_order_and_cleans_parts() {
        let mut deck = Deck::builtin().unwrap();
        deck.add_picture(3, &png(4, 4), Placement::from_inches(2.5, 1.0, 8.0))
            .unwrap();
        deck.add_picture(2, &png(4, 4), Placement::from_inches(2.5, 1.0, 8.0))
            .unwrap();

        let selection: Selection = [Metric::Revenue, Metric::StockPrice].into_iter().collect();
        let plan = SlidePlan::for_selection(&selection);
        deck.retain_slides(|i| plan.keeps(i)).unwrap();

        assert_eq!(deck.slide_count(), 4);
        assert_eq!(deck.slide_texts(2).unwrap(), vec!["Stock Price"]);
        assert_eq!(deck.slide_texts(3).unwrap(), vec!["Revenue"]);

        let package = deck.package();
        assert!(!package.contains("ppt/slides/slide5.xml"));
        assert!(!package.contains("ppt/slides/_rels/slide6.xml.rels"));
        assert!(package.contains("ppt/media/image1.png"));

        let reopened = Deck::from_bytes(&deck.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.slide_count(), 4);
        let types = ContentTypes::parse(
            &reopened.package().read_string(CONTENT_TYPES_PART).unwrap(),
        )
        .unwrap();
        assert_eq!(types.content_type_of("ppt/slides/slide5.xml"), None);
    }

    #[test]
    fn test_remove_slides_drops_orphaned_media() {
        let mut deck = Deck::builtin().unwrap();
        deck.add_picture(5, &png(4, 4), Placement::from_inches(2.5, 1.0, 8.0))
            .unwrap();
        assert!(deck.package().contains("ppt/media/image1.png"));

        deck.remove_slides(&BTreeSet::from([5])).unwrap();
        assert_eq!(deck.slide_count(), 5);
        assert!(!deck.package().contains("ppt/media/image1.png"));
    }

    #[test]
    fn test_remove_all_chart_slides() {
        let mut deck = Deck::builtin().unwrap();
        deck.remove_slides(&BTreeSet::from([2, 3, 4, 5])).unwrap();
        let reopened = Deck::from_bytes(&deck.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.slide_count(), 2);
        assert_eq!(reopened.slide_texts(1).unwrap()[0], "{c}");
    }

    #[test]
    fn test_remove_out_of_range_slide_fails() {
        let mut deck = Deck::builtin().unwrap();
        assert!(deck.remove_slides(&BTreeSet::from([6])).is_err());
        assert_eq!(deck.slide_count(), 6);
    }

    #[test]
    fn test_drop_slide_ids_with_children() {
        let xml = r#"<p:presentation xmlns:p="urn:p" xmlns:r="urn:r"><p:sldIdLst><p:sldId id="256" r:id="rId2"><p:extLst/></p:sldId><p:sldId id="257" r:id="rId3"/></p:sldIdLst></p:presentation>"#;
        let removed = HashSet::from(["rId2"]);
        let out = drop_slide_ids(xml, &removed).unwrap();
        assert_eq!(slide_id_list(&out).unwrap(), vec!["rId3"]);
        assert!(!out.contains("extLst"));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(
            relative_target("ppt/slides/slide1.xml", "ppt/media/image1.png"),
            "../media/image1.png"
        );
        assert_eq!(
            relative_target("ppt/presentation.xml", "ppt/slides/slide1.xml"),
            "slides/slide1.xml"
        );
        assert_eq!(source_part_for("ppt/slides/_rels/slide1.xml.rels"), "ppt/slides/slide1.xml");
        assert_eq!(source_part_for("_rels/.rels"), "");
    }
}
