//! Picture shapes (`p:pic`) appended to a slide's shape tree.

use crate::xml::{attribute, into_string, local_name, parse_error, write};
use deckgen_core::{Error, Placement, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Position and size of a picture in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    /// Place an image of `pixels` (width, height) at `placement`, keeping its aspect ratio.
    pub fn fit(placement: Placement, pixels: (u32, u32)) -> Result<Self> {
        let (w, h) = pixels;
        if w == 0 || h == 0 {
            return Err(Error::Render(format!("Image has no area: {}x{}", w, h)));
        }
        let cy = (placement.width as f64 * h as f64 / w as f64).round() as i64;
        Ok(Self {
            x: placement.left,
            y: placement.top,
            cx: placement.width,
            cy,
        })
    }
}

/// Largest `cNvPr id` on the slide plus one.
pub fn next_shape_id(slide_xml: &str) -> Result<u32> {
    let mut max_id = 1u32;
    let mut reader = Reader::from_str(slide_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"cNvPr" =>
            {
                if let Some(id) = attribute(e, b"id").and_then(|v| v.parse::<u32>().ok()) {
                    max_id = max_id.max(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error("slide", e)),
            _ => {}
        }
    }

    Ok(max_id + 1)
}

fn picture_xml(shape_id: u32, name: &str, rel_id: &str, frame: Frame) -> String {
    format!(
        concat!(
            "<p:pic>",
            "<p:nvPicPr><p:cNvPr id=\"{id}\" name=\"Picture {id}\" descr=\"{name}\"/>",
            "<p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>",
            "<p:blipFill><a:blip r:embed=\"{rid}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>",
            "<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
            "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr>",
            "</p:pic>"
        ),
        id = shape_id,
        name = escape(name),
        rid = escape(rel_id),
        x = frame.x,
        y = frame.y,
        cx = frame.cx,
        cy = frame.cy,
    )
}

/// Append a picture referencing `rel_id` as the last shape of the slide.
pub fn insert_picture(slide_xml: &str, name: &str, rel_id: &str, frame: Frame) -> Result<String> {
    let shape_id = next_shape_id(slide_xml)?;
    let picture = picture_xml(shape_id, name, rel_id, frame);

    let mut reader = Reader::from_str(slide_xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(slide_xml.len() + picture.len()));
    let mut inserted = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error("slide", e))?;
        match &event {
            Event::End(e) if !inserted && local_name(e.name().as_ref()) == b"spTree" => {
                writer
                    .get_mut()
                    .write_all(picture.as_bytes())
                    .map_err(|e| Error::XmlError(format!("Failed to write picture: {}", e)))?;
                inserted = true;
            }
            Event::Eof => break,
            _ => {}
        }
        write(&mut writer, event)?;
    }

    if !inserted {
        return Err(Error::Template("Slide has no shape tree".to_string()));
    }
    into_string(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::picture_embeds;

    const SLIDE: &str = r#"<p:sld xmlns:a="urn:a" xmlns:p="urn:p" xmlns:r="urn:r"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="4" name="Title"/></p:nvSpPr></p:sp></p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_frame_keeps_aspect_ratio() {
        let frame = Frame::fit(Placement::from_inches(2.5, 1.0, 8.0), (700, 500)).unwrap();
        assert_eq!(frame.cx, 7_315_200);
        assert_eq!(frame.cy, 5_225_143);
        assert!(Frame::fit(Placement::from_inches(0.0, 0.0, 1.0), (0, 10)).is_err());
    }

    #[test]
    fn test_next_shape_id() {
        assert_eq!(next_shape_id(SLIDE).unwrap(), 5);
    }

    #[test]
    fn test_insert_picture_at_end_of_tree() {
        let frame = Frame { x: 1, y: 2, cx: 3, cy: 4 };
        let xml = insert_picture(SLIDE, "logo.png", "rId2", frame).unwrap();

        assert!(xml.ends_with("</p:pic></p:spTree></p:cSld></p:sld>"));
        assert!(xml.contains(r#"<p:cNvPr id="5" name="Picture 5" descr="logo.png"/>"#));
        assert!(xml.contains(r#"<a:off x="1" y="2"/><a:ext cx="3" cy="4"/>"#));
        assert_eq!(picture_embeds(&xml).unwrap(), vec!["rId2"]);
    }

    #[test]
    fn test_insert_picture_without_tree_fails() {
        let frame = Frame { x: 0, y: 0, cx: 1, cy: 1 };
        assert!(insert_picture("<p:sld xmlns:p=\"urn:p\"/>", "x", "rId1", frame).is_err());
    }
}
