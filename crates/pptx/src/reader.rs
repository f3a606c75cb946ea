//! Read-only views of presentation XML: slide order, paragraph text and pictures.

use crate::xml::{local_name, parse_error, prefixed_attribute};
use deckgen_core::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Relationship ids of `p:sldId` entries in `presentation.xml`, in deck order.
pub fn slide_id_list(presentation_xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(presentation_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = prefixed_attribute(e, b"id") {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error("presentation", e)),
            _ => {}
        }
    }

    Ok(ids)
}

/// Text of every paragraph inside a text body, in document order.
pub fn paragraph_texts(slide_xml: &str) -> Result<Vec<String>> {
    let mut paragraphs = Vec::new();
    let mut reader = Reader::from_str(slide_xml);
    reader.trim_text(false);

    let mut in_text_body = false;
    let mut current: Option<String> = None;
    let mut in_t = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"txBody" => in_text_body = true,
                b"p" if in_text_body => current = Some(String::new()),
                b"t" => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if in_text_body && local_name(e.name().as_ref()) == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (true, Some(text)) = (in_t, current.as_mut()) {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"txBody" => in_text_body = false,
                b"p" => {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error("slide", e)),
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Relationship ids referenced by `a:blip r:embed` on a slide.
pub fn picture_embeds(slide_xml: &str) -> Result<Vec<String>> {
    let mut embeds = Vec::new();
    let mut reader = Reader::from_str(slide_xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"blip" =>
            {
                if let Some(id) = prefixed_attribute(e, b"embed") {
                    embeds.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error("slide", e)),
            _ => {}
        }
    }

    Ok(embeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENTATION: &str = r#"<p:presentation xmlns:p="urn:p" xmlns:r="urn:r"><p:sldIdLst><p:sldId id="257" r:id="rId7"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;

    const SLIDE: &str = r#"<p:sld xmlns:a="urn:a" xmlns:p="urn:p" xmlns:r="urn:r"><p:cSld><p:spTree>
<p:sp><p:spPr><a:xfrm><a:off x="500" y="2000"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Body &amp; more</a:t></a:r></a:p><a:p/><a:p><a:r><a:t>Second</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:spPr><a:xfrm><a:off x="100" y="100"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Title</a:t></a:r></a:p></p:txBody></p:sp>
<p:pic><p:blipFill><a:blip r:embed="rId3"/></p:blipFill></p:pic>
</p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_slide_id_list_keeps_document_order() {
        assert_eq!(slide_id_list(PRESENTATION).unwrap(), vec!["rId7", "rId2"]);
    }

    #[test]
    fn test_paragraph_texts() {
        assert_eq!(
            paragraph_texts(SLIDE).unwrap(),
            vec!["Body & more", "", "Second", "Title"]
        );
    }

    #[test]
    fn test_picture_embeds() {
        assert_eq!(picture_embeds(SLIDE).unwrap(), vec!["rId3"]);
    }
}
