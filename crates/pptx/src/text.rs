//! Placeholder substitution inside slide XML.
//!
//! Works paragraph by paragraph on the text bodies of the slide's top-level
//! `p:sp` shapes; grouped shapes and table cells are left alone. A paragraph
//! whose concatenated run text contains a token is collapsed into its first
//! run, which receives the fully substituted text. Formatting of the other
//! runs is lost; non-run children such as `a:pPr`, `a:br` and `a:endParaRPr`
//! are kept. Paragraphs without a token are written back unchanged.

use crate::xml::{into_string, local_name, parse_error, prefix_of, write};
use deckgen_core::{PlaceholderMap, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Result of rewriting one slide.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub xml: String,
    /// Number of paragraphs that contained at least one token.
    pub paragraphs: usize,
}

/// Replace placeholder tokens in every paragraph of a slide.
pub fn replace_placeholders(xml: &str, map: &PlaceholderMap) -> Result<Substitution> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut text_body: Option<usize> = None;
    let mut paragraph: Option<Vec<Event<'static>>> = None;
    let mut paragraph_depth = 0usize;
    let mut replaced = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| parse_error("slide", e))?;

        if let Some(buffer) = paragraph.as_mut() {
            match &event {
                Event::Start(_) => paragraph_depth += 1,
                Event::End(_) => paragraph_depth -= 1,
                Event::Eof => {
                    return Err(deckgen_core::Error::XmlError(
                        "Unexpected end of slide inside a paragraph".to_string(),
                    ))
                }
                _ => {}
            }
            buffer.push(event.into_owned());

            if paragraph_depth == 0 {
                let events = paragraph.take().unwrap_or_default();
                let (events, changed) = rewrite_paragraph(events, map);
                if changed {
                    replaced += 1;
                }
                for e in events {
                    write(&mut writer, e)?;
                }
            }
            continue;
        }

        let mut begins_paragraph = false;
        match &event {
            Event::Start(e) => {
                let qname = e.name();
                let name = local_name(qname.as_ref());
                if text_body.is_some() && name == b"p" {
                    begins_paragraph = true;
                } else {
                    if name == b"txBody" && text_body.is_none() && is_top_level_shape(&path) {
                        text_body = Some(path.len());
                    }
                    path.push(name.to_vec());
                }
            }
            Event::End(_) => {
                path.pop();
                if text_body == Some(path.len()) {
                    text_body = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }

        if begins_paragraph {
            paragraph = Some(vec![event.into_owned()]);
            paragraph_depth = 1;
            continue;
        }
        write(&mut writer, event)?;
    }

    Ok(Substitution {
        xml: into_string(writer)?,
        paragraphs: replaced,
    })
}

/// Whether `path` ends at a shape directly inside the slide's shape tree.
fn is_top_level_shape(path: &[Vec<u8>]) -> bool {
    matches!(path, [.., tree, shape] if tree.as_slice() == b"spTree" && shape.as_slice() == b"sp")
}

/// A direct child of `a:p`.
enum Segment {
    Run(Vec<Event<'static>>),
    Other(Vec<Event<'static>>),
}

fn is_run(e: &BytesStart<'_>) -> bool {
    local_name(e.name().as_ref()) == b"r"
}

/// Split the children of a paragraph (without its own start/end tags) into segments.
fn segments(children: Vec<Event<'static>>) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Vec<Event<'static>> = Vec::new();
    let mut depth = 0usize;
    let mut in_run = false;

    for event in children {
        let top_level = depth == 0;
        let mut empty_run = None;
        match &event {
            Event::Start(e) => {
                if top_level {
                    in_run = is_run(e);
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Empty(e) if top_level => empty_run = Some(is_run(e)),
            _ => {}
        }

        match empty_run {
            Some(true) => {
                segments.push(Segment::Run(vec![event]));
                continue;
            }
            Some(false) => {
                segments.push(Segment::Other(vec![event]));
                continue;
            }
            None => {}
        }

        current.push(event);
        if depth == 0 {
            let events = std::mem::take(&mut current);
            segments.push(if in_run {
                Segment::Run(events)
            } else {
                Segment::Other(events)
            });
            in_run = false;
        }
    }
    if !current.is_empty() {
        segments.push(Segment::Other(current));
    }
    segments
}

/// Concatenated text of the `a:t` elements in a run.
fn run_text(events: &[Event<'static>]) -> String {
    let mut text = String::new();
    let mut in_t = false;
    for event in events {
        match event {
            Event::Start(e) if local_name(e.name().as_ref()) == b"t" => in_t = true,
            Event::End(e) if local_name(e.name().as_ref()) == b"t" => in_t = false,
            Event::Text(e) if in_t => {
                text.push_str(&e.unescape().unwrap_or_default());
            }
            Event::CData(e) if in_t => {
                text.push_str(&String::from_utf8_lossy(e));
            }
            _ => {}
        }
    }
    text
}

/// Rebuild a run so that its only text is `text`, keeping its properties.
fn retext_run(events: Vec<Event<'static>>, text: &str) -> Vec<Event<'static>> {
    let (run_name, self_closing) = match events.first() {
        Some(Event::Start(e)) => (String::from_utf8_lossy(e.name().as_ref()).into_owned(), false),
        Some(Event::Empty(e)) => (String::from_utf8_lossy(e.name().as_ref()).into_owned(), true),
        _ => return events,
    };
    let t_name = format!("{}t", prefix_of(run_name.as_bytes()));
    let new_t = |name: &str| -> Vec<Event<'static>> {
        vec![
            Event::Start(BytesStart::new(name.to_string())),
            Event::Text(BytesText::new(text).into_owned()),
            Event::End(BytesEnd::new(name.to_string())),
        ]
    };

    if self_closing {
        let mut out = vec![Event::Start(BytesStart::new(run_name.clone()))];
        out.extend(new_t(&t_name));
        out.push(Event::End(BytesEnd::new(run_name)));
        return out;
    }

    let last = events.len().saturating_sub(1);
    let mut out = Vec::with_capacity(events.len() + 3);
    let mut emitted = false;
    let mut skipping = 0usize;
    let mut depth = 0usize;

    for (index, event) in events.into_iter().enumerate() {
        if index == 0 {
            out.push(event);
            continue;
        }
        if index == last {
            if !emitted {
                out.extend(new_t(&t_name));
            }
            out.push(event);
            break;
        }
        if skipping > 0 {
            match &event {
                Event::Start(_) => skipping += 1,
                Event::End(_) => skipping -= 1,
                _ => {}
            }
            continue;
        }

        match &event {
            Event::Start(e) if depth == 0 && local_name(e.name().as_ref()) == b"t" => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !emitted {
                    out.extend(new_t(&name));
                    emitted = true;
                }
                skipping = 1;
                continue;
            }
            Event::Empty(e) if depth == 0 && local_name(e.name().as_ref()) == b"t" => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if !emitted {
                    out.extend(new_t(&name));
                    emitted = true;
                }
                continue;
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(event);
    }
    out
}

/// Returns the paragraph events to write and whether the paragraph was changed.
fn rewrite_paragraph(
    mut events: Vec<Event<'static>>,
    map: &PlaceholderMap,
) -> (Vec<Event<'static>>, bool) {
    if events.len() < 2 {
        return (events, false);
    }
    let end = events.pop();
    let start = events.remove(0);
    let children = segments(events);

    let whole_text: String = children
        .iter()
        .filter_map(|s| match s {
            Segment::Run(run) => Some(run_text(run)),
            Segment::Other(_) => None,
        })
        .collect();

    let substituted = map.substitute(&whole_text);
    let mut out = vec![start];
    let mut first_run = true;

    for segment in children {
        match segment {
            Segment::Other(events) => out.extend(events),
            Segment::Run(events) => match &substituted {
                None => out.extend(events),
                Some(text) if first_run => {
                    out.extend(retext_run(events, text));
                    first_run = false;
                }
                Some(_) => {}
            },
        }
    }
    out.extend(end);

    (out, substituted.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::paragraph_texts;

    fn slide(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>{}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            body
        )
    }

    fn map() -> PlaceholderMap {
        PlaceholderMap::new()
            .with("{company}", "Apple Inc.")
            .with("{date}", "2024-01-31")
    }

    #[test]
    fn test_token_split_across_runs() {
        let xml = slide(
            r#"<a:p><a:r><a:rPr b="1"/><a:t>{com</a:t></a:r><a:r><a:rPr i="1"/><a:t>pany} profile</a:t></a:r></a:p>"#,
        );
        let result = replace_placeholders(&xml, &map()).unwrap();

        assert_eq!(result.paragraphs, 1);
        assert_eq!(paragraph_texts(&result.xml).unwrap(), vec!["Apple Inc. profile"]);
        assert!(result.xml.contains(r#"<a:r><a:rPr b="1"/><a:t>Apple Inc. profile</a:t></a:r>"#));
        assert!(!result.xml.contains(r#"i="1""#));
    }

    #[test]
    fn test_paragraph_without_token_is_unchanged() {
        let body = r#"<a:p><a:pPr algn="ctr"/><a:r><a:t>Company </a:t></a:r><a:r><a:rPr b="1"/><a:t>overview</a:t></a:r><a:endParaRPr lang="en-US"/></a:p>"#;
        let xml = slide(body);
        let result = replace_placeholders(&xml, &map()).unwrap();

        assert_eq!(result.paragraphs, 0);
        assert_eq!(result.xml, xml);
    }

    #[test]
    fn test_only_matching_paragraphs_change() {
        let xml = slide(
            r#"<a:p><a:r><a:t>Date: </a:t></a:r><a:r><a:t>{date}</a:t></a:r></a:p><a:p><a:r><a:t>Keep </a:t></a:r><a:r><a:t>both</a:t></a:r></a:p>"#,
        );
        let result = replace_placeholders(&xml, &map()).unwrap();

        assert_eq!(result.paragraphs, 1);
        assert_eq!(
            paragraph_texts(&result.xml).unwrap(),
            vec!["Date: 2024-01-31", "Keep both"]
        );
        assert!(result.xml.contains("<a:r><a:t>Keep </a:t></a:r><a:r><a:t>both</a:t></a:r>"));
    }

    #[test]
    fn test_non_run_children_are_kept() {
        let xml = slide(
            r#"<a:p><a:pPr lvl="1"/><a:r><a:t>{company}</a:t></a:r><a:br/><a:r><a:t>x</a:t></a:r><a:endParaRPr lang="en-US"/></a:p>"#,
        );
        let result = replace_placeholders(&xml, &map()).unwrap();

        assert!(result.xml.contains(
            r#"<a:p><a:pPr lvl="1"/><a:r><a:t>Apple Inc.x</a:t></a:r><a:br/><a:endParaRPr lang="en-US"/></a:p>"#
        ));
    }

    #[test]
    fn test_replacement_is_escaped() {
        let map = PlaceholderMap::new().with("{company}", "AT&T <Inc>");
        let xml = slide(r#"<a:p><a:r><a:t>{company}</a:t></a:r></a:p>"#);
        let result = replace_placeholders(&xml, &map).unwrap();

        assert!(result.xml.contains("<a:t>AT&amp;T &lt;Inc&gt;</a:t>"));
        assert_eq!(paragraph_texts(&result.xml).unwrap(), vec!["AT&T <Inc>"]);
    }

    #[test]
    fn test_escaped_token_text_matches() {
        let map = PlaceholderMap::new().with("{w}", "apple.com");
        let xml = slide(r#"<a:p><a:r><a:t>&lt;{w}&gt;</a:t></a:r></a:p>"#);
        let result = replace_placeholders(&xml, &map).unwrap();
        assert_eq!(paragraph_texts(&result.xml).unwrap(), vec!["<apple.com>"]);
    }

    #[test]
    fn test_grouped_shapes_and_tables_are_ignored() {
        let grouped = r#"<p:grpSp><p:sp><p:txBody><a:p><a:r><a:t>{company}</a:t></a:r></a:p></p:txBody></p:sp></p:grpSp>"#;
        let table = r#"<p:graphicFrame><a:graphic><a:graphicData><a:tbl><a:tr><a:tc><a:txBody><a:p><a:r><a:t>{date}</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#;
        let top = r#"<p:sp><p:txBody><a:p><a:r><a:t>{company}</a:t></a:r></a:p></p:txBody></p:sp>"#;
        let xml = format!(
            r#"<p:sld xmlns:a="urn:a" xmlns:p="urn:p"><p:cSld><p:spTree>{}{}{}</p:spTree></p:cSld></p:sld>"#,
            grouped, table, top
        );
        let result = replace_placeholders(&xml, &map()).unwrap();

        assert_eq!(result.paragraphs, 1);
        assert_eq!(
            paragraph_texts(&result.xml).unwrap(),
            vec!["{company}", "{date}", "Apple Inc."]
        );
        assert!(result.xml.contains(grouped));
        assert!(result.xml.contains(table));
    }

    #[test]
    fn test_paragraphs_outside_text_bodies_are_ignored() {
        let xml = r#"<root xmlns:a="urn:a"><a:p><a:r><a:t>{company}</a:t></a:r></a:p></root>"#;
        let result = replace_placeholders(xml, &map()).unwrap();
        assert_eq!(result.paragraphs, 0);
        assert_eq!(result.xml, xml);
    }
}
