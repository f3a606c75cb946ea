//! The bundled six-slide company deck template.
//!
//! Slide 1 carries `{company}` and `{date}`, slide 2 the overview tokens
//! (`{c}`, `{s}`, `{i}`, `{co}`, `{ci}`, `{ee}`, `{w}`, `{summary}`), and
//! slides 3 to 6 a heading for the Stock Price, Revenue, Cashflow and EBITDA
//! charts. Several tokens sit in runs next to differently formatted labels.

use crate::content_types::{ContentTypes, CONTENT_TYPES_PART, CT_SLIDE};
use crate::package::Package;
use crate::rels::{
    Relationships, REL_OFFICE_DOCUMENT, REL_PRES_PROPS, REL_SLIDE, REL_SLIDE_LAYOUT,
    REL_SLIDE_MASTER, REL_TABLE_STYLES, REL_THEME,
};
use deckgen_core::{inches, Metric, Result};
use quick_xml::escape::escape;

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";
const NS: &str = concat!(
    "xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" ",
    "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\" ",
    "xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\""
);

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
const CT_TABLE_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// 16:9 slide size in EMU.
const SLIDE_WIDTH: i64 = 12_192_000;
const SLIDE_HEIGHT: i64 = 6_858_000;

/// A text run: (text, size in hundredths of a point, bold).
type Run<'a> = (&'a str, u32, bool);

struct TextBox<'a> {
    name: &'a str,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    centered: bool,
    paragraphs: Vec<Vec<Run<'a>>>,
}

impl TextBox<'_> {
    fn to_xml(&self, id: u32) -> String {
        let mut paragraphs = String::new();
        for runs in &self.paragraphs {
            paragraphs.push_str("<a:p>");
            if self.centered {
                paragraphs.push_str("<a:pPr algn=\"ctr\"/>");
            }
            for (text, size, bold) in runs {
                paragraphs.push_str(&format!(
                    "<a:r><a:rPr lang=\"en-US\" sz=\"{}\"{} dirty=\"0\"/><a:t>{}</a:t></a:r>",
                    size,
                    if *bold { " b=\"1\"" } else { "" },
                    escape(*text)
                ));
            }
            paragraphs.push_str("<a:endParaRPr lang=\"en-US\" dirty=\"0\"/></a:p>");
        }

        format!(
            concat!(
                "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{name}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>",
                "<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>",
                "<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>",
                "<p:txBody><a:bodyPr wrap=\"square\" rtlCol=\"0\"><a:normAutofit/></a:bodyPr><a:lstStyle/>",
                "{paragraphs}</p:txBody></p:sp>"
            ),
            id = id,
            name = escape(self.name),
            x = inches(self.left),
            y = inches(self.top),
            cx = inches(self.width),
            cy = inches(self.height),
            paragraphs = paragraphs,
        )
    }
}

fn group_shape_header() -> &'static str {
    concat!(
        "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
        "<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>",
        "<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>"
    )
}

fn slide_xml(boxes: &[TextBox<'_>]) -> String {
    let shapes: String = boxes
        .iter()
        .enumerate()
        .map(|(i, b)| b.to_xml(i as u32 + 2))
        .collect();
    format!(
        "{}<p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
        XML_DECL,
        NS,
        group_shape_header(),
        shapes
    )
}

fn title_slide() -> String {
    slide_xml(&[
        TextBox {
            name: "Title",
            left: 0.9,
            top: 2.4,
            width: 11.5,
            height: 1.4,
            centered: true,
            paragraphs: vec![vec![("{company}", 4400, true)]],
        },
        TextBox {
            name: "Subtitle",
            left: 0.9,
            top: 3.9,
            width: 11.5,
            height: 0.8,
            centered: true,
            paragraphs: vec![vec![
                ("Company profile as of ", 2000, false),
                ("{date}", 2000, true),
            ]],
        },
    ])
}

fn overview_slide() -> String {
    let label = |l| (l, 1600, true);
    let value = |v| (v, 1600, false);
    slide_xml(&[
        TextBox {
            name: "Company Name",
            left: 3.8,
            top: 0.5,
            width: 8.6,
            height: 0.9,
            centered: false,
            paragraphs: vec![vec![("{c}", 3200, true)]],
        },
        TextBox {
            name: "Company Facts",
            left: 0.9,
            top: 1.9,
            width: 4.9,
            height: 3.6,
            centered: false,
            paragraphs: vec![
                vec![label("Sector: "), value("{s}")],
                vec![label("Industry: "), value("{i}")],
                vec![label("Location: "), value("{ci}"), value(", "), value("{co}")],
                vec![label("Employees: "), value("{ee}")],
                vec![label("Website: "), value("{w}")],
            ],
        },
        TextBox {
            name: "Business Summary",
            left: 6.1,
            top: 1.9,
            width: 6.5,
            height: 5.0,
            centered: false,
            paragraphs: vec![vec![("{summary}", 1100, false)]],
        },
    ])
}

fn chart_slide(metric: Metric) -> String {
    slide_xml(&[TextBox {
        name: "Chart Heading",
        left: 0.5,
        top: 0.2,
        width: 12.3,
        height: 0.7,
        centered: false,
        paragraphs: vec![vec![(metric.label(), 2400, true)]],
    }])
}

fn slide_layout() -> String {
    format!(
        "{}<p:sldLayout {} type=\"blank\" preserve=\"1\"><p:cSld name=\"Blank\"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
        XML_DECL,
        NS,
        group_shape_header()
    )
}

fn slide_master() -> String {
    format!(
        concat!(
            "{decl}<p:sldMaster {ns}><p:cSld><p:bg><p:bgRef idx=\"1001\"><a:schemeClr val=\"bg1\"/></p:bgRef></p:bg>",
            "<p:spTree>{group}</p:spTree></p:cSld>",
            "<p:clrMap bg1=\"lt1\" tx1=\"dk1\" bg2=\"lt2\" tx2=\"dk2\" accent1=\"accent1\" accent2=\"accent2\" ",
            "accent3=\"accent3\" accent4=\"accent4\" accent5=\"accent5\" accent6=\"accent6\" hlink=\"hlink\" folHlink=\"folHlink\"/>",
            "<p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst>",
            "<p:txStyles><p:titleStyle><a:lvl1pPr><a:defRPr sz=\"4400\"/></a:lvl1pPr></p:titleStyle>",
            "<p:bodyStyle><a:lvl1pPr><a:defRPr sz=\"1800\"/></a:lvl1pPr></p:bodyStyle>",
            "<p:otherStyle><a:lvl1pPr><a:defRPr sz=\"1800\"/></a:lvl1pPr></p:otherStyle></p:txStyles>",
            "</p:sldMaster>"
        ),
        decl = XML_DECL,
        ns = NS,
        group = group_shape_header(),
    )
}

fn theme() -> String {
    let accents = ["4F81BD", "C0504D", "9BBB59", "8064A2", "4BACC6", "F79646"];
    let accent_xml: String = accents
        .iter()
        .enumerate()
        .map(|(i, c)| format!("<a:accent{n}><a:srgbClr val=\"{c}\"/></a:accent{n}>", n = i + 1, c = c))
        .collect();
    let solid = "<a:solidFill><a:schemeClr val=\"phClr\"/></a:solidFill>";
    let lines: String = [9525, 25400, 38100]
        .iter()
        .map(|w| format!("<a:ln w=\"{}\">{}</a:ln>", w, solid))
        .collect();

    format!(
        concat!(
            "{decl}<a:theme xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" name=\"Company Deck\">",
            "<a:themeElements><a:clrScheme name=\"Company Deck\">",
            "<a:dk1><a:sysClr val=\"windowText\" lastClr=\"000000\"/></a:dk1>",
            "<a:lt1><a:sysClr val=\"window\" lastClr=\"FFFFFF\"/></a:lt1>",
            "<a:dk2><a:srgbClr val=\"1F497D\"/></a:dk2><a:lt2><a:srgbClr val=\"EEECE1\"/></a:lt2>",
            "{accents}<a:hlink><a:srgbClr val=\"0000FF\"/></a:hlink><a:folHlink><a:srgbClr val=\"800080\"/></a:folHlink>",
            "</a:clrScheme><a:fontScheme name=\"Company Deck\">",
            "<a:majorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:majorFont>",
            "<a:minorFont><a:latin typeface=\"Calibri\"/><a:ea typeface=\"\"/><a:cs typeface=\"\"/></a:minorFont>",
            "</a:fontScheme><a:fmtScheme name=\"Company Deck\">",
            "<a:fillStyleLst>{solid}{solid}{solid}</a:fillStyleLst>",
            "<a:lnStyleLst>{lines}</a:lnStyleLst>",
            "<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle>",
            "<a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>",
            "<a:bgFillStyleLst>{solid}{solid}{solid}</a:bgFillStyleLst>",
            "</a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"
        ),
        decl = XML_DECL,
        accents = accent_xml,
        solid = solid,
        lines = lines,
    )
}

fn presentation(slide_count: usize) -> String {
    let slide_ids: String = (0..slide_count)
        .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 256 + i, i + 2))
        .collect();
    format!(
        concat!(
            "{decl}<p:presentation {ns} saveSubsetFonts=\"1\">",
            "<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>",
            "<p:sldIdLst>{ids}</p:sldIdLst>",
            "<p:sldSz cx=\"{cx}\" cy=\"{cy}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/>",
            "</p:presentation>"
        ),
        decl = XML_DECL,
        ns = NS,
        ids = slide_ids,
        cx = SLIDE_WIDTH,
        cy = SLIDE_HEIGHT,
    )
}

/// The six slide bodies in template order.
fn slides() -> Vec<String> {
    let mut slides = vec![title_slide(), overview_slide()];
    slides.extend(Metric::ALL.into_iter().map(chart_slide));
    slides
}

/// Build the bundled template as `.pptx` bytes.
pub fn builtin_template() -> Result<Vec<u8>> {
    let slides = slides();
    let mut package = Package::default();
    let mut types = ContentTypes::default();
    types.ensure_default("rels", CT_RELS);
    types.ensure_default("xml", "application/xml");
    types.ensure_default("png", "image/png");
    types.set_override("ppt/presentation.xml", CT_PRESENTATION);
    types.set_override("ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER);
    types.set_override("ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT);
    types.set_override("ppt/theme/theme1.xml", CT_THEME);
    types.set_override("ppt/presProps.xml", CT_PRES_PROPS);
    types.set_override("ppt/tableStyles.xml", CT_TABLE_STYLES);
    for i in 1..=slides.len() {
        types.set_override(&format!("ppt/slides/slide{}.xml", i), CT_SLIDE);
    }
    package.set(CONTENT_TYPES_PART, types.to_xml());

    let mut root_rels = Relationships::new();
    root_rels.add(REL_OFFICE_DOCUMENT, "ppt/presentation.xml");
    package.set("_rels/.rels", root_rels.to_xml());

    let mut pres_rels = Relationships::new();
    pres_rels.add(REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    for i in 1..=slides.len() {
        pres_rels.add(REL_SLIDE, &format!("slides/slide{}.xml", i));
    }
    pres_rels.add(REL_PRES_PROPS, "presProps.xml");
    pres_rels.add(REL_THEME, "theme/theme1.xml");
    pres_rels.add(REL_TABLE_STYLES, "tableStyles.xml");
    package.set("ppt/presentation.xml", presentation(slides.len()));
    package.set("ppt/_rels/presentation.xml.rels", pres_rels.to_xml());

    package.set(
        "ppt/presProps.xml",
        format!("{}<p:presentationPr {}/>", XML_DECL, NS),
    );
    package.set(
        "ppt/tableStyles.xml",
        format!(
            "{}<a:tblStyleLst xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" def=\"{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}\"/>",
            XML_DECL
        ),
    );

    let mut master_rels = Relationships::new();
    master_rels.add(REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    master_rels.add(REL_THEME, "../theme/theme1.xml");
    package.set("ppt/slideMasters/slideMaster1.xml", slide_master());
    package.set("ppt/slideMasters/_rels/slideMaster1.xml.rels", master_rels.to_xml());

    let mut layout_rels = Relationships::new();
    layout_rels.add(REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    package.set("ppt/slideLayouts/slideLayout1.xml", slide_layout());
    package.set("ppt/slideLayouts/_rels/slideLayout1.xml.rels", layout_rels.to_xml());

    package.set("ppt/theme/theme1.xml", theme());

    for (i, slide) in slides.into_iter().enumerate() {
        let mut slide_rels = Relationships::new();
        slide_rels.add(REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        package.set(&format!("ppt/slides/slide{}.xml", i + 1), slide);
        package.set(
            &format!("ppt/slides/_rels/slide{}.xml.rels", i + 1),
            slide_rels.to_xml(),
        );
    }

    package.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{paragraph_texts, slide_id_list};

    #[test]
    fn test_builtin_template_has_six_slides() {
        let package = Package::from_bytes(&builtin_template().unwrap()).unwrap();
        let presentation = package.read_string("ppt/presentation.xml").unwrap();
        assert_eq!(slide_id_list(&presentation).unwrap().len(), 6);
        assert_eq!(
            package.part_names().next(),
            Some(CONTENT_TYPES_PART)
        );
    }

    #[test]
    fn test_builtin_template_tokens() {
        let package = Package::from_bytes(&builtin_template().unwrap()).unwrap();
        let title = paragraph_texts(&package.read_string("ppt/slides/slide1.xml").unwrap()).unwrap();
        assert_eq!(title, vec!["{company}", "Company profile as of {date}"]);

        let overview =
            paragraph_texts(&package.read_string("ppt/slides/slide2.xml").unwrap()).unwrap();
        assert!(overview.contains(&"Location: {ci}, {co}".to_string()));
        assert!(overview.contains(&"{summary}".to_string()));

        let ebitda = paragraph_texts(&package.read_string("ppt/slides/slide6.xml").unwrap()).unwrap();
        assert_eq!(ebitda, vec!["EBITDA"]);
    }

    #[test]
    fn test_every_xml_part_is_well_formed() {
        let package = Package::from_bytes(&builtin_template().unwrap()).unwrap();
        for name in package.part_names() {
            let xml = package.read_string(name).unwrap();
            let mut reader = quick_xml::Reader::from_str(&xml);
            loop {
                match reader.read_event() {
                    Ok(quick_xml::events::Event::Eof) => break,
                    Ok(_) => {}
                    Err(e) => panic!("{} is not well-formed: {}", name, e),
                }
            }
        }
    }
}
