//! Minimal PresentationML package writer
//!
//! Produces a widescreen deck with a single blank layout. Every slide
//! positions its own text boxes and pictures; nothing is inherited from
//! placeholders.

use crate::document::{ChartImage, Deck, Slide};
use crate::error::AssemblyError;
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const EMU_PER_INCH: i64 = 914_400;
const SLIDE_CX: i64 = 12_192_000;
const SLIDE_CY: i64 = 6_858_000;

const TITLE_BACKGROUND: &str = "F5F5F5";
const ACCENT: &str = "00467A";
const BODY_TEXT: &str = "323232";

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Escape text for XML element and attribute content.
///
/// Control characters other than tab, newline and carriage return are not
/// allowed in XML 1.0 and are dropped.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' => {}
            c => out.push(c),
        }
    }
    out
}

fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

struct TextBox<'a> {
    id: usize,
    name: &'a str,
    text: &'a str,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
    size_pt: u32,
    bold: bool,
    color: &'a str,
    anchor: &'a str,
}

impl TextBox<'_> {
    fn render(&self, out: &mut String) {
        let _ = write!(
            out,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" anchor="{anchor}"/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="{sz}" b="{b}" dirty="0"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill></a:rPr><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            id = self.id,
            name = escape_xml(self.name),
            x = self.x,
            y = self.y,
            cx = self.cx,
            cy = self.cy,
            anchor = self.anchor,
            sz = self.size_pt * 100,
            b = if self.bold { 1 } else { 0 },
            color = self.color,
            text = escape_xml(self.text),
        );
    }
}

/// Serializes a [`Deck`] into `.pptx` bytes
#[derive(Debug, Clone)]
pub struct PptxWriter {
    title: String,
}

impl PptxWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn write(&self, deck: &Deck) -> Result<Vec<u8>, AssemblyError> {
        if deck.is_empty() {
            return Err(AssemblyError::Package("Deck has no sections".to_string()));
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let slide_count = deck.len();

        let mut put = |name: &str, body: &[u8]| -> Result<(), AssemblyError> {
            zip.start_file(name, options)?;
            zip.write_all(body)?;
            Ok(())
        };

        put("[Content_Types].xml", content_types(slide_count).as_bytes())?;
        put("_rels/.rels", root_rels().as_bytes())?;
        put("docProps/app.xml", app_props(slide_count).as_bytes())?;
        put("docProps/core.xml", core_props(&self.title).as_bytes())?;
        put("ppt/presentation.xml", presentation(slide_count).as_bytes())?;
        put("ppt/_rels/presentation.xml.rels", presentation_rels(slide_count).as_bytes())?;
        put("ppt/slideMasters/slideMaster1.xml", slide_master().as_bytes())?;
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            slide_master_rels().as_bytes(),
        )?;
        put("ppt/slideLayouts/slideLayout1.xml", slide_layout().as_bytes())?;
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            slide_layout_rels().as_bytes(),
        )?;
        put("ppt/theme/theme1.xml", theme().as_bytes())?;

        let mut chart_count = 0;
        for (i, slide) in deck.slides().iter().enumerate() {
            let number = i + 1;
            let media = match slide {
                Slide::Chart { image, .. } => {
                    chart_count += 1;
                    let media_name = format!("chart{chart_count}.png");
                    put(&format!("ppt/media/{media_name}"), &image.png)?;
                    Some(media_name)
                }
                _ => None,
            };
            put(
                &format!("ppt/slides/slide{number}.xml"),
                slide_xml(slide).as_bytes(),
            )?;
            put(
                &format!("ppt/slides/_rels/slide{number}.xml.rels"),
                slide_rels(media.as_deref()).as_bytes(),
            )?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

fn relationships(entries: &[(String, String, String)]) -> String {
    let mut out = format!(r#"{XML_DECL}<Relationships xmlns="{NS_RELS}">"#);
    for (id, kind, target) in entries {
        let _ = write!(
            out,
            r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"/>"#
        );
    }
    out.push_str("</Relationships>");
    out
}

fn rel(id: &str, kind: &str, target: &str) -> (String, String, String) {
    (id.to_string(), kind.to_string(), target.to_string())
}

fn content_types(slide_count: usize) -> String {
    let mut out = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#
    );
    for n in 1..=slide_count {
        let _ = write!(
            out,
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        );
    }
    out.push_str("</Types>");
    out
}

fn root_rels() -> String {
    relationships(&[
        rel(
            "rId1",
            &format!("{REL_BASE}/officeDocument"),
            "ppt/presentation.xml",
        ),
        rel(
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        rel(
            "rId3",
            &format!("{REL_BASE}/extended-properties"),
            "docProps/app.xml",
        ),
    ])
}

fn app_props(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>{}</Application><Slides>{slide_count}</Slides></Properties>"#,
        crate::NAME
    )
}

fn core_props(title: &str) -> String {
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>{}</dc:creator></cp:coreProperties>"#,
        escape_xml(title),
        crate::NAME
    )
}

fn presentation(slide_count: usize) -> String {
    let mut ids = String::new();
    for n in 0..slide_count {
        let _ = write!(ids, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + n, 3 + n);
    }
    format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut entries = vec![
        rel(
            "rId1",
            &format!("{REL_BASE}/slideMaster"),
            "slideMasters/slideMaster1.xml",
        ),
        rel("rId2", &format!("{REL_BASE}/theme"), "theme/theme1.xml"),
    ];
    for n in 1..=slide_count {
        entries.push(rel(
            &format!("rId{}", n + 2),
            &format!("{REL_BASE}/slide"),
            &format!("slides/slide{n}.xml"),
        ));
    }
    relationships(&entries)
}

fn empty_tree() -> &'static str {
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
}

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        empty_tree()
    )
}

fn slide_master_rels() -> String {
    relationships(&[
        rel(
            "rId1",
            &format!("{REL_BASE}/slideLayout"),
            "../slideLayouts/slideLayout1.xml",
        ),
        rel("rId2", &format!("{REL_BASE}/theme"), "../theme/theme1.xml"),
    ])
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        empty_tree()
    )
}

fn slide_layout_rels() -> String {
    relationships(&[rel(
        "rId1",
        &format!("{REL_BASE}/slideMaster"),
        "../slideMasters/slideMaster1.xml",
    )])
}

fn theme() -> String {
    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = format!(r#"<a:ln w="9525">{solid}</a:ln>"#);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    let font = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    format!(
        r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="Companion"><a:themeElements><a:clrScheme name="Companion"><a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="{BODY_TEXT}"/></a:dk2><a:lt2><a:srgbClr val="{TITLE_BACKGROUND}"/></a:lt2><a:accent1><a:srgbClr val="{ACCENT}"/></a:accent1><a:accent2><a:srgbClr val="4F81BD"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Companion"><a:majorFont>{font}</a:majorFont><a:minorFont>{font}</a:minorFont></a:fontScheme><a:fmtScheme name="Companion"><a:fillStyleLst>{solid}{solid}{solid}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{solid}{solid}{solid}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#
    )
}

fn picture(image: &ChartImage, rel_id: &str) -> String {
    let cx = inches(11.0);
    let cy = if image.width_px == 0 {
        0
    } else {
        cx * i64::from(image.height_px) / i64::from(image.width_px)
    };
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="Forecast Chart"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rel_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        inches(1.0),
        inches(1.5)
    )
}

fn slide_xml(slide: &Slide) -> String {
    let mut shapes = String::new();
    let mut background = None;

    match slide {
        Slide::Title { title } => {
            background = Some(TITLE_BACKGROUND);
            TextBox {
                id: 2,
                name: "Title",
                text: title,
                x: inches(0.5),
                y: inches(2.5),
                cx: SLIDE_CX - inches(1.0),
                cy: inches(2.0),
                size_pt: 48,
                bold: true,
                color: "000000",
                anchor: "ctr",
            }
            .render(&mut shapes);
        }
        Slide::Chart { title, image } => {
            TextBox {
                id: 2,
                name: "Title",
                text: title,
                x: inches(0.5),
                y: inches(0.3),
                cx: SLIDE_CX - inches(1.0),
                cy: inches(1.0),
                size_pt: 36,
                bold: false,
                color: ACCENT,
                anchor: "ctr",
            }
            .render(&mut shapes);
            shapes.push_str(&picture(image, "rId2"));
        }
        Slide::Insight { title, body, .. } => {
            TextBox {
                id: 2,
                name: "Title",
                text: title,
                x: inches(0.5),
                y: inches(0.3),
                cx: SLIDE_CX - inches(1.0),
                cy: inches(1.0),
                size_pt: 32,
                bold: false,
                color: ACCENT,
                anchor: "ctr",
            }
            .render(&mut shapes);
            TextBox {
                id: 3,
                name: "Body",
                text: body,
                x: inches(0.8),
                y: inches(1.6),
                cx: SLIDE_CX - inches(1.6),
                cy: inches(5.0),
                size_pt: 24,
                bold: false,
                color: BODY_TEXT,
                anchor: "t",
            }
            .render(&mut shapes);
        }
    }

    let bg = background
        .map(|color| {
            format!(
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld>{bg}<p:spTree>{}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        empty_tree()
    )
}

fn slide_rels(media: Option<&str>) -> String {
    let mut entries = vec![rel(
        "rId1",
        &format!("{REL_BASE}/slideLayout"),
        "../slideLayouts/slideLayout1.xml",
    )];
    if let Some(name) = media {
        entries.push(rel(
            "rId2",
            &format!("{REL_BASE}/image"),
            &format!("../media/{name}"),
        ));
    }
    relationships(&entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn deck(insights: &[&str]) -> Deck {
        let mut deck = Deck::new();
        deck.push(Slide::Title {
            title: "Sales & Trends".to_string(),
        })
        .unwrap();
        deck.push(Slide::Chart {
            title: "Forecast Plot".to_string(),
            image: ChartImage {
                png: vec![137, 80, 78, 71],
                width_px: 1000,
                height_px: 500,
            },
        })
        .unwrap();
        for (i, text) in insights.iter().enumerate() {
            deck.push(Slide::Insight {
                index: i + 1,
                title: format!("Insight {}", i + 1),
                body: text.to_string(),
            })
            .unwrap();
        }
        deck
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_escape_xml_drops_control_characters() {
        assert_eq!(escape_xml("a\u{8}b\u{1b}[0mc\td\r\ne\u{0}"), "ab[0mc\td\r\ne");
    }

    #[test]
    fn test_slide_parts_follow_deck_order() {
        let bytes = PptxWriter::new("Sales & Trends")
            .write(&deck(&["- rising <fast>", "- flat"]))
            .unwrap();

        assert!(read_part(&bytes, "ppt/slides/slide1.xml").contains("Sales &amp; Trends"));
        assert!(read_part(&bytes, "ppt/slides/slide2.xml").contains(r#"r:embed="rId2""#));
        let third = read_part(&bytes, "ppt/slides/slide3.xml");
        assert!(third.contains("Insight 1"));
        assert!(third.contains("- rising &lt;fast&gt;"));
        assert!(read_part(&bytes, "ppt/presentation.xml").contains(r#"r:id="rId6""#));
        assert!(read_part(&bytes, "ppt/slides/_rels/slide2.xml.rels").contains("../media/chart1.png"));
    }

    #[test]
    fn test_title_slide_has_background() {
        let bytes = PptxWriter::new("t").write(&deck(&[])).unwrap();
        assert!(read_part(&bytes, "ppt/slides/slide1.xml").contains(TITLE_BACKGROUND));
        assert!(!read_part(&bytes, "ppt/slides/slide2.xml").contains("<p:bg>"));
    }

    #[test]
    fn test_empty_deck_rejected() {
        assert!(matches!(
            PptxWriter::new("t").write(&Deck::new()),
            Err(AssemblyError::Package(_))
        ));
    }
}
