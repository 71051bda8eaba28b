mod common;

use common::monthly_series;
use forecast_companion::data::Horizon;
use forecast_companion::document::{DocumentAssembler, DocumentStyle, Slide};
use forecast_companion::error::AssemblyError;
use forecast_companion::models::{Forecast, ForecastEngine, HoltEngine};
use forecast_companion::narrative::InsightSet;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::{Cursor, Read};

fn forecast(periods: usize) -> Forecast {
    HoltEngine::new(0.8)
        .forecast(&monthly_series(), Horizon::new(periods, 24).unwrap())
        .unwrap()
}

fn small_style() -> DocumentStyle {
    DocumentStyle {
        chart_width_px: 320,
        chart_height_px: 160,
        ..DocumentStyle::default()
    }
}

fn slide_parts(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    names.sort();
    names
}

fn read_part(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut out = Vec::new();
    part.read_to_end(&mut out).unwrap();
    out
}

#[rstest]
#[case("", 2)]
#[case("- only one", 3)]
#[case("- up\n- seasonal\n\n- stable", 5)]
fn test_section_count(#[case] text: &str, #[case] expected: usize) {
    let assembler = DocumentAssembler::new(small_style());
    let insights = InsightSet::from_text(text);
    let horizon = Horizon::new(2, 24).unwrap();

    let deck = assembler.compose(&forecast(2), &insights, horizon).unwrap();
    assert_eq!(deck.len(), expected);

    let bytes = assembler.assemble(&forecast(2), &insights, horizon).unwrap();
    assert_eq!(slide_parts(&bytes).len(), expected);
}

#[test]
fn test_sections_are_ordered() {
    let assembler = DocumentAssembler::new(small_style());
    let insights = InsightSet::from_text("- up\n- stable");

    let deck = assembler
        .compose(&forecast(2), &insights, Horizon::new(2, 24).unwrap())
        .unwrap();
    let slides = deck.slides();

    assert!(matches!(&slides[0], Slide::Title { title } if title == "Forecast & Narrative Companion"));
    assert!(matches!(&slides[1], Slide::Chart { title, .. } if title == "Forecast Plot"));
    match &slides[3] {
        Slide::Insight { index, title, body } => {
            assert_eq!(*index, 2);
            assert_eq!(title, "Insight 2");
            assert_eq!(body, "- stable");
        }
        other => panic!("Expected insight section, got {:?}", other),
    }
}

#[test]
fn test_chart_is_embedded_as_png() {
    let assembler = DocumentAssembler::new(small_style());
    let bytes = assembler
        .assemble(
            &forecast(2),
            &InsightSet::from_text("- a"),
            Horizon::new(2, 24).unwrap(),
        )
        .unwrap();

    let png = read_part(&bytes, "ppt/media/chart1.png");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let chart_slide = String::from_utf8(read_part(&bytes, "ppt/slides/slide2.xml")).unwrap();
    assert!(chart_slide.contains("Forecast Plot"));
    assert!(chart_slide.contains("<p:pic>"));
}

#[test]
fn test_insight_text_is_escaped() {
    let assembler = DocumentAssembler::new(small_style());
    let bytes = assembler
        .assemble(
            &forecast(1),
            &InsightSet::from_text("- Q1 < Q2 & rising"),
            Horizon::new(1, 24).unwrap(),
        )
        .unwrap();

    let slide = String::from_utf8(read_part(&bytes, "ppt/slides/slide3.xml")).unwrap();
    assert!(slide.contains("- Q1 &lt; Q2 &amp; rising"));
    assert!(slide.contains("Insight 1"));
}

#[test]
fn test_control_characters_are_dropped_from_slides() {
    let assembler = DocumentAssembler::new(small_style());
    let bytes = assembler
        .assemble(
            &forecast(1),
            &InsightSet::from_text("- growth\u{8} of 5%\u{1b}[0m"),
            Horizon::new(1, 24).unwrap(),
        )
        .unwrap();

    let slide = read_part(&bytes, "ppt/slides/slide3.xml");
    assert!(slide
        .iter()
        .all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r')));
    let slide = String::from_utf8(slide).unwrap();
    assert!(slide.contains("- growth of 5%[0m"));
}

#[test]
fn test_mismatched_horizon_is_fatal() {
    let assembler = DocumentAssembler::new(small_style());
    let result = assembler.assemble(
        &forecast(2),
        &InsightSet::from_text("- a"),
        Horizon::new(3, 24).unwrap(),
    );
    assert!(matches!(result, Err(AssemblyError::Chart(_))));
}

#[test]
fn test_zero_sized_chart_fails_whole_document() {
    let style = DocumentStyle {
        chart_width_px: 0,
        ..DocumentStyle::default()
    };
    let result = DocumentAssembler::new(style).assemble(
        &forecast(2),
        &InsightSet::from_text("- a"),
        Horizon::new(2, 24).unwrap(),
    );
    assert!(result.is_err());
}
