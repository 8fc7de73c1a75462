//! Integration tests for the end-to-end pipeline.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use sectionrank::error::{Error, Result};
use sectionrank::extract::{ExtractorChain, LayoutExtractor, PlainTextExtractor, TextExtractor};
use sectionrank::model::Page;
use sectionrank::{render, JsonFormat, Pipeline, RankOptions, SectionRank, SourceDocument};
use sectionrank::{PersonaProfile, Report};

const LINE_SPACING: i64 = 20;

/// Build a PDF whose pages hold `(text, font size)` lines, top to bottom.
fn build_pdf(pages: &[&[(&str, i64)]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![Operation::new("BT", vec![])];
        let mut y = 740;
        for (text, size) in lines.iter() {
            operations.push(Operation::new("Tf", vec!["F1".into(), Object::Integer(*size)]));
            operations.push(Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Integer(72),
                    Object::Integer(y),
                ],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            y -= LINE_SPACING;
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

fn resume_pdf() -> Vec<u8> {
    build_pdf(&[
        &[
            ("Experience", 18),
            ("Built scalable backend services using Kubernetes and Go.", 11),
            ("Operated clusters serving millions of requests.", 11),
        ],
        &[("Education", 18), ("Studied computer science at a state university.", 11)],
    ])
}

fn travel_pdf() -> Vec<u8> {
    build_pdf(&[&[
        ("Coastal Towns", 18),
        ("The beach towns are quiet outside of summer.", 11),
        ("Local cuisine focuses on seafood and olive oil.", 11),
    ]])
}

/// Always fails, to exercise the fallback chain.
struct Failing;

impl TextExtractor for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn extract(&self, _data: &[u8]) -> Result<Vec<Page>> {
        Err(Error::TextExtract("unavailable".into()))
    }
}

fn write_input_dir(dir: &Path, config: &str) {
    fs::write(dir.join("resume.pdf"), resume_pdf()).unwrap();
    fs::write(dir.join("travel.pdf"), travel_pdf()).unwrap();
    fs::write(dir.join("broken.pdf"), b"%PDF-1.4\nthis is not a real document").unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();
    fs::write(dir.join("challenge.json"), config).unwrap();
}

#[test]
fn test_layout_extractor_reads_generated_pdf() {
    let pages = LayoutExtractor.extract(&resume_pdf()).unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages[0].has_layout());
    assert!(pages[0].text.contains("Experience"));
    assert!(pages[0].text.contains("Kubernetes"));
    assert_eq!(pages[0].body_font_size(), Some(11.0));
    assert!(pages[1].text.contains("Education"));
}

#[test]
fn test_segments_generated_pdf() {
    let sections = sectionrank::segment_bytes("resume.pdf", &resume_pdf()).unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Experience");
    assert_eq!(sections[0].page_number, 0);
    assert!(sections[0].body_text.contains("Kubernetes and Go."));
    assert_eq!(sections[1].title, "Education");
    assert_eq!(sections[1].page_number, 1);
}

#[test]
fn test_plain_extractor_keeps_page_numbers() {
    let pages = PlainTextExtractor::new().extract(&resume_pdf()).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].index, 1);
    assert!(pages[1].text.contains("Education"));

    let sections = sectionrank::segment::segment("resume.pdf", &pages);
    let education = sections.iter().find(|s| s.title == "Education").unwrap();
    assert_eq!(education.page_number, 1);
    assert!(sections.iter().any(|s| s.page_number == 0));
}

#[test]
fn test_chain_falls_back() {
    let chain = ExtractorChain::new()
        .with_extractor(Arc::new(Failing))
        .with_extractor(Arc::new(LayoutExtractor));
    let pipeline = Pipeline::new(RankOptions::default()).unwrap().with_chain(chain);
    let profile = PersonaProfile::new("backend engineer", "kubernetes");

    let doc = SourceDocument::from_bytes("resume.pdf", resume_pdf());
    let result = pipeline.process_document(&doc, &profile);
    assert!(result.status.succeeded());
    assert_eq!(result.status.sections_found, 2);
    assert_eq!(result.status.pages_with_text, 2);
    assert!(matches!(
        result.status.extraction,
        sectionrank::model::ExtractionStatus::Extracted { ref extractor } if extractor == "layout"
    ));
}

#[test]
fn test_rank_directory_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_input_dir(
        dir.path(),
        r#"{"persona": {"role": "Backend Engineer"}, "job_to_be_done": {"task": "Deploy services on Kubernetes"}}"#,
    );

    let report = SectionRank::new().rank_dir(dir.path()).unwrap();

    assert_eq!(
        report.metadata.input_documents,
        vec!["broken.pdf", "resume.pdf", "travel.pdf"]
    );
    assert_eq!(report.metadata.persona, "Backend Engineer");
    assert_eq!(report.skipped_count(), 1);
    assert!(!report.metadata.documents[0].succeeded());
    assert!(!report.metadata.degraded_scoring);

    let top = &report.extracted_sections[0];
    assert_eq!(top.document, "resume.pdf");
    assert_eq!(top.section_title, "Experience");
    assert_eq!(top.page_number, 0);
    assert!(report
        .extracted_sections
        .iter()
        .all(|s| s.document != "broken.pdf"));
    assert_eq!(report.extracted_sections.len(), 3);
    assert!(report.subsection_analysis.len() <= 3);
}

#[test]
fn test_configured_document_list() {
    let dir = tempfile::tempdir().unwrap();
    write_input_dir(
        dir.path(),
        r#"{
            "persona": "Travel Planner",
            "job_to_be_done": "Plan a trip to the coast",
            "documents": [{"filename": "travel.pdf"}, {"filename": "missing.pdf"}]
        }"#,
    );

    let report = SectionRank::new().rank_dir(dir.path()).unwrap();
    assert_eq!(report.metadata.input_documents, vec!["travel.pdf", "missing.pdf"]);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.extracted_sections.len(), 1);
    assert_eq!(report.extracted_sections[0].section_title, "Coastal Towns");
}

#[test]
fn test_ambiguous_configuration_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_input_dir(dir.path(), r#"{"persona": "a", "job_to_be_done": "b"}"#);
    fs::write(dir.path().join("other.json"), "{}").unwrap();

    assert!(matches!(
        SectionRank::new().rank_dir(dir.path()),
        Err(Error::Config(_))
    ));

    let report = SectionRank::new()
        .with_config_path(dir.path().join("challenge.json"))
        .rank_dir(dir.path())
        .unwrap();
    assert_eq!(report.metadata.persona, "a");
}

#[test]
fn test_missing_persona_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_input_dir(dir.path(), r#"{"job_to_be_done": "b"}"#);
    assert!(matches!(
        SectionRank::new().rank_dir(dir.path()),
        Err(Error::MissingField("persona"))
    ));
}

#[test]
fn test_reruns_produce_identical_arrays() {
    let dir = tempfile::tempdir().unwrap();
    write_input_dir(
        dir.path(),
        r#"{"persona": "Backend Engineer", "job_to_be_done": "Deploy services on Kubernetes"}"#,
    );

    let render_arrays = |report: &Report| {
        serde_json::to_string(&(&report.extracted_sections, &report.subsection_analysis)).unwrap()
    };
    let first = SectionRank::new().rank_dir(dir.path()).unwrap();
    let second = SectionRank::new().parallel().rank_dir(dir.path()).unwrap();
    assert_eq!(render_arrays(&first), render_arrays(&second));

    let out = dir.path().join("out").join("ranked_sections.json");
    render::write_report(&first, &out, JsonFormat::Pretty).unwrap();
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["extracted_sections"][0]["document"], "resume.pdf");
    assert!(written["metadata"]["processing_timestamp"].is_string());
}
