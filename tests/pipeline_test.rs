//! End-to-end pipeline tests: ALTO in, TEI out.
//!
//! The sequence models are stand-ins that label tokens by lookup, so these
//! tests exercise parsing, retokenization, feature generation, tag decoding,
//! extraction and serialization together without a real model.

use scitei::extract::affiliation::extract_affiliations;
use scitei::extract::header::extract_front;
use scitei::features::affiliation::AffiliationAddressDataGenerator;
use scitei::features::header::HeaderDataGenerator;
use scitei::features::segmentation::{SegmentationDataGenerator, SEGMENTATION_COLUMN_COUNT};
use scitei::features::DataGenerator;
use scitei::model::{
    entity_blocks_for_labeled_tokens, label_layout_document, labeled_layout_tokens,
};
use scitei::semantic::{LeafKind, SemanticContent};
use scitei::{document_to_tei, parse_alto, LayoutDocument, SemanticDocument, SequenceModel};

const ALTO_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="http://www.loc.gov/standards/alto/ns-v3#">
  <Styles>
    <TextStyle ID="font-title" FONTFAMILY="Helvetica" FONTSIZE="18.0" FONTSTYLE="bold"/>
    <TextStyle ID="font-body" FONTFAMILY="Times" FONTSIZE="10.0"/>
  </Styles>
  <Layout>
    <Page>
      <PrintSpace>
        <TextBlock>
          <TextLine>
            <String CONTENT="A" STYLEREFS="font-title" HPOS="0" VPOS="10" WIDTH="30" HEIGHT="12"/>
            <String CONTENT="Study" STYLEREFS="font-title" HPOS="40" VPOS="10" WIDTH="60" HEIGHT="12"/>
            <String CONTENT="Title" STYLEREFS="font-title" HPOS="110" VPOS="10" WIDTH="50" HEIGHT="12"/>
          </TextLine>
        </TextBlock>
        <TextBlock>
          <TextLine>
            <String CONTENT="Example" STYLEREFS="font-body" HPOS="0" VPOS="40" WIDTH="50" HEIGHT="10"/>
            <String CONTENT="University" STYLEREFS="font-body" HPOS="55" VPOS="40" WIDTH="60" HEIGHT="10"/>
            <String CONTENT="," STYLEREFS="font-body" HPOS="116" VPOS="40" WIDTH="4" HEIGHT="10"/>
          </TextLine>
          <TextLine>
            <String CONTENT="Paris" STYLEREFS="font-body" HPOS="0" VPOS="55" WIDTH="30" HEIGHT="10"/>
            <String CONTENT="," STYLEREFS="font-body" HPOS="31" VPOS="55" WIDTH="4" HEIGHT="10"/>
            <String CONTENT="France." STYLEREFS="font-body" HPOS="40" VPOS="55" WIDTH="45" HEIGHT="10"/>
          </TextLine>
        </TextBlock>
      </PrintSpace>
    </Page>
  </Layout>
</alto>"#;

fn parsed_document() -> LayoutDocument {
    parse_alto(ALTO_FIXTURE)
        .expect("fixture should parse")
        .retokenize()
}

/// Labels each feature line by its leading token text.
struct LookupModel(fn(&str) -> &'static str);

impl SequenceModel for LookupModel {
    fn predict(&self, data_lines: &[String]) -> scitei::Result<Vec<String>> {
        Ok(data_lines
            .iter()
            .map(|line| self.0(line.split(' ').next().unwrap_or_default()).to_string())
            .collect())
    }
}

#[test]
fn test_parsed_fonts_and_normalization() {
    let document = parsed_document();
    let tokens: Vec<_> = document.iter_all_tokens().collect();
    assert!(tokens[0].font.is_bold);
    assert_eq!(tokens[0].font.font_size, Some(18.0));
    assert_eq!(tokens[3].font.font_family.as_deref(), Some("Times"));
    assert!(!tokens[3].font.is_bold);
    let texts: Vec<&str> = tokens.iter().map(|token| token.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["A", "Study", "Title", "Example", "University", ",", "Paris", ",", "France", "."],
        "France. should retokenize into two tokens"
    );
}

#[test]
fn test_segmentation_features_have_fixed_arity() {
    let lines = SegmentationDataGenerator
        .data_lines(&parsed_document())
        .expect("segmentation features should generate");
    assert_eq!(lines.len(), 3);
    for line in &lines {
        assert_eq!(line.split(' ').count(), SEGMENTATION_COLUMN_COUNT);
    }
}

#[test]
fn test_segmentation_labels_filter_document_by_line() {
    let document = parsed_document();
    let model = LookupModel(|token| match token {
        "A" => "B-<header>",
        "Example" => "B-<body>",
        _ => "I-<body>",
    });
    let result = label_layout_document(&model, &SegmentationDataGenerator, &document)
        .expect("segmentation labeling should succeed");
    let header = result.filtered_document_by_labels(&["<header>"]);
    let texts: Vec<String> = header
        .iter_all_tokens()
        .map(|token| token.text.clone())
        .collect();
    assert_eq!(texts, vec!["A", "Study", "Title"]);
    let body = result.filtered_document_by_labels(&["<body>"]);
    assert_eq!(body.iter_all_tokens().count(), 6);
}

#[test]
fn test_header_labels_produce_tei_title_with_styles() {
    let document = parsed_document();
    let model = LookupModel(|token| match token {
        "A" => "B-<title>",
        "Study" | "Title" => "I-<title>",
        _ => "O",
    });
    let result = label_layout_document(&model, &HeaderDataGenerator, &document)
        .expect("header labeling should succeed");
    let labeled = labeled_layout_tokens(&result).expect("header labels are token level");
    let entities = entity_blocks_for_labeled_tokens(&labeled);
    let front = extract_front(&entities);
    let title = front.meta.title.as_ref().expect("title should be extracted");
    assert_eq!(title.text(), "A Study Title");

    let semantic = SemanticDocument {
        meta: front.meta,
        ..SemanticDocument::default()
    };
    let xml = document_to_tei(&semantic)
        .expect("serialization should succeed")
        .to_xml_string();
    assert!(xml.contains("<hi rend=\"bold\">A Study Title</hi>"));
    assert!(xml.contains("coords=\"1,0.00,10.00,160.00,12.00\""));
}

#[test]
fn test_affiliation_labels_produce_tei_affiliation() {
    let document = parsed_document();
    let model = LookupModel(|token| match token {
        "Example" => "B-<institution>",
        "University" => "I-<institution>",
        "Paris" => "B-<settlement>",
        "France" => "B-<country>",
        "." => "I-<country>",
        _ => "O",
    });
    let result = label_layout_document(&model, &AffiliationAddressDataGenerator, &document)
        .expect("affiliation labeling should succeed");
    let labeled = labeled_layout_tokens(&result).expect("affiliation labels are token level");
    let entities = entity_blocks_for_labeled_tokens(&labeled);
    let affiliations = extract_affiliations(&entities);

    let affiliation = affiliations
        .iter()
        .find(|content| matches!(content, SemanticContent::AffiliationAddress(_)))
        .expect("one affiliation should be extracted");
    assert_eq!(
        affiliation.view_by_kind(LeafKind::Institution).text(),
        "Example University"
    );
    assert_eq!(
        affiliation.view_by_kind(LeafKind::Country).text(),
        "France",
        "trailing dot should be stripped from the country"
    );

    let semantic = SemanticDocument {
        front: affiliations,
        ..SemanticDocument::default()
    };
    let xml = document_to_tei(&semantic)
        .expect("serialization should succeed")
        .to_xml_string();
    assert!(xml.contains("<orgName type=\"institution\">Example University</orgName>"));
    assert!(xml.contains("<settlement>Paris</settlement>"));
    assert!(xml.contains("<country>France</country>"));
}
