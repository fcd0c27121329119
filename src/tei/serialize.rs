//! Semantic document to TEI serialization.

use crate::error::Result;
use crate::geometry::PageCoordinates;
use crate::layout::{LayoutBlock, LayoutFont};
use crate::semantic::{LeafKind, SectionType, SemanticContent, SemanticDocument};
use crate::tei::element::{TeiElement, TeiNode};

const TITLE_PATH: &[&str] = &["teiHeader", "fileDesc", "titleStmt", "title[@type=\"main\"]"];
const ABSTRACT_PATH: &[&str] = &["teiHeader", "profileDesc", "abstract", "p"];
const ANALYTIC_PATH: &[&str] = &["teiHeader", "fileDesc", "sourceDesc", "biblStruct", "analytic"];
const NOTES_PATH: &[&str] = &["teiHeader", "fileDesc", "notesStmt"];
const BODY_PATH: &[&str] = &["text", "body"];
const BACK_PATH: &[&str] = &["text", "back"];

/// A TEI document under construction.
#[derive(Debug)]
pub struct TeiDocument {
    root: TeiElement,
}

impl Default for TeiDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl TeiDocument {
    pub fn new() -> Self {
        Self {
            root: TeiElement::new("TEI"),
        }
    }

    pub fn root(&self) -> &TeiElement {
        &self.root
    }

    pub fn title_element(&mut self) -> Result<&mut TeiElement> {
        let element = self.root.get_or_create_element_at(TITLE_PATH)?;
        element.set_attribute("level", "a");
        Ok(element)
    }

    pub fn abstract_paragraph(&mut self) -> Result<&mut TeiElement> {
        self.root.get_or_create_element_at(ABSTRACT_PATH)
    }

    pub fn analytic(&mut self) -> Result<&mut TeiElement> {
        self.root.get_or_create_element_at(ANALYTIC_PATH)
    }

    pub fn notes_statement(&mut self) -> Result<&mut TeiElement> {
        self.root.get_or_create_element_at(NOTES_PATH)
    }

    pub fn body(&mut self) -> Result<&mut TeiElement> {
        self.root.get_or_create_element_at(BODY_PATH)
    }

    pub fn back(&mut self) -> Result<&mut TeiElement> {
        self.root.get_or_create_element_at(BACK_PATH)
    }

    pub fn acknowledgement_div(&mut self) -> Result<&mut TeiElement> {
        self.root
            .get_or_create_element_at(&["text", "back", "div[@type=\"acknowledgement\"]"])
    }

    pub fn annex_div(&mut self) -> Result<&mut TeiElement> {
        self.root
            .get_or_create_element_at(&["text", "back", "div[@type=\"annex\"]"])
    }

    pub fn to_xml_string(&self) -> String {
        self.root.to_xml_string()
    }
}

/// Format merged coordinate groups as
/// `page,x.xx,y.xx,width.xx,height.xx[;...]`.
pub fn format_coordinates(coordinates_list: &[PageCoordinates]) -> String {
    coordinates_list
        .iter()
        .map(|coordinates| {
            format!(
                "{},{:.2},{:.2},{:.2},{:.2}",
                coordinates.page_number,
                coordinates.x,
                coordinates.y,
                coordinates.width,
                coordinates.height
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn apply_coordinates(element: &mut TeiElement, block: &LayoutBlock) {
    let merged = block.merged_coordinates_list();
    if !merged.is_empty() {
        element.set_attribute("coords", format_coordinates(&merged));
    }
}

fn styles_for_font(font: &LayoutFont) -> Vec<&'static str> {
    let mut styles = Vec::new();
    if font.is_bold {
        styles.push("bold");
    }
    if font.is_italics {
        styles.push("italic");
    }
    styles
}

/// Append a block's text with minimal `<hi rend=...>` style runs.
///
/// Tokens with the same required-style set accumulate into one run; a style
/// change flushes the pending run and its trailing whitespace. With multiple
/// styles, the first is the outermost element. The block's final trailing
/// whitespace is dropped.
fn append_styled_text(parent: &mut TeiElement, block: &LayoutBlock) {
    let mut pending_styles: Vec<&'static str> = Vec::new();
    let mut pending_text = String::new();
    let mut pending_whitespace = String::new();
    for token in block.iter_tokens() {
        let styles = styles_for_font(&token.font);
        if styles != pending_styles {
            flush_run(
                parent,
                &pending_styles,
                &mut pending_text,
                &mut pending_whitespace,
            );
            pending_styles = styles;
        } else {
            pending_text.push_str(&pending_whitespace);
            pending_whitespace.clear();
        }
        pending_text.push_str(&token.text);
        pending_whitespace.clear();
        pending_whitespace.push_str(&token.whitespace);
    }
    pending_whitespace.clear();
    flush_run(
        parent,
        &pending_styles,
        &mut pending_text,
        &mut pending_whitespace,
    );
}

fn flush_run(
    parent: &mut TeiElement,
    styles: &[&'static str],
    text: &mut String,
    whitespace: &mut String,
) {
    if !text.is_empty() {
        let mut styled: Option<TeiElement> = None;
        for style in styles.iter().rev() {
            let mut hi = TeiElement::new("hi").with_attribute("rend", *style);
            match styled.take() {
                Some(inner) => hi.children.push(TeiNode::Element(inner)),
                None => hi.append_text(text),
            }
            styled = Some(hi);
        }
        match styled {
            Some(element) => {
                parent.append_element(element);
            }
            None => parent.append_text(text),
        }
        text.clear();
    }
    if !whitespace.is_empty() {
        parent.append_text(whitespace);
        whitespace.clear();
    }
}

fn text_element(tag: &str, block: &LayoutBlock) -> TeiElement {
    let mut element = TeiElement::new(tag);
    apply_coordinates(&mut element, block);
    append_styled_text(&mut element, block);
    element
}

fn note_element(note_type: &str, block: &LayoutBlock) -> TeiElement {
    let mut element = TeiElement::new("note").with_attribute("type", note_type);
    append_styled_text(&mut element, block);
    element
}

fn author_element(author: &SemanticContent) -> TeiElement {
    let mut element = TeiElement::new("author");
    let mut pers_name = TeiElement::new("persName");
    apply_coordinates(&mut pers_name, &author.merged_block());
    for child in author.children() {
        let part = match child {
            SemanticContent::Leaf { kind, block } => {
                let (tag, type_attribute) = match kind {
                    LeafKind::NameTitle => ("roleName", None),
                    LeafKind::GivenName => ("forename", Some("first")),
                    LeafKind::MiddleName => ("forename", Some("middle")),
                    LeafKind::Surname => ("surname", None),
                    LeafKind::NameSuffix => ("genName", None),
                    LeafKind::Marker => ("note", Some("marker")),
                    _ => ("note", None),
                };
                let mut part = text_element(tag, block);
                if let Some(value) = type_attribute {
                    part.set_attribute("type", value);
                }
                part
            }
            SemanticContent::Note { note_type, block } => note_element(note_type, block),
            _ => continue,
        };
        pers_name.children.push(TeiNode::Element(part));
    }
    element.children.push(TeiNode::Element(pers_name));
    element
}

fn affiliation_element(affiliation: &SemanticContent) -> Result<TeiElement> {
    let mut element = TeiElement::new("affiliation");
    apply_coordinates(&mut element, &affiliation.merged_block());
    for child in affiliation.children() {
        match child {
            SemanticContent::Leaf { kind, block } => match kind {
                LeafKind::Marker => {
                    let part = note_element("marker", block);
                    element.children.push(TeiNode::Element(part));
                }
                LeafKind::Institution | LeafKind::Department | LeafKind::Laboratory => {
                    let org_type = match kind {
                        LeafKind::Institution => "institution",
                        LeafKind::Department => "department",
                        _ => "laboratory",
                    };
                    let part = text_element("orgName", block).with_attribute("type", org_type);
                    element.children.push(TeiNode::Element(part));
                }
                LeafKind::AddressLine
                | LeafKind::PostCode
                | LeafKind::PostBox
                | LeafKind::Region
                | LeafKind::Settlement
                | LeafKind::Country => {
                    let tag = match kind {
                        LeafKind::AddressLine => "addrLine",
                        LeafKind::PostCode => "postCode",
                        LeafKind::PostBox => "postBox",
                        LeafKind::Region => "region",
                        LeafKind::Settlement => "settlement",
                        _ => "country",
                    };
                    let part = text_element(tag, block);
                    let address = element.get_or_create_element_at(&["address"])?;
                    address.children.push(TeiNode::Element(part));
                }
                _ => {
                    let part = text_element("note", block);
                    element.children.push(TeiNode::Element(part));
                }
            },
            SemanticContent::Note { note_type, block } => {
                let part = note_element(note_type, block);
                element.children.push(TeiNode::Element(part));
            }
            _ => {}
        }
    }
    Ok(element)
}

fn section_div(section_children: &[SemanticContent]) -> TeiElement {
    let mut div = TeiElement::new("div");
    for child in section_children {
        let element = match child {
            SemanticContent::Leaf {
                kind: LeafKind::Heading,
                block,
            } => text_element("head", block),
            SemanticContent::Leaf {
                kind: LeafKind::Paragraph,
                block,
            } => text_element("p", block),
            SemanticContent::Note { note_type, block } => note_element(note_type, block),
            other => note_element("other", &other.merged_block()),
        };
        div.children.push(TeiNode::Element(element));
    }
    div
}

fn figure_element(figure: &SemanticContent) -> TeiElement {
    let mut element = TeiElement::new("figure");
    apply_coordinates(&mut element, &figure.merged_block());
    let caption = figure.view_by_kind(LeafKind::Caption);
    if !caption.is_empty() {
        let mut head = TeiElement::new("head");
        append_styled_text(&mut head, &caption);
        element.children.push(TeiNode::Element(head));
    }
    for child in figure.children() {
        let part = match child {
            SemanticContent::Leaf {
                kind: LeafKind::Label,
                block,
            } => text_element("label", block),
            SemanticContent::Leaf {
                kind: LeafKind::Caption,
                block,
            } => text_element("figDesc", block),
            SemanticContent::Note { note_type, block } => note_element(note_type, block),
            _ => continue,
        };
        element.children.push(TeiNode::Element(part));
    }
    element
}

/// Serialize the whole semantic document to a TEI tree.
pub fn document_to_tei(document: &SemanticDocument) -> Result<TeiDocument> {
    let mut tei = TeiDocument::new();
    if let Some(title) = &document.meta.title {
        let element = tei.title_element()?;
        apply_coordinates(element, title);
        append_styled_text(element, title);
    }
    if let Some(abstract_block) = &document.meta.abstract_text {
        let element = tei.abstract_paragraph()?;
        apply_coordinates(element, abstract_block);
        append_styled_text(element, abstract_block);
    }
    let mut last_author_index: Option<usize> = None;
    for content in &document.front {
        match content {
            SemanticContent::Author(_) => {
                let analytic = tei.analytic()?;
                analytic
                    .children
                    .push(TeiNode::Element(author_element(content)));
                last_author_index = Some(analytic.children.len() - 1);
            }
            SemanticContent::AffiliationAddress(_) => {
                let affiliation = affiliation_element(content)?;
                let analytic = tei.analytic()?;
                let target = match last_author_index {
                    Some(index) => match &mut analytic.children[index] {
                        TeiNode::Element(author) => author,
                        _ => unreachable!(),
                    },
                    None => analytic,
                };
                target.children.push(TeiNode::Element(affiliation));
            }
            SemanticContent::Note { note_type, block } => {
                let notes = tei.notes_statement()?;
                let note = note_element(note_type, block);
                notes.children.push(TeiNode::Element(note));
            }
            other => {
                let notes = tei.notes_statement()?;
                let note = note_element("other", &other.merged_block());
                notes.children.push(TeiNode::Element(note));
            }
        }
    }
    for content in &document.body {
        let element = match content {
            SemanticContent::Section { children, .. } => section_div(children),
            SemanticContent::Figure(_) => figure_element(content),
            SemanticContent::Note { note_type, block } => note_element(note_type, block),
            other => note_element("other", &other.merged_block()),
        };
        tei.body()?.children.push(TeiNode::Element(element));
    }
    for content in &document.back {
        match content {
            SemanticContent::Section {
                section_type: SectionType::Acknowledgement,
                children,
            } => {
                let div = section_div(children);
                let acknowledgement = tei.acknowledgement_div()?;
                acknowledgement.children.extend(div.children);
            }
            SemanticContent::Section { children, .. } => {
                let div = section_div(children);
                tei.annex_div()?.children.push(TeiNode::Element(div));
            }
            other => {
                let note = match other {
                    SemanticContent::Note { note_type, block } => note_element(note_type, block),
                    _ => note_element("other", &other.merged_block()),
                };
                tei.back()?.children.push(TeiNode::Element(note));
            }
        }
    }
    Ok(tei)
}
