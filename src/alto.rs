//! ALTO XML parsing into the [`LayoutDocument`] model.
//!
//! ALTO (namespace `http://www.loc.gov/standards/alto/ns-v3#`) describes
//! OCR/PDF-extracted page layout: a `Styles` section with `TextStyle` font
//! definitions followed by `Layout/Page/.../TextBlock/TextLine/String`
//! geometry. Fonts are parsed first into a table keyed by id and shared by
//! reference across tokens; `String` content is normalized through a fixed
//! ligature/quote/bullet substitution table.

use std::collections::HashMap;
use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::geometry::PageCoordinates;
use crate::layout::{LayoutBlock, LayoutDocument, LayoutFont, LayoutLine, LayoutPage, LayoutToken};

pub const ALTO_NS: &str = "http://www.loc.gov/standards/alto/ns-v3#";

/// Character substitutions applied to `CONTENT` text: ligatures expanded,
/// curly quotes straightened, bullet glyph variants unified.
fn replacement_for_char(ch: char) -> Option<&'static str> {
    Some(match ch {
        '\u{FB00}' => "ff",
        '\u{FB01}' => "fi",
        '\u{FB02}' => "fl",
        '\u{FB03}' => "ffi",
        '\u{FB04}' => "ffl",
        '\u{FB05}' => "ft",
        '\u{FB06}' => "st",
        '\u{00E6}' => "ae",
        '\u{00C6}' => "AE",
        '\u{0153}' => "oe",
        '\u{0152}' => "OE",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => "\"",
        '\u{2018}' | '\u{2019}' => "'",
        '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{204C}' | '\u{204D}' | '\u{2219}'
        | '\u{25C9}' | '\u{25D8}' | '\u{25E6}' | '\u{2619}' | '\u{2765}' | '\u{2767}'
        | '\u{29BE}' | '\u{29BF}' => "•",
        '\u{2217}' => "*",
        _ => return None,
    })
}

/// Normalize token text via the substitution table.
pub fn normalize_text(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for ch in text.chars() {
        match replacement_for_char(ch) {
            Some(replacement) => normalized.push_str(replacement),
            None => normalized.push(ch),
        }
    }
    normalized
}

/// Element name without its namespace prefix.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(index) => &name[index + 1..],
        None => name,
    }
}

fn get_attribute(element: &BytesStart, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            let raw = String::from_utf8(attr.value.to_vec())?;
            let value = unescape(&raw).map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn get_float_attribute_or_zero(element: &BytesStart, name: &[u8]) -> Result<f64> {
    match get_attribute(element, name)? {
        Some(value) => value.parse().map_err(|_| {
            Error::InvalidAlto(format!(
                "invalid numeric attribute {}: {:?}",
                String::from_utf8_lossy(name),
                value
            ))
        }),
        None => Ok(0.0),
    }
}

fn parse_font(element: &BytesStart) -> Result<LayoutFont> {
    let font_size_text = get_attribute(element, b"FONTSIZE")?
        .ok_or_else(|| Error::MissingAttribute("FONTSIZE".to_string()))?;
    let font_size: f64 = font_size_text
        .parse()
        .map_err(|_| Error::InvalidAlto(format!("invalid FONTSIZE: {:?}", font_size_text)))?;
    let font_styles = get_attribute(element, b"FONTSTYLE")?.unwrap_or_default();
    let font_styles: Vec<&str> = font_styles.split(' ').collect();
    Ok(LayoutFont {
        font_id: get_attribute(element, b"ID")?.unwrap_or_default(),
        font_family: get_attribute(element, b"FONTFAMILY")?,
        font_size: Some(font_size),
        is_bold: font_styles.contains(&"bold"),
        is_italics: font_styles.contains(&"italics"),
        is_subscript: font_styles.contains(&"subscript"),
        is_superscript: font_styles.contains(&"superscript"),
    })
}

fn parse_token(
    element: &BytesStart,
    fonts: &HashMap<String, Arc<LayoutFont>>,
    page_number: u32,
) -> Result<LayoutToken> {
    let font = match get_attribute(element, b"STYLEREFS")? {
        Some(style_refs) => match fonts.get(&style_refs) {
            Some(font) => font.clone(),
            None => {
                log::warn!("unresolved style reference: {:?}", style_refs);
                LayoutFont::empty()
            }
        },
        None => LayoutFont::empty(),
    };
    Ok(LayoutToken::new(
        normalize_text(&get_attribute(element, b"CONTENT")?.unwrap_or_default()),
        font,
        " ",
        Some(PageCoordinates::new(
            get_float_attribute_or_zero(element, b"HPOS")?,
            get_float_attribute_or_zero(element, b"VPOS")?,
            get_float_attribute_or_zero(element, b"WIDTH")?,
            get_float_attribute_or_zero(element, b"HEIGHT")?,
            page_number,
        )),
    ))
}

/// Parse an ALTO document into a [`LayoutDocument`].
///
/// Page numbers are 1-based in enumeration order. Lines without `String`
/// children are dropped; unresolved `STYLEREFS` fall back to the empty font.
pub fn parse_alto(xml: &str) -> Result<LayoutDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fonts: HashMap<String, Arc<LayoutFont>> = HashMap::new();
    let mut pages: Vec<LayoutPage> = Vec::new();
    let mut current_blocks: Option<Vec<LayoutBlock>> = None;
    let mut current_lines: Option<Vec<LayoutLine>> = None;
    let mut current_tokens: Option<Vec<LayoutToken>> = None;
    let mut page_number: u32 = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == b"TextStyle" => {
                let font = parse_font(&e)?;
                fonts.insert(font.font_id.clone(), Arc::new(font));
            }
            Event::Start(e) if local_name(e.name().as_ref()) == b"Page" => {
                page_number += 1;
                current_blocks = Some(Vec::new());
            }
            Event::Start(e) if local_name(e.name().as_ref()) == b"TextBlock" => {
                current_lines = Some(Vec::new());
            }
            Event::Start(e) if local_name(e.name().as_ref()) == b"TextLine" => {
                current_tokens = Some(Vec::new());
            }
            Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == b"String" => {
                if let Some(tokens) = current_tokens.as_mut() {
                    tokens.push(parse_token(&e, &fonts, page_number)?);
                }
            }
            Event::End(e) => match local_name(e.name().as_ref()) {
                b"TextLine" => {
                    let tokens = current_tokens.take().unwrap_or_default();
                    if !tokens.is_empty() {
                        if let Some(lines) = current_lines.as_mut() {
                            lines.push(LayoutLine::new(tokens));
                        }
                    }
                }
                b"TextBlock" => {
                    let lines = current_lines.take().unwrap_or_default();
                    if let Some(blocks) = current_blocks.as_mut() {
                        blocks.push(LayoutBlock::new(lines));
                    }
                }
                b"Page" => {
                    pages.push(LayoutPage::new(current_blocks.take().unwrap_or_default()));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(LayoutDocument::new(pages))
}
