//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use tablewash_core::style::{FontStyle, NumberFormat, Style};
use tablewash_core::Workbook;

// === Writing ===

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index corresponds to the cellXfs index (xfId).
    styles: Vec<Style>,
    /// Per-worksheet mapping: local worksheet style index -> global xfId.
    sheet_maps: Vec<HashMap<u32, u32>>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles: Vec<Style> = Vec::new();
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();

        // Index 0 is always default style
        let default = Style::default();
        styles.push(default.clone());
        style_to_xf.insert(default, 0);

        let mut sheet_maps: Vec<HashMap<u32, u32>> = Vec::with_capacity(workbook.sheet_count());

        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_row, _col, cell) in sheet.cells().iter() {
                let local_idx = cell.style_index;
                if local_idx == 0 || map.contains_key(&local_idx) {
                    continue;
                }

                let style = sheet
                    .cells()
                    .style_pool()
                    .get(local_idx)
                    .cloned()
                    .unwrap_or_default();

                let xf_id = match style_to_xf.get(&style) {
                    Some(&id) => id,
                    None => {
                        let id = styles.len() as u32;
                        styles.push(style.clone());
                        style_to_xf.insert(style, id);
                        id
                    }
                };

                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        // Build the font table
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        let mut fonts: Vec<FontStyle> = Vec::new();

        let default_font = FontStyle::default();
        fonts.push(default_font.clone());
        font_ids.insert(default_font, 0);

        // Custom number formats get ids from 164 upward
        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut next_numfmt_id: u32 = 164;

        // Resolve component ids for each style
        let mut resolved: Vec<(u32, u32)> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            let font_id = match font_ids.get(&style.font) {
                Some(&id) => id,
                None => {
                    let id = fonts.len() as u32;
                    fonts.push(style.font.clone());
                    font_ids.insert(style.font.clone(), id);
                    id
                }
            };

            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => {
                    if let Some(&id) = numfmt_ids.get(code) {
                        id
                    } else {
                        let id = next_numfmt_id;
                        next_numfmt_id += 1;
                        numfmt_ids.insert(code.clone(), id);
                        numfmts.push((id, code.clone()));
                        id
                    }
                }
            };

            resolved.push((font_id, num_fmt_id));
        }

        // Write XML
        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        // Fonts
        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        // Excel requires the first two fills to be none and gray125
        xml.push_str(
            r#"
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        // cellXfs
        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (font_id, num_fmt_id) in &resolved {
            let apply_font = if *font_id != 0 { " applyFont=\"1\"" } else { "" };
            let apply_fmt = if *num_fmt_id != 0 {
                " applyNumberFormat=\"1\""
            } else {
                ""
            };
            xml.push_str(&format!(
                "\n    <xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"0\" borderId=\"0\"{}{}/>",
                num_fmt_id, font_id, apply_fmt, apply_font
            ));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>"#,
        );

        xml.push_str("\n</styleSheet>");
        xml
    }
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

// === Reading ===

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut cell_xfs: Vec<Style> = Vec::new();

    let mut current_font: Option<FontStyle> = None;
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"cellXfs" => {
                    in_cell_xfs = true;
                }

                b"font" => {
                    current_font = Some(FontStyle::default());
                }

                // Font sub-elements can appear as start tags
                b"b" => {
                    if let Some(font) = current_font.as_mut() {
                        font.bold = font_flag_value(&e);
                    }
                }
                b"i" => {
                    if let Some(font) = current_font.as_mut() {
                        font.italic = font_flag_value(&e);
                    }
                }
                b"sz" => {
                    if let Some(font) = current_font.as_mut() {
                        apply_font_size(font, &e);
                    }
                }
                b"name" => {
                    if let Some(font) = current_font.as_mut() {
                        apply_font_name(font, &e);
                    }
                }

                b"xf" if in_cell_xfs => {
                    cell_xfs.push(parse_xf(&e, &numfmts, &fonts));
                }

                _ => {}
            },

            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        numfmts.insert(id, code);
                    }
                }

                // Font empty tags
                b"b" => {
                    if let Some(font) = current_font.as_mut() {
                        font.bold = font_flag_value(&e);
                    }
                }
                b"i" => {
                    if let Some(font) = current_font.as_mut() {
                        font.italic = font_flag_value(&e);
                    }
                }
                b"sz" => {
                    if let Some(font) = current_font.as_mut() {
                        apply_font_size(font, &e);
                    }
                }
                b"name" => {
                    if let Some(font) = current_font.as_mut() {
                        apply_font_name(font, &e);
                    }
                }

                // xf can be empty (no child elements)
                b"xf" if in_cell_xfs => {
                    cell_xfs.push(parse_xf(&e, &numfmts, &fonts));
                }

                _ => {}
            },

            Ok(Event::End(e)) => match e.name().as_ref() {
                b"font" => {
                    if let Some(f) = current_font.take() {
                        fonts.push(f);
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = false;
                }
                _ => {}
            },

            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(Style::default());
    }

    Ok(cell_xfs)
}

/// Flag elements like `<b/>` default to true; `<b val="0"/>` means false.
fn font_flag_value(e: &quick_xml::events::BytesStart<'_>) -> bool {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"val" {
            if let Ok(v) = attr.unescape_value() {
                return v.as_ref() != "0" && !v.eq_ignore_ascii_case("false");
            }
        }
    }
    true
}

fn apply_font_size(font: &mut FontStyle, e: &quick_xml::events::BytesStart<'_>) {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"val" {
            if let Ok(v) = attr.unescape_value() {
                font.size = v.parse::<f64>().unwrap_or(font.size);
            }
        }
    }
}

fn apply_font_name(font: &mut FontStyle, e: &quick_xml::events::BytesStart<'_>) {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"val" {
            if let Ok(v) = attr.unescape_value() {
                font.name = v.to_string();
            }
        }
    }
}

fn parse_xf(
    e: &quick_xml::events::BytesStart<'_>,
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
) -> Style {
    let mut num_fmt_id = 0u32;
    let mut font_id = 0u32;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"numFmtId" => {
                num_fmt_id = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
            }
            b"fontId" => {
                font_id = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0);
            }
            _ => {}
        }
    }

    let mut style = Style::default();
    style.font = fonts.get(font_id as usize).cloned().unwrap_or_default();
    style.number_format = if num_fmt_id == 0 {
        NumberFormat::General
    } else if let Some(code) = numfmts.get(&num_fmt_id) {
        NumberFormat::Custom(code.clone())
    } else {
        NumberFormat::BuiltIn(num_fmt_id)
    };

    style
}
