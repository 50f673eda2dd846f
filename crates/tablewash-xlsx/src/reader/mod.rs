//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use crate::tables::read_table_xml;
use tablewash_core::style::Style;
use tablewash_core::{CellAddress, CellValue, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML, e.g.
/// `_x000a_` for LF and `_x005f_` for an escaped underscore.
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < s.len() {
        // An escape is exactly "_x" + 4 hex digits + "_"
        let is_escape = s[i..].starts_with("_x")
            && s.len() >= i + 7
            && bytes[i + 6] == b'_'
            && s[i + 2..i + 6].bytes().all(|b| b.is_ascii_hexdigit());

        if is_escape {
            if let Some(decoded) =
                u32::from_str_radix(&s[i + 2..i + 6], 16).ok().and_then(char::from_u32)
            {
                result.push(decoded);
                i += 7;
                continue;
            }
        }

        // Not an escape; copy the next char as-is
        let c = s[i..].chars().next().unwrap_or('\u{FFFD}');
        result.push(c);
        i += c.len_utf8();
    }

    result
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        // Read shared strings (if present)
        let shared_strings = Self::read_shared_strings(&mut archive)?;

        // Read styles (if present)
        let styles = Self::read_styles(&mut archive)?;

        // Read workbook.xml to get sheet info
        let sheet_info = Self::read_workbook_xml(&mut archive)?;

        // Read workbook.xml.rels to get sheet paths
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for (name, r_id) in &sheet_info {
            if let Some(path) = sheet_paths.get(r_id) {
                let mut sheet = Worksheet::new(name.clone());
                Self::read_worksheet(&mut archive, path, &mut sheet, &shared_strings, &styles)?;
                Self::read_worksheet_tables(&mut archive, path, &mut sheet)?;
                workbook.add_existing_worksheet(sheet)?;
            }
        }

        // Ensure at least one sheet exists
        if workbook.sheet_count() == 0 {
            workbook.add_worksheet("Sheet1")?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => {
                        in_t = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"t" => {
                        in_t = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(vec![Style::default()]),
        };
        read_styles_xml(file)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let rels = Self::read_relationships(file)?;

        // Only worksheet relationships; targets are relative to xl/
        Ok(rels
            .into_iter()
            .filter(|(_, (rel_type, _))| rel_type.ends_with("/worksheet"))
            .map(|(id, (_, target))| {
                let full_path = if let Some(absolute) = target.strip_prefix('/') {
                    absolute.to_string()
                } else {
                    format!("xl/{}", target)
                };
                (id, full_path)
            })
            .collect())
    }

    /// Parse a relationships part into id -> (type, target)
    fn read_relationships<R: Read>(reader: R) -> XlsxResult<HashMap<String, (String, String)>> {
        let mut xml_reader = Reader::from_reader(BufReader::new(reader));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        rels.insert(id, (rel_type, target));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet's cells from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();

        // Current cell state
        let mut current_cell_ref: Option<String> = None;
        let mut current_cell_type: Option<String> = None;
        let mut current_cell_style: Option<u32> = None;
        let mut current_value: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => {
                        in_cell = true;
                        current_cell_ref = None;
                        current_cell_type = None;
                        current_cell_style = None;
                        current_value = None;
                        Self::parse_cell_attrs(
                            &e,
                            &mut current_cell_ref,
                            &mut current_cell_type,
                            &mut current_cell_style,
                        );
                    }
                    b"v" if in_cell => {
                        in_value = true;
                    }
                    b"is" if in_cell => {
                        in_inline_str = true;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(ref cell_ref) = current_cell_ref {
                            Self::process_cell(
                                worksheet,
                                cell_ref,
                                current_cell_type.as_deref(),
                                current_value.as_deref(),
                                current_cell_style,
                                shared_strings,
                                styles,
                            )?;
                        }
                        in_cell = false;
                    }
                    b"v" => {
                        in_value = false;
                    }
                    b"is" => {
                        in_inline_str = false;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value {
                        if let Ok(text) = e.unescape() {
                            current_value = Some(text.to_string());
                        }
                    } else if in_inline_text {
                        if let Ok(text) = e.unescape() {
                            current_value = Some(text.to_string());
                            current_cell_type = Some("inlineStr".to_string());
                        }
                    }
                }
                Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                    // Empty cell element (may still carry a style)
                    let mut cell_ref: Option<String> = None;
                    let mut cell_type: Option<String> = None;
                    let mut cell_style: Option<u32> = None;
                    Self::parse_cell_attrs(&e, &mut cell_ref, &mut cell_type, &mut cell_style);

                    if let Some(cell_ref) = cell_ref {
                        Self::process_cell(
                            worksheet,
                            &cell_ref,
                            cell_type.as_deref(),
                            None,
                            cell_style,
                            shared_strings,
                            styles,
                        )?;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn parse_cell_attrs(
        e: &quick_xml::events::BytesStart<'_>,
        cell_ref: &mut Option<String>,
        cell_type: &mut Option<String>,
        cell_style: &mut Option<u32>,
    ) {
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    *cell_ref = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"t" => {
                    *cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"s" => {
                    *cell_style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }
    }

    /// Process a cell and add it to the worksheet
    fn process_cell(
        worksheet: &mut Worksheet,
        cell_ref: &str,
        cell_type: Option<&str>,
        value: Option<&str>,
        style_idx: Option<u32>,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;

        if let Some(value) = value {
            let cell_value = match cell_type {
                // Shared string
                Some("s") => {
                    let idx: usize = value.parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::string(s.as_str())
                }

                // Boolean
                Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

                // Inline or explicit string - decode Excel escape sequences
                Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(value)),

                // Number (default type or explicit "n")
                None | Some("n") => match value.parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::string(value),
                },

                // Unknown type - treat as string
                Some(_) => CellValue::string(value),
            };

            worksheet.set_cell_value(addr, cell_value)?;
        }

        // Apply style (if any)
        if let Some(s) = style_idx {
            if s != 0 {
                let style = styles
                    .get(s as usize)
                    .ok_or_else(|| XlsxError::Parse(format!("Style index {} out of bounds", s)))?;
                worksheet.set_cell_style(addr, style)?;
            }
        }

        Ok(())
    }

    /// Read a worksheet's table parts, if any
    fn read_worksheet_tables<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        sheet_path: &str,
        worksheet: &mut Worksheet,
    ) -> XlsxResult<()> {
        // "xl/worksheets/sheet1.xml" -> "xl/worksheets/_rels/sheet1.xml.rels"
        let rels_path = match sheet_path.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => return Ok(()),
        };

        let table_paths: Vec<String> = {
            let file = match archive.by_name(&rels_path) {
                Ok(f) => f,
                Err(_) => return Ok(()), // No relationships means no tables
            };

            let rels = Self::read_relationships(file)?;
            let mut paths: Vec<String> = rels
                .into_values()
                .filter(|(rel_type, _)| rel_type.ends_with("/table"))
                .map(|(_, target)| {
                    // Targets are relative to the worksheet directory
                    if let Some(absolute) = target.strip_prefix('/') {
                        absolute.to_string()
                    } else if let Some(relative) = target.strip_prefix("../") {
                        format!("xl/{}", relative)
                    } else {
                        format!("xl/worksheets/{}", target)
                    }
                })
                .collect();
            paths.sort();
            paths
        };

        for path in table_paths {
            let file = match archive.by_name(&path) {
                Ok(f) => f,
                Err(_) => {
                    log::warn!("table part {} referenced but missing, skipping", path);
                    continue;
                }
            };
            let table = read_table_xml(file)?;
            worksheet.add_table(table)?;
        }

        Ok(())
    }
}
