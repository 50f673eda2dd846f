//! XLSX table part (xl/tables/tableN.xml) read/write helpers

use std::io::{BufReader, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use tablewash_core::Table;

/// Parse a single table part into a [`Table`]
pub(crate) fn read_table_xml<R: Read>(reader: R) -> XlsxResult<Table> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut name: Option<String> = None;
    let mut display_name: Option<String> = None;
    let mut range_ref: Option<String> = None;
    // headerRowCount defaults to 1 when the attribute is absent
    let mut header_row_count: u32 = 1;
    let mut columns: Vec<String> = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"table" => {
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"displayName" => {
                                display_name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"ref" => {
                                range_ref = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"headerRowCount" => {
                                header_row_count = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse().ok())
                                    .unwrap_or(1);
                            }
                            _ => {}
                        }
                    }
                }
                b"tableColumn" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name" {
                            if let Ok(v) = attr.unescape_value() {
                                columns.push(v.to_string());
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let name = name
        .or(display_name)
        .ok_or_else(|| XlsxError::Parse("Table part has no name".into()))?;
    let range_ref =
        range_ref.ok_or_else(|| XlsxError::Parse(format!("Table '{}' has no ref", name)))?;

    Table::new(name, &range_ref, header_row_count, columns)
        .map_err(|e| XlsxError::Parse(format!("Invalid table part: {}", e)))
}

/// Serialize a [`Table`] to a table part, using `id` as its workbook-wide id
pub(crate) fn write_table_xml(table: &Table, id: u32) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="{}" name="{}" displayName="{}" ref="{}" headerRowCount="{}">"#,
        id,
        escape_xml_attr(table.name()),
        escape_xml_attr(table.name()),
        table.range(),
        table.header_row_count()
    );

    xml.push_str(&format!(
        "\n    <tableColumns count=\"{}\">",
        table.column_count()
    ));
    for (i, column) in table.columns().iter().enumerate() {
        xml.push_str(&format!(
            "\n        <tableColumn id=\"{}\" name=\"{}\"/>",
            i + 1,
            escape_xml_attr(column)
        ));
    }
    xml.push_str("\n    </tableColumns>");

    xml.push_str(
        r#"
    <tableStyleInfo name="TableStyleMedium2" showFirstColumn="0" showLastColumn="0" showRowStripes="1" showColumnStripes="0"/>
</table>"#,
    );

    xml
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_table_xml() {
        let xml = r#"<?xml version="1.0"?>
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="1" name="Sales" displayName="Sales" ref="B2:E5" headerRowCount="1">
    <tableColumns count="4">
        <tableColumn id="1" name="Region"/>
        <tableColumn id="2" name="Units"/>
        <tableColumn id="3" name="Price"/>
        <tableColumn id="4" name="Total"/>
    </tableColumns>
</table>"#;

        let table = read_table_xml(xml.as_bytes()).unwrap();
        assert_eq!(table.name(), "Sales");
        assert_eq!(table.range().to_string(), "B2:E5");
        assert_eq!(table.header_row_count(), 1);
        assert_eq!(table.columns(), ["Region", "Units", "Price", "Total"]);
    }

    #[test]
    fn test_read_table_xml_default_header_count() {
        let xml = r#"<table name="T" ref="A1:A3"><tableColumns count="1"><tableColumn id="1" name="X"/></tableColumns></table>"#;
        let table = read_table_xml(xml.as_bytes()).unwrap();
        assert_eq!(table.header_row_count(), 1);
    }

    #[test]
    fn test_read_table_xml_missing_ref() {
        let xml = r#"<table name="T"/>"#;
        assert!(matches!(
            read_table_xml(xml.as_bytes()),
            Err(XlsxError::Parse(_))
        ));
    }

    #[test]
    fn test_roundtrip_table_xml() {
        let table = Table::new("Data", "A1:B4", 1, vec!["X".into(), "Y".into()]).unwrap();
        let xml = write_table_xml(&table, 3);

        let parsed = read_table_xml(xml.as_bytes()).unwrap();
        assert_eq!(parsed.name(), "Data");
        assert_eq!(parsed.range().to_string(), "A1:B4");
        assert_eq!(parsed.columns(), ["X", "Y"]);
    }
}
