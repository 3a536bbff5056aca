//! Integration tests for tabular sources.

use std::io::{Cursor, Write};
use std::sync::Arc;

use rowreport::error::Result;
use rowreport::source::{CsvSource, WorkbookSource};
use rowreport::{
    detect_format_from_bytes, Error, Record, SheetFormat, SourceRegistry, SourceRow,
    TabularSource, Value,
};

/// Reader that returns one fixed row for any input.
struct FixedSource;

impl TabularSource for FixedSource {
    fn supported_extensions(&self) -> &[&str] {
        &["fixed"]
    }

    fn name(&self) -> &str {
        "fixed"
    }

    fn read_bytes(&self, _bytes: &[u8]) -> Result<Vec<SourceRow>> {
        Ok(vec![SourceRow::new(
            1,
            Record::from_pairs([("Name", Value::from("fixed"))]),
        )])
    }
}

/// Minimal xlsx with inline strings: one header row and two data rows.
fn tiny_xlsx() -> Vec<u8> {
    let files: [(&str, &str); 5] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Issues" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#,
        ),
        (
            "xl/worksheets/sheet1.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Name</t></is></c><c r="B1" t="inlineStr"><is><t>Age</t></is></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>John Doe</t></is></c><c r="B2"><v>30</v></c></row>
<row r="3"><c r="A3" t="inlineStr"><is><t>Jane Roe</t></is></c><c r="B3"><v>41.5</v></c></row>
</sheetData>
</worksheet>"#,
        ),
    ];

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in files {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_registry_new_is_empty() {
    let registry = SourceRegistry::new();
    assert!(!registry.supports("csv"));
    assert!(registry.supported_extensions().is_empty());
}

#[test]
fn test_registry_defaults() {
    let registry = SourceRegistry::with_defaults();
    for ext in ["xlsx", "xlsm", "xls", "ods", "csv", "tsv"] {
        assert!(registry.supports(ext), "missing {}", ext);
    }
    assert!(registry.supports("CSV"));
    assert!(!registry.supports("pdf"));
}

#[test]
fn test_registry_custom_source() {
    let mut registry = SourceRegistry::new();
    registry.register(Arc::new(FixedSource));
    assert!(registry.supports("FIXED"));
    assert_eq!(registry.get_by_name("Fixed").unwrap().name(), "fixed");

    let rows = registry.read_bytes(b"whatever", Some("fixed")).unwrap();
    assert_eq!(rows[0].record.get("Name"), Some(&Value::from("fixed")));
}

#[test]
fn test_csv_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("incidents.csv");
    std::fs::write(
        &path,
        "issue_type,severity,,severity\nContamination,High,x,2\n,,,\nLabel error,NA,y,3\n",
    )
    .unwrap();

    let rows = rowreport::read_file(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].row, 2);

    let columns: Vec<&str> = rows[0].record.columns().collect();
    assert_eq!(columns, vec!["issue_type", "severity", "Unnamed: 2", "severity.1"]);
    assert_eq!(rows[1].record.get("severity"), Some(&Value::Empty));
    assert_eq!(rows[1].record.get("severity.1"), Some(&Value::Integer(3)));
}

#[test]
fn test_csv_header_only_is_unreadable() {
    let err = CsvSource::new().read_bytes(b"Name,Age\n").unwrap_err();
    assert!(matches!(err, Error::UnreadableFile(_)));
}

#[test]
fn test_csv_via_path_helper() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.tsv");
    std::fs::write(&path, "Name\tAge\nAnn\t30\n").unwrap();

    let rows = SourceRegistry::with_defaults().read_path(&path).unwrap();
    assert_eq!(rows[0].record.get("Age"), Some(&Value::Integer(30)));
}

#[test]
fn test_workbook_rows() {
    let data = tiny_xlsx();
    assert_eq!(detect_format_from_bytes(&data).unwrap(), SheetFormat::Workbook);

    let rows = WorkbookSource::new().read_bytes(&data).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].record.get("Name"), Some(&Value::from("John Doe")));
    assert_eq!(rows[1].row, 2);

    // sniffed when the extension is unknown
    let sniffed = rowreport::read_bytes(&data, None).unwrap();
    assert_eq!(sniffed, rows);
}

#[test]
fn test_workbook_garbage_is_an_error() {
    let err = WorkbookSource::new()
        .read_bytes(b"PK\x03\x04 definitely not a workbook")
        .unwrap_err();
    assert!(matches!(err, Error::UnreadableFile(_)));
}

#[test]
fn test_unknown_binary_is_unreadable() {
    let err = rowreport::read_bytes(&[0xFF, 0xFE, 0, 1, 2, 3], Some("dat")).unwrap_err();
    assert!(matches!(err, Error::UnreadableFile(_)));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.bin");
    std::fs::write(&path, [0u8, 159, 146, 150]).unwrap();
    let err = rowreport::read_file(&path).unwrap_err();
    assert!(matches!(err, Error::UnreadableFile(_)));
}
