//! Integration tests for archive construction.

use std::io::{Cursor, Read};

use chrono::{NaiveDate, TimeZone, Utc};
use rowreport::archive::{build_archive, sanitize_component};
use rowreport::{
    ArchiveBuilder, ArchiveOptions, EntryNaming, Error, Record, RenderOptions, RenderedDocument,
    ReportPipeline, RowError, RowFailure, SourceRow, Value,
};

fn entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

fn failure(row: usize) -> RowFailure {
    RowFailure::new(row, RowError::Compose(format!("row {} broke", row)))
}

#[test]
fn test_archive_names_match_source_rows() {
    let docs = vec![
        RenderedDocument::new(1, b"one".to_vec()),
        RenderedDocument::new(2, b"two".to_vec()),
        RenderedDocument::new(4, b"four".to_vec()),
        RenderedDocument::new(5, b"five".to_vec()),
    ];
    let archive = build_archive(docs, vec![failure(3)]).unwrap();

    let listed = entries(&archive.bytes);
    let names: Vec<&str> = listed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["row_1.pdf", "row_2.pdf", "row_4.pdf", "row_5.pdf"]);
    assert_eq!(listed[2].1, b"four");
    assert_eq!(archive.failures[0].row, 3);
}

#[test]
fn test_archive_is_flat_and_deflated() {
    let docs = vec![RenderedDocument::new(1, vec![b'a'; 4096])];
    let archive = build_archive(docs, vec![]).unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(&archive.bytes)).unwrap();
    let file = zip.by_index(0).unwrap();
    assert!(!file.name().contains('/'));
    assert_eq!(file.compression(), zip::CompressionMethod::Deflated);
    assert!(file.compressed_size() < file.size());
}

#[test]
fn test_every_row_failed_is_not_an_empty_archive() {
    let err = build_archive(vec![], vec![failure(1), failure(2), failure(3)]).unwrap_err();
    match err {
        Error::EmptyBatch { failed } => assert_eq!(failed, 3),
        other => panic!("expected EmptyBatch, got {:?}", other),
    }
}

#[test]
fn test_duplicate_names_fail_loudly() {
    let mut builder = ArchiveBuilder::new(ArchiveOptions::default());
    builder.add(RenderedDocument::new(1, vec![1])).unwrap();
    let err = builder.add(RenderedDocument::new(1, vec![2])).unwrap_err();
    assert!(matches!(err, Error::NamingCollision(_)));
    assert_eq!(builder.len(), 1);
}

#[test]
fn test_row_and_column_naming_through_pipeline() {
    let rows = vec![
        SourceRow::new(
            1,
            Record::from_pairs([
                ("batch_number", Value::from("LOT 2024/07")),
                ("severity", Value::from("High")),
            ]),
        ),
        SourceRow::new(
            2,
            Record::from_pairs([
                ("batch_number", Value::Empty),
                ("severity", Value::from("Low")),
            ]),
        ),
    ];

    let pipeline = ReportPipeline::new()
        .with_render_options(
            RenderOptions::new().with_generated_at(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()),
        )
        .with_archive_options(
            ArchiveOptions::new().with_naming(EntryNaming::RowAndColumn("batch_number".into())),
        );
    let archive = pipeline.build_archive(&rows).unwrap();
    assert_eq!(archive.entries, vec!["row_1_LOT_2024_07.pdf", "row_2.pdf"]);
}

#[test]
fn test_same_input_same_archive() {
    let options = ArchiveOptions::new().with_modified(
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 6)
            .unwrap(),
    );
    let make = || {
        ArchiveBuilder::new(options.clone())
            .build(
                vec![
                    RenderedDocument::new(1, b"a".to_vec()),
                    RenderedDocument::new(2, b"b".to_vec()),
                ],
                vec![],
            )
            .unwrap()
            .bytes
    };
    assert_eq!(make(), make());
}

#[test]
fn test_sanitize_component_is_path_safe() {
    for input in ["../../x", "a\\b", "C:\\evil", "  spaced  out  "] {
        let out = sanitize_component(input);
        assert!(!out.contains('/'));
        assert!(!out.contains('\\'));
        assert!(!out.starts_with('.'));
    }
}
