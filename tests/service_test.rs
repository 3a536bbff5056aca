//! Integration tests for the upload / download surface.

use std::io::Cursor;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rowreport::service::{SpreadsheetId, SpreadsheetInfo, StoredSpreadsheet};
use rowreport::{
    DocumentTree, Error, LayoutPolicy, NormalizedField, PolicyRegistry, ReportId, ReportPipeline,
    ReportService, RowError, SpreadsheetStore,
};

const ISSUES: &str = "date,department,issue_type,severity,description\n\
2024-03-01,Packaging,Label error,Low,Wrong allergen label on carton.\n\
2024-03-02,Production,Contamination,High,\"Metal shaving found.\nLine stopped.\"\n\
2024-03-04,QA,Temperature,Medium,Cold room above limit.\n";

/// Store whose clock is fixed, so listing order can be tested.
#[derive(Default)]
struct FixedClockStore {
    entries: Mutex<Vec<StoredSpreadsheet>>,
}

impl SpreadsheetStore for FixedClockStore {
    fn insert(&self, file_name: &str, bytes: Vec<u8>, _uploaded_at: DateTime<Utc>) -> SpreadsheetId {
        let mut entries = self.entries.lock();
        let id = entries.len() as SpreadsheetId + 1;
        entries.push(StoredSpreadsheet {
            id,
            file_name: file_name.to_string(),
            // every upload lands in the same second
            uploaded_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            processed: false,
            bytes: Arc::new(bytes),
        });
        id
    }

    fn get(&self, id: SpreadsheetId) -> Option<StoredSpreadsheet> {
        self.entries.lock().iter().find(|s| s.id == id).cloned()
    }

    fn all(&self) -> Vec<SpreadsheetInfo> {
        self.entries.lock().iter().map(SpreadsheetInfo::from).collect()
    }

    fn mark_processed(&self, id: SpreadsheetId) -> bool {
        match self.entries.lock().iter_mut().find(|s| s.id == id) {
            Some(entry) => {
                entry.processed = true;
                true
            }
            None => false,
        }
    }
}

struct AlwaysFails;

impl LayoutPolicy for AlwaysFails {
    fn name(&self) -> &str {
        "always-fails"
    }

    fn compose(&self, _fields: &[NormalizedField], row: usize) -> Result<DocumentTree, RowError> {
        Err(RowError::Compose(format!("row {} rejected", row)))
    }
}

#[test]
fn test_upload_and_download_batch() {
    let service = ReportService::in_memory();
    let id = service.upload("issues.csv", ISSUES.as_bytes().to_vec()).unwrap();

    let download = service.download_spreadsheet_reports(id).unwrap().unwrap();
    assert_eq!(download.content_type, "application/zip");
    assert_eq!(
        download.content_disposition.unwrap(),
        format!("attachment; filename=\"spreadsheet_{}_reports.zip\"", id)
    );

    let mut zip = zip::ZipArchive::new(Cursor::new(download.bytes)).unwrap();
    assert_eq!(zip.len(), 3);
    for i in 0..3 {
        let entry = zip.by_index(i).unwrap();
        assert_eq!(entry.name(), format!("row_{}.pdf", i + 1));
    }
}

#[test]
fn test_single_report_is_a_pdf() {
    let service = ReportService::in_memory();
    let id = service.upload("issues.csv", ISSUES.as_bytes().to_vec()).unwrap();

    let download = service
        .download_report(ReportId { spreadsheet: id, row: 2 })
        .unwrap()
        .unwrap();
    assert_eq!(download.content_type, "application/pdf");
    let doc = lopdf::Document::load_mem(&download.bytes).unwrap();
    assert!(!doc.get_pages().is_empty());

    let none = service
        .download_report(ReportId { spreadsheet: id + 1, row: 1 })
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn test_upload_validation() {
    let service = ReportService::in_memory();

    let err = service.upload("notes.txt", ISSUES.as_bytes().to_vec()).unwrap_err();
    assert!(err.to_string().contains(".xlsx"));

    let err = service.upload("broken.xlsx", b"not a workbook".to_vec()).unwrap_err();
    assert!(matches!(err, Error::UnreadableFile(_)));

    assert!(service.list().is_empty());
}

#[test]
fn test_list_breaks_time_ties_by_id() {
    let service = ReportService::new(FixedClockStore::default());
    let a = service.upload("a.csv", ISSUES.as_bytes().to_vec()).unwrap();
    let b = service.upload("b.csv", ISSUES.as_bytes().to_vec()).unwrap();
    let c = service.upload("c.csv", ISSUES.as_bytes().to_vec()).unwrap();

    let ids: Vec<_> = service.list().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![c, b, a]);
}

#[test]
fn test_failed_batch_stays_unprocessed() {
    let pipeline = ReportPipeline::new().with_registry(PolicyRegistry::new(Arc::new(AlwaysFails)));
    let service = ReportService::in_memory().with_pipeline(pipeline);
    let id = service.upload("issues.csv", ISSUES.as_bytes().to_vec()).unwrap();

    let err = service.download_spreadsheet_reports(id).unwrap_err();
    assert!(matches!(err, Error::EmptyBatch { failed: 3 }));

    let listed = service.list();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].processed);
}

#[test]
fn test_listing_serializes() {
    let service = ReportService::in_memory();
    service.upload("issues.csv", ISSUES.as_bytes().to_vec()).unwrap();

    let json = serde_json::to_value(service.list()).unwrap();
    assert_eq!(json[0]["file_name"], "issues.csv");
    assert_eq!(json[0]["processed"], false);
}
