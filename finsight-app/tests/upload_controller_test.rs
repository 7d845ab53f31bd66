//! Upload controller dispatch and normalization behavior

use async_trait::async_trait;
use finsight_app::{AppError, UploadController};
use finsight_client::ResearchBackend;
use finsight_core::{
    ChatMode, DataPreview, DocumentPreview, ErrorContext, FileKind, FinsightError, FinsightResult,
    IndexStats, Message, Quote, SearchHit, StockReport, SystemStatus, TablePreview, UploadReport,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Backend that serves a canned upload report and counts upload calls
struct CannedUploadBackend {
    report: fn() -> UploadReport,
    upload_calls: AtomicUsize,
}

impl CannedUploadBackend {
    fn new(report: fn() -> UploadReport) -> Self {
        Self {
            report,
            upload_calls: AtomicUsize::new(0),
        }
    }

    fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }
}

fn unscripted<T>(operation: &str) -> FinsightResult<T> {
    Err(FinsightError::Backend {
        message: format!("{} not scripted", operation),
        context: ErrorContext::new("canned_backend"),
    })
}

#[async_trait]
impl ResearchBackend for CannedUploadBackend {
    async fn health(&self) -> FinsightResult<SystemStatus> {
        unscripted("health")
    }

    async fn chat(
        &self,
        _message: &str,
        _mode: ChatMode,
        _context_data: Option<&Value>,
    ) -> FinsightResult<Message> {
        unscripted("chat")
    }

    async fn upload(&self, _file_name: &str, _bytes: Vec<u8>) -> FinsightResult<UploadReport> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.report)())
    }

    async fn search_documents(
        &self,
        _query: &str,
        _limit: usize,
    ) -> FinsightResult<Vec<SearchHit>> {
        unscripted("search_documents")
    }

    async fn clear_index(&self) -> FinsightResult<bool> {
        unscripted("clear_index")
    }

    async fn index_stats(&self) -> FinsightResult<IndexStats> {
        unscripted("index_stats")
    }

    async fn market_overview(&self) -> FinsightResult<HashMap<String, Quote>> {
        unscripted("market_overview")
    }

    async fn fetch_quote(&self, _symbol: &str) -> FinsightResult<StockReport> {
        unscripted("fetch_quote")
    }
}

fn tabular_report_with_charts() -> UploadReport {
    UploadReport {
        message: "Successfully loaded 120 rows".to_string(),
        preview: DataPreview::Tabular(TablePreview {
            row_count: 120,
            column_count: 4,
            column_types: HashMap::from([
                ("Date".to_string(), "object".to_string()),
                ("Close".to_string(), "float64".to_string()),
            ]),
            sample_rows: vec![json!({"Date": "2024-01-02", "Close": 185.6})
                .as_object()
                .cloned()
                .unwrap()],
        }),
        charts: vec![
            json!({"data": [], "layout": {"title": "Stock Price Over Time"}}),
            Value::String("{{{ definitely not json".to_string()),
            json!({"data": [], "layout": {"title": "Trading Volume"}}),
        ],
    }
}

fn document_report() -> UploadReport {
    UploadReport {
        message: "Successfully extracted 5400 characters".to_string(),
        preview: DataPreview::Document(DocumentPreview {
            char_count: 5400,
            word_count: 860,
            excerpt: "Annual report 2024...".to_string(),
        }),
        charts: vec![],
    }
}

#[tokio::test]
async fn unsupported_extension_never_reaches_the_backend() {
    let backend = CannedUploadBackend::new(document_report);
    let mut controller = UploadController::new();

    let result = controller
        .submit(&backend, "malware.exe", b"MZ".to_vec())
        .await;

    match result {
        Err(AppError::Api(FinsightError::UnsupportedFileType { extension, .. })) => {
            assert_eq!(extension, "exe");
        }
        other => panic!("expected UnsupportedFileType, got {:?}", other.err()),
    }
    assert_eq!(backend.upload_calls(), 0);
    assert!(!controller.is_upload_pending());
}

#[tokio::test]
async fn malformed_chart_blob_is_dropped_without_losing_the_rest() {
    let backend = CannedUploadBackend::new(tabular_report_with_charts);
    let mut controller = UploadController::new();

    let outcome = controller
        .submit(&backend, "prices.csv", b"Date,Close\n".to_vec())
        .await
        .unwrap();

    // Two of three blobs parse; the preview is untouched.
    assert_eq!(outcome.charts.len(), 2);
    assert_eq!(outcome.charts[0].title(), Some("Stock Price Over Time"));
    assert_eq!(outcome.charts[1].title(), Some("Trading Volume"));

    match &outcome.preview {
        DataPreview::Tabular(table) => {
            assert_eq!(table.row_count, 120);
            assert_eq!(table.column_count, 4);
            assert_eq!(table.sample_rows.len(), 1);
        }
        other => panic!("expected tabular preview, got {:?}", other),
    }
    assert_eq!(outcome.kind, FileKind::Csv);
}

#[tokio::test]
async fn pdf_upload_normalizes_to_document_preview() {
    let backend = CannedUploadBackend::new(document_report);
    let mut controller = UploadController::new();

    let outcome = controller
        .submit(&backend, "Q1-Report.PDF", b"%PDF-1.7".to_vec())
        .await
        .unwrap();

    assert_eq!(outcome.kind, FileKind::Pdf);
    assert!(outcome.charts.is_empty());
    match &outcome.preview {
        DataPreview::Document(doc) => {
            assert_eq!(doc.word_count, 860);
            assert!(doc.excerpt.starts_with("Annual report"));
        }
        other => panic!("expected document preview, got {:?}", other),
    }
}

#[tokio::test]
async fn controller_is_reusable_after_each_submission() {
    let backend = CannedUploadBackend::new(document_report);
    let mut controller = UploadController::new();

    controller
        .submit(&backend, "a.pdf", b"%PDF".to_vec())
        .await
        .unwrap();
    assert!(!controller.is_upload_pending());

    controller
        .submit(&backend, "b.pdf", b"%PDF".to_vec())
        .await
        .unwrap();
    assert_eq!(backend.upload_calls(), 2);
}
