//! Upload and artifact preview controller
//!
//! Dispatches one file per submission to the backend and normalizes the
//! heterogeneous preview payload (tabular or document) plus chart blobs
//! into a display-ready outcome. Same single-flight discipline as the chat
//! controller: a submission while an upload is pending is rejected, not
//! queued.

use crate::charts::parse_chart_specs;
use crate::{AppError, AppResult};
use finsight_client::ResearchBackend;
use finsight_core::{FileKind, UploadOutcome};
use tracing::{debug, info};

/// Controller for document uploads
#[derive(Debug, Default)]
pub struct UploadController {
    upload_pending: bool,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an upload is outstanding
    pub fn is_upload_pending(&self) -> bool {
        self.upload_pending
    }

    /// Upload one file and normalize the result.
    ///
    /// Unsupported extensions fail synchronously before any network
    /// activity. A malformed chart blob in the response is dropped without
    /// affecting the remaining charts or the preview.
    pub async fn submit<B: ResearchBackend + ?Sized>(
        &mut self,
        backend: &B,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> AppResult<UploadOutcome> {
        if self.upload_pending {
            return Err(AppError::RequestInFlight {
                operation: "upload",
            });
        }

        // Boundary validation; rejected files never mark the controller busy.
        let kind = FileKind::from_file_name(file_name)?;

        debug!("Uploading {} ({:?})", file_name, kind);
        self.upload_pending = true;
        let result = backend.upload(file_name, bytes).await;
        self.upload_pending = false;

        let report = result?;
        let charts = parse_chart_specs(report.charts);

        info!(
            "Upload of {} complete: {} charts normalized",
            file_name,
            charts.len()
        );

        Ok(UploadOutcome {
            file_name: file_name.to_string(),
            kind,
            message: report.message,
            preview: report.preview,
            charts,
        })
    }
}
