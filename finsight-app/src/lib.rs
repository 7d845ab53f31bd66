//! FinSight App - session and upload controllers
//!
//! This crate holds the client-side orchestration logic between the typed
//! API client and a rendering layer: the chat session controller (ordered
//! history, response modes, in-flight request state) and the upload
//! controller (file dispatch and preview normalization). Controllers are
//! plain owned values driven by one logical task; the awaited backend call
//! is the only suspension point.

pub mod charts;
pub mod chat;
pub mod upload;

pub use charts::parse_chart_specs;
pub use chat::{ChatController, Completion, PendingExchange};
pub use upload::UploadController;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] finsight_core::FinsightError),

    /// A submission was rejected because one is already outstanding
    #[error("A {operation} request is already in flight")]
    RequestInFlight { operation: &'static str },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Whether this error was rejected at the client boundary without a
    /// network round trip
    pub fn is_boundary_rejection(&self) -> bool {
        match self {
            AppError::RequestInFlight { .. } => true,
            AppError::Api(err) => matches!(
                err,
                finsight_core::FinsightError::Validation { .. }
                    | finsight_core::FinsightError::UnsupportedFileType { .. }
            ),
        }
    }
}
