//! Type definitions for the FinSight domain model
//!
//! This module defines the types exchanged between the API client, the
//! session controllers, and the presentation layer.

use crate::error::{ErrorContext, FinsightError, FinsightResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Role of a conversation participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Response mode for chat requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Plain LLM completion
    Standard,
    /// Document search over the retrieval index
    Search,
    /// Multi-step planned analysis with richer metadata
    Agentic,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Standard => "standard",
            ChatMode::Search => "search",
            ChatMode::Agentic => "agentic",
        }
    }
}

impl std::fmt::Display for ChatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChatMode {
    type Err = FinsightError;

    fn from_str(s: &str) -> FinsightResult<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(ChatMode::Standard),
            "search" => Ok(ChatMode::Search),
            "agentic" => Ok(ChatMode::Agentic),
            other => Err(FinsightError::Validation {
                message: format!("Unknown chat mode: {}", other),
                field: Some("mode".to_string()),
                context: ErrorContext::new("types")
                    .with_suggestion("Supported modes: standard, search, agentic"),
            }),
        }
    }
}

/// One step of an agentic analysis, as reported by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Human-readable description of the step
    pub description: String,
    /// Tool the agent invoked for this step
    pub tool: String,
    /// Truncated textual result of the step
    pub result: String,
    /// Whether the step completed successfully
    pub success: bool,
}

/// Structured metadata attached to an assistant message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Mode the response was produced in
    pub mode: Option<ChatMode>,
    /// Confidence score in [0, 1], present only for agentic responses
    pub confidence: Option<f64>,
    /// Ordered plan steps for agentic responses
    #[serde(default)]
    pub plan: Vec<String>,
    /// Intermediate step results keyed by step label
    #[serde(default)]
    pub intermediate_results: BTreeMap<String, StepOutcome>,
    /// Citation identifiers for retrieved sources
    #[serde(default)]
    pub sources: Vec<String>,
    /// Whether this message reports a failure
    #[serde(default)]
    pub error: bool,
}

impl MessageMetadata {
    /// Metadata for a locally synthesized error notice
    pub fn error_notice(mode: ChatMode) -> Self {
        Self {
            mode: Some(mode),
            error: true,
            ..Default::default()
        }
    }
}

/// One turn in a conversation
///
/// Messages are created once and never mutated; the session history is
/// append-only except for an explicit reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    pub id: String,
    /// Sender role
    pub role: Role,
    /// Message content
    pub content: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
    /// Optional structured metadata
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content, None)
    }

    pub fn assistant<S: Into<String>>(content: S, metadata: Option<MessageMetadata>) -> Self {
        Self::new(Role::Assistant, content, metadata)
    }

    fn new<S: Into<String>>(role: Role, content: S, metadata: Option<MessageMetadata>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata,
        }
    }

    /// Whether this message reports a failure
    pub fn is_error(&self) -> bool {
        self.metadata.as_ref().map(|m| m.error).unwrap_or(false)
    }
}

/// Overall health of the backend API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Healthy,
    Degraded,
    Error,
}

/// Capabilities advertised by the backend at session start
///
/// Feature availability is strictly gated by these flags; the client never
/// assumes a capability the backend did not advertise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Plain LLM chat completions
    pub llm_chat: bool,
    /// Document retrieval index (search mode, knowledge-base operations)
    pub retrieval_pipeline: bool,
    /// Multi-step agentic analysis
    pub agentic_reasoning: bool,
}

impl Capabilities {
    /// Whether the given chat mode can be used against this backend
    pub fn supports_mode(&self, mode: ChatMode) -> bool {
        match mode {
            ChatMode::Standard => true,
            ChatMode::Search => self.retrieval_pipeline,
            ChatMode::Agentic => self.agentic_reasoning,
        }
    }
}

/// Backend status fetched once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub api_status: ApiStatus,
    pub capabilities: Capabilities,
}

/// File types accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Excel,
    Pdf,
}

impl FileKind {
    /// Infer the file kind from a file name, case-insensitively.
    ///
    /// Fails with `UnsupportedFileType` before any network activity for
    /// extensions outside {csv, xls, xlsx, pdf}.
    pub fn from_file_name(name: &str) -> FinsightResult<Self> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(FileKind::Csv),
            "xls" | "xlsx" => Ok(FileKind::Excel),
            "pdf" => Ok(FileKind::Pdf),
            _ => Err(FinsightError::UnsupportedFileType {
                extension,
                context: ErrorContext::new("upload")
                    .with_operation("infer_file_kind")
                    .with_suggestion("Supported file types: csv, xls, xlsx, pdf"),
            }),
        }
    }

    /// Upload endpoint path for this file kind
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            FileKind::Csv => "/upload/csv",
            FileKind::Excel => "/upload/excel",
            FileKind::Pdf => "/upload/pdf",
        }
    }
}

/// Preview of tabular data (CSV and Excel uploads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePreview {
    pub row_count: u64,
    pub column_count: u64,
    /// Column name to declared type
    pub column_types: HashMap<String, String>,
    /// Leading rows, in file order
    pub sample_rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Preview of a text document (PDF uploads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPreview {
    pub char_count: u64,
    pub word_count: u64,
    pub excerpt: String,
}

/// Preview payload returned by the upload endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataPreview {
    Tabular(TablePreview),
    Document(DocumentPreview),
}

/// An opaque chart specification blob
///
/// Charts are JSON documents produced by the backend's plotting layer. The
/// client treats them as renderable blobs and only inspects the title for
/// display purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec(pub serde_json::Value);

impl ChartSpec {
    /// Chart title, if the spec carries one
    pub fn title(&self) -> Option<&str> {
        let title = self.0.get("layout")?.get("title")?;
        // Plotly emits either a bare string or {"text": ...}
        title
            .as_str()
            .or_else(|| title.get("text").and_then(|t| t.as_str()))
    }
}

/// Result of a file upload, decoded but not yet normalized for display
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Server-side processing summary
    pub message: String,
    /// Typed preview union
    pub preview: DataPreview,
    /// Raw chart blobs; each is parsed independently downstream
    pub charts: Vec<serde_json::Value>,
}

/// Normalized, display-ready upload result
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub file_name: String,
    pub kind: FileKind,
    pub message: String,
    pub preview: DataPreview,
    /// Charts that parsed successfully; malformed blobs are dropped
    pub charts: Vec<ChartSpec>,
}

/// One retrieval hit from a document search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Matched chunk content
    pub content: String,
    /// Relevance score, clamped to [0, 1]
    pub relevance: f64,
    /// Source metadata (file name, chunk index, ...)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SearchHit {
    /// Source file name, if the index recorded one
    pub fn source_name(&self) -> Option<&str> {
        self.metadata.get("filename").and_then(|v| v.as_str())
    }
}

/// Retrieval index statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: u64,
    pub chunk_count: u64,
}

/// Quote for a single symbol in the market overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub company_name: Option<String>,
    pub market_cap: Option<u64>,
}

/// Windowed price history for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSeries {
    pub columns: Vec<String>,
    /// Trailing window of rows, as served by the backend
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
    pub latest_price: f64,
    pub price_change: f64,
}

/// Full response to a quote fetch
#[derive(Debug, Clone)]
pub struct StockReport {
    pub symbol: String,
    /// Opaque issuer/fundamentals blob from the data provider
    pub info: serde_json::Value,
    pub series: StockSeries,
    /// Raw chart blobs
    pub charts: Vec<serde_json::Value>,
}
