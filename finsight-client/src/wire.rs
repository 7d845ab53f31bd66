//! Wire-format DTOs for the backend HTTP contract
//!
//! These structs mirror the backend's JSON payloads exactly; the conversion
//! functions validate shape at the boundary and translate into the domain
//! model, failing with Protocol or Backend errors instead of propagating
//! loosely-typed values further in.

use finsight_core::{
    ApiStatus, Capabilities, ChatMode, DataPreview, DocumentPreview, ErrorContext, FinsightError,
    FinsightResult, IndexStats, Message, MessageMetadata, Quote, SearchHit, StepOutcome,
    StockReport, StockSeries, SystemStatus, TablePreview, UploadReport,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub api_status: String,
    #[serde(default)]
    pub groq_client: bool,
    #[serde(default)]
    pub rag_pipeline: bool,
    #[serde(default)]
    pub agentic_rag: bool,
}

pub(crate) fn system_status(body: HealthResponse) -> FinsightResult<SystemStatus> {
    let api_status = match body.api_status.as_str() {
        "healthy" => ApiStatus::Healthy,
        "degraded" => ApiStatus::Degraded,
        "error" => ApiStatus::Error,
        other => {
            return Err(FinsightError::Protocol {
                message: format!("Unknown api_status value: {}", other),
                source: None,
                context: ErrorContext::new("wire").with_operation("health"),
            })
        }
    };

    Ok(SystemStatus {
        api_status,
        capabilities: Capabilities {
            llm_chat: body.groq_client,
            retrieval_pipeline: body.rag_pipeline,
            agentic_reasoning: body.agentic_rag,
        },
    })
}

// ---------------------------------------------------------------------------
// /chat
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_data: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub metadata: Option<ChatResponseMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatResponseMetadata {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub sources: Vec<Value>,
    #[serde(default)]
    pub intermediate_results: BTreeMap<String, WireStepOutcome>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireStepOutcome {
    #[serde(default)]
    pub step_description: String,
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub success: bool,
}

/// Convert a chat response body into an assistant message.
///
/// A well-formed `success:false` body is still a renderable message; the
/// failure is carried in the metadata error flag, matching how the backend
/// reports mode-level failures in-band.
pub(crate) fn assistant_message(body: ChatResponse, requested_mode: ChatMode) -> Message {
    let wire_metadata = body.metadata.unwrap_or_default();

    let mode = wire_metadata
        .mode
        .as_deref()
        .and_then(|m| m.parse().ok())
        .or(Some(requested_mode));

    let sources = wire_metadata
        .sources
        .into_iter()
        .map(|source| match source {
            Value::String(name) => name,
            other => other.to_string(),
        })
        .collect();

    let intermediate_results = wire_metadata
        .intermediate_results
        .into_iter()
        .map(|(key, step)| {
            (
                key,
                StepOutcome {
                    description: step.step_description,
                    tool: step.tool,
                    result: step.result,
                    success: step.success,
                },
            )
        })
        .collect();

    let metadata = MessageMetadata {
        mode,
        confidence: wire_metadata.confidence.map(|c| c.clamp(0.0, 1.0)),
        plan: wire_metadata.plan,
        intermediate_results,
        sources,
        error: !body.success,
    };

    Message::assistant(body.message, Some(metadata))
}

// ---------------------------------------------------------------------------
// /upload/*
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data_preview: Option<WirePreview>,
    #[serde(default)]
    pub charts: Option<Vec<Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The preview union: tabular for CSV/Excel, document for PDF
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum WirePreview {
    Tabular {
        shape: (u64, u64),
        columns: Vec<String>,
        #[serde(default)]
        head: Vec<serde_json::Map<String, Value>>,
        #[serde(default)]
        dtypes: HashMap<String, String>,
    },
    Document {
        text_length: u64,
        word_count: u64,
        preview: String,
    },
}

impl From<WirePreview> for DataPreview {
    fn from(preview: WirePreview) -> Self {
        match preview {
            WirePreview::Tabular {
                shape, head, dtypes, ..
            } => DataPreview::Tabular(TablePreview {
                row_count: shape.0,
                column_count: shape.1,
                column_types: dtypes,
                sample_rows: head,
            }),
            WirePreview::Document {
                text_length,
                word_count,
                preview,
            } => DataPreview::Document(DocumentPreview {
                char_count: text_length,
                word_count,
                excerpt: preview,
            }),
        }
    }
}

pub(crate) fn upload_report(body: UploadResponse) -> FinsightResult<UploadReport> {
    if !body.success {
        return Err(FinsightError::Backend {
            message: body
                .error
                .or(body.message)
                .unwrap_or_else(|| "Upload rejected by backend".to_string()),
            context: ErrorContext::new("wire").with_operation("upload"),
        });
    }

    let preview = body
        .data_preview
        .ok_or_else(|| FinsightError::Protocol {
            message: "Upload response is missing data_preview".to_string(),
            source: None,
            context: ErrorContext::new("wire").with_operation("upload"),
        })?
        .into();

    Ok(UploadReport {
        message: body.message.unwrap_or_default(),
        preview,
        charts: body.charts.unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// /rag/search, /rag/clear, /rag/stats
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Vec<WireSearchHit>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSearchHit {
    pub content: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

/// Order-preserving conversion, truncated to the requested limit
pub(crate) fn search_hits(body: SearchResponse, limit: usize) -> FinsightResult<Vec<SearchHit>> {
    if !body.success {
        return Err(FinsightError::Backend {
            message: body
                .error
                .unwrap_or_else(|| "Document search failed".to_string()),
            context: ErrorContext::new("wire").with_operation("search_documents"),
        });
    }

    Ok(body
        .results
        .into_iter()
        .take(limit)
        .map(|hit| SearchHit {
            content: hit.content,
            relevance: hit.relevance_score.clamp(0.0, 1.0),
            metadata: hit.metadata,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClearResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    #[serde(default)]
    pub document_count: u64,
    #[serde(default)]
    pub chunk_count: u64,
    #[serde(default)]
    pub error: Option<String>,
}

pub(crate) fn index_stats(body: StatsResponse) -> FinsightResult<IndexStats> {
    if let Some(error) = body.error {
        return Err(FinsightError::Backend {
            message: error,
            context: ErrorContext::new("wire").with_operation("index_stats"),
        });
    }

    Ok(IndexStats {
        document_count: body.document_count,
        chunk_count: body.chunk_count,
    })
}

// ---------------------------------------------------------------------------
// /analysis/market-overview, /stock/fetch
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct MarketOverviewResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub market_data: HashMap<String, WireQuote>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireQuote {
    pub price: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub market_cap: Option<u64>,
}

pub(crate) fn market_quotes(
    body: MarketOverviewResponse,
) -> FinsightResult<HashMap<String, Quote>> {
    if !body.success {
        return Err(FinsightError::Backend {
            message: body
                .error
                .unwrap_or_else(|| "Market overview unavailable".to_string()),
            context: ErrorContext::new("wire").with_operation("market_overview"),
        });
    }

    Ok(body
        .market_data
        .into_iter()
        .map(|(symbol, quote)| {
            (
                symbol,
                Quote {
                    price: quote.price,
                    change: quote.change,
                    change_percent: quote.change_percent,
                    company_name: quote.company_name,
                    market_cap: quote.market_cap.filter(|cap| *cap > 0),
                },
            )
        })
        .collect())
}

#[derive(Debug, Serialize)]
pub(crate) struct StockRequest<'a> {
    pub symbol: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StockFetchResponse {
    #[serde(default)]
    pub success: bool,
    pub symbol: String,
    #[serde(default)]
    pub stock_info: Value,
    pub stock_data: WireStockSeries,
    #[serde(default)]
    pub charts: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireStockSeries {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<serde_json::Map<String, Value>>,
    pub latest_price: f64,
    #[serde(default)]
    pub price_change: f64,
}

pub(crate) fn stock_report(body: StockFetchResponse) -> FinsightResult<StockReport> {
    if !body.success {
        return Err(FinsightError::Backend {
            message: format!("Quote fetch failed for {}", body.symbol),
            context: ErrorContext::new("wire").with_operation("fetch_quote"),
        });
    }

    Ok(StockReport {
        symbol: body.symbol,
        info: body.stock_info,
        series: StockSeries {
            columns: body.stock_data.columns,
            rows: body.stock_data.data,
            latest_price: body.stock_data.latest_price,
            price_change: body.stock_data.price_change,
        },
        charts: body.charts.unwrap_or_default(),
    })
}
