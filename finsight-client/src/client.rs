//! Typed domain client for the equity-research backend
//!
//! One operation per backend capability. Each operation owns its endpoint
//! path, payload shape, and latency class; boundary validation
//! (unsupported file types, blank inputs) happens here before any network
//! round trip.

use crate::transport::{LatencyClass, Transport};
use crate::wire;
use async_trait::async_trait;
use finsight_core::{
    validation_error, ApiConfig, ChatMode, FileKind, FinsightResult, IndexStats, Message, Quote,
    SearchHit, StockReport, SystemStatus, UploadReport,
};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Operations exposed by the equity-research backend
///
/// Controllers and tests program against this trait so the concrete HTTP
/// client can be substituted.
#[async_trait]
pub trait ResearchBackend: Send + Sync {
    /// Fetch backend health and advertised capabilities
    async fn health(&self) -> FinsightResult<SystemStatus>;

    /// Send one chat turn; heavy latency class iff mode is agentic
    async fn chat(
        &self,
        message: &str,
        mode: ChatMode,
        context_data: Option<&Value>,
    ) -> FinsightResult<Message>;

    /// Upload a document; the extension selects the endpoint
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> FinsightResult<UploadReport>;

    /// Search the retrieval index; result length is at most `limit`
    async fn search_documents(&self, query: &str, limit: usize) -> FinsightResult<Vec<SearchHit>>;

    /// Drop all indexed documents
    async fn clear_index(&self) -> FinsightResult<bool>;

    /// Retrieval index statistics
    async fn index_stats(&self) -> FinsightResult<IndexStats>;

    /// Quotes for the backend's market overview watchlist
    async fn market_overview(&self) -> FinsightResult<HashMap<String, Quote>>;

    /// Quote, trailing price window, and charts for one symbol
    async fn fetch_quote(&self, symbol: &str) -> FinsightResult<StockReport>;
}

/// HTTP implementation of [`ResearchBackend`]
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    /// Create a client from connection settings
    pub fn new(config: &ApiConfig) -> FinsightResult<Self> {
        let transport = Transport::new(config)?;
        info!("Created API client for {}", config.base_url);
        Ok(Self { transport })
    }
}

#[async_trait]
impl ResearchBackend for ApiClient {
    async fn health(&self) -> FinsightResult<SystemStatus> {
        let body: wire::HealthResponse = self
            .transport
            .get_json(LatencyClass::Interactive, "/health")
            .await?;
        wire::system_status(body)
    }

    async fn chat(
        &self,
        message: &str,
        mode: ChatMode,
        context_data: Option<&Value>,
    ) -> FinsightResult<Message> {
        if message.trim().is_empty() {
            return Err(validation_error!(
                "Chat message must not be blank",
                "message",
                "api_client"
            ));
        }

        let class = if mode == ChatMode::Agentic {
            LatencyClass::Heavy
        } else {
            LatencyClass::Interactive
        };

        let request = wire::ChatRequest {
            message,
            mode: mode.as_str(),
            context_data,
        };

        let started = Instant::now();
        let body: wire::ChatResponse =
            self.transport.post_json(class, "/chat", &request).await?;
        debug!(
            "Chat turn in {} mode completed in {:?}",
            mode,
            started.elapsed()
        );

        Ok(wire::assistant_message(body, mode))
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> FinsightResult<UploadReport> {
        // Fails fast for unsupported extensions; no round trip happens.
        let kind = FileKind::from_file_name(file_name)?;

        info!(
            "Uploading {} ({} bytes) to {}",
            file_name,
            bytes.len(),
            kind.endpoint_path()
        );

        let body: wire::UploadResponse = self
            .transport
            .post_multipart(
                LatencyClass::Heavy,
                kind.endpoint_path(),
                "file",
                file_name,
                bytes,
            )
            .await?;

        wire::upload_report(body)
    }

    async fn search_documents(&self, query: &str, limit: usize) -> FinsightResult<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(validation_error!(
                "Search query must not be blank",
                "query",
                "api_client"
            ));
        }
        if limit == 0 {
            return Err(validation_error!(
                "Result limit must be positive",
                "limit",
                "api_client"
            ));
        }

        // The backend binds these from the query string, not the body.
        let query_pairs = [
            ("query", query.to_string()),
            ("n_results", limit.to_string()),
        ];

        let body: wire::SearchResponse = self
            .transport
            .post_query(LatencyClass::Interactive, "/rag/search", &query_pairs)
            .await?;

        wire::search_hits(body, limit)
    }

    async fn clear_index(&self) -> FinsightResult<bool> {
        let body: wire::ClearResponse = self
            .transport
            .delete_json(LatencyClass::Interactive, "/rag/clear")
            .await?;
        Ok(body.success)
    }

    async fn index_stats(&self) -> FinsightResult<IndexStats> {
        let body: wire::StatsResponse = self
            .transport
            .get_json(LatencyClass::Interactive, "/rag/stats")
            .await?;
        wire::index_stats(body)
    }

    async fn market_overview(&self) -> FinsightResult<HashMap<String, Quote>> {
        let body: wire::MarketOverviewResponse = self
            .transport
            .get_json(LatencyClass::Interactive, "/analysis/market-overview")
            .await?;
        wire::market_quotes(body)
    }

    async fn fetch_quote(&self, symbol: &str) -> FinsightResult<StockReport> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(validation_error!(
                "Ticker symbol must not be empty",
                "symbol",
                "api_client"
            ));
        }

        let body: wire::StockFetchResponse = self
            .transport
            .post_json(
                LatencyClass::Interactive,
                "/stock/fetch",
                &wire::StockRequest { symbol },
            )
            .await?;

        wire::stock_report(body)
    }
}
