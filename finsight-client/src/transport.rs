//! HTTP transport with per-class timeout budgets
//!
//! Requests are issued through one of two preconfigured clients: an
//! interactive client for operations expected to finish within seconds, and
//! a heavy client for uploads and agentic analysis. Failures surface
//! uniformly as Timeout, Network, Server, or Protocol errors; callers can
//! always tell a timeout apart from other failures. This layer never
//! retries; a failed request is terminal and must be reissued explicitly.

use finsight_core::{ApiConfig, ErrorContext, FinsightError, FinsightResult};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Expected latency class of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyClass {
    /// A few seconds of server work: health, quotes, search, standard chat
    Interactive,
    /// Up to ~2 minutes: file uploads, agentic chat
    Heavy,
}

/// HTTP transport for the backend API
pub struct Transport {
    base_url: Url,
    interactive: reqwest::Client,
    heavy: reqwest::Client,
    interactive_timeout: Duration,
    heavy_timeout: Duration,
}

impl Transport {
    /// Create a transport from connection settings
    pub fn new(config: &ApiConfig) -> FinsightResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| FinsightError::Config {
            message: format!("Invalid base URL '{}': {}", config.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("transport").with_operation("new"),
        })?;

        let interactive_timeout = Duration::from_secs(config.interactive_timeout_secs);
        let heavy_timeout = Duration::from_secs(config.heavy_timeout_secs);

        Ok(Self {
            base_url,
            interactive: build_client(interactive_timeout, &config.user_agent)?,
            heavy: build_client(heavy_timeout, &config.user_agent)?,
            interactive_timeout,
            heavy_timeout,
        })
    }

    /// Timeout budget for the given latency class
    pub fn timeout_for(&self, class: LatencyClass) -> Duration {
        match class {
            LatencyClass::Interactive => self.interactive_timeout,
            LatencyClass::Heavy => self.heavy_timeout,
        }
    }

    fn client(&self, class: LatencyClass) -> &reqwest::Client {
        match class {
            LatencyClass::Interactive => &self.interactive,
            LatencyClass::Heavy => &self.heavy,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET a JSON payload
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        class: LatencyClass,
        path: &str,
    ) -> FinsightResult<T> {
        let request = self.client(class).get(self.endpoint(path));
        self.dispatch(class, path, request).await
    }

    /// POST a JSON body and decode a JSON payload
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        class: LatencyClass,
        path: &str,
        body: &B,
    ) -> FinsightResult<T> {
        let request = self.client(class).post(self.endpoint(path)).json(body);
        self.dispatch(class, path, request).await
    }

    /// POST with URL query parameters and no body
    pub async fn post_query<T: DeserializeOwned>(
        &self,
        class: LatencyClass,
        path: &str,
        query: &[(&str, String)],
    ) -> FinsightResult<T> {
        let request = self.client(class).post(self.endpoint(path)).query(query);
        self.dispatch(class, path, request).await
    }

    /// POST a file as a multipart form
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        class: LatencyClass,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> FinsightResult<T> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);
        let request = self.client(class).post(self.endpoint(path)).multipart(form);
        self.dispatch(class, path, request).await
    }

    /// DELETE and decode a JSON payload
    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        class: LatencyClass,
        path: &str,
    ) -> FinsightResult<T> {
        let request = self.client(class).delete(self.endpoint(path));
        self.dispatch(class, path, request).await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        class: LatencyClass,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> FinsightResult<T> {
        debug!("Dispatching {} ({:?} class)", operation, class);

        let response = request
            .send()
            .await
            .map_err(|e| self.classify_send_error(e, class, operation))?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(response, operation).await);
        }

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error(class, operation)
            } else {
                FinsightError::Protocol {
                    message: format!("Malformed response body for {}: {}", operation, e),
                    source: Some(Box::new(e)),
                    context: ErrorContext::new("transport")
                        .with_operation(operation)
                        .with_suggestion("Check that the backend version matches the client"),
                }
            }
        })
    }

    fn classify_send_error(
        &self,
        error: reqwest::Error,
        class: LatencyClass,
        operation: &str,
    ) -> FinsightError {
        if error.is_timeout() {
            self.timeout_error(class, operation)
        } else {
            FinsightError::Network {
                message: format!("Request to {} failed: {}", operation, error),
                source: Some(Box::new(error)),
                context: ErrorContext::new("transport")
                    .with_operation(operation)
                    .with_suggestion("Check that the backend server is running")
                    .with_suggestion("Check network connectivity"),
            }
        }
    }

    fn timeout_error(&self, class: LatencyClass, operation: &str) -> FinsightError {
        let budget = self.timeout_for(class);
        FinsightError::Timeout {
            operation: operation.to_string(),
            duration_ms: budget.as_millis() as u64,
            context: ErrorContext::new("transport")
                .with_operation(operation)
                .with_suggestion("Reissue the request")
                .with_suggestion("Check backend load"),
        }
    }
}

fn build_client(timeout: Duration, user_agent: &str) -> FinsightResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.to_string())
        .build()
        .map_err(|e| FinsightError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("transport").with_operation("build_client"),
        })
}

/// Drain a non-success response into a Server error
async fn error_from_response(response: reqwest::Response, operation: &str) -> FinsightError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body
    };

    FinsightError::Server {
        status: status.as_u16(),
        body,
        context: ErrorContext::new("transport")
            .with_operation(operation)
            .with_suggestion(match status.as_u16() {
                400 => "Check the request payload",
                404 => "Check that the endpoint exists on this backend version",
                _ => "Check backend logs for details",
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_duplicate_slashes() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..Default::default()
        };
        let transport = Transport::new(&config).unwrap();
        assert_eq!(
            transport.endpoint("/rag/search"),
            "http://localhost:8000/rag/search"
        );
        assert_eq!(transport.endpoint("health"), "http://localhost:8000/health");
    }

    #[test]
    fn timeout_budgets_follow_latency_class() {
        let config = ApiConfig::default();
        let transport = Transport::new(&config).unwrap();
        assert_eq!(
            transport.timeout_for(LatencyClass::Interactive),
            Duration::from_secs(30)
        );
        assert_eq!(
            transport.timeout_for(LatencyClass::Heavy),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = ApiConfig {
            base_url: "localhost-without-scheme".to_string(),
            ..Default::default()
        };
        assert!(Transport::new(&config).is_err());
    }
}
