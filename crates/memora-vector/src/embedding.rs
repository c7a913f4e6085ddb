//! Embedding service trait and implementations.
//!
//! - `HttpEmbeddingService` posts `{input, model}` to a remote endpoint and
//!   expects a JSON array of floats back. This is the production backend.
//! - `MockEmbedding` provides deterministic hash-based vectors for offline
//!   runs and tests.
//! - `StaticEmbedding` returns one preset vector and counts its calls.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use memora_core::config::{EmbeddingConfig, EmbeddingProvider};
use memora_core::error::MemoraError;
use serde::Serialize;
use tracing::{debug, info};

/// Longest slice of an error body quoted back in `EmbeddingFailed`.
const ERROR_BODY_EXCERPT: usize = 200;

/// Dimensionality of `MockEmbedding` vectors.
pub const MOCK_DIMENSIONS: usize = 384;

/// One logical embedding request, serialized as the HTTP request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: &'a str,
    pub model: &'a str,
}

/// Service for generating text embeddings.
///
/// Implementations convert text into a vector. They are opaque to the rest
/// of the crate: validation, provenance, and cancellation live in
/// [`crate::Embedder`].
pub trait EmbeddingService: Send + Sync {
    /// Generate an embedding vector for the request.
    fn embed(
        &self,
        request: &EmbeddingRequest<'_>,
    ) -> impl Future<Output = Result<Vec<f32>, MemoraError>> + Send;
}

/// Object-safe version of [`EmbeddingService`] for dynamic dispatch.
///
/// `EmbeddingService::embed` returns `impl Future`, so it cannot be used as
/// a trait object. This trait boxes the future instead. Every
/// `EmbeddingService` gets it through the blanket impl below.
pub trait DynEmbeddingService: Send + Sync {
    /// Generate an embedding vector for the request (boxed future).
    fn embed_boxed<'a>(
        &'a self,
        request: &'a EmbeddingRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, MemoraError>> + Send + 'a>>;
}

impl<T: EmbeddingService> DynEmbeddingService for T {
    fn embed_boxed<'a>(
        &'a self,
        request: &'a EmbeddingRequest<'a>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, MemoraError>> + Send + 'a>> {
        Box::pin(self.embed(request))
    }
}

/// Build the embedding backend selected in configuration.
pub fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn DynEmbeddingService>, MemoraError> {
    match config.provider {
        EmbeddingProvider::Http => Ok(Arc::new(HttpEmbeddingService::from_config(config)?)),
        EmbeddingProvider::Mock => {
            info!("Using mock embedding provider");
            Ok(Arc::new(MockEmbedding::new()))
        }
    }
}

// ---------------------------------------------------------------------------
// HttpEmbeddingService - remote embedding endpoint
// ---------------------------------------------------------------------------

/// Embedding service backed by a remote HTTP endpoint.
///
/// Each call is exactly one `POST` with no retries. Timeouts are enforced
/// by the underlying client.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingService {
    client: reqwest::Client,
    url: String,
}

impl HttpEmbeddingService {
    /// Create a client posting to `base_url` joined with `path`.
    pub fn new(base_url: &str, path: &str, timeout: Duration) -> Result<Self, MemoraError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MemoraError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        info!(url = %url, timeout_secs = timeout.as_secs(), "HTTP embedding service configured");

        Ok(Self { client, url })
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, MemoraError> {
        Self::new(
            &config.base_url,
            &config.path,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Full URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EmbeddingService for HttpEmbeddingService {
    async fn embed(&self, request: &EmbeddingRequest<'_>) -> Result<Vec<f32>, MemoraError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                MemoraError::EmbeddingFailed(format!("Request to {} failed: {}", self.url, e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            MemoraError::EmbeddingFailed(format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            return Err(MemoraError::EmbeddingFailed(format!(
                "Embedding service returned {}: {}",
                status,
                excerpt(&body)
            )));
        }

        let vector = parse_vector(&body)?;
        debug!(dimensions = vector.len(), "Embedding response parsed");
        Ok(vector)
    }
}

/// Parse a response body into a vector.
///
/// A JSON `null` is treated as an empty vector; anything other than an array
/// of finite `f32` values is a protocol violation. Numbers outside the `f32`
/// range would otherwise parse as infinities.
fn parse_vector(body: &str) -> Result<Vec<f32>, MemoraError> {
    let parsed: Option<Vec<f32>> = serde_json::from_str(body).map_err(|e| {
        MemoraError::EmbeddingFailed(format!(
            "Unexpected response body ({}): {}",
            e,
            excerpt(body)
        ))
    })?;
    let vector = parsed.unwrap_or_default();
    if let Some(index) = vector.iter().position(|v| !v.is_finite()) {
        return Err(MemoraError::EmbeddingFailed(format!(
            "Non-finite value at index {}: {}",
            index,
            excerpt(body)
        )));
    }
    Ok(vector)
}

fn excerpt(body: &str) -> String {
    body.chars().take(ERROR_BODY_EXCERPT).collect()
}

// ---------------------------------------------------------------------------
// MockEmbedding - deterministic hash-based vectors
// ---------------------------------------------------------------------------

/// Mock embedding service that returns deterministic 384-dimensional vectors.
///
/// The output is derived from a hash of the input text and model, so
/// identical requests always produce identical outputs.
#[derive(Debug, Clone, Default)]
pub struct MockEmbedding;

impl MockEmbedding {
    pub fn new() -> Self {
        Self
    }

    fn hash_to_vector(text: &str, model: &str) -> Vec<f32> {
        let mut result = Vec::with_capacity(MOCK_DIMENSIONS);
        for i in 0..MOCK_DIMENSIONS {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            model.hash(&mut hasher);
            i.hash(&mut hasher);
            let h = hasher.finish();
            let val = ((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0;
            result.push(val as f32);
        }

        let norm: f32 = result.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut result {
                *val /= norm;
            }
        }

        result
    }
}

impl EmbeddingService for MockEmbedding {
    async fn embed(&self, request: &EmbeddingRequest<'_>) -> Result<Vec<f32>, MemoraError> {
        if request.input.is_empty() {
            return Err(MemoraError::invalid_input("Cannot embed empty text"));
        }
        Ok(Self::hash_to_vector(request.input, request.model))
    }
}

// ---------------------------------------------------------------------------
// StaticEmbedding - fixed vector with a call counter
// ---------------------------------------------------------------------------

/// Embedding service that answers every request with the same vector.
///
/// Clones share the call counter, so a test can hand one clone to an
/// `Embedder` and inspect `calls()` on the other.
#[derive(Debug, Clone)]
pub struct StaticEmbedding {
    vector: Vec<f32>,
    calls: Arc<AtomicUsize>,
}

impl StaticEmbedding {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `embed` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingService for StaticEmbedding {
    async fn embed(&self, _request: &EmbeddingRequest<'_>) -> Result<Vec<f32>, MemoraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn request<'a>(input: &'a str) -> EmbeddingRequest<'a> {
        EmbeddingRequest {
            input,
            model: "text-embedding-3-large",
        }
    }

    #[test]
    fn test_request_serializes_input_and_model() {
        let json = serde_json::to_value(request("hello")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"input": "hello", "model": "text-embedding-3-large"})
        );
    }

    #[test]
    fn test_parse_vector_array() {
        assert_eq!(parse_vector("[0.5, -1, 2.25]").unwrap(), vec![0.5, -1.0, 2.25]);
    }

    #[test]
    fn test_parse_vector_null_is_empty() {
        assert!(parse_vector("null").unwrap().is_empty());
    }

    #[test]
    fn test_parse_vector_rejects_other_shapes() {
        for body in [r#"{"embedding": [1.0]}"#, r#"["a", "b"]"#, "", "42"] {
            let err = parse_vector(body).unwrap_err();
            assert!(
                matches!(err, MemoraError::EmbeddingFailed(_)),
                "body {:?} should be rejected",
                body
            );
        }
    }

    #[test]
    fn test_parse_vector_rejects_out_of_range_values() {
        for body in ["[1e39, 0.0]", "[0.0, -1e39]"] {
            let err = parse_vector(body).unwrap_err();
            match err {
                MemoraError::EmbeddingFailed(msg) => assert!(msg.contains("Non-finite"), "{}", msg),
                other => panic!("Expected EmbeddingFailed, got {:?}", other),
            }
        }
        assert_eq!(parse_vector("[3.0e38]").unwrap(), vec![3.0e38]);
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(500);
        assert_eq!(excerpt(&body).chars().count(), ERROR_BODY_EXCERPT);
    }

    #[test]
    fn test_http_url_joining() {
        let svc =
            HttpEmbeddingService::new("http://localhost:8080/", "/embeddings", Duration::from_secs(1))
                .unwrap();
        assert_eq!(svc.url(), "http://localhost:8080/embeddings");

        let svc =
            HttpEmbeddingService::new("http://localhost:8080", "embeddings", Duration::from_secs(1))
                .unwrap();
        assert_eq!(svc.url(), "http://localhost:8080/embeddings");
    }

    #[tokio::test]
    async fn test_http_embed_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_body(Matcher::Json(serde_json::json!({
                "input": "hello world",
                "model": "text-embedding-3-large"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[0.1, 0.2, 0.3]")
            .expect(1)
            .create_async()
            .await;

        let svc = HttpEmbeddingService::new(&server.url(), "/embeddings", Duration::from_secs(5))
            .unwrap();
        let vector = svc.embed(&request("hello world")).await.unwrap();

        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_embed_null_body_is_empty_vector() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let svc = HttpEmbeddingService::new(&server.url(), "/embeddings", Duration::from_secs(5))
            .unwrap();
        let vector = svc.embed(&request("anything")).await.unwrap();
        assert!(vector.is_empty());
    }

    #[tokio::test]
    async fn test_http_embed_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(503)
            .with_body("model overloaded")
            .create_async()
            .await;

        let svc = HttpEmbeddingService::new(&server.url(), "/embeddings", Duration::from_secs(5))
            .unwrap();
        let err = svc.embed(&request("hello")).await.unwrap_err();

        match err {
            MemoraError::EmbeddingFailed(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("model overloaded"));
            }
            other => panic!("Expected EmbeddingFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_embed_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": [{"embedding": [0.1]}]}"#)
            .create_async()
            .await;

        let svc = HttpEmbeddingService::new(&server.url(), "/embeddings", Duration::from_secs(5))
            .unwrap();
        let err = svc.embed(&request("hello")).await.unwrap_err();
        assert!(matches!(err, MemoraError::EmbeddingFailed(_)));
    }

    #[tokio::test]
    async fn test_http_embed_connection_refused() {
        // Nothing listens on port 9 on a test host.
        let svc = HttpEmbeddingService::new("http://127.0.0.1:9", "/embeddings", Duration::from_secs(2))
            .unwrap();
        let err = svc.embed(&request("hello")).await.unwrap_err();
        assert!(matches!(err, MemoraError::EmbeddingFailed(_)));
    }

    #[tokio::test]
    async fn test_mock_embedding_dimension() {
        let vec = MockEmbedding::new().embed(&request("hello world")).await.unwrap();
        assert_eq!(vec.len(), MOCK_DIMENSIONS);
    }

    #[tokio::test]
    async fn test_mock_embedding_deterministic() {
        let service = MockEmbedding::new();
        let v1 = service.embed(&request("same text")).await.unwrap();
        let v2 = service.embed(&request("same text")).await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_mock_embedding_different_inputs() {
        let service = MockEmbedding::new();
        let v1 = service.embed(&request("text one")).await.unwrap();
        let v2 = service.embed(&request("text two")).await.unwrap();
        assert_ne!(v1, v2);
    }

    #[tokio::test]
    async fn test_mock_embedding_empty_text() {
        let result = MockEmbedding::new().embed(&request("")).await;
        assert!(matches!(result, Err(MemoraError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_static_embedding_counts_calls() {
        let service = StaticEmbedding::new(vec![1.0, 0.0]);
        let shared = service.clone();

        assert_eq!(service.embed(&request("a")).await.unwrap(), vec![1.0, 0.0]);
        assert_eq!(service.embed(&request("b")).await.unwrap(), vec![1.0, 0.0]);
        assert_eq!(shared.calls(), 2);
    }

    #[test]
    fn test_from_config_selects_provider() {
        let mut config = EmbeddingConfig::default();
        assert!(from_config(&config).is_ok());

        config.provider = EmbeddingProvider::Mock;
        assert!(from_config(&config).is_ok());
    }
}
