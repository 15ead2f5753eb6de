//! Remote generation service.

mod http;

pub use http::{HttpGenerationService, ServiceConfig, DEFAULT_BASE_URL};

use crate::error::RemoteError;
use crate::model::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submit one generation request. Exactly one remote call per invocation.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, RemoteError>;

    /// Fetch a generated artifact by the filename the service returned.
    async fn download(&self, filename: &str) -> Result<Bytes, RemoteError>;
}
