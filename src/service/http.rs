use super::GenerationService;
use crate::error::RemoteError;
use crate::model::{GenerationInput, GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300),
            user_agent: format!("eduslide/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub struct HttpGenerationService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGenerationService {
    pub fn new(cfg: &ServiceConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn download_url(&self, filename: &str) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.endpoint("download"))
            .map_err(|e| RemoteError::Transport(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Transport("base URL cannot have a path".into()))?
            .push(filename);
        Ok(url)
    }
}

/// Multipart body and endpoint for a request. Only the active mode's fields are added.
fn build_form(request: GenerationRequest) -> Result<(&'static str, Form), RemoteError> {
    let (endpoint, mut form) = match request.input {
        GenerationInput::Topic { topic, slide_count } => (
            "generate-from-topic",
            Form::new()
                .text("topic", topic)
                .text("num_slides", slide_count.to_string()),
        ),
        GenerationInput::Document {
            document,
            slides_per_chapter,
        } => {
            let part = Part::bytes(document.bytes.to_vec())
                .file_name(document.filename)
                .mime_str("application/pdf")?;
            (
                "generate-from-pdf",
                Form::new()
                    .part("file", part)
                    .text("slides_per_chapter", slides_per_chapter.to_string()),
            )
        }
    };

    form = form
        .text("template", request.template_id)
        .text("color_scheme", request.color_scheme_id)
        .text("use_images", request.use_images.to_string())
        .text("generate_pdf", request.generate_pdf.to_string());
    if let Some(prompt) = request.custom_instructions {
        form = form.text("custom_prompt", prompt);
    }
    Ok((endpoint, form))
}

/// Pull a string `detail` out of an error body, if there is one.
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

async fn check_status(resp: Response) -> Result<Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::Service {
        status: status.as_u16(),
        detail: extract_detail(&body),
    })
}

#[async_trait]
impl GenerationService for HttpGenerationService {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, RemoteError> {
        let (endpoint, form) = build_form(request)?;
        let url = self.endpoint(endpoint);
        debug!(%url, "submitting generation request");

        let resp = self.http.post(url).multipart(form).send().await?;
        let resp = check_status(resp).await?;
        resp.json::<GenerationResponse>()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }

    async fn download(&self, filename: &str) -> Result<Bytes, RemoteError> {
        let url = self.download_url(filename)?;
        debug!(%url, "downloading artifact");

        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.bytes().await?)
    }
}
