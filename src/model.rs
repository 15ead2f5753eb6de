use crate::error::GenerationError;
use crate::notify::Notification;
use crate::progress::ProgressSnapshot;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;

/// Title used for document submissions without a usable filename.
pub const FALLBACK_DOCUMENT_TITLE: &str = "PDF Presentation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Topic,
    Document,
}

/// An uploaded document: raw bytes plus the original filename.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

// Keep document bodies out of logs.
impl fmt::Debug for DocumentUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentUpload")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Mode-specific part of a request. Only the active mode is ever constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationInput {
    Topic { topic: String, slide_count: u8 },
    Document {
        document: DocumentUpload,
        slides_per_chapter: u8,
    },
}

/// A validated submission, built fresh from the form for every submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub input: GenerationInput,
    pub template_id: String,
    pub color_scheme_id: String,
    pub custom_instructions: Option<String>,
    pub generate_pdf: bool,
    pub use_images: bool,
}

impl GenerationRequest {
    pub fn mode(&self) -> InputMode {
        match self.input {
            GenerationInput::Topic { .. } => InputMode::Topic,
            GenerationInput::Document { .. } => InputMode::Document,
        }
    }

    /// Title recorded in history: the topic, or the document's filename.
    pub fn title(&self) -> String {
        match &self.input {
            GenerationInput::Topic { topic, .. } => topic.clone(),
            GenerationInput::Document { document, .. } => {
                if document.filename.trim().is_empty() {
                    FALLBACK_DOCUMENT_TITLE.to_string()
                } else {
                    document.filename.clone()
                }
            }
        }
    }
}

/// Success body returned by both generation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub filename: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pdf_filename: Option<String>,
    #[serde(default)]
    pub slides_count: Option<u32>,
    #[serde(default)]
    pub total_slides: Option<u32>,
    #[serde(default)]
    pub chapters_detected: Option<u32>,
}

/// Normalized outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub artifact_filename: String,
    pub slide_count: u32,
    pub chapters_detected: Option<u32>,
    pub pdf_filename: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl GenerationResult {
    pub fn from_response(response: GenerationResponse, created_at: OffsetDateTime) -> Self {
        Self {
            slide_count: response
                .slides_count
                .or(response.total_slides)
                .unwrap_or(0),
            artifact_filename: response.filename,
            chapters_detected: response.chapters_detected,
            pdf_filename: response.pdf_filename,
            created_at,
        }
    }
}

/// One row of the persisted history ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "filename")]
    pub artifact_filename: String,
    pub title: String,
    #[serde(rename = "slides")]
    pub slide_count: u32,
    #[serde(rename = "template")]
    pub template_id: String,
    #[serde(rename = "timestamp", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl HistoryEntry {
    pub fn from_result(
        id: String,
        result: &GenerationResult,
        title: String,
        template_id: String,
    ) -> Self {
        Self {
            id,
            artifact_filename: result.artifact_filename.clone(),
            title,
            slide_count: result.slide_count,
            template_id,
            created_at: result.created_at,
        }
    }
}

/// Lifecycle of the generation controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Submitting {
        seq: u64,
    },
    Success(GenerationResult),
    Failed(GenerationError),
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Success(_) | LifecycleState::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Submitting { .. } => "submitting",
            LifecycleState::Success(_) => "success",
            LifecycleState::Failed(_) => "failed",
        }
    }
}

/// Events emitted by the controller loop for presentation layers.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    State(LifecycleState),
    Progress(ProgressSnapshot),
    History(Vec<HistoryEntry>),
    Notification(Option<Notification>),
    Info(String),
}

/// Machine-readable summary of one generate run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub state: &'static str,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    pub title: String,
    pub template: String,
    pub color_scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub downloaded: Vec<std::path::PathBuf>,
}
