//! Post-generation processing.
//!
//! Downloads the generated artifacts after a successful run and collects
//! messages for presentation layers.

use crate::model::GenerationResult;
use crate::service::GenerationService;
use crate::storage::write_atomic;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of post-generation processing, ready for presentation layers.
#[derive(Debug, Default)]
pub struct ProcessedGeneration {
    pub downloaded: Vec<PathBuf>,
    pub messages: Vec<String>,
}

/// Local path for a service-provided filename. Only the final path component
/// is used, so a hostile name cannot escape `dir`.
pub fn artifact_path(dir: &Path, filename: &str) -> Result<PathBuf> {
    let name = Path::new(filename)
        .file_name()
        .filter(|n| !n.is_empty())
        .with_context(|| format!("invalid artifact filename: {filename:?}"))?;
    Ok(dir.join(name))
}

/// Fetch `filename` from the service and write it atomically into `dir`.
pub async fn download_artifact(
    service: &dyn GenerationService,
    filename: &str,
    dir: &Path,
) -> Result<PathBuf> {
    let path = artifact_path(dir, filename)?;
    let bytes = service
        .download(filename)
        .await
        .with_context(|| format!("download {filename}"))?;
    write_atomic(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "artifact saved");
    Ok(path)
}

/// Download the deck (and the PDF copy, if one was produced) into `download_dir`.
pub async fn process_generation_success(
    service: &dyn GenerationService,
    result: &GenerationResult,
    download_dir: Option<&Path>,
) -> ProcessedGeneration {
    let mut processed = ProcessedGeneration::default();
    let Some(dir) = download_dir else {
        return processed;
    };

    let files = std::iter::once(result.artifact_filename.as_str())
        .chain(result.pdf_filename.as_deref());
    for filename in files {
        match download_artifact(service, filename, dir).await {
            Ok(path) => {
                processed.messages.push(format!("Downloaded: {}", path.display()));
                processed.downloaded.push(path);
            }
            Err(e) => processed.messages.push(format!("Download failed: {e:#}")),
        }
    }
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::model::{GenerationRequest, GenerationResponse};
    use async_trait::async_trait;
    use bytes::Bytes;
    use time::OffsetDateTime;

    /// Serves every artifact except `missing.pdf`.
    struct Artifacts;

    #[async_trait]
    impl GenerationService for Artifacts {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationResponse, RemoteError> {
            Err(RemoteError::Transport("not used".into()))
        }

        async fn download(&self, filename: &str) -> Result<Bytes, RemoteError> {
            if filename == "missing.pdf" {
                return Err(RemoteError::Service {
                    status: 404,
                    detail: Some("File not found".into()),
                });
            }
            Ok(Bytes::from(format!("contents of {filename}")))
        }
    }

    fn result(pdf: Option<&str>) -> GenerationResult {
        GenerationResult {
            artifact_filename: "deck.pptx".into(),
            slide_count: 5,
            chapters_detected: None,
            pdf_filename: pdf.map(str::to_string),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn nothing_is_downloaded_without_a_directory() {
        let processed = process_generation_success(&Artifacts, &result(None), None).await;
        assert!(processed.downloaded.is_empty());
        assert!(processed.messages.is_empty());
    }

    #[tokio::test]
    async fn deck_and_pdf_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let processed =
            process_generation_success(&Artifacts, &result(Some("deck.pdf")), Some(dir.path()))
                .await;

        assert_eq!(
            processed.downloaded,
            vec![dir.path().join("deck.pptx"), dir.path().join("deck.pdf")]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("deck.pdf")).unwrap(),
            "contents of deck.pdf"
        );
    }

    #[tokio::test]
    async fn failed_download_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let processed =
            process_generation_success(&Artifacts, &result(Some("missing.pdf")), Some(dir.path()))
                .await;

        assert_eq!(processed.downloaded, vec![dir.path().join("deck.pptx")]);
        assert!(processed.messages[1].starts_with("Download failed"));
    }

    #[test]
    fn artifact_path_keeps_only_the_file_name() {
        let dir = Path::new("/tmp/out");
        assert_eq!(
            artifact_path(dir, "20240101_ab12cd34.pptx").unwrap(),
            dir.join("20240101_ab12cd34.pptx")
        );
        assert_eq!(
            artifact_path(dir, "../../etc/passwd").unwrap(),
            dir.join("passwd")
        );
        assert!(artifact_path(dir, "..").is_err());
        assert!(artifact_path(dir, "").is_err());
    }
}
