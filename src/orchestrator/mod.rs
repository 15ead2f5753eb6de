//! Application-level orchestration.
//!
//! This module owns the generation lifecycle (validation, submission, progress,
//! completion, history) and post-generation processing such as artifact
//! downloads. UI/CLI layers call into this module to keep responsibilities
//! separated.

mod controller;
mod lifecycle;
mod post_process;

pub use controller::{run_controller, UiCommand};
pub use lifecycle::{GenerationController, PendingSubmission};
pub use post_process::{
    artifact_path, download_artifact, process_generation_success, ProcessedGeneration,
};
