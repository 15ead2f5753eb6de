//! Generation lifecycle state machine.
//!
//! `Idle -> Submitting -> (Success | Failed)`, with a new submission allowed
//! from any state. Every submission gets a sequence number; an outcome is
//! applied only if it belongs to the latest submission, so a slow response
//! can never overwrite a newer one.

use crate::error::{GenerationError, RemoteError, ValidationError};
use crate::form::FormState;
use crate::history::HistoryStore;
use crate::model::{
    GenerationRequest, GenerationResponse, GenerationResult, HistoryEntry, LifecycleState,
};
use crate::progress::{ProgressHandle, ProgressSimulator, ProgressSnapshot};
use crate::service::GenerationService;
use crate::storage::KeyValueStore;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A validated request waiting to be sent, tagged with its sequence number.
#[derive(Debug)]
pub struct PendingSubmission {
    pub seq: u64,
    pub request: GenerationRequest,
}

/// What the controller remembers about the in-flight submission.
struct ActiveSubmission {
    seq: u64,
    title: String,
    template_id: String,
}

pub struct GenerationController<S> {
    state: LifecycleState,
    history: HistoryStore<S>,
    simulator: ProgressSimulator,
    progress: ProgressHandle,
    seq: u64,
    active: Option<ActiveSubmission>,
    record_history: bool,
}

impl<S: KeyValueStore> GenerationController<S> {
    pub fn new(history: HistoryStore<S>, simulator: ProgressSimulator) -> Self {
        Self {
            state: LifecycleState::Idle,
            history,
            simulator,
            progress: ProgressHandle::idle(),
            seq: 0,
            active: None,
            record_history: true,
        }
    }

    /// Whether successful generations are added to history (on by default).
    pub fn with_history_recording(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.history
    }

    pub fn progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.simulator.subscribe()
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        self.simulator.snapshot()
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq
    }

    pub fn is_submitting(&self) -> bool {
        self.active.is_some()
    }

    /// Validate the form and enter `Submitting`, or fail without a remote call.
    ///
    /// Either way this becomes the latest submission; outcomes for earlier
    /// sequence numbers are ignored from now on.
    pub fn begin(&mut self, form: &FormState) -> Result<PendingSubmission, ValidationError> {
        self.seq += 1;
        let seq = self.seq;
        self.progress.stop();

        match form.validate() {
            Err(e) => {
                debug!(seq, error = %e, "submission rejected by validation");
                self.active = None;
                self.simulator.complete(seq);
                self.state = LifecycleState::Failed(GenerationError::Validation(e.clone()));
                Err(e)
            }
            Ok(request) => {
                debug!(seq, mode = ?request.mode(), template = %request.template_id, "submitting");
                self.active = Some(ActiveSubmission {
                    seq,
                    title: request.title(),
                    template_id: request.template_id.clone(),
                });
                self.state = LifecycleState::Submitting { seq };
                self.progress = self.simulator.start(seq);
                Ok(PendingSubmission { seq, request })
            }
        }
    }

    /// Apply the remote outcome for `seq`. Returns false if it was stale.
    pub fn finish(
        &mut self,
        seq: u64,
        outcome: Result<GenerationResponse, RemoteError>,
    ) -> bool {
        let active = match self.active.take() {
            Some(active) if active.seq == seq => active,
            other => {
                self.active = other;
                warn!(seq, latest = self.seq, "dropping outcome of superseded submission");
                return false;
            }
        };

        self.progress.stop();
        self.simulator.complete(seq);

        match outcome {
            Ok(response) => {
                let result = GenerationResult::from_response(response, OffsetDateTime::now_utc());
                info!(
                    seq,
                    file = %result.artifact_filename,
                    slides = result.slide_count,
                    "presentation generated"
                );
                if self.record_history {
                    let id = self.history.next_id();
                    self.history.record(HistoryEntry::from_result(
                        id,
                        &result,
                        active.title,
                        active.template_id,
                    ));
                }
                self.state = LifecycleState::Success(result);
            }
            Err(e) => {
                warn!(seq, error = %e, "generation failed");
                self.state = LifecycleState::Failed(GenerationError::Remote(e));
            }
        }
        true
    }

    /// Validate, call the service once and apply the outcome.
    pub async fn submit(
        &mut self,
        form: &FormState,
        service: &dyn GenerationService,
    ) -> &LifecycleState {
        if let Ok(pending) = self.begin(form) {
            let outcome = service.generate(pending.request).await;
            self.finish(pending.seq, outcome);
        }
        &self.state
    }
}
