//! Controller event loop.
//!
//! Owns a [`GenerationController`], turns UI commands into lifecycle calls,
//! runs remote requests on spawned tasks and emits events for presentation
//! layers.

use super::lifecycle::GenerationController;
use crate::error::RemoteError;
use crate::form::FormState;
use crate::model::{ControllerEvent, GenerationResponse, LifecycleState};
use crate::notify::NotificationManager;
use crate::service::GenerationService;
use crate::storage::KeyValueStore;
use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Duration;

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub enum UiCommand {
    Submit(Box<FormState>),
    DeleteHistory(String),
    ClearHistory,
    DismissNotification,
    Quit,
}

type InFlight = BoxFuture<'static, (u64, Result<GenerationResponse, RemoteError>)>;

/// Spawn the remote call for one submission.
fn spawn_request(
    service: &Arc<dyn GenerationService>,
    seq: u64,
    request: crate::model::GenerationRequest,
) -> InFlight {
    let service = service.clone();
    let handle = tokio::spawn(async move { service.generate(request).await });
    Box::pin(async move {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(RemoteError::Transport(format!("generation task failed: {e}"))),
        };
        (seq, outcome)
    })
}

/// Process UI commands until `Quit` (or the command channel closes) and every
/// outstanding request has resolved.
pub async fn run_controller<S: KeyValueStore>(
    mut controller: GenerationController<S>,
    service: Arc<dyn GenerationService>,
    mut notifications: NotificationManager,
    event_tx: UnboundedSender<ControllerEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: FuturesUnordered<InFlight> = FuturesUnordered::new();
    let mut progress_rx = controller.progress();
    let mut progress_open = true;
    let mut commands_open = true;
    let mut quit_pending = false;
    // Checks whether the success alert has been up long enough.
    let mut watchdog = tokio::time::interval(Duration::from_millis(500));

    let _ = event_tx.send(ControllerEvent::History(
        controller.history().entries().to_vec(),
    ));

    loop {
        if quit_pending && in_flight.is_empty() {
            break;
        }

        tokio::select! {
            cmd = cmd_rx.recv(), if commands_open => {
                match cmd {
                    Some(UiCommand::Submit(form)) => {
                        match controller.begin(&form) {
                            Ok(pending) => {
                                in_flight.push(spawn_request(
                                    &service,
                                    pending.seq,
                                    pending.request,
                                ));
                            }
                            Err(e) => {
                                let snap = progress_rx.borrow_and_update().clone();
                                let _ = event_tx.send(ControllerEvent::Progress(snap));
                                let _ = event_tx.send(ControllerEvent::Info(e.to_string()));
                            }
                        }
                        let _ = event_tx.send(ControllerEvent::State(controller.state().clone()));
                    }
                    Some(UiCommand::DeleteHistory(id)) => {
                        controller.history_mut().delete(&id);
                        let _ = event_tx.send(ControllerEvent::History(
                            controller.history().entries().to_vec(),
                        ));
                    }
                    Some(UiCommand::ClearHistory) => {
                        controller.history_mut().clear();
                        let _ = event_tx.send(ControllerEvent::History(Vec::new()));
                    }
                    Some(UiCommand::DismissNotification) => {
                        if notifications.dismiss() {
                            let _ = event_tx.send(ControllerEvent::Notification(None));
                        }
                    }
                    Some(UiCommand::Quit) => {
                        // No request can be cancelled; wait for outstanding ones.
                        quit_pending = true;
                        if !in_flight.is_empty() {
                            let _ = event_tx.send(ControllerEvent::Info(
                                "Waiting for the presentation to finish…".into(),
                            ));
                        }
                    }
                    None => {
                        commands_open = false;
                        quit_pending = true;
                    }
                }
            }
            Some((seq, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                if controller.finish(seq, outcome) {
                    let state = controller.state().clone();
                    // Final snapshot (100%) goes out before the terminal state.
                    let snap = progress_rx.borrow_and_update().clone();
                    let _ = event_tx.send(ControllerEvent::Progress(snap));
                    let _ = event_tx.send(ControllerEvent::State(state.clone()));
                    if let LifecycleState::Success(_) = &state {
                        let _ = event_tx.send(ControllerEvent::History(
                            controller.history().entries().to_vec(),
                        ));
                    }
                    if let Some(n) = notifications.observe(&state) {
                        let _ = event_tx.send(ControllerEvent::Notification(Some(n.clone())));
                    }
                }
            }
            changed = progress_rx.changed(), if progress_open => {
                match changed {
                    Ok(()) => {
                        let snap = progress_rx.borrow_and_update().clone();
                        let _ = event_tx.send(ControllerEvent::Progress(snap));
                    }
                    Err(_) => progress_open = false,
                }
            }
            _ = watchdog.tick() => {
                if notifications.expire(tokio::time::Instant::now()) {
                    let _ = event_tx.send(ControllerEvent::Notification(None));
                }
            }
        }
    }

    Ok(())
}
