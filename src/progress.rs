//! Simulated progress for an opaque remote call.
//!
//! The service reports nothing until it finishes, so while a request is in
//! flight a background task rotates through status messages and nudges a
//! progress value upward by random steps. The value never passes
//! [`PROGRESS_CAP`] on its own; only [`ProgressSimulator::complete`] reaches
//! 100.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const PROGRESS_CAP: f64 = 95.0;
pub const PROGRESS_COMPLETE: f64 = 100.0;

pub const STATUS_MESSAGES: [&str; 8] = [
    "Crafting your masterpiece...",
    "Bringing your ideas to life...",
    "Building something amazing...",
    "Your presentation is taking shape...",
    "Perfecting every detail...",
    "Creating visual magic...",
    "Assembling brilliant slides...",
    "Making it spectacular...",
];

/// Status message for a position in the rotation; wraps past the end.
pub fn status_message(index: usize) -> &'static str {
    STATUS_MESSAGES[index % STATUS_MESSAGES.len()]
}

/// Advance `current` by `increment`, never decreasing and never passing the cap.
pub fn next_progress(current: f64, increment: f64) -> f64 {
    if current >= PROGRESS_CAP {
        return current;
    }
    (current + increment.max(0.0)).min(PROGRESS_CAP)
}

#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub message_interval: Duration,
    pub tick_interval: Duration,
    /// Upper bound (exclusive) of the random per-tick increment.
    pub max_increment: f64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            message_interval: Duration::from_secs(2),
            tick_interval: Duration::from_millis(500),
            max_increment: 15.0,
            seed: None,
        }
    }
}

/// Latest simulated progress, published over a watch channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Submission this snapshot belongs to.
    pub run: u64,
    pub percent: f64,
    pub message_index: usize,
    /// Set once the run reached a terminal state; later ticks are ignored.
    pub finished: bool,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            run: 0,
            percent: 0.0,
            message_index: 0,
            finished: false,
        }
    }
}

impl ProgressSnapshot {
    pub fn message(&self) -> &'static str {
        status_message(self.message_index)
    }
}

pub struct ProgressSimulator {
    config: SimulatorConfig,
    tx: Arc<watch::Sender<ProgressSnapshot>>,
}

impl ProgressSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::default());
        Self {
            config,
            tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// Reset the snapshot for `run` and start both periodic effects.
    pub fn start(&self, run: u64) -> ProgressHandle {
        self.tx.send_replace(ProgressSnapshot {
            run,
            ..Default::default()
        });

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run)),
            None => StdRng::from_entropy(),
        };
        let task = tokio::spawn(drive(self.tx.clone(), run, self.config.clone(), rng));
        ProgressHandle { task: Some(task) }
    }

    /// Force `run` to 100% and freeze it.
    pub fn complete(&self, run: u64) {
        self.tx.send_modify(|snap| {
            snap.run = run;
            snap.percent = PROGRESS_COMPLETE;
            snap.finished = true;
        });
    }
}

/// Cancels the simulator task on [`stop`](ProgressHandle::stop) or drop.
#[derive(Debug, Default)]
pub struct ProgressHandle {
    task: Option<JoinHandle<()>>,
}

impl ProgressHandle {
    /// A handle with nothing to cancel.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive(
    tx: Arc<watch::Sender<ProgressSnapshot>>,
    run: u64,
    config: SimulatorConfig,
    mut rng: StdRng,
) {
    let start = Instant::now();
    let mut messages = interval_at(start + config.message_interval, config.message_interval);
    let mut ticks = interval_at(start + config.tick_interval, config.tick_interval);
    messages.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = messages.tick() => {
                tx.send_if_modified(|snap| {
                    if snap.run != run || snap.finished {
                        return false;
                    }
                    snap.message_index = (snap.message_index + 1) % STATUS_MESSAGES.len();
                    true
                });
            }
            _ = ticks.tick() => {
                let increment = rng.gen::<f64>() * config.max_increment;
                tx.send_if_modified(|snap| {
                    if snap.run != run || snap.finished {
                        return false;
                    }
                    let next = next_progress(snap.percent, increment);
                    if next == snap.percent {
                        return false;
                    }
                    snap.percent = next;
                    true
                });
            }
        }
    }
}
