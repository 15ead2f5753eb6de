//! Dismissible "presentation ready" alert.

use crate::model::LifecycleState;
use std::time::Duration;
use tokio::time::Instant;

pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub artifact_filename: String,
}

pub struct NotificationManager {
    enabled: bool,
    display_for: Duration,
    active: Option<(Notification, Instant)>,
}

impl NotificationManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            display_for: NOTIFICATION_DURATION,
            active: None,
        }
    }

    /// Raise an alert when `state` is a success. Returns the new alert, if any.
    pub fn observe(&mut self, state: &LifecycleState) -> Option<&Notification> {
        let LifecycleState::Success(result) = state else {
            return None;
        };
        if !self.enabled {
            return None;
        }
        let notification = Notification {
            title: "Presentation Ready!".to_string(),
            body: format!("Your {}-slide presentation is ready to download", result.slide_count),
            artifact_filename: result.artifact_filename.clone(),
        };
        self.active = Some((notification, Instant::now()));
        self.active.as_ref().map(|(n, _)| n)
    }

    pub fn active(&self) -> Option<&Notification> {
        self.active.as_ref().map(|(n, _)| n)
    }

    /// Returns true if an alert was showing.
    pub fn dismiss(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Drop the alert once it has been shown long enough. Returns true if it expired.
    pub fn expire(&mut self, now: Instant) -> bool {
        match &self.active {
            Some((_, shown_at)) if now.saturating_duration_since(*shown_at) >= self.display_for => {
                self.active = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, ValidationError};
    use crate::model::GenerationResult;

    fn success() -> LifecycleState {
        LifecycleState::Success(GenerationResult {
            artifact_filename: "deck.pptx".into(),
            slide_count: 8,
            chapters_detected: None,
            pdf_filename: None,
            created_at: time::OffsetDateTime::now_utc(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn success_raises_alert_that_expires() {
        let mut manager = NotificationManager::new(true);
        let raised = manager.observe(&success()).cloned().unwrap();
        assert_eq!(raised.artifact_filename, "deck.pptx");
        assert!(raised.body.contains("8-slide"));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(!manager.expire(Instant::now()));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(manager.expire(Instant::now()));
        assert!(manager.active().is_none());
    }

    #[tokio::test]
    async fn failures_and_disabled_manager_stay_quiet() {
        let mut manager = NotificationManager::new(true);
        let failed = LifecycleState::Failed(GenerationError::Validation(
            ValidationError::MissingTopic,
        ));
        assert!(manager.observe(&failed).is_none());

        let mut disabled = NotificationManager::new(false);
        assert!(disabled.observe(&success()).is_none());
        assert!(!disabled.dismiss());
    }
}
