//! Screenshot → clipboard acquisition.
//!
//! The capture tool returns as soon as its UI is up, and the OS fills the
//! clipboard some time after the user finishes, so the clipboard is polled a
//! bounded number of times with growing delays. Attempts never overlap.

use std::{env, path::PathBuf, time::Duration};

use tokio::time;

use super::alerts::Notifier;
use super::session::{ImageOrigin, ImageRef, SessionStore};
use crate::gateway::Gateway;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

pub const EXHAUSTED_MESSAGE: &str =
    "No screenshot found on the clipboard. Take the screenshot again or paste it manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Constant,
    /// Attempt `i` waits `base_delay × i`.
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            backoff: Backoff::Linear,
        }
    }
}

impl RetryPolicy {
    /// Defaults, overridden by `AITEX_SCREENSHOT_ATTEMPTS` and
    /// `AITEX_SCREENSHOT_DELAY_MS` when they parse.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut policy = Self::default();
        if let Some(attempts) = lookup("AITEX_SCREENSHOT_ATTEMPTS")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
        {
            policy.attempts = attempts;
        }
        if let Some(ms) = lookup("AITEX_SCREENSHOT_DELAY_MS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            policy.base_delay = Duration::from_millis(ms);
        }
        policy
    }

    /// Delay before the 1-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Constant => self.base_delay,
            Backoff::Linear => self.base_delay.saturating_mul(attempt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    ImageFound(PathBuf),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionAttempt {
    pub index: u32,
    pub delay: Duration,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    Acquired(PathBuf),
    Exhausted,
    TriggerFailed(String),
    /// Another action held the busy flag; nothing was done.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionReport {
    pub outcome: AcquisitionOutcome,
    pub attempts: Vec<AcquisitionAttempt>,
}

impl AcquisitionReport {
    fn new(outcome: AcquisitionOutcome, attempts: Vec<AcquisitionAttempt>) -> Self {
        Self { outcome, attempts }
    }
}

#[derive(Clone)]
pub struct AcquisitionSequencer {
    gateway: Gateway,
    policy: RetryPolicy,
}

impl AcquisitionSequencer {
    pub fn new(gateway: Gateway, policy: RetryPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn run(&self, store: &SessionStore, notifier: &dyn Notifier) -> AcquisitionReport {
        let Some(_busy) = store.try_begin_busy() else {
            log_info!("screenshot requested while busy; ignoring");
            return AcquisitionReport::new(AcquisitionOutcome::Skipped, Vec::new());
        };

        if let Err(err) = self.gateway.trigger_screenshot().await {
            log_warn!("screenshot trigger failed: {err}");
            notifier.alert(&format!("Screenshot failed: {err}"));
            return AcquisitionReport::new(AcquisitionOutcome::TriggerFailed(err.to_string()), Vec::new());
        }

        let mut attempts = Vec::with_capacity(self.policy.attempts as usize);
        for index in 1..=self.policy.attempts {
            let delay = self.policy.delay_for(index);
            time::sleep(delay).await;

            let outcome = match self.gateway.get_clipboard_image().await {
                Ok(Some(path)) => AttemptOutcome::ImageFound(path),
                Ok(None) => AttemptOutcome::NotFound,
                Err(err) => AttemptOutcome::Failed(err.to_string()),
            };

            let found = match &outcome {
                AttemptOutcome::ImageFound(path) => Some(path.clone()),
                AttemptOutcome::NotFound => {
                    log_info!("no clipboard image on attempt {index}/{}", self.policy.attempts);
                    None
                }
                AttemptOutcome::Failed(message) => {
                    log_warn!(
                        "clipboard poll {index}/{} failed: {message}",
                        self.policy.attempts
                    );
                    None
                }
            };
            attempts.push(AcquisitionAttempt { index, delay, outcome });

            if let Some(path) = found {
                log_info!(
                    "clipboard image found on attempt {index}/{}: {}",
                    self.policy.attempts,
                    path.display()
                );
                let image = ImageRef::new(path.clone(), ImageOrigin::Screenshot);
                store.apply(|session| session.with_image(image));
                return AcquisitionReport::new(AcquisitionOutcome::Acquired(path), attempts);
            }
        }

        log_error!("no clipboard image after {} attempts", self.policy.attempts);
        notifier.alert(EXHAUSTED_MESSAGE);
        AcquisitionReport::new(AcquisitionOutcome::Exhausted, attempts)
    }
}
