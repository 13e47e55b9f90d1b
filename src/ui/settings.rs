use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use serde::Serialize;
use tokio::sync::watch;

use super::alerts::Notifier;
use crate::config::ApiConfig;
use crate::gateway::{Gateway, StatusReport};

pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(1500);

/// What the settings modal renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    pub open: bool,
    pub draft: Option<ApiConfig>,
    pub status: Option<StatusReport>,
    pub testing: bool,
    pub saving: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveOutcome {
    /// Validated, persisted, and the surface closed (or was already gone).
    Saved,
    /// Validation did not succeed; nothing was persisted.
    Rejected,
    /// Validation passed but persisting failed.
    Failed,
    /// Surface closed (before or during validation) or a save already running.
    Skipped,
}

/// Modal editor over a transient copy of the backend's [`ApiConfig`].
pub struct SettingsSurface {
    gateway: Gateway,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<SettingsSnapshot>,
    // Bumped on open and close so a delayed auto-close can tell whether the
    // surface it meant to close is still the one showing.
    generation: AtomicU64,
    close_delay: Duration,
}

impl SettingsSurface {
    pub fn new(gateway: Gateway, notifier: Arc<dyn Notifier>, close_delay: Duration) -> Self {
        let (state, _) = watch::channel(SettingsSnapshot::default());
        Self {
            gateway,
            notifier,
            state,
            generation: AtomicU64::new(0),
            close_delay,
        }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.state.subscribe()
    }

    /// Load the backend's config into a fresh draft and show the surface.
    pub async fn open(&self) -> SettingsSnapshot {
        match self.gateway.get_config().await {
            Ok(config) => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                self.state.send_replace(SettingsSnapshot {
                    open: true,
                    draft: Some(config),
                    ..SettingsSnapshot::default()
                });
            }
            Err(err) => {
                log::error!("Failed to load configuration: {err}");
                self.notifier
                    .alert(&format!("Failed to load configuration: {err}"));
            }
        }
        self.snapshot()
    }

    /// Replace the draft with the form's current values. Ignored when closed.
    pub fn edit(&self, config: ApiConfig) -> SettingsSnapshot {
        self.edit_with(|draft| *draft = config)
    }

    pub fn edit_with(&self, change: impl FnOnce(&mut ApiConfig)) -> SettingsSnapshot {
        self.state.send_if_modified(|snapshot| {
            if !snapshot.open {
                return false;
            }
            match snapshot.draft.as_mut() {
                Some(draft) => {
                    change(draft);
                    true
                }
                None => false,
            }
        });
        self.snapshot()
    }

    /// Check the draft against the live API without persisting anything.
    pub async fn test(&self) -> Option<StatusReport> {
        let mut draft = None;
        self.state.send_if_modified(|snapshot| {
            if !snapshot.open || snapshot.testing {
                return false;
            }
            draft = snapshot.draft.clone();
            snapshot.testing = draft.is_some();
            snapshot.status = None;
            draft.is_some()
        });
        let draft = draft?;

        let report = match self.gateway.test_connection(draft).await {
            Ok(report) => report,
            Err(err) => StatusReport::failure(format!("Connection failed: {err}")),
        };

        self.state.send_modify(|snapshot| {
            snapshot.testing = false;
            snapshot.status = Some(report.clone());
        });
        Some(report)
    }

    /// Validate the draft, persist it only on a successful report, then close
    /// after the display delay.
    pub async fn save(&self) -> SaveOutcome {
        let mut draft = None;
        self.state.send_if_modified(|snapshot| {
            if !snapshot.open || snapshot.saving {
                return false;
            }
            draft = snapshot.draft.clone();
            snapshot.saving = draft.is_some();
            draft.is_some()
        });
        let Some(draft) = draft else {
            return SaveOutcome::Skipped;
        };
        let generation = self.generation.load(Ordering::SeqCst);

        let validation = match self.gateway.validate_config(draft.clone()).await {
            Ok(report) => report,
            Err(err) => StatusReport::failure(err.to_string()),
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            log::info!("Settings closed during validation; not saving");
            return SaveOutcome::Skipped;
        }

        if !validation.success {
            log::info!("Configuration not saved: {}", validation.message);
            self.finish_saving(validation);
            return SaveOutcome::Rejected;
        }

        let saved = match self.gateway.save_config(draft).await {
            Ok(report) => report,
            Err(err) => StatusReport::failure(format!("Save failed: {err}")),
        };
        let success = saved.success;
        self.finish_saving(saved);
        if !success {
            return SaveOutcome::Failed;
        }

        tokio::time::sleep(self.close_delay).await;
        if self.generation.load(Ordering::SeqCst) == generation {
            self.close();
        }
        SaveOutcome::Saved
    }

    pub fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SettingsSnapshot::default());
    }

    fn finish_saving(&self, status: StatusReport) {
        self.state.send_modify(|snapshot| {
            snapshot.saving = false;
            snapshot.status = Some(status);
        });
    }
}
