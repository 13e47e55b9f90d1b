use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::watch;

use crate::vision::strip_math_delimiters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageOrigin {
    File,
    Paste,
    Screenshot,
}

/// Locator of the image currently shown in the source pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub path: PathBuf,
    pub origin: ImageOrigin,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>, origin: ImageOrigin) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

/// Everything the main window renders. Never mutated in place: each
/// transition builds a new value that replaces the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionSession {
    pub image: Option<ImageRef>,
    pub result_markup: String,
    /// `result_markup` without its outer math delimiters, for the renderer.
    pub display_markup: String,
    pub busy: bool,
}

impl RecognitionSession {
    pub fn with_image(self, image: ImageRef) -> Self {
        Self {
            image: Some(image),
            ..self
        }
    }

    pub fn with_result(self, markup: String) -> Self {
        Self {
            display_markup: strip_math_delimiters(&markup).to_string(),
            result_markup: markup,
            ..self
        }
    }

    pub fn with_busy(self, busy: bool) -> Self {
        Self { busy, ..self }
    }

    pub fn has_result(&self) -> bool {
        !self.result_markup.is_empty()
    }
}

/// Publishes [`RecognitionSession`] snapshots to any number of renderers.
pub struct SessionStore {
    tx: watch::Sender<RecognitionSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(RecognitionSession::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> RecognitionSession {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RecognitionSession> {
        self.tx.subscribe()
    }

    /// Replace the snapshot with `transition(current)` and return the result.
    pub fn apply(
        &self,
        transition: impl FnOnce(RecognitionSession) -> RecognitionSession,
    ) -> RecognitionSession {
        let mut next = None;
        self.tx.send_modify(|current| {
            let updated = transition(current.clone());
            *current = updated.clone();
            next = Some(updated);
        });
        next.unwrap_or_default()
    }

    /// Mark the session busy unless it already is.
    ///
    /// The returned guard clears the flag when dropped, on every exit path.
    pub fn try_begin_busy(&self) -> Option<BusyGuard<'_>> {
        let acquired = self.tx.send_if_modified(|current| {
            if current.busy {
                return false;
            }
            *current = current.clone().with_busy(true);
            true
        });
        acquired.then_some(BusyGuard { store: self })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BusyGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.store.apply(|session| session.with_busy(false));
    }
}
