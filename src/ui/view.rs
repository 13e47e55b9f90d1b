use std::{path::PathBuf, sync::Arc};

use tokio::sync::watch;

use super::acquisition::{AcquisitionReport, AcquisitionSequencer, RetryPolicy};
use super::alerts::Notifier;
use super::session::{ImageOrigin, ImageRef, RecognitionSession, SessionStore};
use crate::gateway::Gateway;

pub const SELECT_IMAGE_FIRST: &str = "Please select an image first";
pub const CLIPBOARD_HAS_NO_IMAGE: &str = "Clipboard does not contain an image";
pub const COPIED: &str = "LaTeX copied to clipboard";

/// Destination of the copy-result action.
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Main window state plus the toolbar actions that drive it.
pub struct ViewController {
    store: SessionStore,
    gateway: Gateway,
    sequencer: AcquisitionSequencer,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn ClipboardWriter>,
}

impl ViewController {
    pub fn new(
        gateway: Gateway,
        policy: RetryPolicy,
        notifier: Arc<dyn Notifier>,
        clipboard: Arc<dyn ClipboardWriter>,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            sequencer: AcquisitionSequencer::new(gateway.clone(), policy),
            gateway,
            notifier,
            clipboard,
        }
    }

    pub fn session(&self) -> RecognitionSession {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<RecognitionSession> {
        self.store.subscribe()
    }

    /// Show a user-picked file. Allowed while busy; last write wins.
    pub fn select_image(&self, path: PathBuf) -> RecognitionSession {
        self.adopt(path, ImageOrigin::File)
    }

    /// Adopt the file picked in a dialog. A cancelled pick changes nothing.
    pub fn select_picked(&self, picked: Option<PathBuf>) -> RecognitionSession {
        match picked {
            Some(path) => self.select_image(path),
            None => self.session(),
        }
    }

    pub async fn paste(&self) -> RecognitionSession {
        match self.gateway.get_clipboard_image().await {
            Ok(Some(path)) => return self.adopt(path, ImageOrigin::Paste),
            Ok(None) => self.notifier.alert(CLIPBOARD_HAS_NO_IMAGE),
            Err(err) => self.notifier.alert(&format!("Paste failed: {err}")),
        }
        self.session()
    }

    pub async fn recognize(&self) -> RecognitionSession {
        let Some(image) = self.session().image else {
            self.notifier.alert(SELECT_IMAGE_FIRST);
            return self.session();
        };

        let Some(busy) = self.store.try_begin_busy() else {
            log::info!("recognize requested while busy; ignoring");
            return self.session();
        };

        match self.gateway.process_image(image.path).await {
            Ok(markup) => {
                self.store.apply(|session| session.with_result(markup));
            }
            Err(err) => self.notifier.alert(&format!("Recognition failed: {err}")),
        }
        drop(busy);
        self.session()
    }

    pub async fn capture_screenshot(&self) -> AcquisitionReport {
        self.sequencer.run(&self.store, self.notifier.as_ref()).await
    }

    /// Copy the markup to the clipboard. Returns whether anything was written.
    pub fn copy_result(&self) -> bool {
        let session = self.session();
        if !session.has_result() {
            return false;
        }
        match self.clipboard.write_text(&session.result_markup) {
            Ok(()) => {
                self.notifier.alert(COPIED);
                true
            }
            Err(err) => {
                self.notifier.alert(&format!("Copy failed: {err}"));
                false
            }
        }
    }

    fn adopt(&self, path: PathBuf, origin: ImageOrigin) -> RecognitionSession {
        let image = ImageRef::new(path, origin);
        self.store.apply(|session| session.with_image(image))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::gateway::{fake::FakeBackend, GatewayError, Operation};
    use crate::ui::acquisition::AcquisitionOutcome;
    use crate::ui::alerts::RecordingNotifier;

    #[derive(Default)]
    struct MemoryClipboard {
        writes: Mutex<Vec<String>>,
    }

    impl ClipboardWriter for MemoryClipboard {
        fn write_text(&self, text: &str) -> Result<(), String> {
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Harness {
        view: Arc<ViewController>,
        fake: Arc<FakeBackend>,
        notifier: Arc<RecordingNotifier>,
        clipboard: Arc<MemoryClipboard>,
    }

    fn harness() -> Harness {
        let fake = FakeBackend::new();
        let notifier = RecordingNotifier::new();
        let clipboard = Arc::new(MemoryClipboard::default());
        let view = Arc::new(ViewController::new(
            Gateway::new(fake.clone()),
            RetryPolicy::default(),
            notifier.clone(),
            clipboard.clone(),
        ));
        Harness {
            view,
            fake,
            notifier,
            clipboard,
        }
    }

    #[tokio::test]
    async fn recognize_without_image_prompts_and_skips_backend() {
        let h = harness();
        let session = h.view.recognize().await;

        assert!(h.fake.operations().is_empty());
        assert_eq!(h.notifier.messages(), vec![SELECT_IMAGE_FIRST.to_string()]);
        assert!(!session.busy);
    }

    #[tokio::test]
    async fn recognize_stores_markup_and_clears_busy() {
        let h = harness();
        h.fake.set_process(Ok("\\frac{1}{2}".into()));
        h.view.select_image(PathBuf::from("/tmp/f.png"));

        let session = h.view.recognize().await;

        assert_eq!(session.result_markup, "\\frac{1}{2}");
        assert!(!session.busy);
        assert_eq!(h.fake.operations(), vec![Operation::ProcessImage]);
    }

    #[tokio::test]
    async fn recognize_failure_alerts_and_keeps_previous_result() {
        let h = harness();
        h.view.select_image(PathBuf::from("/tmp/f.png"));
        h.view.recognize().await;
        h.fake.set_process(Err(GatewayError::rejected("API error: 401 - bad key")));

        let session = h.view.recognize().await;

        assert_eq!(session.result_markup, "x^{2}");
        assert!(!session.busy);
        assert_eq!(
            h.notifier.messages(),
            vec!["Recognition failed: API error: 401 - bad key".to_string()]
        );
    }

    #[tokio::test]
    async fn copy_with_empty_result_writes_nothing() {
        let h = harness();
        assert!(!h.view.copy_result());
        assert!(h.clipboard.writes.lock().unwrap().is_empty());
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn copy_writes_current_markup() {
        let h = harness();
        h.view.select_image(PathBuf::from("/tmp/f.png"));
        h.view.recognize().await;

        assert!(h.view.copy_result());
        assert_eq!(*h.clipboard.writes.lock().unwrap(), vec!["x^{2}".to_string()]);
        assert_eq!(h.notifier.messages(), vec![COPIED.to_string()]);
    }

    #[tokio::test]
    async fn picked_file_becomes_the_image_and_cancel_keeps_it() {
        let h = harness();
        let session = h.view.select_picked(Some(PathBuf::from("/home/u/formula.png")));
        assert_eq!(
            session.image,
            Some(ImageRef::new("/home/u/formula.png", ImageOrigin::File))
        );

        let session = h.view.select_picked(None);
        assert_eq!(
            session.image.map(|i| i.path),
            Some(PathBuf::from("/home/u/formula.png"))
        );
        assert!(h.fake.operations().is_empty());
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn paste_adopts_clipboard_image_or_alerts() {
        let h = harness();
        let session = h.view.paste().await;
        assert!(session.image.is_none());
        assert_eq!(h.notifier.messages(), vec![CLIPBOARD_HAS_NO_IMAGE.to_string()]);

        h.fake.push_clipboard(Ok(Some(PathBuf::from("/tmp/clip.png"))));
        let session = h.view.paste().await;
        assert_eq!(
            session.image,
            Some(ImageRef::new("/tmp/clip.png", ImageOrigin::Paste))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn later_selection_wins_over_in_flight_screenshot() {
        let h = harness();
        h.fake.push_clipboard(Ok(None));
        h.fake.push_clipboard(Ok(Some(PathBuf::from("/tmp/shot.png"))));

        let capture = {
            let view = h.view.clone();
            tokio::spawn(async move { view.capture_screenshot().await })
        };

        // Between the first and second poll.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        h.view.select_image(PathBuf::from("/tmp/picked.png"));
        assert_eq!(
            h.view.session().image,
            Some(ImageRef::new("/tmp/picked.png", ImageOrigin::File))
        );

        let report = capture.await.unwrap();
        assert_eq!(
            report.outcome,
            AcquisitionOutcome::Acquired(PathBuf::from("/tmp/shot.png"))
        );
        // The sequence resolved last, so its image is current.
        let session = h.view.session();
        assert_eq!(
            session.image,
            Some(ImageRef::new("/tmp/shot.png", ImageOrigin::Screenshot))
        );
        assert!(!session.busy);

        h.view.select_image(PathBuf::from("/tmp/after.png"));
        assert_eq!(
            h.view.session().image.map(|i| i.path),
            Some(PathBuf::from("/tmp/after.png"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn recognize_is_ignored_during_screenshot() {
        let h = harness();
        h.view.select_image(PathBuf::from("/tmp/f.png"));

        let capture = {
            let view = h.view.clone();
            tokio::spawn(async move { view.capture_screenshot().await })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;

        h.view.recognize().await;
        assert_eq!(h.fake.count(Operation::ProcessImage), 0);

        capture.await.unwrap();
        assert!(!h.view.session().busy);
    }
}
