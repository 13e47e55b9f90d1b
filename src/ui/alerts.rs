/// Sink for user-visible, blocking alerts carrying a raw message.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

#[cfg(test)]
pub(crate) use recording::RecordingNotifier;

#[cfg(test)]
mod recording {
    use std::sync::{Arc, Mutex};

    use super::Notifier;

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub(crate) fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn alert(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }
}
