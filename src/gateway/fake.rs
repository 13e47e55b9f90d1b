//! Scriptable in-memory backend for presentation tests.

use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::Instant;

use super::{BackendGateway, BackendReply, BackendRequest, GatewayError, Operation, StatusReport};
use crate::config::ApiConfig;

struct Script {
    config: Result<ApiConfig, GatewayError>,
    validate: Result<StatusReport, GatewayError>,
    save: Result<StatusReport, GatewayError>,
    test: Result<StatusReport, GatewayError>,
    process: Result<String, GatewayError>,
    clipboard: VecDeque<Result<Option<PathBuf>, GatewayError>>,
    trigger: Result<(), GatewayError>,
    validate_delay: Duration,
}

pub(crate) struct FakeBackend {
    script: Mutex<Script>,
    calls: Mutex<Vec<(Operation, Instant)>>,
    saved: Mutex<Vec<ApiConfig>>,
    tested: Mutex<Vec<ApiConfig>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Script {
                config: Ok(ApiConfig::default()),
                validate: Ok(StatusReport::success("API connection succeeded")),
                save: Ok(StatusReport::success("Configuration saved")),
                test: Ok(StatusReport::success("API connection succeeded")),
                process: Ok("x^{2}".into()),
                clipboard: VecDeque::new(),
                trigger: Ok(()),
                validate_delay: Duration::ZERO,
            }),
            calls: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
            tested: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn set_config(&self, config: Result<ApiConfig, GatewayError>) {
        self.script.lock().unwrap().config = config;
    }

    pub(crate) fn set_validate(&self, report: Result<StatusReport, GatewayError>) {
        self.script.lock().unwrap().validate = report;
    }

    pub(crate) fn set_save(&self, report: Result<StatusReport, GatewayError>) {
        self.script.lock().unwrap().save = report;
    }

    pub(crate) fn set_test(&self, report: Result<StatusReport, GatewayError>) {
        self.script.lock().unwrap().test = report;
    }

    pub(crate) fn set_process(&self, markup: Result<String, GatewayError>) {
        self.script.lock().unwrap().process = markup;
    }

    pub(crate) fn set_trigger(&self, result: Result<(), GatewayError>) {
        self.script.lock().unwrap().trigger = result;
    }

    /// Make validate-config take `delay` of (virtual) time before replying.
    pub(crate) fn set_validate_delay(&self, delay: Duration) {
        self.script.lock().unwrap().validate_delay = delay;
    }

    /// Queue the reply for the next clipboard poll. An empty queue answers `None`.
    pub(crate) fn push_clipboard(&self, reply: Result<Option<PathBuf>, GatewayError>) {
        self.script.lock().unwrap().clipboard.push_back(reply);
    }

    pub(crate) fn operations(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().iter().map(|(op, _)| *op).collect()
    }

    pub(crate) fn calls(&self) -> Vec<(Operation, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, operation: Operation) -> usize {
        self.operations().into_iter().filter(|op| *op == operation).count()
    }

    pub(crate) fn saved(&self) -> Vec<ApiConfig> {
        self.saved.lock().unwrap().clone()
    }

    pub(crate) fn tested(&self) -> Vec<ApiConfig> {
        self.tested.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendGateway for FakeBackend {
    async fn invoke(&self, request: BackendRequest) -> Result<BackendReply, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.operation(), Instant::now()));

        if matches!(request, BackendRequest::ValidateConfig(_)) {
            let delay = self.script.lock().unwrap().validate_delay;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        let mut script = self.script.lock().unwrap();
        match request {
            BackendRequest::GetConfig => script.config.clone().map(BackendReply::Config),
            BackendRequest::ValidateConfig(_) => script.validate.clone().map(BackendReply::Status),
            BackendRequest::SaveConfig(config) => {
                let reply = script.save.clone();
                if reply.as_ref().map(|r| r.success).unwrap_or(false) {
                    self.saved.lock().unwrap().push(config);
                }
                reply.map(BackendReply::Status)
            }
            BackendRequest::TestConnection(config) => {
                self.tested.lock().unwrap().push(config);
                script.test.clone().map(BackendReply::Status)
            }
            BackendRequest::ProcessImage(_) => script.process.clone().map(BackendReply::Markup),
            BackendRequest::GetClipboardImage => script
                .clipboard
                .pop_front()
                .unwrap_or(Ok(None))
                .map(BackendReply::ClipboardImage),
            BackendRequest::TriggerScreenshot => script.trigger.clone().map(|()| BackendReply::Done),
        }
    }
}
