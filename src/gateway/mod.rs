//! The single call boundary between the presentation core and the backend.
//!
//! Everything that leaves the view layer (config, network, clipboard,
//! screenshots) goes through [`BackendGateway::invoke`]. [`Gateway`] adds one
//! typed method per operation on top of it so callers never match on replies.
//! The gateway never retries; retry policy lives with the caller.

use std::{fmt, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ApiConfig;

/// Names of the seven backend operations, as they appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetConfig,
    ValidateConfig,
    SaveConfig,
    TestConnection,
    ProcessImage,
    GetClipboardImage,
    TriggerScreenshot,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetConfig => "get-config",
            Operation::ValidateConfig => "validate-config",
            Operation::SaveConfig => "save-config",
            Operation::TestConnection => "test-connection",
            Operation::ProcessImage => "process-image",
            Operation::GetClipboardImage => "get-clipboard-image",
            Operation::TriggerScreenshot => "trigger-screenshot",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendRequest {
    GetConfig,
    ValidateConfig(ApiConfig),
    SaveConfig(ApiConfig),
    TestConnection(ApiConfig),
    ProcessImage(PathBuf),
    GetClipboardImage,
    TriggerScreenshot,
}

impl BackendRequest {
    pub fn operation(&self) -> Operation {
        match self {
            BackendRequest::GetConfig => Operation::GetConfig,
            BackendRequest::ValidateConfig(_) => Operation::ValidateConfig,
            BackendRequest::SaveConfig(_) => Operation::SaveConfig,
            BackendRequest::TestConnection(_) => Operation::TestConnection,
            BackendRequest::ProcessImage(_) => Operation::ProcessImage,
            BackendRequest::GetClipboardImage => Operation::GetClipboardImage,
            BackendRequest::TriggerScreenshot => Operation::TriggerScreenshot,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Config(ApiConfig),
    Status(StatusReport),
    Markup(String),
    ClipboardImage(Option<PathBuf>),
    Done,
}

/// Outcome of validate, save and test-connection.
///
/// `success` is what gates persistence; `message` is only for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub success: bool,
    pub message: String,
}

impl StatusReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend rejected the call; the message is shown to the user as is.
    #[error("{0}")]
    Rejected(String),
    #[error("backend sent an unexpected reply to {0}")]
    UnexpectedReply(Operation),
}

impl GatewayError {
    pub fn rejected(message: impl Into<String>) -> Self {
        GatewayError::Rejected(message.into())
    }
}

#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn invoke(&self, request: BackendRequest) -> Result<BackendReply, GatewayError>;
}

/// Typed facade over a shared [`BackendGateway`].
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<dyn BackendGateway>,
}

impl Gateway {
    pub fn new(inner: Arc<dyn BackendGateway>) -> Self {
        Self { inner }
    }

    async fn call(&self, request: BackendRequest) -> Result<BackendReply, GatewayError> {
        let operation = request.operation();
        log::debug!("gateway -> {operation}");
        let reply = self.inner.invoke(request).await;
        if let Err(err) = &reply {
            log::debug!("gateway <- {operation} failed: {err}");
        }
        reply
    }

    pub async fn get_config(&self) -> Result<ApiConfig, GatewayError> {
        match self.call(BackendRequest::GetConfig).await? {
            BackendReply::Config(config) => Ok(config),
            _ => Err(GatewayError::UnexpectedReply(Operation::GetConfig)),
        }
    }

    pub async fn validate_config(&self, config: ApiConfig) -> Result<StatusReport, GatewayError> {
        self.status(BackendRequest::ValidateConfig(config)).await
    }

    pub async fn save_config(&self, config: ApiConfig) -> Result<StatusReport, GatewayError> {
        self.status(BackendRequest::SaveConfig(config)).await
    }

    pub async fn test_connection(&self, config: ApiConfig) -> Result<StatusReport, GatewayError> {
        self.status(BackendRequest::TestConnection(config)).await
    }

    pub async fn process_image(&self, path: PathBuf) -> Result<String, GatewayError> {
        match self.call(BackendRequest::ProcessImage(path)).await? {
            BackendReply::Markup(markup) => Ok(markup),
            _ => Err(GatewayError::UnexpectedReply(Operation::ProcessImage)),
        }
    }

    pub async fn get_clipboard_image(&self) -> Result<Option<PathBuf>, GatewayError> {
        match self.call(BackendRequest::GetClipboardImage).await? {
            BackendReply::ClipboardImage(path) => Ok(path),
            _ => Err(GatewayError::UnexpectedReply(Operation::GetClipboardImage)),
        }
    }

    pub async fn trigger_screenshot(&self) -> Result<(), GatewayError> {
        match self.call(BackendRequest::TriggerScreenshot).await? {
            BackendReply::Done => Ok(()),
            _ => Err(GatewayError::UnexpectedReply(Operation::TriggerScreenshot)),
        }
    }

    async fn status(&self, request: BackendRequest) -> Result<StatusReport, GatewayError> {
        let operation = request.operation();
        match self.call(request).await? {
            BackendReply::Status(report) => Ok(report),
            _ => Err(GatewayError::UnexpectedReply(operation)),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake;
