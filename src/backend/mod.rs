//! Native implementation of the gateway operations.

use std::{io, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    capture::{clipboard, screenshot, ClipboardTempFiles},
    config::{validate_fields, ApiConfig, ConfigStore},
    gateway::{BackendGateway, BackendReply, BackendRequest, GatewayError, StatusReport},
    vision::{clean_latex, prepare_for_upload, VisionClient},
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API is disabled")]
    Disabled,
    #[error("API key is not configured")]
    MissingApiKey,
    #[error("Failed to read image {path}: {source}")]
    ReadImage { path: PathBuf, source: io::Error },
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Network request failed: {0}")]
    Network(reqwest::Error),
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse API response: {0}")]
    MalformedResponse(String),
    #[error("Clipboard access failed: {0}")]
    Clipboard(arboard::Error),
    #[error("Clipboard image data is invalid")]
    InvalidClipboardImage,
    #[error("No screenshot tool found")]
    NoScreenshotTool,
    #[error("Failed to launch screenshot tool: {0}")]
    ScreenshotLaunch(io::Error),
    #[error("Failed to save configuration: {0:#}")]
    Persist(anyhow::Error),
    #[error("Background task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Owner of config, network and OS access. Cheap to clone.
#[derive(Clone)]
pub struct Backend {
    store: Arc<ConfigStore>,
    vision: VisionClient,
    captures: Arc<ClipboardTempFiles>,
}

impl Backend {
    pub fn new(store: Arc<ConfigStore>) -> Result<Self, BackendError> {
        Ok(Self {
            store,
            vision: VisionClient::new()?,
            captures: Arc::new(ClipboardTempFiles::new()),
        })
    }

    pub fn get_config(&self) -> ApiConfig {
        self.store.current()
    }

    /// Offline field checks followed by a live connection test.
    pub async fn validate_config(&self, config: &ApiConfig) -> StatusReport {
        if let Err(problem) = validate_fields(config) {
            return StatusReport::failure(problem);
        }
        self.test_connection(config).await
    }

    /// Persist `config`. Field checks run again, the network test does not.
    pub fn save_config(&self, config: ApiConfig) -> Result<StatusReport, BackendError> {
        if let Err(problem) = validate_fields(&config) {
            return Ok(StatusReport::failure(problem));
        }
        self.store.replace(config).map_err(BackendError::Persist)?;
        log_info!("Configuration saved to {}", self.store.path().display());
        Ok(StatusReport::success("Configuration saved"))
    }

    pub async fn test_connection(&self, config: &ApiConfig) -> StatusReport {
        match self.vision.ping(config).await {
            Ok(()) => StatusReport::success("API connection succeeded"),
            Err(err) => {
                log_warn!("Connection test against {} failed: {err}", config.base_url());
                StatusReport::failure(format!("API connection failed: {err}"))
            }
        }
    }

    pub async fn process_image(&self, path: PathBuf) -> Result<String, BackendError> {
        let config = self.store.current();
        if !config.enabled {
            return Err(BackendError::Disabled);
        }
        if config.api_key.trim().is_empty() {
            return Err(BackendError::MissingApiKey);
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| BackendError::ReadImage {
                path: path.clone(),
                source,
            })?;
        let encoded = tokio::task::spawn_blocking(move || prepare_for_upload(&bytes)).await??;
        log_debug!("Prepared {} ({} base64 bytes)", path.display(), encoded.len());

        let raw = self.vision.recognize(&config, &encoded).await?;
        let latex = clean_latex(&raw);
        log_info!("Recognized {} chars of LaTeX from {}", latex.len(), path.display());
        Ok(latex)
    }

    pub async fn get_clipboard_image(&self) -> Result<Option<PathBuf>, BackendError> {
        let path = tokio::task::spawn_blocking(clipboard::read_image_to_temp).await??;
        if let Some(path) = &path {
            self.captures.track(path.clone());
        }
        Ok(path)
    }

    /// Delete the last clipboard capture. Called on app exit.
    pub fn discard_captures(&self) {
        self.captures.clear();
    }

    pub fn trigger_screenshot(&self) -> Result<(), BackendError> {
        screenshot::launch().map(|_| ())
    }
}

#[async_trait]
impl BackendGateway for Backend {
    async fn invoke(&self, request: BackendRequest) -> Result<BackendReply, GatewayError> {
        let reply = match request {
            BackendRequest::GetConfig => Ok(BackendReply::Config(self.get_config())),
            BackendRequest::ValidateConfig(config) => {
                Ok(BackendReply::Status(self.validate_config(&config).await))
            }
            BackendRequest::SaveConfig(config) => self.save_config(config).map(BackendReply::Status),
            BackendRequest::TestConnection(config) => {
                Ok(BackendReply::Status(self.test_connection(&config).await))
            }
            BackendRequest::ProcessImage(path) => {
                self.process_image(path).await.map(BackendReply::Markup)
            }
            BackendRequest::GetClipboardImage => self
                .get_clipboard_image()
                .await
                .map(BackendReply::ClipboardImage),
            BackendRequest::TriggerScreenshot => self.trigger_screenshot().map(|()| BackendReply::Done),
        };
        reply.map_err(|err| GatewayError::rejected(err.to_string()))
    }
}
