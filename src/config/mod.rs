pub mod store;
pub mod validate;

pub use store::ConfigStore;
pub use validate::validate_fields;

use serde::{Deserialize, Serialize};

pub const PROVIDER_SILICONFLOW: &str = "SiliconFlow";
pub const PROVIDER_CUSTOM: &str = "custom";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional mathematical formula recognition system. Follow these rules strictly:
1. Focus on the formulas, symbols, Greek letters and operators in the image
2. Output standard LaTeX that a compiler can parse
3. Every formula must be on a single line (never use \\begin{align} or other multi-line environments)
4. Join multi-line formulas with spaces into one line
5. Do not add any explanation, output only the LaTeX code";

/// Connection settings for the vision model.
///
/// Field names are part of the IPC contract with the webview and of the
/// on-disk `config.json`, so they stay snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enabled: bool,
    pub provider: String,
    pub api_url: String,
    pub api_key: String,
    pub model_name: String,
    pub system_prompt: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: PROVIDER_SILICONFLOW.into(),
            api_url: "https://api.siliconflow.cn/v1".into(),
            api_key: String::new(),
            model_name: "Qwen/Qwen2.5-VL-72B-Instruct".into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }
}

impl ApiConfig {
    pub fn is_known_provider(&self) -> bool {
        self.provider == PROVIDER_SILICONFLOW
    }

    /// `api_url` without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_snake_case_fields() {
        let json = r#"{
            "enabled": false,
            "provider": "custom",
            "api_url": "https://example.com/v1/",
            "api_key": "sk-0123456789",
            "model_name": "gpt-4o",
            "system_prompt": "latex only"
        }"#;
        let config: ApiConfig = serde_json::from_str(json).unwrap();
        assert!(!config.enabled);
        assert!(!config.is_known_provider());
        assert_eq!(config.base_url(), "https://example.com/v1");
        assert_eq!(config.model_name, "gpt-4o");
    }

    #[test]
    fn default_points_at_siliconflow() {
        let config = ApiConfig::default();
        assert!(config.enabled);
        assert!(config.is_known_provider());
        assert!(config.api_key.is_empty());
        assert!(config.system_prompt.contains("LaTeX"));
    }
}
