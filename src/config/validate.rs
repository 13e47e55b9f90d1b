use super::ApiConfig;

const MIN_API_KEY_LEN: usize = 10;

/// Offline checks run before any network round trip.
///
/// Returns the first problem found, phrased for the settings form.
pub fn validate_fields(config: &ApiConfig) -> Result<(), String> {
    if config.provider.trim().is_empty() {
        return Err("API provider must not be empty".into());
    }
    if config.api_url.trim().is_empty() {
        return Err("API URL must not be empty".into());
    }
    if config.api_key.trim().is_empty() {
        return Err("API key must not be empty".into());
    }
    if config.model_name.trim().is_empty() {
        return Err("Model name must not be empty".into());
    }

    let url = config.api_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("API URL must start with http:// or https://".into());
    }

    if config.api_key.len() < MIN_API_KEY_LEN {
        return Err("API key looks too short, please check it".into());
    }

    Ok(())
}
