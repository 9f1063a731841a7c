//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.storage.dir.trim().is_empty() {
        errors.push("storage.dir must not be empty".to_string());
    }
    let key = config.storage.key.trim();
    if key.is_empty() {
        errors.push("storage.key must not be empty".to_string());
    } else if crate::utils::safe_filename(key) != key {
        errors.push(format!(
            "storage.key '{}' may only contain letters, digits, '-', '_' and '.'",
            key
        ));
    }
    if config.storage.max_sessions == 0 {
        errors.push("storage.max_sessions must be > 0".to_string());
    }

    if config.session.preview_chars == 0 {
        errors.push("session.preview_chars must be > 0".to_string());
    }

    if !matches!(
        config.logging.format.to_ascii_lowercase().as_str(),
        "text" | "json"
    ) {
        errors.push(format!(
            "logging.format must be 'text' or 'json', got '{}'",
            config.logging.format
        ));
    }
    if config.logging.retention_days == 0 {
        errors.push("logging.retention_days must be > 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
