use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use url::Url;

use super::timeline::TimelineConfig;

/// The main configuration structure for the Parlor client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the chat server.
    pub server_url: String,

    /// Logging level filter, e.g. `info` or `timeline=debug`.
    pub log_level: String,

    /// Timeline engine settings.
    #[serde(default)]
    pub timeline: TimelineConfig,
}

impl Config {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            log_level: "info".to_string(),
            timeline: TimelineConfig::default(),
        }
    }

    /// Loads the configuration from a file, environment variables, or
    /// defaults, in that order of precedence (later layers only fill
    /// values the earlier ones left at their defaults).
    ///
    /// # Arguments
    /// * `config_path` - Optional path to the configuration file.
    /// * `server_override` - Optional server URL taking precedence
    ///   over everything else.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is in an
    /// unsupported format, or the resolved configuration fails
    /// validation.
    pub fn load_config(
        config_path: Option<PathBuf>,
        server_override: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::with_defaults();

        // Load from file if provided
        if let Some(path) = config_path {
            let content = fs::read_to_string(&path)?;
            let file_config: Self = match path.extension().and_then(|ext| ext.to_str()) {
                Some("yaml" | "yml") => serde_yml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                _ => {
                    return Err("Unsupported configuration format. Use 'yaml' or 'json'.".into());
                }
            };

            config.server_url = file_config.server_url;
            config.log_level = file_config.log_level;
            config.timeline = file_config.timeline;
        }

        // Use environment variables only if values are not already set
        let defaults = Self::with_defaults();
        if config.server_url == defaults.server_url
            && let Ok(server_url) = env::var("PARLOR_SERVER_URL")
        {
            config.server_url = server_url;
        }
        if config.log_level == defaults.log_level
            && let Ok(log_level) = env::var("PARLOR_LOG_LEVEL")
        {
            config.log_level = log_level;
        }
        if config.timeline.gap_threshold_seconds == defaults.timeline.gap_threshold_seconds
            && let Ok(threshold) = env::var("PARLOR_GAP_THRESHOLD_SECONDS")
        {
            config.timeline.gap_threshold_seconds = threshold.parse().map_err(|_| {
                "Invalid PARLOR_GAP_THRESHOLD_SECONDS value: must be a number of seconds"
            })?;
        }
        if config.timeline.history_page_size == defaults.timeline.history_page_size
            && let Ok(page_size) = env::var("PARLOR_HISTORY_PAGE_SIZE")
        {
            config.timeline.history_page_size = page_size
                .parse()
                .map_err(|_| "Invalid PARLOR_HISTORY_PAGE_SIZE value: must be a positive number")?;
        }

        // Override with command-line arguments if provided
        if let Some(server_url) = server_override {
            config.server_url = server_url;
        }

        // Validate configuration
        Url::parse(&config.server_url)
            .map_err(|err| format!("Invalid server URL '{}': {err}", config.server_url))?;
        if config.timeline.history_page_size == 0 {
            return Err("Invalid history page size. Must be greater than 0.".into());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        // Safety note: tests touching process env are serialised.
        unsafe {
            env::remove_var("PARLOR_SERVER_URL");
            env::remove_var("PARLOR_LOG_LEVEL");
            env::remove_var("PARLOR_GAP_THRESHOLD_SECONDS");
            env::remove_var("PARLOR_HISTORY_PAGE_SIZE");
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::load_config(None, None).expect("defaults should load");
        assert_eq!(config.server_url, "http://localhost:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.timeline.gap_threshold_seconds, 600);
    }

    #[test]
    #[serial]
    fn test_load_from_yaml_file() {
        clear_env();
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("tempfile");
        writeln!(
            file,
            "server_url: https://chat.example.org\nlog_level: debug\ntimeline:\n  gap_threshold_seconds: 120"
        )
        .expect("write config");

        let config = Config::load_config(Some(file.path().to_path_buf()), None)
            .expect("yaml config should load");
        assert_eq!(config.server_url, "https://chat.example.org");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.timeline.gap_threshold_seconds, 120);
        assert_eq!(config.timeline.history_page_size, 30);
    }

    #[test]
    #[serial]
    fn test_unsupported_extension_rejected() {
        clear_env();
        let file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        let result = Config::load_config(Some(file.path().to_path_buf()), None);
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        clear_env();
        unsafe {
            env::set_var("PARLOR_SERVER_URL", "https://env.example.org");
            env::set_var("PARLOR_GAP_THRESHOLD_SECONDS", "300");
        }
        let config = Config::load_config(None, None).expect("env config should load");
        assert_eq!(config.server_url, "https://env.example.org");
        assert_eq!(config.timeline.gap_threshold_seconds, 300);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_server_override_wins() {
        clear_env();
        unsafe {
            env::set_var("PARLOR_SERVER_URL", "https://env.example.org");
        }
        let config = Config::load_config(None, Some("https://flag.example.org".to_string()))
            .expect("override config should load");
        assert_eq!(config.server_url, "https://flag.example.org");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_server_url_rejected() {
        clear_env();
        let result = Config::load_config(None, Some("not a url".to_string()));
        assert!(result.is_err());
    }
}
