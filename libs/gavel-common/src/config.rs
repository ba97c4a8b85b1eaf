use std::env;

/// Application configuration
/// Provides defaults with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub timeout_ms: u64,
    pub languages_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("GAVEL_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3001".to_string()),
            timeout_ms: env::var("GAVEL_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            languages_path: env::var("GAVEL_LANGUAGES_PATH")
                .unwrap_or_else(|_| "config/languages.json".to_string()),
        }
    }

    pub fn new() -> Self {
        Self::from_env()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.languages_path, "config/languages.json");
    }
}
