//! Application configuration loaded from environment variables.

use std::path::{Path, PathBuf};

/// File name of the exported classifier artifact.
pub const MODEL_FILE_NAME: &str = "rf_success_model_balanced.onnx";

/// Browser origins the balanced service accepts cross-origin requests from.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:4000", "http://localhost:5173"];

/// Which of the two prediction services is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceVariant {
    /// Named features, probability plus thresholded class, CORS enabled.
    Balanced,
    /// Positional features, raw class label, `/test` liveness route.
    Simple,
}

impl ServiceVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceVariant::Balanced => "balanced",
            ServiceVariant::Simple => "simple",
        }
    }

    /// Where the model artifact is looked up when `MODEL_PATH` is unset.
    ///
    /// The balanced service resolves it next to its own executable, the
    /// simple service against the current working directory.
    pub fn default_model_path(&self) -> PathBuf {
        match self {
            ServiceVariant::Balanced => executable_dir().join(MODEL_FILE_NAME),
            ServiceVariant::Simple => PathBuf::from(MODEL_FILE_NAME),
        }
    }
}

impl std::fmt::Display for ServiceVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"127.0.0.1"`)
/// - `PORT`: listen port (default: `8000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `MODEL_PATH`: model artifact path (default: per variant)
/// - `CORS_ALLOWED_ORIGINS`: comma-separated origins, balanced service only
#[derive(Debug, Clone)]
pub struct Config {
    pub variant: ServiceVariant,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub model_path: PathBuf,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Default configuration for a variant, ignoring the environment.
    pub fn for_variant(variant: ServiceVariant) -> Self {
        let cors_origins = match variant {
            ServiceVariant::Balanced => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            ServiceVariant::Simple => Vec::new(),
        };
        Self {
            variant,
            host: "127.0.0.1".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            model_path: variant.default_model_path(),
            cors_origins,
        }
    }

    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env(variant: ServiceVariant) -> Self {
        let defaults = Self::for_variant(variant);
        let cors_origins = match variant {
            ServiceVariant::Balanced => std::env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|raw| parse_origins(&raw))
                .filter(|origins| !origins.is_empty())
                .unwrap_or(defaults.cors_origins),
            ServiceVariant::Simple => Vec::new(),
        };

        Self {
            variant,
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            model_path: std::env::var_os("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            cors_origins,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &["HOST", "PORT", "RUST_LOG", "MODEL_PATH", "CORS_ALLOWED_ORIGINS"];

    fn clear_env() {
        for var in VARS {
            // SAFETY: env-mutating tests are serialized.
            unsafe { std::env::remove_var(var) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: env-mutating tests are serialized.
        unsafe { std::env::set_var(key, value) };
    }

    #[test]
    fn test_default_values() {
        let config = Config::for_variant(ServiceVariant::Balanced);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8000);
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:4000", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_addr_default() {
        let config = Config::for_variant(ServiceVariant::Simple);
        assert_eq!(config.addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_simple_model_path_is_cwd_relative() {
        let config = Config::for_variant(ServiceVariant::Simple);
        assert_eq!(config.model_path, PathBuf::from(MODEL_FILE_NAME));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_balanced_model_path_is_next_to_executable() {
        let path = ServiceVariant::Balanced.default_model_path();
        assert!(path.is_absolute());
        assert!(path.ends_with(MODEL_FILE_NAME));
        let exe = std::env::current_exe().unwrap();
        assert_eq!(path.parent(), exe.parent());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        set_env("HOST", "0.0.0.0");
        set_env("PORT", "9100");
        set_env("MODEL_PATH", "/srv/models/classifier.onnx");
        set_env("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,");

        let config = Config::from_env(ServiceVariant::Balanced);
        assert_eq!(config.addr(), "0.0.0.0:9100");
        assert_eq!(config.model_path, PathBuf::from("/srv/models/classifier.onnx"));
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_bad_port_falls_back() {
        clear_env();
        set_env("PORT", "not-a-port");
        let config = Config::from_env(ServiceVariant::Balanced);
        assert_eq!(config.port, 8000);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_simple_ignores_cors_origins() {
        clear_env();
        set_env("CORS_ALLOWED_ORIGINS", "https://a.example");
        let config = Config::from_env(ServiceVariant::Simple);
        assert!(config.cors_origins.is_empty());
        clear_env();
    }
}
