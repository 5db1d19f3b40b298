//! Service configuration
//!
//! Server settings come from environment variables with local-development
//! defaults. The country dialing-code whitelist is a YAML resource loaded
//! once at startup.

use anyhow::Context;
use config::{Config, File, FileFormat};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HOST`: bind address (default: 0.0.0.0)
    /// - `PORT`: bind port (default: 3000)
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self { host, port }
    }

    /// Address string suitable for a TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Country dialing-code whitelist
///
/// Maps supported country codes to their international dialing codes. The
/// whitelist gates the `international_code` registration field.
#[derive(Debug, Clone)]
pub struct CountryCodes {
    codes: HashMap<String, String>,
}

impl CountryCodes {
    /// Load the whitelist from the configured YAML file
    ///
    /// `COUNTRY_DIALING_CODES` overrides the file location. The path is
    /// tried as given first, then relative to the crate root.
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var("COUNTRY_DIALING_CODES")
            .unwrap_or_else(|_| "config/country_dialing_codes.yml".to_string());

        let raw = std::fs::read_to_string(&path)
            .or_else(|_| {
                let mut fallback = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                fallback.push(&path);
                std::fs::read_to_string(fallback)
            })
            .with_context(|| format!("Failed to read country dialing codes from {}", path))?;

        Self::from_yaml(&raw)
    }

    /// Parse a whitelist from YAML text
    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Yaml))
            .build()
            .context("Failed to parse country dialing codes")?;

        let codes: HashMap<String, String> = settings
            .try_deserialize()
            .context("Country dialing codes must map country to dialing code")?;

        // The config crate lowercases keys; country codes are uppercase.
        let codes = codes
            .into_iter()
            .map(|(country, code)| (country.to_uppercase(), code))
            .collect();

        Ok(Self { codes })
    }

    /// Whether a country code is in the whitelist
    pub fn is_supported(&self, country: &str) -> bool {
        self.codes.contains_key(country)
    }

    /// Dialing code for a supported country
    pub fn dialing_code(&self, country: &str) -> Option<&str> {
        self.codes.get(country).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SAMPLE: &str = "MX: \"52\"\nUS: \"1\"\nCA: \"1\"\n";

    #[test]
    fn test_from_yaml_parses_dialing_codes() {
        let codes = CountryCodes::from_yaml(SAMPLE).expect("Failed to parse sample YAML");
        assert_eq!(codes.dialing_code("MX"), Some("52"));
        assert_eq!(codes.dialing_code("US"), Some("1"));
        assert_eq!(codes.dialing_code("CA"), Some("1"));
    }

    #[test]
    fn test_is_supported_is_exact() {
        let codes = CountryCodes::from_yaml(SAMPLE).expect("Failed to parse sample YAML");
        assert!(codes.is_supported("MX"));
        assert!(!codes.is_supported("INVALID"));
        assert!(!codes.is_supported("mx"));
        assert!(!codes.is_supported(""));
    }

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        unsafe {
            std::env::remove_var("HOST");
            std::env::remove_var("PORT");
        }

        let config = ServerConfig::from_env();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_server_config_env_overrides() {
        unsafe {
            std::env::set_var("HOST", "127.0.0.1");
            std::env::set_var("PORT", "8080");
        }

        let config = ServerConfig::from_env();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");

        unsafe {
            std::env::remove_var("HOST");
            std::env::remove_var("PORT");
        }
    }

    #[test]
    #[serial]
    fn test_load_reads_bundled_whitelist() {
        unsafe {
            std::env::remove_var("COUNTRY_DIALING_CODES");
        }

        let codes = CountryCodes::load().expect("Failed to load bundled whitelist");
        assert!(codes.is_supported("MX"));
        assert!(codes.is_supported("US"));
        assert!(codes.is_supported("CA"));
    }
}
