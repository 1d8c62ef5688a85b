use crate::query::{FilterError, PageSize};
use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

/// Config, from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the posts service, e.g. `http://localhost:8000/api/`. Endpoint paths are joined
    /// onto it.
    pub api_base_url: String,

    /// By default, output JSON logs. Only if this flag is set to true, output colourful human-friendly logs
    pub human_logs: bool,

    /// Rows per page when the query doesn't say otherwise. One of 25, 50, 100.
    #[serde(default = "page_size")]
    pub page_size: u32,

    /// Maximum seconds to wait for any single request
    #[serde(default = "request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Max HTTP body size accepted from the service. Exports are the large ones.
    #[serde(default = "max_response_bytes")]
    pub max_response_bytes: usize,

    /// Where exports are written. Defaults to the working directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Sent as a bearer token with every request, if set.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Config {
    pub fn from_file(filepath: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(filepath)
            .with_context(|| format!("couldn't read config file {}", filepath))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents).context("couldn't parse config file")?;
        config.default_page_size().context("invalid page_size in config")?;
        Ok(config)
    }

    pub fn default_page_size(&self) -> Result<PageSize, FilterError> {
        PageSize::new(self.page_size)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn page_size() -> u32 {
    50
}

fn request_timeout_secs() -> u64 {
    30
}

fn max_response_bytes() -> usize {
    64 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml(
            r#"
            api_base_url = "http://localhost:8000/api/"
            human_logs = true
            "#,
        )
        .unwrap();
        assert_eq!(config.default_page_size().unwrap().get(), 50);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_response_bytes, 64 * 1024 * 1024);
        assert_eq!(config.export_dir(), PathBuf::from("."));
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn test_page_size_is_checked() {
        let err = Config::from_toml(
            r#"
            api_base_url = "http://localhost:8000/api/"
            human_logs = false
            page_size = 40
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("page size 40"));
    }

    #[test]
    fn test_missing_base_url() {
        assert!(Config::from_toml("human_logs = true").is_err());
    }
}
