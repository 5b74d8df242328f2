use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Agent string sent with every request and matched against robots.txt groups
pub const DEFAULT_USER_AGENT: &str = "webspider/1.0";

/// Main configuration structure for webspider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl session configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerConfig {
    /// Address the crawl starts from (the CLI may override it)
    #[serde(default)]
    pub seed: Option<String>,

    /// Replaces the default `<base>/robots.txt` location
    #[serde(default, rename = "robots-url")]
    pub robots_url: Option<String>,

    /// Whole-request timeout in seconds; absent means transport defaults
    #[serde(default, rename = "request-timeout")]
    pub request_timeout: Option<u64>,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }
}

/// Fixed headers attached to every outbound request
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_user_agent", rename = "user-agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language", rename = "accept-language")]
    pub accept_language: String,

    #[serde(default = "default_content_type", rename = "content-type")]
    pub content_type: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            content_type: default_content_type(),
        }
    }
}

/// Link file export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the per-category link files are written into
    #[serde(default = "default_directory")]
    pub directory: String,

    /// File extension of the link files, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Replace link files left by an earlier crawl of the same host
    #[serde(default)]
    pub overwrite: bool,
}

impl OutputConfig {
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            extension: default_extension(),
            overwrite: false,
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    "en".to_string()
}

fn default_content_type() -> String {
    "application/x-www-form-urlencoded".to_string()
}

fn default_directory() -> String {
    "./crawl-output".to_string()
}

fn default_extension() -> String {
    "txt".to_string()
}
