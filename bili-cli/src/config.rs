use anyhow::{Context, Result};
use bili_resolver::{ProxyConfig, ResolverConfig, extractor::DEFAULT_UA};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "bili-cli";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Resolve every message; when off, only messages containing a trigger phrase are resolved
    pub is_auto_parse: bool,

    /// Send all nodes of one message as a single packed block
    pub is_auto_pack: bool,

    /// Size ceiling in megabytes, 0 disables the check
    pub max_video_size_mb: f64,

    /// Resolution tasks allowed to run at once
    pub max_concurrent: usize,

    /// Per-request timeout in seconds
    pub request_timeout: u64,

    /// Budget for resolving one link, in seconds
    pub session_timeout: u64,

    /// User agent string for requests
    pub user_agent: Option<String>,

    /// Enable colored output
    pub colored_output: bool,

    /// Default proxy URL (supports http, https, socks5)
    pub default_proxy: Option<String>,

    /// Default proxy username (if proxy requires authentication)
    pub default_proxy_username: Option<String>,

    /// Default proxy password (if proxy requires authentication)
    pub default_proxy_password: Option<String>,

    /// Line sent before the results of a message
    pub greeting_template: Option<String>,

    /// Text node of a resolved link; placeholders: {title} {author} {description} {url}
    pub info_template: Option<String>,

    /// Notice for an oversize link; placeholders: {url} {actual_mb} {limit_mb}
    pub oversize_template: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            is_auto_parse: true,
            is_auto_pack: true,
            max_video_size_mb: 0.0,
            max_concurrent: 10,
            request_timeout: 10,
            session_timeout: 30,
            user_agent: Some(DEFAULT_UA.to_string()),
            colored_output: true,
            default_proxy: None,
            default_proxy_username: None,
            default_proxy_password: None,
            greeting_template: None,
            info_template: None,
            oversize_template: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file or the default location
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => {
                if path.exists() {
                    let content = std::fs::read_to_string(path)
                        .context("Failed to read configuration file")?;
                    toml::from_str(&content).context("Failed to parse configuration file")
                } else {
                    Ok(Self::default())
                }
            }
            None => confy::load(APP_NAME, None).context("Failed to load configuration"),
        }
    }

    /// Get default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, None).ok()
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, toml_string).context("Failed to write configuration file")?;

        Ok(())
    }

    /// Reset configuration to defaults and save
    pub fn reset(config_path: Option<&Path>) -> Result<()> {
        let path = config_path
            .map(|p| p.to_path_buf())
            .or_else(Self::default_config_path)
            .context("No configuration path available")?;

        let default_config = Self::default();
        default_config.save(&path)?;

        Ok(())
    }

    /// Show current configuration as a formatted string
    pub fn show(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration for display")
    }

    pub fn proxy(&self) -> Option<ProxyConfig> {
        self.default_proxy.as_ref().map(|url| ProxyConfig {
            url: url.clone(),
            username: self.default_proxy_username.clone(),
            password: self.default_proxy_password.clone(),
        })
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_video_size_mb: self.max_video_size_mb,
            max_concurrent: self.max_concurrent,
            request_timeout: Duration::from_secs(self.request_timeout),
            session_timeout: Duration::from_secs(self.session_timeout),
            user_agent: self
                .user_agent
                .clone()
                .filter(|ua| !ua.is_empty())
                .unwrap_or_else(|| DEFAULT_UA.to_string()),
            proxy: self.proxy(),
        }
    }
}
