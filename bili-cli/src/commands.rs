use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::{CliError, Result},
    output::{OutputManager, Templates, write_output},
};
use bili_resolver::{ProxyConfig, Resolver, extractor::links::extract_links};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::{path::Path, sync::LazyLock, time::Duration};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Phrases that request resolution when auto-parse is off.
static TRIGGER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"B站解析|b站解析|bilibili解析").unwrap());

pub struct CommandExecutor {
    config: AppConfig,
    resolver: Resolver,
}

impl CommandExecutor {
    pub fn new(config: AppConfig) -> Result<Self> {
        let resolver = Resolver::new(config.resolver_config())?;
        Ok(Self { config, resolver })
    }

    pub fn new_with_proxy(
        config: AppConfig,
        proxy_url: Option<String>,
        proxy_username: Option<String>,
        proxy_password: Option<String>,
    ) -> Result<Self> {
        let mut resolver_config = config.resolver_config();
        resolver_config.proxy = proxy_url.map(|url| ProxyConfig {
            url,
            username: proxy_username.or_else(|| config.default_proxy_username.clone()),
            password: proxy_password.or_else(|| config.default_proxy_password.clone()),
        });

        let resolver = Resolver::new(resolver_config)?;
        Ok(Self { config, resolver })
    }

    /// Whether a message should be resolved at all.
    pub fn should_parse(&self, text: &str) -> bool {
        should_parse(self.config.is_auto_parse, text)
    }

    pub async fn resolve_text(
        &self,
        text: &str,
        output_format: OutputFormat,
        output_file: Option<&Path>,
        pack: Option<bool>,
        force: bool,
    ) -> Result<()> {
        if !force && !self.should_parse(text) {
            debug!("auto-parse is off and no trigger phrase found, ignoring message");
            return Ok(());
        }

        let pb = self.create_progress_bar("Resolving...");
        let outcomes = self.resolver.resolve(text).await;
        pb.finish_and_clear();

        if outcomes.is_empty() {
            info!("No Bilibili links found");
            return Ok(());
        }

        let resolved = outcomes.iter().filter(|o| o.is_resolved()).count();
        info!(links = outcomes.len(), resolved, "resolution finished");

        let output_manager = OutputManager::new(
            self.config.colored_output,
            Templates::from_config(&self.config),
        );
        let output = output_manager.format_outcomes(
            &outcomes,
            &output_format,
            pack.unwrap_or(self.config.is_auto_pack),
        )?;

        if output.is_empty() {
            debug!("every link was skipped, nothing to send");
            return Ok(());
        }

        write_output(&output, output_file)
    }

    fn create_progress_bar(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(500));
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        pb.set_message(message.to_string());
        pb
    }
}

/// Lists the links found in `text`; needs no network access.
pub fn print_links(config: &AppConfig, text: &str, output_format: OutputFormat) -> Result<()> {
    let links = extract_links(text);
    let output_manager = OutputManager::new(config.colored_output, Templates::from_config(config));
    let output = output_manager.format_links(&links, &output_format)?;
    write_output(&output, None)
}

pub fn should_parse(is_auto_parse: bool, text: &str) -> bool {
    is_auto_parse || TRIGGER_REGEX.is_match(text)
}

/// Returns the message text from the argument, or reads it from stdin.
pub async fn read_input(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    let mut buffer = String::new();
    tokio::io::stdin().read_to_string(&mut buffer).await?;
    if buffer.trim().is_empty() {
        return Err(CliError::invalid_input("No message text given"));
    }
    Ok(buffer)
}
