use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;

const ENV_FILE: &str = ".env";
const TOKEN_VAR: &str = "SLACK_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Upper bound on profile lookups in flight while building the roster.
    #[serde(default = "default_profile_concurrency")]
    pub profile_concurrency: usize,
    /// Also search private channels; the token then needs `groups:read`.
    #[serde(default, alias = "include-private-channels")]
    pub include_private_channels: bool,
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}
fn default_request_timeout() -> u64 { 10_000 }
fn default_profile_concurrency() -> usize { 8 }

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_ms: default_request_timeout(),
            profile_concurrency: default_profile_concurrency(),
            include_private_channels: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RosterConfig {
    /// Drop members whose email belongs to `staff_email_domain`.
    #[serde(default = "default_filter_staff", alias = "filter-staff")]
    pub filter_staff: bool,
    #[serde(default = "default_staff_domain", alias = "staff-email-domain")]
    pub staff_email_domain: String,
}

fn default_filter_staff() -> bool { true }
fn default_staff_domain() -> String {
    "galvanize.com".to_string()
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            filter_staff: default_filter_staff(),
            staff_email_domain: default_staff_domain(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_file() -> String {
    "questionator.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { file: default_log_file() }
    }
}

impl Config {
    /// Load the TOML config file. A missing file yields all defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config TOML")
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for (key, value) in parse_env_lines(content) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Slack token comes from the environment, or is prompted for at startup.
    /// A prompted token is saved to .env for future runs.
    pub fn slack_token() -> Result<String> {
        match std::env::var(TOKEN_VAR) {
            Ok(token) if !clean_token(&token).is_empty() => Ok(clean_token(&token)),
            _ => {
                let token = prompt_token()?;
                persist_token(&token);
                Ok(token)
            }
        }
    }
}

/// Split `.env` content into KEY/VALUE pairs, skipping blanks and comments.
fn parse_env_lines(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim().trim_start_matches("export ").trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key, value)
        })
        .collect()
}

/// Ask the operator for the token on the terminal.
fn prompt_token() -> Result<String> {
    print!("  Slack API token (xoxb-/xoxp-) > ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read token from stdin")?;
    let token = clean_token(&line);
    if token.is_empty() {
        anyhow::bail!("Slack API token cannot be empty");
    }
    Ok(token)
}

/// A pasted Slack token may carry a BOM, zero-width spaces, CR/LF, or a
/// leading `Bearer ` copied from an HTTP header.
fn clean_token(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '\r' | '\u{feff}' | '\u{200b}'))
        .collect();
    let trimmed = stripped.trim();
    trimmed
        .strip_prefix("Bearer ")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Replace `key`'s line in `.env` content, or append one.
fn upsert_env_line(contents: &str, key: &str, value: &str) -> String {
    let prefix = format!("{}=", key);
    let mut lines: Vec<String> = contents
        .lines()
        .filter(|line| !line.trim_start().starts_with(&prefix))
        .map(str::to_string)
        .collect();
    lines.push(format!("{}{}", prefix, value));
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Remember a prompted token for this process and for future runs.
fn persist_token(token: &str) {
    std::env::set_var(TOKEN_VAR, token);
    let path = Path::new(ENV_FILE);
    let existing = std::fs::read_to_string(path).unwrap_or_default();
    match std::fs::write(path, upsert_env_line(&existing, TOKEN_VAR, token)) {
        Ok(()) => tracing::info!(file = ENV_FILE, "saved {}", TOKEN_VAR),
        Err(e) => tracing::warn!(error = %e, "could not save {} to {}", TOKEN_VAR, ENV_FILE),
    }
}
