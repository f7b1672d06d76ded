use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;

pub const USAGE: &str = "\
The Questionator, a lazy way to ask the class a question.

Usage: questionator --chan <CHANNEL> [options]

Options:
  --chan <CHANNEL>          Slack channel whose members form the roster
  --port <PORT>             Port to serve on (default 8080)
  --host <ADDR>             Address to bind (default 0.0.0.0)
  --no-filter               Keep members with a staff email address
  --exclude-domain <DOMAIN> Staff email domain to filter out
  --no-prune                Skip the interactive roster review
  --config <PATH>           Config file (default questionator.toml)
  -h, --help                Print this help
";

const DEFAULT_CONFIG: &str = "questionator.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub channel: String,
    pub port: Option<u16>,
    pub host: Option<String>,
    pub no_filter: bool,
    pub exclude_domain: Option<String>,
    pub no_prune: bool,
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliArgs),
    Help,
}

/// Parse flags (without the program name). Accepts `--flag value` and
/// `--flag=value`.
pub fn parse<I, S>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut channel = None;
    let mut port = None;
    let mut host = None;
    let mut no_filter = false;
    let mut exclude_domain = None;
    let mut no_prune = false;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG);

    let mut iter = args.into_iter().map(Into::into);
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => match iter.next() {
                    Some(v) if v.starts_with("--") => {
                        anyhow::bail!("{} requires a value, got flag {}", name, v)
                    }
                    Some(v) => Ok(v),
                    None => anyhow::bail!("{} requires a value", name),
                },
            }
        };

        match flag.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--chan" | "--channel" => channel = Some(value("--chan")?),
            "--port" => {
                let raw = value("--port")?;
                let parsed = raw
                    .parse::<u16>()
                    .with_context(|| format!("invalid port: {}", raw))?;
                port = Some(parsed);
            }
            "--host" => host = Some(value("--host")?),
            "--exclude-domain" => exclude_domain = Some(value("--exclude-domain")?),
            "--config" => config_path = PathBuf::from(value("--config")?),
            "--no-filter" => no_filter = true,
            "--no-prune" => no_prune = true,
            other => anyhow::bail!("unknown argument: {}\n\n{}", other, USAGE),
        }
    }

    let channel = channel
        .filter(|c| !c.trim().is_empty())
        .with_context(|| format!("--chan is required\n\n{}", USAGE))?;

    Ok(Command::Run(CliArgs {
        channel,
        port,
        host,
        no_filter,
        exclude_domain,
        no_prune,
        config_path,
    }))
}

impl CliArgs {
    /// Command-line flags win over the config file.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(ref domain) = self.exclude_domain {
            config.roster.staff_email_domain = domain.clone();
            config.roster.filter_staff = true;
        }
        if self.no_filter {
            config.roster.filter_staff = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> CliArgs {
        match parse(args.iter().copied()).unwrap() {
            Command::Run(a) => a,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_channel_only() {
        let args = run(&["--chan", "g39ds_platte"]);
        assert_eq!(args.channel, "g39ds_platte");
        assert_eq!(args.port, None);
        assert!(!args.no_filter);
        assert!(!args.no_prune);
        assert_eq!(args.config_path, PathBuf::from("questionator.toml"));
    }

    #[test]
    fn test_inline_values() {
        let args = run(&["--chan=g39ds_platte", "--port=9090", "--no-filter", "--no-prune"]);
        assert_eq!(args.channel, "g39ds_platte");
        assert_eq!(args.port, Some(9090));
        assert!(args.no_filter);
        assert!(args.no_prune);
    }

    #[test]
    fn test_missing_channel_is_error() {
        assert!(parse(["--port", "8080"]).is_err());
        assert!(parse(["--chan="]).is_err());
    }

    #[test]
    fn test_bad_port_is_error() {
        let err = parse(["--chan", "c", "--port", "99999"]).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid port"));
    }

    #[test]
    fn test_flag_without_value_is_error() {
        assert!(parse(["--chan"]).is_err());
    }

    #[test]
    fn test_flag_is_not_taken_as_value() {
        let err = parse(["--chan", "--port", "8080"]).unwrap_err();
        assert!(format!("{:#}", err).contains("got flag --port"));
        assert!(parse(["--chan", "c", "--host", "--no-prune"]).is_err());
    }

    #[test]
    fn test_inline_value_may_start_with_dashes() {
        let args = run(&["--chan=--odd-name"]);
        assert_eq!(args.channel, "--odd-name");
    }

    #[test]
    fn test_unknown_flag_is_error() {
        assert!(parse(["--chan", "c", "--verbose"]).is_err());
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(["--chan", "c", "-h"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        let args = run(&["--chan", "c", "--port", "5000", "--host", "127.0.0.1", "--exclude-domain", "school.edu"]);
        args.apply_to(&mut config);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.roster.staff_email_domain, "school.edu");
        assert!(config.roster.filter_staff);

        let args = run(&["--chan", "c", "--no-filter"]);
        args.apply_to(&mut config);
        assert!(!config.roster.filter_staff);
    }
}
