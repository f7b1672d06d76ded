use anyhow::{Context, Result};
use questionator::cli::{self, Command};
use questionator::config::Config;
use questionator::roster::{apply_keep_mask, build_roster, Roster, RosterFilter, Selector};
use questionator::slack::rest::SlackRest;
use questionator::tui::{self, state::PruneRow};
use questionator::web;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = match cli::parse(std::env::args().skip(1))? {
        Command::Help => {
            print!("{}", cli::USAGE);
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let mut config = Config::load(&args.config_path)?;
    args.apply_to(&mut config);

    // The terminal belongs to the prune UI and operator messages; logs go to a file.
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("Failed to create log file: {}", config.logging.file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questionator=info,tower_http=info".into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    // Load saved token from .env (real env vars take precedence)
    Config::load_env_file();

    println!();
    println!("  The Questionator v{}", env!("CARGO_PKG_VERSION"));
    println!("  ======================");
    println!();

    let token = Config::slack_token()?;
    let directory = SlackRest::new(token, &config.slack)?;
    let filter = RosterFilter::from_config(&config.roster);

    match filter.staff_domain() {
        Some(domain) => println!("  Collecting members of #{} (excluding @{})...", args.channel, domain),
        None => println!("  Collecting members of #{}...", args.channel),
    }
    let (channel, mut entries) = build_roster(
        &directory,
        &args.channel,
        &filter,
        config.slack.profile_concurrency,
    )
    .await?;
    println!("  {} members found in #{}", entries.len(), channel.name);

    if args.no_prune {
        tracing::info!("roster review skipped (--no-prune)");
    } else if !std::io::stdout().is_terminal() {
        tracing::warn!("stdout is not a terminal, skipping roster review");
    } else {
        let rows: Vec<PruneRow> = entries
            .iter()
            .map(|e| PruneRow {
                name: e.name.clone(),
                username: e.username.clone(),
                removed: false,
            })
            .collect();
        let channel_name = channel.name.clone();
        let outcome = tokio::task::spawn_blocking(move || tui::run_prune(&channel_name, rows))
            .await
            .context("roster review task failed")??;

        match outcome {
            Some(mask) => {
                let before = entries.len();
                entries = apply_keep_mask(entries, &mask);
                tracing::info!(before, after = entries.len(), "roster reviewed");
            }
            None => {
                println!("  Roster review aborted, exiting.");
                return Ok(());
            }
        }
    }

    println!("  {} students ready for questioning", entries.len());
    println!(
        "  Serving #{} on http://{}:{}/  (Ctrl-C to stop, log: {})",
        channel.name, config.server.host, config.server.port, config.logging.file
    );
    println!();

    let state = web::AppState::new(channel.name, Selector::new(Roster::new(entries)));
    web::serve(state, &config.server.host, config.server.port).await
}
