//! Rule-driven labeler for GitHub issues and pull requests.
//!
//! Reads the triggering webhook event payload, evaluates the configured
//! label rules against the item, and reconciles the computed decision
//! with the item's current labels through the GitHub API.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use autolabel::config::Config;
use autolabel::context::{self, ItemContext};
use autolabel::engine;
use autolabel::github::GithubClient;

#[derive(Parser)]
#[command(name = "autolabel")]
#[command(about = "Rule-driven issue and pull request labeler")]
#[command(version)]
struct Cli {
    /// Path to the labeling configuration (JSON or YAML)
    #[arg(long, default_value = ".github/labels.json")]
    config: PathBuf,

    /// Path to the webhook event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: PathBuf,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// API token used for label reads and mutations
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Compute and log operations without mutating anything
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("autolabel=debug,info")
    } else {
        EnvFilter::new("autolabel=info,warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    config.validate().context("validating config")?;

    let payload = fs::read_to_string(&cli.event_path)
        .with_context(|| format!("reading event payload from {}", cli.event_path.display()))?;
    let Some(item) = context::parse_event(&payload)? else {
        info!("event concerns neither an issue nor a pull request, nothing to do");
        return Ok(());
    };

    let (owner, repo) = cli
        .repo
        .split_once('/')
        .context("--repo must be in owner/name form")?;
    let mut client = GithubClient::new(cli.token, owner.to_string(), repo.to_string())
        .context("building GitHub client")?;

    if cli.dry_run {
        info!("dry run: skipping label catalog sync");
    } else {
        client
            .sync_labels(&config.labels)
            .await
            .context("syncing label catalog")?;
    }

    let names = config.display_names();

    let (number, operations) = match item {
        ItemContext::Issue(ctx) => {
            debug!("labeling issue #{}", ctx.number);
            let operations = engine::run(
                &config.issue,
                &config.issue_fallback,
                &config.skip_labeling,
                &names,
                &ctx.props,
                &ctx.labels,
            );
            (ctx.number, operations)
        }
        ItemContext::Pr(mut ctx) => {
            debug!("labeling pull request #{}", ctx.number);
            ctx.props.files = client
                .pr_files(ctx.number)
                .await
                .context("listing changed files")?;
            let operations = engine::run(
                &config.pr,
                &config.pr_fallback,
                &config.skip_labeling,
                &names,
                &ctx.props,
                &ctx.labels,
            );
            (ctx.number, operations)
        }
    };

    if operations.is_empty() {
        info!("#{number} already carries the right labels");
        return Ok(());
    }

    if cli.dry_run {
        for operation in &operations {
            info!("dry run: would {} \"{}\"", operation.action, operation.label);
        }
        return Ok(());
    }

    client
        .apply(number, &operations)
        .await
        .context("applying label operations")?;
    info!("applied {} label operation(s) to #{number}", operations.len());

    Ok(())
}
