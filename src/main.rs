use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use conventional_release::action::{ActionContext, CommandFile};
use conventional_release::assets::resolve_assets;
use conventional_release::cli::{run_compute, run_publish, write_compute_results};
use conventional_release::config::{self, Config};
use conventional_release::github::GithubClient;
use conventional_release::handoff::ReleaseHandoff;
use conventional_release::ui;

#[derive(Parser)]
#[command(
    name = "conventional-release",
    version,
    about = "Compute semantic versions from conventional commits and publish GitHub releases"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the next version and changelog since the last release
    Compute {
        #[arg(long, help = "Version used when no release exists yet")]
        init_version: Option<String>,

        #[arg(long, help = "Prefix of release tags")]
        tag_prefix: Option<String>,

        #[arg(long, help = "Print the plan without writing outputs or state")]
        dry_run: bool,
    },
    /// Create the computed release and upload its assets
    Publish {
        #[arg(long = "assets", help = "Glob pattern of files to upload (repeatable)")]
        assets: Vec<String>,

        #[arg(long, help = "Show what would be published without calling the API")]
        dry_run: bool,
    },
}

fn main() {
    let args = Args::parse();
    let ctx = ActionContext::from_env();

    setup_logging(args.debug || ctx.runner_debug());

    if let Err(e) = run(args, &ctx) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Set up logging/tracing.
fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::try_new("conventional_release=debug,info")
            .unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if debug {
        tracing::debug!("Debug logging enabled");
    }
}

fn run(args: Args, ctx: &ActionContext) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref())?;
    config.apply_inputs(ctx);

    match args.command {
        Command::Compute {
            init_version,
            tag_prefix,
            dry_run,
        } => {
            if let Some(init_version) = init_version {
                config.version.init_version = init_version;
            }
            if let Some(tag_prefix) = tag_prefix {
                config.version.tag_prefix = tag_prefix;
            }
            config.validate()?;

            compute(&config, ctx, dry_run)
        }
        Command::Publish { assets, dry_run } => {
            if !assets.is_empty() {
                config.assets.patterns = assets;
            }

            publish(&config, ctx, dry_run)
        }
    }
}

fn compute(config: &Config, ctx: &ActionContext, dry_run: bool) -> Result<()> {
    let client = GithubClient::new(ctx.repository()?, config.release.max_release_pages);

    ui::display_status("Computing next version from commit history...");
    let outcome = run_compute(&client, config)?;

    for warning in &outcome.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_plan(&outcome.plan);

    if dry_run {
        ui::display_status("Dry run: outputs and state not written");
        return Ok(());
    }

    let mut outputs = CommandFile::new(ctx.output_file());
    let mut state = CommandFile::new(ctx.state_file());
    write_compute_results(&outcome, &config.version.tag_prefix, &mut outputs, &mut state)
        .context("failed to write outputs")?;

    if outcome.plan.released {
        ui::display_success(&format!("Next release: {}", outcome.plan.tag));
    } else {
        ui::display_success("No release needed");
    }

    Ok(())
}

fn publish(config: &Config, ctx: &ActionContext, dry_run: bool) -> Result<()> {
    let handoff = ReleaseHandoff::from_entries(|key| ctx.state(key))
        .context("compute phase state is missing or invalid")?;

    if !handoff.released {
        ui::display_status("release: skip, no new version");
        return Ok(());
    }

    let asset_files = resolve_assets(&config.assets.patterns)?;

    if dry_run {
        ui::display_status(&format!("Dry run: would create release {}", handoff.tag));
        for line in ui::changelog_lines(&handoff.changelog, usize::MAX) {
            eprintln!("{}", line);
        }
        for file in &asset_files {
            ui::display_status(&format!("Dry run: would upload {}", file.display()));
        }
        return Ok(());
    }

    let client = GithubClient::new(ctx.repository()?, config.release.max_release_pages);
    let outcome = run_publish(&client, &handoff, &asset_files)?;

    if let Some(release) = &outcome.release {
        ui::display_publish_summary(release, &outcome.assets);
    }

    Ok(())
}
