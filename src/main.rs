use anyhow::Context;
use clap::{Parser, Subcommand};
use folio::{
    config::SiteConfig,
    content::Library,
    output::{build, serve, Site},
    stats::{GithubClient, StatsCache},
    view::location,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Single-page portfolio website generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file path; content directories are relative to it
    #[arg(short = 'C', long, default_value = "folio.toml", value_hint = clap::ValueHint::FilePath)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every page into the output directory
    #[command(visible_alias = "b")]
    Build,

    /// Serve the site, rendering the page for each request's location
    #[command(visible_alias = "s")]
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        addr: String,
    },

    /// Print every published record with its location
    #[command(visible_alias = "l")]
    List,
}

fn main() -> anyhow::Result<()> {
    let start = Instant::now();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = SiteConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let library = Library::load(config.content_sources()).context("failed to load content")?;

    info!(
        "({:.1}s) Found {} posts and {} work updates",
        start.elapsed().as_secs_f32(),
        library.posts.len(),
        library.updates.len(),
    );

    let stats = StatsCache::new(config.github.cache_ttl(), config.github.fallback.clone());
    let github = config.github.username.as_ref().and_then(|username| {
        GithubClient::new(username, config.github.token(), config.github.timeout())
            .inspect_err(|e| warn!("GitHub stats disabled: {e}"))
            .ok()
    });
    let site = Site {
        config: &config,
        library: &library,
        stats: &stats,
    };

    match cli.command {
        Command::List => {
            for record in library.records() {
                println!(
                    "{}\t{}\t{}",
                    location::encode(Some(&record.key())),
                    record.date,
                    record.title
                );
            }
        }
        Command::Build => {
            if let Some(github) = &github {
                stats.refresh(|fallback| github.fetch_blocking(fallback));
            }
            let output = site.output();
            info!(
                "({:.1}s) Generated output manifest",
                start.elapsed().as_secs_f32(),
            );
            build(start, &config, &output).context("failed to save website")?;
        }
        Command::Serve { addr } => {
            let refresh = github.as_ref().map(|github| {
                let stats = &stats;
                move || {
                    stats.refresh(|fallback| github.fetch_blocking(fallback));
                }
            });
            let output = site.output();
            serve(
                start,
                &addr,
                site,
                &output,
                refresh.as_ref().map(|refresh| refresh as &(dyn Fn() + Sync)),
            )
            .with_context(|| format!("failed to serve on {addr}"))?;
        }
    }

    Ok(())
}
