//! wyrd-ag - Catalog aggregation and site generation
//!
//! Collects phenomenon source documents, normalizes them, and writes the
//! static API (`api/v1/`) and pages (`phenomena/`) of the site.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, error, info, warn};
use wyrd_common::config::{try_load_toml_config, SourceMode};
use wyrd_ag::config::{AgSettings, CliOverrides};
use wyrd_ag::{pipeline, serve, Pipeline};

/// Command-line arguments for wyrd-ag
#[derive(Parser, Debug)]
#[command(name = "wyrd-ag")]
#[command(about = "Aggregates phenomenon sources into the Wyrdness catalog")]
#[command(version)]
struct Args {
    /// Site root; api/v1/ and phenomena/ are generated beneath it
    #[arg(long, global = true)]
    site_root: Option<PathBuf>,

    /// TOML config file (default: platform config dir, wyrdness/wyrd-ag.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect and normalize sources, write per-record files and index.json
    Aggregate(SourceArgs),
    /// Regenerate categories.json from index.json
    Categories,
    /// Regenerate stats.json from index.json
    Stats,
    /// Render phenomena/{id}/index.html from index.json
    Pages(TemplateArgs),
    /// Full run: aggregate, then categories, stats and pages
    Generate {
        #[command(flatten)]
        sources: SourceArgs,
        #[command(flatten)]
        template: TemplateArgs,
    },
    /// Serve the site root for local preview
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "WYRD_SERVE_PORT")]
        port: u16,
    },
}

#[derive(clap::Args, Debug, Default)]
struct SourceArgs {
    /// Collection strategy: local or remote
    #[arg(long)]
    mode: Option<SourceMode>,

    /// Parent directory of local source directories
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Remote organisation owning the source repositories
    #[arg(long)]
    org: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
struct TemplateArgs {
    /// Page template file
    #[arg(long)]
    template: Option<PathBuf>,
}

fn overrides(site_root: Option<PathBuf>, sources: Option<&SourceArgs>, template: Option<&TemplateArgs>) -> CliOverrides {
    CliOverrides {
        site_root,
        mode: sources.and_then(|s| s.mode),
        source_root: sources.and_then(|s| s.source_root.clone()),
        org: sources.and_then(|s| s.org.clone()),
        template: template.and_then(|t| t.template.clone()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging level comes from the config, so its diagnostics wait for init_tracing
    let loaded = try_load_toml_config(args.config.as_deref(), "wyrd-ag");
    let cli = match &args.command {
        Command::Aggregate(sources) => overrides(args.site_root.clone(), Some(sources), None),
        Command::Pages(template) => overrides(args.site_root.clone(), None, Some(template)),
        Command::Generate { sources, template } => {
            overrides(args.site_root.clone(), Some(sources), Some(template))
        }
        Command::Categories | Command::Stats | Command::Serve { .. } => {
            overrides(args.site_root.clone(), None, None)
        }
    };
    let settings = AgSettings::resolve(cli, loaded.config);

    wyrd_common::logging::init_tracing(&settings.log_level)?;
    match (&loaded.warning, &loaded.path) {
        (Some(warning), _) => warn!("{}", warning),
        (None, Some(path)) => debug!("Loaded config from {}", path.display()),
        (None, None) => debug!("No config file found; using compiled defaults"),
    }

    info!(
        "Starting wyrd-ag v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Site root: {}", settings.site_root.display());

    let layout = settings.layout();

    let outcome = match args.command {
        Command::Aggregate(_) => {
            let run = Pipeline::new(settings.collector()?, layout.clone(), settings.version.clone());
            run.aggregate().await.map(|(_, summary)| {
                println!("{}", summary);
            })
        }
        Command::Categories => pipeline::regenerate_categories(&layout).map(|_| ()),
        Command::Stats => pipeline::regenerate_stats(&layout).map(|_| ()),
        Command::Pages(_) => {
            let renderer = settings.renderer()?;
            pipeline::regenerate_pages(&layout, &renderer).map(|_| ())
        }
        Command::Generate { .. } => {
            let renderer = settings.renderer()?;
            let run = Pipeline::new(settings.collector()?, layout.clone(), settings.version.clone());
            run.generate(&renderer).await.map(|report| {
                println!("{}", report.summary);
                println!("Categories: {}, Pages: {}", report.categories, report.pages);
            })
        }
        Command::Serve { port } => {
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind to address")?;
            serve::serve_site(listener, layout.site_root(), serve::shutdown_signal())
                .await
                .context("Server error")?;
            info!("Server shutdown complete");
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        error!("Failed: {}", e);
    }
    outcome.context("Generation stage failed")
}
