//! CLI entry point for titlecard

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use titlecard::commands::render::RenderArgs;
use titlecard::pipeline::PipelineOptions;
use titlecard::render::Preset;

#[derive(Parser)]
#[command(name = "titlecard")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Social-media title cards for a static blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single card
    #[command(alias = "r")]
    Render {
        /// Post title (HTML entities are decoded)
        title: String,

        /// Date line shown above the title
        date: String,

        /// Destination PNG
        output: PathBuf,

        /// Layout preset (compact, large)
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Background image, overriding the site config
        #[arg(short, long)]
        background: Option<PathBuf>,

        /// Font file for both text lines, overriding the site config
        #[arg(short, long)]
        font: Option<PathBuf>,

        /// Compress the PNG harder, even when `card.optimize` is off
        #[arg(long)]
        optimize: bool,
    },

    /// Generate cards for every post
    #[command(alias = "b")]
    Build {
        /// Skip title card generation
        #[arg(long)]
        no_images: bool,

        /// Regenerate cards that are already up to date
        #[arg(long)]
        force: bool,
    },

    /// List posts and their card paths
    List,

    /// Remove generated cards
    Clean,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "titlecard=debug,info"
    } else {
        "titlecard=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Render {
            title,
            date,
            output,
            preset,
            background,
            font,
            optimize,
        } => {
            let site = titlecard::Site::new(&base_dir)?;
            let args = RenderArgs {
                title,
                date,
                output,
                preset,
                background,
                font,
                optimize,
            };
            titlecard::commands::render::run(&site, &args)?;
        }

        Commands::Build { no_images, force } => {
            let site = titlecard::Site::new(&base_dir)?;
            tracing::info!("Building title cards...");

            let options = PipelineOptions {
                stages: site.config.stages.clone(),
                generate_images: !no_images,
                force,
            };
            let report = site.build(options)?;
            if !report.is_success() {
                anyhow::bail!("{} title card(s) failed to render", report.failed());
            }
            println!("Generated {} title card(s)", report.generated());
        }

        Commands::List => {
            let site = titlecard::Site::new(&base_dir)?;
            titlecard::commands::list::run(&site)?;
        }

        Commands::Clean => {
            let site = titlecard::Site::new(&base_dir)?;
            tracing::info!("Cleaning title cards...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("titlecard version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
