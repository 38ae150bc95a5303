//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::Site;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = "0.1.0")]
#[command(about = "Portfolio and blog site built from markdown bundles", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output and detailed error pages
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the site server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Watch content and reload open pages on change
        #[arg(short, long)]
        watch: bool,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Prerender every route into the public folder
    #[command(alias = "g")]
    Generate,

    /// Delete the public folder
    Clean,

    /// List articles or projects
    List {
        /// Type of content to list (articles, projects)
        #[arg(default_value = "articles")]
        r#type: String,
    },

    /// Bundle every item and report failures
    Check,

    /// Print the sitemap XML
    Sitemap,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
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

    let debug = cli.debug;
    let open_site = || -> Result<Site> {
        let mut site = Site::new(&base_dir)?;
        site.config.debug |= debug;
        Ok(site)
    };

    match cli.command {
        Commands::Serve {
            port,
            ip,
            watch,
            open,
        } => {
            let site = open_site()?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&site, &ip, port, watch, open).await?;
        }

        Commands::Generate => {
            let site = open_site()?;
            tracing::info!("Generating static files...");
            folio::commands::generate::run(&site).await?;
            println!("Generated successfully!");
        }

        Commands::Clean => {
            let site = open_site()?;
            tracing::info!("Cleaning public folder...");
            folio::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = open_site()?;
            folio::commands::list::run(&site, &r#type).await?;
        }

        Commands::Check => {
            let site = open_site()?;
            folio::commands::check::run(&site).await?;
        }

        Commands::Sitemap => {
            let site = open_site()?;
            folio::commands::sitemap::run(&site).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
