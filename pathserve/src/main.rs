//! Pathserve - a static file server
//!
//! This is the main entry point for the Pathserve CLI.

mod server;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pathserve_core::config::{
    ConfigLoader, Extensions, IndexFile, MountConfig, PathserveConfig, PublicPath,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Pathserve - serve directories over HTTP
#[derive(Parser)]
#[command(name = "pathserve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server with a configuration file
    Run {
        /// Path to the configuration file (.json or .toml)
        #[arg(default_value = "pathserve.toml")]
        config: String,
    },

    /// Start a quick single-mount file server
    Serve {
        /// Root directory to serve
        #[arg(long, default_value = ".")]
        root: String,

        /// Address to listen on
        #[arg(long, default_value = ":8080")]
        listen: String,

        /// URL prefix to mount the directory at
        #[arg(long, default_value = "/")]
        prefix: String,

        /// Index file for paths ending in `/`
        #[arg(long, conflicts_with = "no_index")]
        index: Option<String>,

        /// Disable the index file
        #[arg(long)]
        no_index: bool,

        /// Serve dot-files
        #[arg(long)]
        hidden: bool,

        /// Serve pre-compressed `.gz` siblings
        #[arg(long)]
        gzip: bool,

        /// Extensions tried for extension-less paths, in order
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Cache-Control max-age in milliseconds
        #[arg(long, default_value_t = 0)]
        maxage: u64,

        /// Decline directory requests instead of serving their index file
        #[arg(long)]
        no_directory_index: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "pathserve.toml")]
        config: String,
    },

    /// Show version information
    Version,
}

fn init_tracing(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config: config_path } => {
            let config = ConfigLoader::load(&config_path)
                .with_context(|| format!("failed to load config {}", config_path))?;
            init_tracing(&config.logging.level, cli.verbose);
            tracing::info!("Starting Pathserve with config: {}", config_path);
            run_server(config).await
        }

        Commands::Serve {
            root,
            listen,
            prefix,
            index,
            no_index,
            hidden,
            gzip,
            extensions,
            maxage,
            no_directory_index,
        } => {
            init_tracing("info", cli.verbose);
            tracing::info!("Starting file server on {} serving {}", listen, root);

            let mut mount = MountConfig::new(root);
            mount.public_path = PublicPath::Literal(prefix);
            mount.index = match (no_index, index) {
                (true, _) => IndexFile::Toggle(false),
                (false, Some(name)) => IndexFile::Name(name),
                (false, None) => IndexFile::default(),
            };
            mount.hidden = hidden;
            mount.format = !no_directory_index;
            mount.gzip = gzip;
            if !extensions.is_empty() {
                mount.extensions = Extensions::List(extensions);
            }
            mount.maxage = maxage;

            let config = PathserveConfig {
                listen,
                mounts: vec![mount],
                ..Default::default()
            };
            run_server(config).await
        }

        Commands::Validate { config } => {
            init_tracing("warn", cli.verbose);
            let result = ConfigLoader::load(&config).and_then(|c| server::build_mounts(&c).map(|_| ()));
            match result {
                Ok(()) => {
                    println!("✅ Configuration '{}' is valid!", config);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("❌ Configuration Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Pathserve v{}", pathserve_core::VERSION);
            Ok(())
        }
    }
}

async fn run_server(config: PathserveConfig) -> anyhow::Result<()> {
    let addr = server::parse_listen(&config.listen)?;
    let mounts = server::build_mounts(&config)?;
    tracing::info!("✅ {} mount(s) ready", mounts.len());
    server::run(addr, mounts).await?;
    Ok(())
}
