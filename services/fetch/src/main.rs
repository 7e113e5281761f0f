//! One-shot storage operations for the water-quality data platform.
//!
//! A thin CLI over the storage access layer:
//! - streaming download from HTTP(S) to any writable backend
//! - existence probes and recursive discovery
//! - GDAL VSI address construction
//! - public-URL resolution with Last-Modified lookup

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wq_common::Backend;

#[derive(Parser, Debug)]
#[command(name = "fetch")]
#[command(about = "Storage operations across local, S3, GCS, and HTTP backends")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download an HTTP(S) URL to a local or object-storage destination
    Download {
        /// Source URL
        url: String,
        /// Destination URI
        dest: String,
        /// Transfer chunk size in megabytes
        #[arg(long)]
        chunk_mb: Option<usize>,
    },
    /// Report whether a URI exists as a file or a directory
    Exists {
        uri: String,
    },
    /// Recursively list files under a URI
    Find {
        /// Directory or prefix to search
        root: String,
        /// Regex searched against each file's base name
        #[arg(long, default_value = ".*")]
        pattern: String,
        /// Keep only GeoTIFF files
        #[arg(long, conflicts_with = "json")]
        geotiff: bool,
        /// Keep only JSON files
        #[arg(long)]
        json: bool,
    },
    /// Print the GDAL VSI address for a URI
    Vsi {
        uri: String,
    },
    /// Print the public URL and Last-Modified timestamp for a URI
    LastModified {
        uri: String,
        /// AWS region for S3 public URLs
        #[arg(long, env = "WQ_AWS_REGION")]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Download { url, dest, chunk_mb } => {
            let written = wq_io::download_url(&url, &dest, chunk_mb).await?;
            println!("{}", written);
        }
        Command::Exists { uri } => {
            let backend = Backend::classify(&uri)?;
            let is_file = wq_io::file_exists(&uri).await?;
            let is_dir = wq_io::directory_exists(&uri).await?;
            info!(backend = %backend, is_file, is_dir, "probed");

            if is_file {
                println!("file");
            } else if is_dir {
                println!("directory");
            } else {
                println!("missing");
            }
        }
        Command::Find {
            root,
            pattern,
            geotiff,
            json,
        } => {
            let files = if geotiff {
                wq_io::find_geotiff_files(&root, &pattern).await?
            } else if json {
                wq_io::find_json_files(&root, &pattern).await?
            } else {
                wq_io::find_files(&root, &pattern, |_| true).await?
            };

            for file in &files {
                println!("{}", file);
            }
            info!(count = files.len(), "find complete");
        }
        Command::Vsi { uri } => {
            println!("{}", wq_io::vsi_path(&uri)?);
        }
        Command::LastModified { uri, region } => {
            let url = wq_io::public_url(&uri, region.as_deref())?;
            match wq_io::last_modified(&uri, region.as_deref()).await? {
                Some(timestamp) => println!("{} {}", url, timestamp.to_rfc3339()),
                None => println!("{} unknown", url),
            }
        }
    }

    Ok(())
}
