//! cfupload: publish an image to Contentful as an asset plus a linked entry.
//!
//! Credentials come from `~/.config/cfupload/config.json` (see
//! `cfupload configure`) or the `CFUPLOAD_*` environment variables.

mod config;
mod notice;
mod source;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cfupload_cma_client::Client;
use cfupload_publish::{PublishError, PublishEvent, Publisher, Step, validate};

use config::{UploaderConfig, default_config_path};
use notice::Notice;
use source::{ImageSource, download_client};

/// Conventional exit status for termination by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(name = "cfupload", version, about = "Publish images to Contentful")]
struct Cli {
    /// Configuration file (defaults to ~/.config/cfupload/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and publish it with its metadata entry
    Publish(PublishArgs),
    /// Store credentials in the configuration file
    Configure {
        /// Contentful space ID
        #[arg(long)]
        space_id: Option<String>,
        /// Content Management API token
        #[arg(long)]
        token: Option<String>,
        /// Content model ID of image entries
        #[arg(long)]
        model_id: Option<String>,
    },
    /// Print the effective configuration with the token masked
    ShowConfig,
}

#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
struct PublishArgs {
    /// Image URL to download
    #[arg(long)]
    url: Option<String>,
    /// Local image file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Display name of the image
    #[arg(long)]
    name: String,
    /// Artist credit
    #[arg(long, default_value = "")]
    artist: String,
    /// Mark the image as a spoiler
    #[arg(long)]
    spoiler: bool,
    /// Feature the image on the homepage
    #[arg(long)]
    homepage: bool,
    /// Override the detected content type
    #[arg(long)]
    content_type: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.unwrap_or_else(default_config_path);

    let result = match cli.command {
        Commands::Publish(args) => publish(&config_path, args).await,
        Commands::Configure {
            space_id,
            token,
            model_id,
        } => configure(&config_path, space_id, token, model_id),
        Commands::ShowConfig => show_config(&config_path),
    };

    let notice = result.unwrap_or_else(|e| Notice::failure(format!("{e:#}")));
    notice.emit();

    if notice.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info,cfupload=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &std::path::Path) -> anyhow::Result<UploaderConfig> {
    let config = UploaderConfig::load_from(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}

async fn publish(config_path: &std::path::Path, args: PublishArgs) -> anyhow::Result<Notice> {
    let config = load_config(config_path)?;
    let creds = config.credentials();

    if let Err(e) = validate(&args.name, &creds) {
        return Ok(Notice::from_error(&e));
    }

    let mut publisher = Publisher::new().with_policy(config.poll_policy());
    let cancel = publisher.cancel_token();
    spawn_ctrl_c(cancel.clone());

    let image = tokio::select! {
        image = acquire(&args, config.request_timeout()) => image?,
        _ = cancel.cancelled() => {
            return Ok(Notice::from_error(&PublishError::Cancelled { step: Step::Upload }));
        }
    };
    let request = image
        .into_request(&args.name, args.content_type.as_deref())
        .with_artist(args.artist.trim())
        .with_spoiler(args.spoiler)
        .with_homepage_feature(args.homepage);

    let api = Client::new()?
        .with_base_urls(config.api_base(), config.upload_base())
        .with_request_timeout(config.request_timeout());

    let events = publisher.take_events().map(|mut rx| {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                log_event(&event);
            }
        })
    });

    let report = publisher.publish(&api, &request, &creds).await;

    // Closing the channel lets the logger drain and exit.
    drop(publisher);
    if let Some(handle) = events {
        let _ = handle.await;
    }

    Ok(Notice::from_report(&report))
}

async fn acquire(args: &PublishArgs, timeout: Duration) -> anyhow::Result<ImageSource> {
    match (&args.url, &args.file) {
        (Some(url), _) => ImageSource::fetch_url(&download_client(timeout)?, url).await,
        (None, Some(path)) => ImageSource::read_file(path).await,
        (None, None) => anyhow::bail!("either --url or --file is required"),
    }
}

/// First interrupt cancels the run at the next step; a second one exits.
fn spawn_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("interrupt received, cancelling (press Ctrl-C again to abort)");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second interrupt, aborting");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

fn log_event(event: &PublishEvent) {
    match event {
        PublishEvent::Progress {
            step,
            progress,
            status,
            ..
        } => info!(step = %step, progress = %format!("{:.0}%", progress * 100.0), "{status}"),
        PublishEvent::Completed { entry_id, .. } => debug!(entry = %entry_id, "entry published"),
        PublishEvent::Failed { step, error, .. } => debug!(step = %step, error = %error, "run failed"),
    }
}

fn configure(
    config_path: &std::path::Path,
    space_id: Option<String>,
    token: Option<String>,
    model_id: Option<String>,
) -> anyhow::Result<Notice> {
    let mut config = UploaderConfig::load_strict(config_path)
        .context("refusing to overwrite the existing configuration; fix or remove it first")?;

    let mut changed = false;
    for (target, value) in [
        (&mut config.space_id, space_id),
        (&mut config.cma_token, token),
        (&mut config.model_id, model_id),
    ] {
        if let Some(value) = value {
            *target = value.trim().to_string();
            changed = true;
        }
    }

    if !changed {
        anyhow::bail!("nothing to configure: pass --space-id, --token or --model-id");
    }

    config.save_to(config_path)?;
    Ok(Notice::success(format!(
        "Configuration saved to {}",
        config_path.display()
    )))
}

fn show_config(config_path: &std::path::Path) -> anyhow::Result<Notice> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    let notice = match config.credentials().missing_field() {
        None => Notice::success(format!("Loaded {}", config_path.display())),
        Some(field) => Notice::failure(format!("{field} is not configured")),
    };
    Ok(notice)
}
