use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::error;

use tag_retention::cli::run_retention;
use tag_retention::config::{self, Settings};
use tag_retention::registry::InventoryRegistry;
use tag_retention::{logging, ui};

const EXIT_CONFIG: i32 = 1;
const EXIT_RUNTIME: i32 = 2;

#[derive(clap::Parser)]
#[command(
    name = "tag-retention",
    version,
    about = "Delete registry tags that fall outside their retention policy"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Registry inventory file (JSON) to evaluate and prune")]
    inventory: String,

    #[arg(short, long, help = "Override the repository to evaluate")]
    repository: Option<String>,

    #[arg(long, help = "Report what would be deleted without deleting anything")]
    dry_run: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load raw inputs
    let mut inputs = match config::load_inputs(args.config.as_deref()) {
        Ok(inputs) => inputs,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(repository) = args.repository {
        inputs.repository = Some(repository);
    }
    if args.dry_run {
        inputs.dryrun = Some("true".to_string());
    }

    logging::init(&inputs.log, args.verbose).context("failed to initialise logging")?;

    // Every configuration error surfaces here, before the registry is touched
    let settings = match Settings::from_inputs(&inputs) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            ui::display_error(&e.to_string());
            std::process::exit(EXIT_CONFIG);
        }
    };
    ui::display_rules(&settings);

    let registry = match InventoryRegistry::open(&args.inventory, &settings.repository).await {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Cannot open registry");
            ui::display_error(&e.to_string());
            std::process::exit(EXIT_RUNTIME);
        }
    };

    if settings.dry_run {
        ui::display_status("Dry run: no tags will be deleted");
    }

    match run_retention(&registry, &settings, Utc::now()).await {
        Ok(summary) => {
            ui::display_summary(&summary);
            if !summary.report.is_success() {
                std::process::exit(EXIT_RUNTIME);
            }
        }
        Err(e) => {
            error!(error = %e, "Retention run failed");
            ui::display_error(&format!("Retention run failed: {}", e));
            std::process::exit(EXIT_RUNTIME);
        }
    }

    Ok(())
}
