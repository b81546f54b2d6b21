use anyhow::{bail, Result};
use clap::Parser;
use gcupload::activity::{collect_activity_files, Activity};
use gcupload::api::GarminApi;
use gcupload::common::Config;
use gcupload::ui::{print_summary, spinner, spinner_error, spinner_success};
use gcupload::workflow::{ActivityReport, ActivityStatus, Workflow, WorkflowEvent};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gcupload")]
#[command(about = "Upload activity files to Garmin Connect")]
struct Cli {
    #[arg(required = true, help = "Activity files (.fit, .gpx, .tcx) or directories holding them")]
    paths: Vec<PathBuf>,

    #[arg(short, long, help = "Garmin Connect username")]
    username: Option<String>,

    #[arg(short, long, help = "Garmin Connect password")]
    password: Option<String>,

    #[arg(short, long, help = "Activity name (single file only)")]
    name: Option<String>,

    #[arg(short = 't', long = "type", help = "Activity type key, e.g. running")]
    activity_type: Option<String>,

    #[arg(short, long, help = "Config file (defaults to the platform config dir)")]
    config: Option<PathBuf>,

    // -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns false when any activity failed
async fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.username.is_some() {
        config.username = cli.username;
    }
    if cli.password.is_some() {
        config.password = cli.password;
    }
    let credentials = config.credentials()?;

    let files = collect_activity_files(&cli.paths)?;
    let mut name = cli.name;
    if name.is_some() && files.len() > 1 {
        tracing::warn!("--name only applies to a single file, ignoring it");
        name = None;
    }

    let mut activities = Vec::with_capacity(files.len());
    for file in files {
        match Activity::new(file, name.clone(), cli.activity_type.clone()) {
            Ok(activity) => activities.push(activity),
            Err(e) => tracing::warn!(error = %e, "skipping file"),
        }
    }
    if activities.is_empty() {
        bail!("No activity files to upload");
    }

    let workflow = Workflow::new(GarminApi::from_config(&config), credentials);

    let mut current: Option<ProgressBar> = None;
    let result = workflow
        .run(&mut activities, |event| match event {
            WorkflowEvent::SigningIn => current = Some(spinner("Signing in to Garmin Connect")),
            WorkflowEvent::SignedIn => {
                if let Some(pb) = current.take() {
                    spinner_success(&pb, "Signed in");
                }
            }
            WorkflowEvent::Started(activity) => {
                current = Some(spinner(format!("Uploading {}", activity.display_name())));
            }
            WorkflowEvent::Finished(activity, report) => {
                if let Some(pb) = current.take() {
                    finish_spinner(&pb, &activity.display_name(), report);
                }
            }
        })
        .await;

    let reports = match result {
        Ok(reports) => reports,
        Err(e) => {
            // only login can fail the run
            if let Some(pb) = current.take() {
                spinner_error(&pb, "Sign-in failed");
            }
            return Err(e);
        }
    };

    print_summary(&reports);
    Ok(!reports.iter().any(|r| r.is_failure()))
}

fn finish_spinner(pb: &ProgressBar, label: &str, report: &ActivityReport) {
    match (&report.status, &report.metadata_error) {
        (ActivityStatus::Uploaded(id), None) => {
            spinner_success(pb, format!("{label} uploaded ({id})"))
        }
        (ActivityStatus::Uploaded(id), Some(_)) => {
            spinner_error(pb, format!("{label} uploaded ({id}), rename failed"))
        }
        (ActivityStatus::Duplicate(id), _) => {
            spinner_success(pb, format!("{label} already exists ({id})"))
        }
        (ActivityStatus::Failed(_), _) => spinner_error(pb, format!("{label} failed")),
    }
}
