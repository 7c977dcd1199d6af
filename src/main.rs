//! CLI entry point for the ride flow map.
//!
//! Serves the map assets and flow CSV over HTTP, and can load a flow export
//! locally to summarize its pickup zones or replay scripted map interactions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ride_flow_map::{
    config::ServerConfig,
    events::parse_script,
    loader::{into_event, load_source},
    output::{append_records, print_json},
    parser::parse_csv,
    render::Scene,
    selection::SelectionController,
    server::run_server,
    stats::DatasetStats,
    zone::{ZoneIndex, ZoneKey},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ride-flow-map")]
#[command(about = "Visualize pickup/dropoff flow probabilities on a map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve static map assets and the flow CSV at /data
    Serve {
        #[command(flatten)]
        config: ServerConfig,
    },
    /// Load a flow CSV and summarize its pickup zones
    Inspect {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Pickup zone key (e.g. 40.712800_-74.006000) whose flows to list
        #[arg(short, long)]
        zone: Option<ZoneKey>,

        /// CSV file to append the listed flows to
        #[arg(short, long, requires = "zone")]
        output: Option<String>,
    },
    /// Replay scripted map clicks against a flow CSV and print the final scene
    Replay {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Interaction script: `zone <key>`, `flow <index>`, `background`, `clear`
        #[arg(short, long)]
        events: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ride_flow_map.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ride_flow_map.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!(panic = %panic_info, "Uncaught panic");
        default_hook(panic_info);
    }));

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { config } => run_server(config).await,
        Commands::Inspect {
            source,
            zone,
            output,
        } => inspect(&source, zone, output.as_deref()).await,
        Commands::Replay { source, events } => replay(&source, &events).await,
    };

    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "Exiting after unrecoverable error");
    }
    result
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Builds the zone index for `source` and logs a summary, plus one zone's flows if asked.
#[tracing::instrument(skip(output))]
async fn inspect(source: &str, zone: Option<ZoneKey>, output: Option<&str>) -> Result<()> {
    let text = load_source(source).await?;
    let outcome = parse_csv(&text);
    let index = ZoneIndex::build(outcome.rows);

    let stats = DatasetStats::from_index(&index).with_parse_error(outcome.error.as_ref());
    print_json(&stats)?;

    let Some(key) = zone else {
        return Ok(());
    };
    let zone = index
        .get(&key)
        .with_context(|| format!("no pickup zone with key {key}"))?;

    let flows = index.flows_for(zone);
    info!(zone = %key, label = %zone.label(), flows = flows.len(), "Flows for pickup zone");
    for (i, flow) in flows.iter().enumerate() {
        info!(
            label = %flow.label(i),
            probability = %format!("{:.1}%", flow.probability),
            lat = flow.dropoff_lat,
            lon = flow.dropoff_lon,
            "Flow"
        );
    }

    if let Some(path) = output {
        append_records(path, &flows)?;
        info!(path, rows = flows.len(), "Flows appended");
    }
    Ok(())
}

/// Loads `source` into a fresh in-memory scene, replays the script and logs the result.
#[tracing::instrument]
async fn replay(source: &str, events_path: &str) -> Result<()> {
    let script = tokio::fs::read_to_string(events_path)
        .await
        .with_context(|| format!("reading {events_path}"))?;
    let events = parse_script(&script)?;

    let mut controller = SelectionController::new(Scene::default());
    controller.handle(into_event(load_source(source).await));

    if controller.surface().loading {
        warn!("Data never loaded; replaying against an empty map");
    }
    info!(events = events.len(), "Replaying interactions");
    controller.run(events);

    print_json(controller.surface())?;
    Ok(())
}
