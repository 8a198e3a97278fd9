//! cot-etl: Scheduled job converting ADSBExchange snapshots into CoT features.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing_subscriber::EnvFilter;

use cot_core::feature::{build_feature_set, BuildOptions};
use cot_core::filter::filter_features;
use cot_core::include::IncludeIndex;
use cot_core::types::{CotError, Feature, FeatureCollection, Result};
use cot_core::TaskConfig;

mod adsbx;
mod cycle;
mod gateway;

use gateway::{DryRunGateway, HttpGateway};

#[derive(Parser)]
#[command(name = "cot-etl", version, about = "ADSBExchange to CoT feature pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, transform, and submit one cycle
    Run {
        /// Path to the JSON config file
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// ADSBX API token, overriding the config file
        #[arg(long, env = "ADSBX_TOKEN")]
        token: Option<String>,

        /// Fetch live but log submissions instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the pipeline over a local snapshot file and print the features
    Preview {
        /// Path to a saved provider response ({"ac": [...]})
        file: PathBuf,

        /// Path to the JSON config file
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Print the feature collection as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file and report fatal errors
    Check {
        /// Path to the JSON config file
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            token,
            dry_run,
        } => cmd_run(&config, token, dry_run),
        Commands::Preview { file, config, json } => cmd_preview(&file, &config, json),
        Commands::Check { config } => cmd_check(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Read and parse the config file; malformed structure is a fatal error.
fn load_config(path: &PathBuf) -> Result<TaskConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CotError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CotError::Config(format!("cannot parse {}: {e}", path.display())))
}

fn init_logging(debug: bool) {
    let default = if debug { "cot_etl=debug,cot_core=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn cmd_run(config_path: &PathBuf, token: Option<String>, dry_run: bool) -> Result<()> {
    let mut cfg = load_config(config_path)?;
    if let Some(token) = token {
        cfg.token = token;
    }
    init_logging(cfg.debug);
    cfg.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let http = HttpGateway::new(&cfg)?;
        let report = if dry_run {
            let gw = DryRunGateway::new(http);
            cycle::run_cycle(&gw, &cfg, Utc::now()).await?
        } else {
            cycle::run_cycle(&http, &cfg, Utc::now()).await?
        };
        println!(
            "Cycle complete: {} aircraft, {} submitted, {} alerts",
            report.fetched, report.submitted, report.alerts
        );
        Ok(())
    })
}

fn cmd_preview(file: &PathBuf, config_path: &PathBuf, json: bool) -> Result<()> {
    // Preview needs no token or sink; skip validate().
    let cfg = if config_path.exists() {
        load_config(config_path)?
    } else {
        TaskConfig::default()
    };
    init_logging(cfg.debug);

    let text = std::fs::read_to_string(file)?;
    let body: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| CotError::Response(format!("cannot parse {}: {e}", file.display())))?;
    let records = adsbx::parse_snapshot(&body)?;

    let opts = BuildOptions {
        domestic: cfg.domestic_range()?,
        emergency_alert: cfg.emergency_alert,
        use_icons: cfg.use_icons,
        ignore_ground_vehicles: cfg.ignore_ground_vehicles,
    };
    let index = IncludeIndex::build(&cfg.includes);
    let features = build_feature_set(&records, &index, &opts, Utc::now());
    let output = filter_features(features, &index, cfg.filtering);

    if json {
        let fc = FeatureCollection::new(output);
        println!("{}", serde_json::to_string_pretty(&fc).unwrap_or_default());
        return Ok(());
    }

    println!();
    println!(
        "Records: {} raw, {} features after filtering",
        records.len(),
        output.len()
    );
    println!();
    if !output.is_empty() {
        print_feature_table(&output);
    }
    Ok(())
}

fn cmd_check(config_path: &PathBuf) -> Result<()> {
    init_logging(false);
    let cfg = load_config(config_path)?;
    cfg.validate()?;
    println!(
        "ok - config valid: {} include rules, filtering {}, stale alerts {}",
        cfg.includes.len(),
        if cfg.filtering { "on" } else { "off" },
        if cfg.stale_alerts { "on" } else { "off" }
    );
    Ok(())
}

fn print_feature_table(features: &[Feature]) {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Type", "Callsign", "Lat", "Lon", "Alt (m)", "Speed (m/s)", "Group", "Icon",
    ]);

    for feat in features {
        let coords = &feat.geometry.coordinates;
        table.add_row(vec![
            Cell::new(&feat.id),
            Cell::new(&feat.properties.cot_type),
            Cell::new(&feat.properties.callsign),
            Cell::new(
                coords
                    .get(1)
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                coords
                    .first()
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                coords
                    .get(2)
                    .map(|v| format!("{v:.0}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(if feat.properties.speed.is_nan() {
                "-".into()
            } else {
                format!("{:.1}", feat.properties.speed)
            }),
            Cell::new(
                feat.properties
                    .metadata
                    .group
                    .as_deref()
                    .unwrap_or("-"),
            ),
            Cell::new(if feat.properties.icon.is_some() { "yes" } else { "-" }),
        ]);
    }

    println!("{table}");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
