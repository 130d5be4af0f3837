use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pavemaster::alert::engine::{deliver_alerts, forward_alerts};
use pavemaster::config::{Config, ConfigOverrides};
use pavemaster::estimate::material::{estimate_material, ZoneSpec};
use pavemaster::estimate::schema::{PaintType, SealerType};
use pavemaster::estimate::sealcoat::{estimate_sealcoat, SealcoatInput};
use pavemaster::estimate::striping::{estimate_striping, StripingInput};
use pavemaster::estimate::Estimate;
use pavemaster::output::csv::{alerts_to_csv, estimate_to_csv};
use pavemaster::output::json::render_json;
use pavemaster::output::table::{render_alerts_table, render_estimate, render_saved_table};
use pavemaster::performance::source::{run_sampler, ReplaySource};
use pavemaster::performance::PerformanceAlert;
use pavemaster::server::{build_sinks, run_server};
use pavemaster::store::sqlite::SqliteStore;
use pavemaster::store::{delete_estimate, list_estimates, load_estimate, save_estimate};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "pavemaster",
    about = "Sealcoat, striping and asphalt estimates with a performance budget monitor"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long)]
    db: Option<String>,
    #[arg(long)]
    webhook: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Sealcoat {
        #[arg(long = "square-feet")]
        square_feet: f64,
        #[arg(long, default_value = "coal-tar")]
        sealer: SealerType,
        #[arg(long)]
        coats: Option<u32>,
        #[arg(long = "application-rate")]
        application_rate: Option<f64>,
        #[arg(long = "water-ratio")]
        water_ratio_percent: Option<f64>,
        #[arg(long = "additive")]
        additive_percent: Option<f64>,
        #[arg(long = "sand")]
        sand_pounds_per_100_gal: Option<f64>,
        #[arg(long)]
        save: Option<String>,
    },
    Striping {
        #[arg(long)]
        length: f64,
        #[arg(long)]
        width: f64,
        #[arg(long = "space-width")]
        space_width: Option<f64>,
        #[arg(long = "space-length")]
        space_length: Option<f64>,
        #[arg(long = "drive-width")]
        drive_width: Option<f64>,
        #[arg(long = "line-width")]
        line_width_inches: Option<f64>,
        #[arg(long, default_value = "waterborne")]
        paint: PaintType,
        #[arg(long)]
        ada: bool,
        #[arg(long = "handicap-symbols")]
        handicap_symbols: bool,
        #[arg(long = "fire-zone")]
        fire_zone: bool,
        #[arg(long)]
        crosswalks: bool,
        #[arg(long)]
        arrows: bool,
        #[arg(long)]
        save: Option<String>,
    },
    Material {
        #[arg(long = "zones-file")]
        zones_file: Option<PathBuf>,
        /// LENGTH,WIDTH,THICKNESS,MIX[,SURFACE]
        #[arg(long = "zone")]
        zones: Vec<String>,
        #[arg(long)]
        save: Option<String>,
    },
    Monitor {
        #[arg(long)]
        samples: Option<PathBuf>,
        /// metric=value, repeatable
        #[arg(long = "sample")]
        sample: Vec<String>,
        #[arg(long = "interval-ms")]
        interval_ms: Option<u64>,
        #[arg(long)]
        ticks: Option<u64>,
    },
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum SavedCommand {
    List,
    Show { name: String },
    Delete { name: String },
}

#[derive(Debug, Serialize)]
struct MonitorReport {
    score: u32,
    samples_recorded: usize,
    alerts: Vec<PerformanceAlert>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        db_path: cli.db.clone(),
        webhook_url: cli.webhook.clone(),
    });

    match &cli.command {
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)?;
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            return run_server(config, addr).await;
        }
        Commands::Sealcoat {
            square_feet,
            sealer,
            coats,
            application_rate,
            water_ratio_percent,
            additive_percent,
            sand_pounds_per_100_gal,
            save,
        } => {
            let mut input = SealcoatInput::new(*square_feet, *sealer);
            if let Some(coats) = coats {
                input = input.with_coats(*coats);
            }
            if let Some(v) = application_rate {
                input.application_rate = *v;
            }
            if let Some(v) = water_ratio_percent {
                input.water_ratio_percent = *v;
            }
            if let Some(v) = additive_percent {
                input.additive_percent = *v;
            }
            if let Some(v) = sand_pounds_per_100_gal {
                input.sand_pounds_per_100_gal = *v;
            }
            let estimate: Estimate = estimate_sealcoat(&input, &config.sealcoat)?.into();
            finish_estimate(&config, &estimate, save.as_deref(), cli.output)?;
        }
        Commands::Striping {
            length,
            width,
            space_width,
            space_length,
            drive_width,
            line_width_inches,
            paint,
            ada,
            handicap_symbols,
            fire_zone,
            crosswalks,
            arrows,
            save,
        } => {
            let mut input = StripingInput::new(*length, *width);
            if let Some(v) = space_width {
                input.space_width = *v;
            }
            if let Some(v) = space_length {
                input.space_length = *v;
            }
            if let Some(v) = drive_width {
                input.drive_width = *v;
            }
            if let Some(v) = line_width_inches {
                input.line_width_inches = *v;
            }
            input.paint_type = *paint;
            input.ada_required = *ada;
            input.handicap_symbols = *handicap_symbols;
            input.fire_zone = *fire_zone;
            input.crosswalks = *crosswalks;
            input.arrows = *arrows;
            let estimate: Estimate = estimate_striping(&input, &config.striping)?.into();
            finish_estimate(&config, &estimate, save.as_deref(), cli.output)?;
        }
        Commands::Material {
            zones_file,
            zones,
            save,
        } => {
            let zones = collect_zones(zones_file.as_deref(), zones)?;
            let estimate: Estimate = estimate_material(&zones, &config.material)?.into();
            finish_estimate(&config, &estimate, save.as_deref(), cli.output)?;
        }
        Commands::Monitor {
            samples,
            sample,
            interval_ms,
            ticks,
        } => {
            let report = run_monitor(&config, samples.as_deref(), sample, *interval_ms, *ticks)
                .await?;
            print_monitor_report(&report, cli.output)?;
        }
        Commands::Saved { action } => handle_saved_command(action, &config, cli.output)?,
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(&config.resolved_db_path())
}

fn finish_estimate(
    config: &Config,
    estimate: &Estimate,
    save_as: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(name) = save_as {
        let store = open_store(config)?;
        let saved = save_estimate(&store, name, estimate)?;
        info!("saved {} estimate as {}", estimate.kind(), saved.name);
    }
    print_estimate(estimate, format)
}

fn print_estimate(estimate: &Estimate, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_estimate(estimate)),
        OutputFormat::Json => println!("{}", render_json(estimate)?),
        OutputFormat::Csv => print!("{}", estimate_to_csv(estimate)?),
    }
    Ok(())
}

fn collect_zones(zones_file: Option<&Path>, raw_zones: &[String]) -> Result<Vec<ZoneSpec>> {
    let mut zones = Vec::new();
    if let Some(path) = zones_file {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading zones file: {}", path.display()))?;
        let parsed: Vec<ZoneSpec> = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing zones file: {}", path.display()))?;
        zones.extend(parsed);
    }
    for raw in raw_zones {
        zones.push(raw.parse::<ZoneSpec>()?);
    }
    if zones.is_empty() {
        return Err(anyhow!("at least one --zone or a --zones-file is required"));
    }
    Ok(zones)
}

async fn run_monitor(
    config: &Config,
    samples_file: Option<&Path>,
    pairs: &[String],
    interval_ms: Option<u64>,
    ticks: Option<u64>,
) -> Result<MonitorReport> {
    let mut source = ReplaySource::default();
    if let Some(path) = samples_file {
        let file = fs::File::open(path)
            .with_context(|| format!("failed opening samples file: {}", path.display()))?;
        source.extend(ReplaySource::from_csv(file)?);
    }
    source.extend(ReplaySource::from_pairs(pairs)?);
    if source.remaining() == 0 {
        return Err(anyhow!("no samples given; use --samples FILE or --sample metric=value"));
    }

    let mut monitor = config.build_monitor();
    let sinks = build_sinks(config)?;
    let (subscription, rx) = forward_alerts(&monitor, config.alerts.rules.clone());
    let delivery = tokio::spawn(async move { deliver_alerts(rx, &sinks).await });

    let interval =
        Duration::from_millis(interval_ms.unwrap_or(config.performance.sample_interval_ms));
    let samples_recorded = run_sampler(&mut monitor, &mut source, interval, ticks).await;

    subscription.unsubscribe();
    match delivery.await {
        Ok(delivered) => info!("delivered {delivered} alerts"),
        Err(err) => warn!("alert delivery task failed: {err}"),
    }

    Ok(MonitorReport {
        score: monitor.score(),
        samples_recorded,
        alerts: monitor.recent_alerts(),
    })
}

fn print_monitor_report(report: &MonitorReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_alerts_table(&report.alerts, report.score));
            println!("{} samples recorded", report.samples_recorded);
        }
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => print!("{}", alerts_to_csv(&report.alerts)?),
    }
    Ok(())
}

fn handle_saved_command(action: &SavedCommand, config: &Config, format: OutputFormat) -> Result<()> {
    let store = open_store(config)?;
    match action {
        SavedCommand::List => {
            let saved = list_estimates(&store)?;
            match format {
                OutputFormat::Table => println!("{}", render_saved_table(&saved)),
                OutputFormat::Json => println!("{}", render_json(&saved)?),
                OutputFormat::Csv => {
                    warn!("CSV output for saved list not implemented, using JSON");
                    println!("{}", render_json(&saved)?);
                }
            }
        }
        SavedCommand::Show { name } => {
            let saved = load_estimate(&store, name)?
                .ok_or_else(|| anyhow!("no saved estimate named {name}"))?;
            print_estimate(&saved.estimate, format)?;
        }
        SavedCommand::Delete { name } => {
            if delete_estimate(&store, name)? {
                println!("Deleted saved estimate {name}");
            } else {
                return Err(anyhow!("no saved estimate named {name}"));
            }
        }
    }
    Ok(())
}
