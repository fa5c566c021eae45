//! MyOcean CLI
//!
//! Donation geometry, funding progress and donor statistics from the
//! command line.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use myocean_cli::output::{
    format_amount, format_area, format_number, format_progress, progress_bar, Status,
};
use myocean_core::address::{AddressBook, StaticResolver};
use myocean_core::config::{Config, LoggingConfig};
use myocean_core::dataset::{load_donations, load_hotspots};
use myocean_core::error::exit_codes;
use myocean_core::funding::{nearest_donations, FundingPolicy};
use myocean_core::model::{Donation, DonationRecord, Hotspot};
use myocean_core::state::OceanState;
use myocean_core::stats;
use myocean_core::Error;
use myocean_geo::{haversine_distance, Coordinate, DonationShape, DonationTier, ShapeKind};
use myocean_telemetry::{metrics, names, Event, TelemetryConfig, Timer};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "myocean")]
#[command(about = "Donation geometry and cleanup funding for MyOcean")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print run metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Protected area for a donation amount
    Area {
        /// Amount in KRW (100000, 1000000 or 10000000)
        amount: u64,
    },

    /// Map geometry of a donation region
    Shape {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Amount in KRW
        amount: u64,
        /// Draw an axis-aligned square instead of the configured shape
        #[arg(long)]
        rect: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Great-circle distance in km
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: f64,
        #[arg(allow_hyphen_values = true)]
        lng1: f64,
        #[arg(allow_hyphen_values = true)]
        lat2: f64,
        #[arg(allow_hyphen_values = true)]
        lng2: f64,
    },

    /// Build a donation record
    Donate {
        /// Donor name
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Amount in KRW
        amount: u64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Funding progress per hotspot
    Funding {
        /// Hotspot dataset or list
        #[arg(long)]
        hotspots: PathBuf,
        /// Exported donations
        #[arg(long)]
        donations: PathBuf,
        /// Only this hotspot
        #[arg(long)]
        id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start a collection run at a funded hotspot
    Collect {
        #[arg(long)]
        hotspots: PathBuf,
        #[arg(long)]
        donations: PathBuf,
        /// Hotspot id
        id: String,
    },

    /// Top donors by total amount
    Ranking {
        #[arg(long)]
        donations: PathBuf,
        #[arg(long, default_value_t = stats::DEFAULT_RANKING_LIMIT)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dense hotspots with few nearby donations
    Priority {
        #[arg(long)]
        hotspots: PathBuf,
        #[arg(long)]
        donations: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cleanup progress of donated regions
    Progress {
        #[arg(long)]
        donations: PathBuf,
        /// Only donations by this donor
        #[arg(long)]
        name: Option<String>,
        /// Known addresses, a JSON object keyed by "lat,lng"
        #[arg(long)]
        addresses: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    // Logging starts at the default level so config loading is traced too.
    let log_handle = myocean_telemetry::init_with_config(TelemetryConfig::for_verbosity(
        &LoggingConfig::default().level,
        cli.verbose,
    ))?;

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    log_handle.set_level(
        &TelemetryConfig::for_verbosity(&config.schema.logging.level, cli.verbose).log_level,
    )?;

    let result = match cli.command {
        Commands::Area { amount } => run_area(amount, &config),
        Commands::Shape { lat, lng, amount, rect, json } => {
            run_shape(lat, lng, amount, rect, json, &config)
        }
        Commands::Distance { lat1, lng1, lat2, lng2 } => run_distance(lat1, lng1, lat2, lng2),
        Commands::Donate { name, lat, lng, amount, json } => {
            run_donate(&name, lat, lng, amount, json, &config)
        }
        Commands::Funding { hotspots, donations, id, json } => {
            run_funding(&hotspots, &donations, id.as_deref(), json, &config)
        }
        Commands::Collect { hotspots, donations, id } => {
            run_collect(&hotspots, &donations, &id, &config)
        }
        Commands::Ranking { donations, limit, json } => run_ranking(&donations, limit, json),
        Commands::Priority { hotspots, donations, json } => {
            run_priority(&hotspots, &donations, json, &config)
        }
        Commands::Progress { donations, name, addresses } => {
            run_progress(&donations, name.as_deref(), addresses.as_deref(), &config)
        }
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => report_error(&e),
    };

    if cli.metrics {
        eprintln!("{}", serde_json::to_string_pretty(&metrics().export_json())?);
    }

    std::process::exit(exit_code);
}

/// Donations listed under a single hotspot's funding view
const NEAREST_DONATIONS: usize = 5;

type CmdResult = std::result::Result<i32, Error>;

/// Print `e` and return its exit code. The full report goes to the debug log.
fn report_error(e: &Error) -> i32 {
    match serde_json::to_string(&e.to_report()) {
        Ok(report) => tracing::debug!(%report, "Command failed"),
        Err(_) => tracing::debug!(code = %e.code, "Command failed"),
    }
    Status::error(&e.to_string());
    e.exit_code()
}

fn exit_with(e: &Error) -> ! {
    std::process::exit(report_error(e))
}

fn run_area(amount: u64, config: &Config) -> CmdResult {
    let tier = DonationTier::try_from(amount)?;
    let area = config.schema.geometry.area_table.area_km2(tier);

    println!("{} → {}", format_amount(amount).bold(), format_area(area));
    Ok(exit_codes::SUCCESS)
}

fn run_shape(
    lat: f64,
    lng: f64,
    amount: u64,
    rect: bool,
    json: bool,
    config: &Config,
) -> CmdResult {
    let center = Coordinate::new(lat, lng).validated()?;
    let tier = DonationTier::try_from(amount)?;
    let area = config.schema.geometry.area_table.area_km2(tier);
    let kind = if rect { ShapeKind::Rect } else { config.schema.geometry.shape };
    let shape = kind.build(&center, area);

    if json {
        let geometry = match &shape {
            DonationShape::Polygon(vertices) => serde_json::json!({ "polygon": vertices }),
            DonationShape::Bounds(bounds) => serde_json::json!({ "bounds": bounds }),
        };
        let out = serde_json::json!({
            "center": center,
            "amount": amount,
            "area": area,
            "shape": geometry,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header(&format!("{} at {}", format_area(area), center.region_label()));
    match &shape {
        DonationShape::Polygon(vertices) => {
            for (label, vertex) in ["N", "E", "S", "W"].iter().zip(vertices) {
                println!("  {}  {:.6}, {:.6}", label.dimmed(), vertex.latitude, vertex.longitude);
            }
        }
        DonationShape::Bounds(bounds) => {
            let (height, width) = bounds.size_km();
            let (sw, ne) = (bounds.south_west, bounds.north_east);
            println!("  SW  {:.6}, {:.6}", sw.latitude, sw.longitude);
            println!("  NE  {:.6}, {:.6}", ne.latitude, ne.longitude);
            println!("  {:.2} km × {:.2} km", width, height);
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn run_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> CmdResult {
    let from = Coordinate::new(lat1, lng1).validated()?;
    let to = Coordinate::new(lat2, lng2).validated()?;

    println!("{:.3} km", haversine_distance(&from, &to));
    Ok(exit_codes::SUCCESS)
}

fn run_donate(
    name: &str,
    lat: f64,
    lng: f64,
    amount: u64,
    json: bool,
    config: &Config,
) -> CmdResult {
    let tier = DonationTier::try_from(amount)?;
    let location = Coordinate::new(lat, lng);
    let donation = Donation::new(name, tier, location, &config.schema.geometry, Utc::now())?;

    Event::new(
        "donation.created",
        serde_json::json!({
            "id": donation.id,
            "amount": amount,
            "region": donation.region_name,
        }),
    )
    .log();

    if json {
        println!("{}", serde_json::to_string_pretty(&DonationRecord::from(donation))?);
    } else {
        Status::success(&format!(
            "{}님이 {}를 기부해 {}의 바다를 지켰습니다",
            donation.name,
            format_amount(amount),
            format_area(donation.area_km2)
        ));
        println!("  id      {}", donation.id);
        println!("  region  {}", donation.region_name);
    }
    Ok(exit_codes::SUCCESS)
}

fn load_state(hotspots: &Path, donations: &Path) -> std::result::Result<OceanState, Error> {
    let _timer = Timer::start(names::LOAD_MS);

    let hotspots = load_hotspots(hotspots)?;
    let donations = load_donations(donations)?;

    metrics().gauge(names::HOTSPOTS_LOADED, hotspots.len() as u64);
    metrics().increment_by(names::DONATIONS_LOADED, donations.len() as u64);

    OceanState::new(donations, hotspots)
}

fn run_funding(
    hotspots: &Path,
    donations: &Path,
    id: Option<&str>,
    json: bool,
    config: &Config,
) -> CmdResult {
    let state = load_state(hotspots, donations)?;
    let policy = FundingPolicy::from(&config.schema.funding);

    let selected = match id {
        Some(id) => Some(state.hotspot(id).ok_or_else(|| Error::hotspot_not_found(id))?),
        None => None,
    };

    let timer = Timer::start(names::FUNDING_MS);
    let summaries: Vec<_> = state
        .funding(&policy)
        .into_iter()
        .filter(|s| id.is_none_or(|id| s.hotspot_id == id))
        .collect();
    timer.stop();

    metrics().increment_by(names::FUNDING_EVALUATED, summaries.len() as u64);
    metrics().increment_by(
        names::FUNDING_COMPLETE,
        summaries.iter().filter(|s| s.complete).count() as u64,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header(&format!("Funding within {} km", policy.radius_km));
    for summary in &summaries {
        let target = summary.target.map_or_else(|| "-".to_string(), format_number);
        let marker = if summary.complete { "✓".green().to_string() } else { " ".to_string() };
        println!(
            "{} {:<12} {} {}  {} / {} ({} donations)",
            marker,
            summary.hotspot_id,
            progress_bar(summary.percent, 20),
            format_progress(summary.percent),
            format_number(summary.total),
            target,
            summary.donation_count
        );
    }

    let untargeted = summaries.iter().filter(|s| s.target.is_none()).count();
    if untargeted > 0 {
        Status::warning(&format!("{} hotspots have no funding target", untargeted));
    }

    if let Some(hotspot) = selected {
        Status::header(&format!("Nearest donations to {}", hotspot.display_name()));
        for result in nearest_donations(hotspot, state.donations(), NEAREST_DONATIONS) {
            let marker = if result.distance <= policy.radius_km { "●" } else { "○" };
            println!("  {} {:<38} {:>8.2} km", marker, result.id, result.distance);
        }
    }
    Ok(exit_codes::SUCCESS)
}

fn run_collect(hotspots: &Path, donations: &Path, id: &str, config: &Config) -> CmdResult {
    let state = load_state(hotspots, donations)?;
    let policy = FundingPolicy::from(&config.schema.funding);

    let collecting = state.begin_collection(id, &policy)?;
    let name = collecting.hotspot(id).map_or_else(|| id.to_string(), Hotspot::display_name);

    Status::success(&format!("Collection vessel dispatched to {} ({})", id, name));
    Ok(exit_codes::SUCCESS)
}

fn run_ranking(donations: &Path, limit: usize, json: bool) -> CmdResult {
    let donations = load_donations(donations)?;
    let ranking = stats::top_donors(&donations, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header(&format!("Top {} donors", ranking.len()));
    for item in &ranking {
        let rank = match item.rank {
            1 => "🥇".to_string(),
            2 => "🥈".to_string(),
            3 => "🥉".to_string(),
            n => format!("{}위", n),
        };
        println!(
            "{:>4}  {:<16} {:>14}원  {}회",
            rank,
            item.name,
            format_number(item.amount),
            item.donation_count
        );
    }
    println!();
    println!("Total raised: {}원", format_number(stats::total_amount(&donations)));
    Ok(exit_codes::SUCCESS)
}

fn run_priority(hotspots: &Path, donations: &Path, json: bool, config: &Config) -> CmdResult {
    let state = load_state(hotspots, donations)?;
    let radius_km = config.schema.funding.radius_km;
    let priority = stats::priority_hotspots(state.hotspots(), state.donations(), radius_km);

    if json {
        println!("{}", serde_json::to_string_pretty(&priority)?);
        return Ok(exit_codes::SUCCESS);
    }

    if priority.is_empty() {
        Status::info("No priority hotspots");
        return Ok(exit_codes::SUCCESS);
    }

    Status::header(&format!("{} priority hotspots", priority.len()));
    for hotspot in priority {
        println!(
            "  {:<12} {:<20} intensity {:.2}",
            hotspot.id,
            hotspot.display_name(),
            hotspot.intensity
        );
    }
    Ok(exit_codes::SUCCESS)
}

fn run_progress(
    donations: &Path,
    name: Option<&str>,
    addresses: Option<&Path>,
    config: &Config,
) -> CmdResult {
    let all = load_donations(donations)?;
    let selected: Vec<&Donation> = match name {
        Some(name) => stats::donations_by(&all, name),
        None => all.iter().collect(),
    };

    let known: HashMap<String, String> = match addresses {
        Some(path) => {
            if !path.exists() {
                return Err(Error::file_not_found(path));
            }
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::io(format!("Failed to read {}", path.display())).with_source(e)
            })?;
            serde_json::from_str(&content)?
        }
        None => HashMap::new(),
    };
    let book = AddressBook::with_timeout(
        StaticResolver::from(known),
        Duration::from_millis(config.schema.address.timeout_ms),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| Error::internal("Failed to start the async runtime").with_source(e))?;

    let now = Utc::now();
    let duration_days = config.schema.cleanup.duration_days;

    Status::header(&format!("{} donated regions", selected.len()));
    for donation in &selected {
        let progress = stats::cleanup_progress(donation.date, now, duration_days);
        let address = runtime.block_on(book.lookup(donation.location));
        println!(
            "  {} {}  {:<28} {}",
            progress_bar(progress, 10),
            format_progress(progress),
            address,
            format_area(donation.area_km2)
        );
    }

    let owned: Vec<Donation> = selected.into_iter().cloned().collect();
    let completed = stats::completed_count(&owned, now, duration_days);
    println!();
    println!(
        "Protected {}, completed {}곳, total {}",
        format_area(owned.iter().map(|d| d.area_km2).sum()),
        completed,
        format_amount(stats::total_amount(&owned))
    );
    Ok(exit_codes::SUCCESS)
}
