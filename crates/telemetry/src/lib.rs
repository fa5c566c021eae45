//! Logging and lightweight metrics for MyOcean tools
//!
//! - Structured logging with `tracing`, filtered by `RUST_LOG` or the
//!   configured level
//! - In-process counters, gauges and histograms for a run summary
//! - [`Timer`] for recording operation durations

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};
use uuid::Uuid;

/// Metric names shared by the MyOcean binaries
pub mod names {
    pub const DONATIONS_LOADED: &str = "donations.loaded";
    pub const HOTSPOTS_LOADED: &str = "hotspots.loaded";
    pub const FUNDING_EVALUATED: &str = "funding.evaluated";
    pub const FUNDING_COMPLETE: &str = "funding.complete";
    pub const LOAD_MS: &str = "dataset.load_ms";
    pub const FUNDING_MS: &str = "funding.evaluate_ms";
}

static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Correlates log lines of a single run
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize logging. `RUST_LOG` takes precedence over `config.log_level`.
///
/// The returned handle changes the level later, e.g. once a config file
/// naming its own level has been read.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<LogHandle> {
    let (subscriber, handle) = build_subscriber(&config)?;

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        level = %config.log_level,
        "Telemetry initialized"
    );

    Ok(handle)
}

fn build_subscriber(
    config: &TelemetryConfig,
) -> anyhow::Result<(impl tracing::Subscriber + Send + Sync + 'static, LogHandle)> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::try_new(&config.log_level)?, false),
    };
    let (filter, reload_handle) = reload::Layer::new(filter);

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.show_target)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number)
            .compact(),
    );

    let handle = LogHandle {
        filter: reload_handle,
        from_env,
    };
    Ok((subscriber, handle))
}

/// Handle to the installed log filter
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogHandle {
    /// Replace the level filter. A filter taken from `RUST_LOG` is kept.
    pub fn set_level(&self, level: &str) -> anyhow::Result<()> {
        if self.from_env {
            return Ok(());
        }
        self.filter.reload(EnvFilter::try_new(level)?)?;
        tracing::debug!(level, "Log level changed");
        Ok(())
    }

    /// Most verbose level the current filter lets through.
    pub fn max_level(&self) -> Option<LevelFilter> {
        self.filter.with_current(|filter| filter.max_level_hint()).ok().flatten()
    }
}

pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Configured level, raised by each `-v` flag.
    pub fn for_verbosity(level: &str, verbose: u8) -> Self {
        let log_level = match verbose {
            0 => level.to_string(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        };

        Self {
            log_level,
            show_target: verbose >= 2,
            ..Self::default()
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

/// In-process metrics registry
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, AtomicU64>>,
    gauges: RwLock<HashMap<String, AtomicU64>>,
    histograms: RwLock<HashMap<String, Vec<f64>>>,
    start_time: Instant,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            gauges: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    pub fn increment(&self, name: &str) {
        self.increment_by(name, 1);
    }

    pub fn increment_by(&self, name: &str, value: u64) {
        if let Some(counter) = read(&self.counters).get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
            return;
        }

        write(&self.counters)
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(value, Ordering::Relaxed);
    }

    pub fn counter(&self, name: &str) -> u64 {
        read(&self.counters)
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    pub fn gauge(&self, name: &str, value: u64) {
        write(&self.gauges)
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .store(value, Ordering::Relaxed);
    }

    pub fn gauge_value(&self, name: &str) -> Option<u64> {
        read(&self.gauges).get(name).map(|g| g.load(Ordering::Relaxed))
    }

    pub fn histogram(&self, name: &str, value: f64) {
        write(&self.histograms)
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    pub fn histogram_stats(&self, name: &str) -> Option<HistogramStats> {
        read(&self.histograms)
            .get(name)
            .map(|values| HistogramStats::from_values(values))
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Snapshot of every metric as JSON
    pub fn export_json(&self) -> serde_json::Value {
        let counters: HashMap<String, u64> = read(&self.counters)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();

        let gauges: HashMap<String, u64> = read(&self.gauges)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();

        let histograms: HashMap<String, HistogramStats> = read(&self.histograms)
            .iter()
            .map(|(k, v)| (k.clone(), HistogramStats::from_values(v)))
            .collect();

        serde_json::json!({
            "session_id": session_id(),
            "uptime_ms": self.uptime().as_millis() as u64,
            "counters": counters,
            "gauges": gauges,
            "histograms": histograms,
        })
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of recorded histogram values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
}

impl HistogramStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                p50: 0.0,
                p95: 0.0,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();

        Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sum / count as f64,
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Global metrics registry
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

/// Records elapsed milliseconds into a histogram, once.
///
/// Dropping a running timer records it as well.
pub struct Timer {
    name: &'static str,
    start: Instant,
    recorded: bool,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
            recorded: false,
        }
    }

    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let duration = self.start.elapsed();
        if !self.recorded {
            self.recorded = true;
            metrics().histogram(self.name, duration.as_secs_f64() * 1000.0);
            tracing::debug!(
                metric = self.name,
                duration_ms = duration.as_millis() as u64,
                "Timer completed"
            );
        }
        duration
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.record();
    }
}

/// Structured event for an audit trail of user actions
#[derive(Debug, Serialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub event_type: String,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: session_id().to_string(),
            event_type: event_type.into(),
            data,
        }
    }

    pub fn log(&self) {
        tracing::info!(
            event_type = %self.event_type,
            data = %self.data,
            "Event recorded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.increment(names::DONATIONS_LOADED);
        registry.increment_by(names::DONATIONS_LOADED, 4);

        assert_eq!(registry.counter(names::DONATIONS_LOADED), 5);
        assert_eq!(registry.counter("missing"), 0);
    }

    #[test]
    fn test_gauges_overwrite() {
        let registry = MetricsRegistry::new();
        registry.gauge(names::HOTSPOTS_LOADED, 42);
        registry.gauge(names::HOTSPOTS_LOADED, 7);

        assert_eq!(registry.gauge_value(names::HOTSPOTS_LOADED), Some(7));
    }

    #[test]
    fn test_histogram_stats() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let stats = HistogramStats::from_values(&values);

        assert_eq!(stats.count, 10);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.mean, 5.5);
        assert_eq!(stats.p95, 10.0);
        assert_eq!(HistogramStats::from_values(&[]).count, 0);
    }

    #[test]
    fn test_timer_records_once() {
        let timer = Timer::start("test.timer_once");
        std::thread::sleep(Duration::from_millis(5));
        let duration = timer.stop();

        assert!(duration >= Duration::from_millis(5));
        assert_eq!(metrics().histogram_stats("test.timer_once").map(|s| s.count), Some(1));
    }

    #[test]
    fn test_timer_records_on_drop() {
        {
            let _timer = Timer::start("test.timer_drop");
        }
        assert_eq!(metrics().histogram_stats("test.timer_drop").map(|s| s.count), Some(1));
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(TelemetryConfig::for_verbosity("warn", 0).log_level, "warn");
        assert_eq!(TelemetryConfig::for_verbosity("warn", 1).log_level, "info");
        assert_eq!(TelemetryConfig::for_verbosity("warn", 5).log_level, "trace");
    }

    #[test]
    fn test_log_level_can_be_raised_after_build() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let (_subscriber, handle) = build_subscriber(&TelemetryConfig::default()).unwrap();
        assert_eq!(handle.max_level(), Some(LevelFilter::WARN));

        handle.set_level("debug").unwrap();
        assert_eq!(handle.max_level(), Some(LevelFilter::DEBUG));
        assert!(handle.set_level("myocean=loudest").is_err());
    }

    #[test]
    fn test_export_json() {
        let registry = MetricsRegistry::new();
        registry.increment(names::FUNDING_COMPLETE);

        let json = registry.export_json();
        assert_eq!(json["counters"][names::FUNDING_COMPLETE], 1);
        assert!(Uuid::parse_str(json["session_id"].as_str().unwrap()).is_ok());
    }
}
