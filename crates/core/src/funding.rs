//! Funding aggregation.
//!
//! Donations are not linked to hotspots by id. A donation counts towards every
//! hotspot within the funding radius of where it was placed, and a hotspot is
//! collection-ready once those donations reach a fraction of its target.

use crate::config::FundingConfig;
use crate::model::{Donation, Hotspot};
use myocean_geo::{calculate_distances_sorted, within_radius, DistanceResult, Located};
use serde::Serialize;

/// Donations within this distance (km) count towards a hotspot
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Fraction of the target that makes a hotspot collection-ready
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.7;

/// Sum of donation amounts within `radius_km` (inclusive) of the hotspot.
pub fn total_donated_near(hotspot: &Hotspot, donations: &[Donation], radius_km: f64) -> u64 {
    nearby_donations(hotspot, donations, radius_km)
        .into_iter()
        .map(Donation::amount)
        .sum()
}

/// True iff the hotspot has a target and donations within the default radius
/// reach `threshold * target`.
pub fn is_funding_complete(hotspot: &Hotspot, donations: &[Donation], threshold: f64) -> bool {
    let total = total_donated_near(hotspot, donations, DEFAULT_RADIUS_KM);
    meets_threshold(total, hotspot.target_amount, threshold)
}

/// `floor(min(100, 100 * total / target))` over the default radius; 0 without a target.
pub fn funding_progress_percent(hotspot: &Hotspot, donations: &[Donation]) -> u8 {
    let total = total_donated_near(hotspot, donations, DEFAULT_RADIUS_KM);
    progress_percent(total, hotspot.target_amount)
}

/// The `limit` donations closest to the hotspot, nearest first, at any distance.
pub fn nearest_donations(
    hotspot: &Hotspot,
    donations: &[Donation],
    limit: usize,
) -> Vec<DistanceResult> {
    calculate_distances_sorted(&hotspot.location(), donations, Some(limit))
}

fn nearby_donations<'a>(
    hotspot: &Hotspot,
    donations: &'a [Donation],
    radius_km: f64,
) -> Vec<&'a Donation> {
    within_radius(&hotspot.location(), donations, radius_km)
}

/// A missing or zero target is never complete.
fn meets_threshold(total: u64, target: Option<u64>, threshold: f64) -> bool {
    match target {
        Some(target) if target > 0 => {
            let required = threshold * target as f64;
            // 0.7 * 10_000_000 is not exact in binary; allow for the rounding.
            total as f64 >= required - required.abs() * 1e-12
        }
        _ => false,
    }
}

fn progress_percent(total: u64, target: Option<u64>) -> u8 {
    match target {
        Some(target) if target > 0 => {
            let percent = (u128::from(total) * 100 / u128::from(target)).min(100);
            percent as u8
        }
        _ => 0,
    }
}

/// Radius and threshold used to evaluate hotspots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundingPolicy {
    pub radius_km: f64,
    pub completion_threshold: f64,
}

impl Default for FundingPolicy {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            completion_threshold: DEFAULT_COMPLETION_THRESHOLD,
        }
    }
}

impl From<&FundingConfig> for FundingPolicy {
    fn from(config: &FundingConfig) -> Self {
        Self {
            radius_km: config.radius_km,
            completion_threshold: config.completion_threshold,
        }
    }
}

impl FundingPolicy {
    pub fn total_near(&self, hotspot: &Hotspot, donations: &[Donation]) -> u64 {
        total_donated_near(hotspot, donations, self.radius_km)
    }

    pub fn is_complete(&self, hotspot: &Hotspot, donations: &[Donation]) -> bool {
        meets_threshold(
            self.total_near(hotspot, donations),
            hotspot.target_amount,
            self.completion_threshold,
        )
    }

    pub fn progress_percent(&self, hotspot: &Hotspot, donations: &[Donation]) -> u8 {
        progress_percent(self.total_near(hotspot, donations), hotspot.target_amount)
    }

    /// Everything a funding view needs in one scan.
    pub fn summarize(&self, hotspot: &Hotspot, donations: &[Donation]) -> FundingSummary {
        let nearby = nearby_donations(hotspot, donations, self.radius_km);
        let total: u64 = nearby.iter().map(|d| d.amount()).sum();

        let summary = FundingSummary {
            hotspot_id: hotspot.id.clone(),
            total,
            target: hotspot.target_amount,
            percent: progress_percent(total, hotspot.target_amount),
            complete: meets_threshold(total, hotspot.target_amount, self.completion_threshold),
            donation_count: nearby.len(),
        };

        tracing::trace!(
            hotspot = %summary.hotspot_id,
            total = summary.total,
            percent = summary.percent,
            complete = summary.complete,
            "Funding evaluated"
        );
        summary
    }
}

/// Aggregated funding state of one hotspot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingSummary {
    pub hotspot_id: String,
    /// Sum of nearby donations (KRW)
    pub total: u64,
    pub target: Option<u64>,
    /// 0..=100
    pub percent: u8,
    /// Collection may start
    pub complete: bool,
    /// Donations that contributed to `total`
    pub donation_count: usize,
}
