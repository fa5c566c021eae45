//! Donor statistics, rankings and cleanup progress.

use crate::model::{Donation, Hotspot};
use chrono::{DateTime, Utc};
use myocean_geo::{within_radius, Located};
use serde::Serialize;
use std::collections::BTreeMap;

/// Days until a protected region counts as fully cleaned
pub const DEFAULT_CLEANUP_DAYS: u32 = 100;

/// Default length of the donor ranking
pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// Hotspots denser than this are cleanup candidates
pub const PRIORITY_INTENSITY: f64 = 0.7;

/// Hotspots with fewer nearby donations than this are under-funded
pub const PRIORITY_MAX_PARTICIPATION: usize = 3;

/// One row of the donor ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingItem {
    /// 1-based, in ranking order
    pub rank: usize,
    pub name: String,
    pub amount: u64,
    pub donation_count: usize,
}

/// Sum of all donation amounts.
pub fn total_amount(donations: &[Donation]) -> u64 {
    donations.iter().map(Donation::amount).sum()
}

/// Donations made under `name`.
pub fn donations_by<'a>(donations: &'a [Donation], name: &str) -> Vec<&'a Donation> {
    donations.iter().filter(|d| d.name == name).collect()
}

/// Donations whose stored region name is `region_name`.
pub fn donations_in_region<'a>(donations: &'a [Donation], region_name: &str) -> Vec<&'a Donation> {
    donations.iter().filter(|d| d.region_name == region_name).collect()
}

/// Donors by total amount, highest first. Equal totals are ordered by name.
pub fn top_donors(donations: &[Donation], limit: usize) -> Vec<RankingItem> {
    let mut totals: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for donation in donations {
        let entry = totals.entry(donation.name.as_str()).or_default();
        entry.0 += donation.amount();
        entry.1 += 1;
    }

    let mut ranked: Vec<_> = totals.into_iter().collect();
    // Stable sort keeps the map's name order for equal amounts.
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0));

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (name, (amount, donation_count)))| RankingItem {
            rank: index + 1,
            name: name.to_string(),
            amount,
            donation_count,
        })
        .collect()
}

/// Simulated cleanup progress: `floor(min(100, days * 100 / duration))`.
///
/// Elapsed time is counted in whole days. Dates in the future give 0, and a
/// zero duration counts as done.
pub fn cleanup_progress(date: DateTime<Utc>, now: DateTime<Utc>, duration_days: u32) -> u8 {
    let days = (now - date).num_days();
    if days <= 0 {
        return 0;
    }
    if duration_days == 0 {
        return 100;
    }

    let percent = (days as u64).saturating_mul(100) / u64::from(duration_days);
    percent.min(100) as u8
}

/// Donations whose simulated cleanup has finished.
pub fn completed_count(donations: &[Donation], now: DateTime<Utc>, duration_days: u32) -> usize {
    donations
        .iter()
        .filter(|d| cleanup_progress(d.date, now, duration_days) >= 100)
        .count()
}

/// Dense hotspots with little donor participation within `radius_km`.
pub fn priority_hotspots<'a>(
    hotspots: &'a [Hotspot],
    donations: &[Donation],
    radius_km: f64,
) -> Vec<&'a Hotspot> {
    let priority: Vec<&Hotspot> = hotspots
        .iter()
        .filter(|h| h.intensity > PRIORITY_INTENSITY)
        .filter(|h| {
            within_radius(&h.location(), donations, radius_km).len() < PRIORITY_MAX_PARTICIPATION
        })
        .collect();

    tracing::debug!(
        candidates = hotspots.len(),
        priority = priority.len(),
        radius_km,
        "Priority hotspots selected"
    );
    priority
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeometryConfig;
    use crate::model::HotspotKind;
    use chrono::{Duration, TimeZone};
    use myocean_geo::{Coordinate, DonationTier};

    fn donation(name: &str, tier: DonationTier) -> Donation {
        let location = Coordinate::new(35.1, 129.1);
        Donation::new(name, tier, location, &GeometryConfig::default(), Utc::now()).unwrap()
    }

    fn hotspot(id: &str, intensity: f64, lat: f64) -> Hotspot {
        Hotspot {
            id: id.to_string(),
            location: Coordinate::new(lat, 129.1),
            intensity,
            activity_count: 10,
            kind: HotspotKind::Debris,
            region_name: None,
            target_amount: None,
        }
    }

    #[test]
    fn test_total_amount_and_filters() {
        let donations = vec![
            donation("김바다", DonationTier::Small),
            donation("이파도", DonationTier::Medium),
            donation("김바다", DonationTier::Large),
        ];

        assert_eq!(total_amount(&donations), 11_100_000);
        assert_eq!(donations_by(&donations, "김바다").len(), 2);
        assert!(donations_by(&donations, "nobody").is_empty());
        assert_eq!(donations_in_region(&donations, "35.10°N 129.10°E").len(), 3);
    }

    #[test]
    fn test_top_donors_ranks_follow_sorted_order() {
        let donations = vec![
            donation("a", DonationTier::Small),
            donation("b", DonationTier::Large),
            donation("c", DonationTier::Medium),
            donation("a", DonationTier::Medium),
        ];

        let ranking = top_donors(&donations, DEFAULT_RANKING_LIMIT);
        let names: Vec<&str> = ranking.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(ranking.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(ranking[1].amount, 1_100_000);
        assert_eq!(ranking[1].donation_count, 2);
    }

    #[test]
    fn test_top_donors_ties_and_limit() {
        let donations = vec![
            donation("zeta", DonationTier::Medium),
            donation("alpha", DonationTier::Medium),
            donation("mid", DonationTier::Small),
        ];

        let ranking = top_donors(&donations, 2);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].name, "alpha");
        assert_eq!(ranking[1].name, "zeta");
        assert!(top_donors(&[], 10).is_empty());
    }

    #[test]
    fn test_cleanup_progress() {
        let date = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(cleanup_progress(date, date, 100), 0);
        assert_eq!(cleanup_progress(date, date + Duration::hours(47), 100), 1);
        assert_eq!(cleanup_progress(date, date + Duration::days(50), 100), 50);
        assert_eq!(cleanup_progress(date, date + Duration::days(365), 100), 100);
        assert_eq!(cleanup_progress(date, date - Duration::days(3), 100), 0);
        assert_eq!(cleanup_progress(date, date + Duration::days(10), 30), 33);
    }

    #[test]
    fn test_completed_count() {
        let now = Utc::now();
        let mut old = donation("a", DonationTier::Small);
        old.date = now - Duration::days(120);
        let fresh = donation("b", DonationTier::Small);

        assert_eq!(completed_count(&[old, fresh], now, DEFAULT_CLEANUP_DAYS), 1);
    }

    #[test]
    fn test_priority_hotspots() {
        let hotspots = vec![
            hotspot("dense-funded", 0.9, 35.1),
            hotspot("dense-quiet", 0.9, 36.0),
            hotspot("sparse", 0.5, 36.5),
            hotspot("edge", 0.7, 37.0),
        ];
        let donations: Vec<Donation> = (0..3).map(|_| donation("a", DonationTier::Small)).collect();

        let ids: Vec<&str> = priority_hotspots(&hotspots, &donations, 10.0)
            .iter()
            .map(|h| h.id.as_str())
            .collect();
        assert_eq!(ids, vec!["dense-quiet"]);
    }
}
