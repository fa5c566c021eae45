//! Application state snapshots.
//!
//! An [`OceanState`] never changes once built. Each transition returns a new
//! snapshot; donation and hotspot lists are shared between snapshots.

use crate::error::{Error, Result};
use crate::funding::{FundingPolicy, FundingSummary};
use crate::model::{ensure_unique_ids, Donation, Hotspot};
use serde::Serialize;
use std::sync::Arc;

/// What the map is currently showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Mode {
    /// Accepting donations
    Funding,
    /// Collection vessel dispatched to a funded hotspot
    #[serde(rename_all = "camelCase")]
    Collection { hotspot_id: String },
}

/// Immutable snapshot of donations, hotspots and the current mode.
#[derive(Debug, Clone)]
pub struct OceanState {
    donations: Arc<[Donation]>,
    hotspots: Arc<[Hotspot]>,
    mode: Mode,
}

impl Default for OceanState {
    fn default() -> Self {
        Self {
            donations: Arc::new([]),
            hotspots: Arc::new([]),
            mode: Mode::Funding,
        }
    }
}

impl OceanState {
    /// Snapshot in funding mode. Fails if a donation id repeats.
    pub fn new(donations: Vec<Donation>, hotspots: Vec<Hotspot>) -> Result<Self> {
        ensure_unique_ids(&donations)?;
        Ok(Self {
            donations: donations.into(),
            hotspots: hotspots.into(),
            mode: Mode::Funding,
        })
    }

    pub fn donations(&self) -> &[Donation] {
        &self.donations
    }

    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn hotspot(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    /// Snapshot with `donation` appended. A donation already in the
    /// snapshot is refused.
    pub fn with_donation(&self, donation: Donation) -> Result<Self> {
        if self.donations.iter().any(|d| d.id == donation.id) {
            return Err(Error::duplicate_donation(&donation.id));
        }
        tracing::debug!(id = %donation.id, amount = donation.amount(), "Donation added");

        let donations: Vec<Donation> = self
            .donations
            .iter()
            .cloned()
            .chain(std::iter::once(donation))
            .collect();

        Ok(Self {
            donations: donations.into(),
            hotspots: Arc::clone(&self.hotspots),
            mode: self.mode.clone(),
        })
    }

    /// Funding summary of every hotspot, in dataset order.
    pub fn funding(&self, policy: &FundingPolicy) -> Vec<FundingSummary> {
        self.hotspots
            .iter()
            .map(|h| policy.summarize(h, &self.donations))
            .collect()
    }

    /// Switch to collection mode at a funded hotspot.
    pub fn begin_collection(&self, hotspot_id: &str, policy: &FundingPolicy) -> Result<Self> {
        if let Mode::Collection { hotspot_id: current } = &self.mode {
            return Err(Error::already_collecting(current));
        }

        let hotspot = self
            .hotspot(hotspot_id)
            .ok_or_else(|| Error::hotspot_not_found(hotspot_id))?;

        let summary = policy.summarize(hotspot, &self.donations);
        if !summary.complete {
            return Err(Error::funding_incomplete(hotspot_id, summary.percent));
        }

        tracing::info!(hotspot = %hotspot_id, total = summary.total, "Collection started");

        Ok(Self {
            donations: Arc::clone(&self.donations),
            hotspots: Arc::clone(&self.hotspots),
            mode: Mode::Collection {
                hotspot_id: hotspot_id.to_string(),
            },
        })
    }

    /// Return to funding mode. A no-op in funding mode.
    #[must_use]
    pub fn end_collection(&self) -> Self {
        if let Mode::Collection { hotspot_id } = &self.mode {
            tracing::info!(hotspot = %hotspot_id, "Collection ended");
        }

        Self {
            donations: Arc::clone(&self.donations),
            hotspots: Arc::clone(&self.hotspots),
            mode: Mode::Funding,
        }
    }
}
