//! Core domain of the MyOcean donation platform
//!
//! Donors protect a patch of sea whose size depends on the donation tier.
//! Donations near a marine hotspot fund its cleanup; once enough has been
//! raised, a collection run can start.
//!
//! - **Model**: donation and hotspot records in the front end's JSON layout
//! - **Dataset**: loading the preprocessed hotspot grid and donation exports
//! - **Funding**: radius-based aggregation and completion checks
//! - **State**: immutable snapshots of donations, hotspots and mode
//! - **Stats**: totals, donor ranking, cleanup progress, priority hotspots
//! - **Address**: reverse geocoding with timeout and fallback
//! - **Configuration**: TOML-based configuration with validation
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use myocean_core::prelude::*;
//!
//! let config = Config::defaults();
//! let donation = Donation::new(
//!     "김바다",
//!     DonationTier::Large,
//!     Coordinate::new(35.1, 129.1),
//!     &config.schema.geometry,
//!     Utc::now(),
//! )?;
//!
//! let state = OceanState::default().with_donation(donation)?;
//! assert_eq!(stats::total_amount(state.donations()), 10_000_000);
//! # Ok::<(), myocean_core::Error>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]

pub mod address;
pub mod config;
pub mod dataset;
pub mod error;
pub mod funding;
pub mod model;
pub mod state;
pub mod stats;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::address::{resolve_with_fallback, AddressBook, AddressResolver};
    pub use crate::config::{Config, ConfigSchema, GeometryConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::funding::{FundingPolicy, FundingSummary};
    pub use crate::model::{Donation, Hotspot, HotspotKind};
    pub use crate::state::{Mode, OceanState};
    pub use crate::stats::{self, RankingItem};
    pub use myocean_geo::{AreaTable, Coordinate, DonationShape, DonationTier, ShapeKind};
}
