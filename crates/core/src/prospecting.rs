//! Prospecting capability consumed by campaigns and the scheduled job.
//!
//! The core only depends on the [`LeadHunter`] trait; concrete hunters backed
//! by search/scrape providers live in the integrations crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::agent::TargetConfig;
use crate::domain::lead::{EnrichmentOutcome, LeadCandidate};
use crate::errors::ProviderError;

/// Approximate degrees per kilometre used to offset grid cells.
pub const DEGREES_PER_KM: f64 = 0.009;

#[async_trait]
pub trait LeadHunter: Send + Sync {
    async fn grid_search(&self, target: &TargetConfig)
        -> Result<Vec<LeadCandidate>, ProviderError>;

    /// Soft-fails with [`EnrichmentOutcome::Skipped`] when no provider is configured.
    async fn enrich(&self, website: &str) -> EnrichmentOutcome;
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub lat: f64,
    pub lng: f64,
}

/// Search cells covering `target`: the centre alone for radii under 1 km,
/// otherwise the centre plus four diagonal offsets.
pub fn grid_cells(target: &TargetConfig) -> Vec<GridCell> {
    let (lat, lng) = (target.latitude, target.longitude);
    if target.radius_km < 1.0 {
        return vec![GridCell { lat, lng }];
    }

    let offset = target.radius_km * DEGREES_PER_KM;
    vec![
        GridCell { lat, lng },
        GridCell { lat: lat + offset, lng: lng + offset },
        GridCell { lat: lat - offset, lng: lng - offset },
        GridCell { lat: lat + offset, lng: lng - offset },
        GridCell { lat: lat - offset, lng: lng + offset },
    ]
}
