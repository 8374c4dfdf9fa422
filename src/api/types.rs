//! API response types.

use serde::Serialize;

use crate::config::QuoteConfig;
use crate::profiles::{FacilityProfile, SizeMetricKind, Vertical};
use crate::sizing::Objective;

/// One entry of `GET /verticals`.
#[derive(Debug, Serialize)]
pub struct VerticalInfo {
    pub key: &'static str,
    pub name: &'static str,
    /// Metric the headline density is expressed per.
    pub unit_field: SizeMetricKind,
    pub power_density_kw: f64,
    pub load_factor: f64,
    pub critical_load_fraction: f64,
    pub source: &'static str,
}

impl From<&FacilityProfile> for VerticalInfo {
    fn from(p: &FacilityProfile) -> Self {
        Self {
            key: p.vertical.key(),
            name: p.name,
            unit_field: p.unit_field,
            power_density_kw: p.power_density_kw,
            load_factor: p.load_factor,
            critical_load_fraction: p.critical_load_fraction,
            source: p.source,
        }
    }
}

/// One entry of `GET /presets`.
#[derive(Debug, Serialize)]
pub struct PresetInfo {
    pub name: &'static str,
    pub vertical: Vertical,
    pub objective: Objective,
}

impl PresetInfo {
    pub fn new(name: &'static str, cfg: &QuoteConfig) -> Self {
        Self {
            name,
            vertical: cfg.facility.vertical(),
            objective: cfg.sizing.objective,
        }
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
