//! Solar array sizing against load and available space.

use serde::{Deserialize, Serialize};

/// Equivalent full-sun hours per day used to turn a kW shortfall into kWh.
pub const PEAK_SUN_HOURS: f64 = 4.5;

/// Space-limited output below this share of the load-based target is reported
/// as infeasible.
pub const MATERIAL_SHORTFALL_RATIO: f64 = 0.9;

/// Where the array would be mounted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarMount {
    #[default]
    Rooftop,
    Carport,
    GroundMount,
}

impl SolarMount {
    /// Square feet required per kW DC, including setbacks and row spacing.
    pub fn area_per_kw_sqft(self) -> f64 {
        match self {
            Self::Rooftop => 100.0,
            Self::Carport => 120.0,
            Self::GroundMount => 175.0,
        }
    }
}

/// Space available for an array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarSite {
    pub mount: SolarMount,
    pub available_area_sqft: f64,
}

impl SolarSite {
    /// Largest array the space can hold (kW).
    pub fn capacity_kw(&self) -> f64 {
        self.available_area_sqft / self.mount.area_per_kw_sqft()
    }
}

/// Alternative offered when space cannot hold the load-based array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolarMitigation {
    /// Put the missing capacity on a ground-mount array instead.
    GroundMount {
        /// Extra land needed for the shortfall.
        additional_area_sqft: f64,
    },
    /// Replace the missing solar energy with longer battery duration.
    ExtendDuration {
        /// Hours to add to the battery duration.
        additional_hours: f64,
    },
}

/// Outcome of sizing solar against load and space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarAssessment {
    pub max_solar_ratio: f64,
    /// Mount of the stated site, if any.
    pub mount: Option<SolarMount>,
    /// `peak_demand_kw × max_solar_ratio`.
    pub load_based_kw: f64,
    /// Capacity the stated space supports, if a site was given.
    pub space_limited_kw: Option<f64>,
    /// Array actually carried into the configuration.
    pub recommended_kw: f64,
    /// False when the space-limited array is materially short of the target.
    pub feasible: bool,
    /// `load_based_kw - recommended_kw`.
    pub shortfall_kw: f64,
    pub mitigations: Vec<SolarMitigation>,
}

/// Sizes solar for a facility.
///
/// The array is the smaller of the load-based target and what the site can
/// hold; a material shortfall is reported with at least one alternative.
pub fn assess_solar(
    peak_demand_kw: f64,
    max_solar_ratio: f64,
    site: Option<&SolarSite>,
    battery_kw: f64,
) -> SolarAssessment {
    let load_based_kw = peak_demand_kw * max_solar_ratio;
    let space_limited_kw = site.map(SolarSite::capacity_kw);
    let recommended_kw = space_limited_kw.map_or(load_based_kw, |s| s.min(load_based_kw));
    let shortfall_kw = load_based_kw - recommended_kw;
    let feasible = space_limited_kw.is_none_or(|s| s >= load_based_kw * MATERIAL_SHORTFALL_RATIO);

    let mut mitigations = Vec::new();
    if !feasible {
        if site.is_some_and(|s| s.mount != SolarMount::GroundMount) {
            mitigations.push(SolarMitigation::GroundMount {
                additional_area_sqft: shortfall_kw * SolarMount::GroundMount.area_per_kw_sqft(),
            });
        }
        if battery_kw > 0.0 {
            mitigations.push(SolarMitigation::ExtendDuration {
                additional_hours: shortfall_kw * PEAK_SUN_HOURS / battery_kw,
            });
        }
        if mitigations.is_empty() {
            mitigations.push(SolarMitigation::GroundMount {
                additional_area_sqft: shortfall_kw * SolarMount::GroundMount.area_per_kw_sqft(),
            });
        }
    }

    SolarAssessment {
        max_solar_ratio,
        mount: site.map(|s| s.mount),
        load_based_kw,
        space_limited_kw,
        recommended_kw,
        feasible,
        shortfall_kw,
        mitigations,
    }
}
