//! Converts a facility input into base load, peak demand, and energy.

use serde::Serialize;
use tracing::debug;

use super::input::{AmenityLoad, DensitySource, FacilityInput};
use crate::error::ValidationError;
use crate::profiles::{HOURS_PER_YEAR, SizeMetricKind, Vertical};

/// How the energy figures were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBasis {
    /// Back-calculated from modeled peak demand and the profile load factor.
    Modeled,
    /// Peak demand derived from the site's stated annual consumption.
    Metered,
}

/// Electrical load of one facility. Recomputed wholesale on any input change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadEstimate {
    /// Vertical whose profile was applied.
    pub vertical: Vertical,
    /// Size metric the base load was derived from.
    pub primary_metric: SizeMetricKind,
    /// Value of the primary metric.
    pub primary_value: f64,
    /// kW per primary-metric unit actually used.
    pub power_density_kw: f64,
    /// Where `power_density_kw` came from.
    pub density_source: DensitySource,
    /// `primary_value × power_density_kw`.
    pub base_load_kw: f64,
    /// Sum of all amenity and equipment loads.
    pub amenity_load_kw: f64,
    /// EV-charging share of `amenity_load_kw`.
    pub ev_charger_kw: f64,
    /// Peak demand before diversity: `base_load_kw + amenity_load_kw`.
    pub connected_load_kw: f64,
    /// Diversity factor from the profile.
    pub peak_multiplier: f64,
    /// Coincident peak demand (kW).
    pub peak_demand_kw: f64,
    /// Share of peak that must survive an outage (kW).
    pub critical_load_kw: f64,
    /// Load factor used for the energy figures.
    pub load_factor: f64,
    pub daily_kwh: f64,
    pub annual_kwh: f64,
    pub energy_basis: EnergyBasis,
    /// Itemized amenity and equipment contributions.
    pub amenities: Vec<AmenityLoad>,
}

/// Estimates load for a facility input.
///
/// The profile is resolved from the input's vertical (unknown verticals were
/// already mapped to the generic profile). Base load is the primary size
/// metric times its density; amenities add a fixed kW each; the diversity
/// multiplier turns the sum into coincident peak demand.
///
/// # Errors
///
/// Returns a [`ValidationError`] when no size metric is present or a
/// magnitude is negative.
pub fn estimate_load(input: &FacilityInput) -> Result<LoadEstimate, ValidationError> {
    input.validate()?;

    let facility = &input.facility;
    let vertical = facility.vertical();
    let profile = vertical.profile();

    let (primary_metric, primary_value) =
        facility
            .size_metrics()
            .primary()
            .ok_or_else(|| ValidationError::MissingSizeMetric {
                vertical: facility.label().to_string(),
            })?;

    let (power_density_kw, density_source) = if primary_metric == profile.unit_field {
        facility
            .density_override(primary_metric)
            .unwrap_or((profile.power_density_kw, DensitySource::Profile))
    } else {
        (profile.density_for(primary_metric), DensitySource::Profile)
    };
    let base_load_kw = primary_value * power_density_kw;

    let amenities = facility.amenity_loads();
    let amenity_load_kw: f64 = amenities.iter().map(|a| a.kw).sum();
    let ev_charger_kw: f64 = amenities.iter().filter(|a| a.ev).map(|a| a.kw).sum();
    let connected_load_kw = base_load_kw + amenity_load_kw;

    let load_factor = profile.load_factor;
    let (peak_demand_kw, annual_kwh, energy_basis) = match input.site.annual_kwh {
        Some(annual) if annual > 0.0 && load_factor > 0.0 => (
            annual / HOURS_PER_YEAR / load_factor,
            annual,
            EnergyBasis::Metered,
        ),
        _ => {
            let peak = connected_load_kw * profile.peak_multiplier;
            (peak, peak * HOURS_PER_YEAR * load_factor, EnergyBasis::Modeled)
        }
    };

    let estimate = LoadEstimate {
        vertical,
        primary_metric,
        primary_value,
        power_density_kw,
        density_source,
        base_load_kw,
        amenity_load_kw,
        ev_charger_kw,
        connected_load_kw,
        peak_multiplier: profile.peak_multiplier,
        peak_demand_kw,
        critical_load_kw: peak_demand_kw * profile.critical_load_fraction,
        load_factor,
        daily_kwh: annual_kwh / 365.0,
        annual_kwh,
        energy_basis,
        amenities,
    };

    debug!(
        vertical = %vertical,
        metric = %primary_metric,
        base_kw = estimate.base_load_kw,
        peak_kw = estimate.peak_demand_kw,
        annual_kwh = estimate.annual_kwh,
        "load estimated"
    );

    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::input::{
        BuildingInput, CarWashInput, Facility, HotelAmenity, HotelInput, WashType,
    };

    fn hotel(rooms: u32, amenities: Vec<HotelAmenity>) -> FacilityInput {
        FacilityInput::new(Facility::Hotel(HotelInput {
            rooms: Some(rooms),
            amenities,
            ..HotelInput::default()
        }))
    }

    #[test]
    fn midscale_hotel_with_pool_and_restaurant() {
        let input = hotel(150, vec![HotelAmenity::Pool, HotelAmenity::Restaurant]);
        let load = estimate_load(&input).unwrap();
        assert_eq!(load.base_load_kw, 300.0);
        assert_eq!(load.amenity_load_kw, 125.0);
        assert_eq!(load.connected_load_kw, 425.0);
        let expected_peak = 425.0 * Vertical::Hotel.profile().peak_multiplier;
        assert!((load.peak_demand_kw - expected_peak).abs() < 1e-9);
    }

    #[test]
    fn tunnel_car_wash_two_bays() {
        let input = FacilityInput::new(Facility::CarWash(CarWashInput {
            bays: Some(2),
            wash_type: WashType::Tunnel,
            ..CarWashInput::default()
        }));
        let load = estimate_load(&input).unwrap();
        assert_eq!(load.primary_metric, SizeMetricKind::Bays);
        assert_eq!(load.connected_load_kw, 240.0);
    }

    #[test]
    fn annual_energy_uses_load_factor() {
        let input = FacilityInput::new(Facility::Office(BuildingInput {
            square_feet: Some(50_000.0),
            ..BuildingInput::default()
        }));
        let load = estimate_load(&input).unwrap();
        let lf = Vertical::Office.profile().load_factor;
        let expected = load.peak_demand_kw * HOURS_PER_YEAR * lf;
        assert!((load.annual_kwh - expected).abs() < 1e-6);
        assert!((load.daily_kwh * 365.0 - load.annual_kwh).abs() < 1e-6);
        assert_eq!(load.energy_basis, EnergyBasis::Modeled);
    }

    #[test]
    fn metered_consumption_drives_peak() {
        let mut input = hotel(100, vec![]);
        input.site.annual_kwh = Some(1_000_000.0);
        let load = estimate_load(&input).unwrap();
        let lf = Vertical::Hotel.profile().load_factor;
        assert_eq!(load.energy_basis, EnergyBasis::Metered);
        assert!((load.peak_demand_kw - 1_000_000.0 / HOURS_PER_YEAR / lf).abs() < 1e-9);
        // base load still reported from the room count
        assert_eq!(load.base_load_kw, 200.0);
    }

    #[test]
    fn secondary_metric_uses_square_foot_density() {
        let input = FacilityInput::new(Facility::Hotel(HotelInput {
            square_feet: Some(100_000.0),
            ..HotelInput::default()
        }));
        let load = estimate_load(&input).unwrap();
        assert_eq!(load.primary_metric, SizeMetricKind::SquareFeet);
        assert!((load.base_load_kw - 100_000.0 * 0.012).abs() < 1e-9);
    }

    #[test]
    fn missing_metric_is_validation_error() {
        let input = FacilityInput::new(Facility::Retail(BuildingInput::default()));
        assert!(matches!(
            estimate_load(&input),
            Err(ValidationError::MissingSizeMetric { .. })
        ));
    }

    #[test]
    fn critical_load_uses_profile_fraction() {
        let input = hotel(200, vec![]);
        let load = estimate_load(&input).unwrap();
        let frac = Vertical::Hotel.profile().critical_load_fraction;
        assert!((load.critical_load_kw - load.peak_demand_kw * frac).abs() < 1e-9);
    }
}
