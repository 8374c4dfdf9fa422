//! Static per-vertical reference data.
//!
//! Each [`FacilityProfile`] is immutable and looked up by [`Vertical`]. An
//! unrecognized vertical key resolves to [`Vertical::Generic`] rather than an
//! error so that quoting degrades gracefully for industries without a
//! dedicated profile.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hours in a non-leap year.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Size metric kinds, in the priority order used to pick the primary metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMetricKind {
    /// Generic countable unit (rooms, dwellings, ports, dispensers, students).
    Units,
    /// Licensed patient beds.
    Beds,
    /// IT racks.
    Racks,
    /// Wash or service bays.
    Bays,
    /// Conditioned floor area.
    SquareFeet,
}

impl SizeMetricKind {
    /// Resolution order: the first present, non-zero metric wins.
    pub const PRIORITY: [SizeMetricKind; 5] = [
        SizeMetricKind::Units,
        SizeMetricKind::Beds,
        SizeMetricKind::Racks,
        SizeMetricKind::Bays,
        SizeMetricKind::SquareFeet,
    ];

    /// Density (kW per metric unit) used when a profile has none for this kind.
    pub fn generic_density_kw(self) -> f64 {
        match self {
            Self::Units => 1.0,
            Self::Beds => 5.0,
            Self::Racks => 8.0,
            Self::Bays => 50.0,
            Self::SquareFeet => 0.008,
        }
    }

    /// Field name as it appears in input records.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::Beds => "beds",
            Self::Racks => "racks",
            Self::Bays => "bays",
            Self::SquareFeet => "square_feet",
        }
    }
}

impl fmt::Display for SizeMetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Industry vertical served by the quoting engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    Hotel,
    Hospital,
    DataCenter,
    TruckStop,
    CarWash,
    EvCharging,
    Office,
    Retail,
    ShoppingCenter,
    Warehouse,
    Government,
    ColdStorage,
    Manufacturing,
    College,
    Apartment,
    Casino,
    Airport,
    Agriculture,
    IndoorFarm,
    GasStation,
    /// Fallback for keys without a dedicated profile.
    Generic,
}

impl Vertical {
    /// Every vertical with a dedicated profile, excluding [`Vertical::Generic`].
    pub const ALL: [Vertical; 20] = [
        Vertical::Hotel,
        Vertical::Hospital,
        Vertical::DataCenter,
        Vertical::TruckStop,
        Vertical::CarWash,
        Vertical::EvCharging,
        Vertical::Office,
        Vertical::Retail,
        Vertical::ShoppingCenter,
        Vertical::Warehouse,
        Vertical::Government,
        Vertical::ColdStorage,
        Vertical::Manufacturing,
        Vertical::College,
        Vertical::Apartment,
        Vertical::Casino,
        Vertical::Airport,
        Vertical::Agriculture,
        Vertical::IndoorFarm,
        Vertical::GasStation,
    ];

    /// Stable snake_case key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::Hospital => "hospital",
            Self::DataCenter => "data_center",
            Self::TruckStop => "truck_stop",
            Self::CarWash => "car_wash",
            Self::EvCharging => "ev_charging",
            Self::Office => "office",
            Self::Retail => "retail",
            Self::ShoppingCenter => "shopping_center",
            Self::Warehouse => "warehouse",
            Self::Government => "government",
            Self::ColdStorage => "cold_storage",
            Self::Manufacturing => "manufacturing",
            Self::College => "college",
            Self::Apartment => "apartment",
            Self::Casino => "casino",
            Self::Airport => "airport",
            Self::Agriculture => "agriculture",
            Self::IndoorFarm => "indoor_farm",
            Self::GasStation => "gas_station",
            Self::Generic => "generic",
        }
    }

    /// Resolves a key, falling back to [`Vertical::Generic`] when unknown.
    ///
    /// Matching ignores ASCII case and treats `-` like `_`.
    pub fn from_key(key: &str) -> Self {
        let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|v| v.key() == normalized)
            .unwrap_or(Self::Generic)
    }

    /// Reference profile for this vertical.
    pub fn profile(self) -> &'static FacilityProfile {
        profile(self)
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable per-vertical electrical parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityProfile {
    /// Vertical this profile describes.
    pub vertical: Vertical,
    /// Display name.
    pub name: &'static str,
    /// Metric the headline density is expressed per.
    pub unit_field: SizeMetricKind,
    /// Peak-basis kW per `unit_field` unit.
    pub power_density_kw: f64,
    /// kW per square foot when only floor area is known.
    pub sqft_density_kw: f64,
    /// Average-to-peak ratio used to derive annual energy (0–1).
    pub load_factor: f64,
    /// Share of peak demand that must survive an outage (0–1).
    pub critical_load_fraction: f64,
    /// Default storage duration for backup-oriented objectives (hours).
    pub default_duration_hours: f64,
    /// Diversity factor converting connected load into coincident peak (>= 1).
    pub peak_multiplier: f64,
    /// Battery power at or above which utility-scale pricing applies (kW).
    pub utility_threshold_kw: f64,
    /// Whether backup generation is N+1 by default.
    pub n_plus_one: bool,
    /// Minimum on-site fuel runtime required by code (hours).
    pub min_fuel_runtime_hours: f64,
    /// Citation for the density and load-factor figures.
    pub source: &'static str,
}

impl FacilityProfile {
    /// kW per unit of the given metric kind.
    pub fn density_for(&self, kind: SizeMetricKind) -> f64 {
        if kind == self.unit_field {
            self.power_density_kw
        } else if kind == SizeMetricKind::SquareFeet {
            self.sqft_density_kw
        } else {
            kind.generic_density_kw()
        }
    }
}

const CBECS: &str = "EIA CBECS 2018 end-use intensity";

#[expect(clippy::too_many_arguments)]
const fn p(
    vertical: Vertical,
    name: &'static str,
    unit_field: SizeMetricKind,
    power_density_kw: f64,
    sqft_density_kw: f64,
    load_factor: f64,
    critical_load_fraction: f64,
    default_duration_hours: f64,
    peak_multiplier: f64,
    n_plus_one: bool,
    min_fuel_runtime_hours: f64,
    source: &'static str,
) -> FacilityProfile {
    FacilityProfile {
        vertical,
        name,
        unit_field,
        power_density_kw,
        sqft_density_kw,
        load_factor,
        critical_load_fraction,
        default_duration_hours,
        peak_multiplier,
        utility_threshold_kw: 1000.0,
        n_plus_one,
        min_fuel_runtime_hours,
        source,
    }
}

use SizeMetricKind::{Bays, Beds, Racks, SquareFeet, Units};

#[rustfmt::skip]
static PROFILES: [FacilityProfile; 21] = [
    p(Vertical::Hotel, "Hotel", Units, 2.0, 0.012, 0.45, 0.40, 4.0, 1.3, false, 24.0,
      "ASHRAE 90.1 lodging LPD; CBECS 2018 lodging"),
    p(Vertical::Hospital, "Hospital", Beds, 10.0, 0.025, 0.70, 0.85, 8.0, 1.4, true, 96.0,
      "NFPA 99 / NFPA 110 Level 1; CBECS 2018 inpatient health care"),
    p(Vertical::DataCenter, "Data center", Racks, 8.0, 0.150, 0.85, 1.00, 4.0, 1.3, false, 48.0,
      "Uptime Institute tier topology; ASHRAE TC 9.9"),
    p(Vertical::TruckStop, "Truck stop / travel center", Units, 2.5, 0.020, 0.55, 0.50, 4.0, 1.5,
      false, 24.0, CBECS),
    p(Vertical::CarWash, "Car wash", Bays, 120.0, 0.020, 0.30, 0.20, 4.0, 1.5, false, 8.0,
      "International Carwash Association equipment survey"),
    p(Vertical::EvCharging, "EV charging hub", Units, 2.0, 0.005, 0.30, 0.30, 4.0, 1.8, false, 8.0,
      "SAE J1772 / J3400 charger ratings"),
    p(Vertical::Office, "Office", SquareFeet, 0.006, 0.006, 0.40, 0.30, 4.0, 1.4, false, 8.0, CBECS),
    p(Vertical::Retail, "Retail", SquareFeet, 0.008, 0.008, 0.45, 0.25, 4.0, 1.4, false, 8.0, CBECS),
    p(Vertical::ShoppingCenter, "Shopping center", SquareFeet, 0.010, 0.010, 0.50, 0.25, 4.0, 1.5,
      false, 8.0, CBECS),
    p(Vertical::Warehouse, "Warehouse", SquareFeet, 0.004, 0.004, 0.35, 0.30, 4.0, 1.3, false, 8.0,
      CBECS),
    p(Vertical::Government, "Government / public safety", SquareFeet, 0.007, 0.007, 0.40, 0.60, 6.0,
      1.4, false, 72.0, "FEMA P-2082; CBECS 2018 public order and safety"),
    p(Vertical::ColdStorage, "Cold storage", SquareFeet, 0.012, 0.012, 0.75, 0.90, 6.0, 1.3, false,
      48.0, "ASHRAE Refrigeration Handbook; CBECS 2018 refrigerated warehouse"),
    p(Vertical::Manufacturing, "Manufacturing", SquareFeet, 0.015, 0.015, 0.60, 0.50, 4.0, 1.6,
      false, 8.0, "EIA MECS 2018"),
    p(Vertical::College, "College / university", Units, 0.5, 0.010, 0.45, 0.40, 4.0, 1.5, false,
      24.0, CBECS),
    p(Vertical::Apartment, "Apartment / multifamily", Units, 1.5, 0.005, 0.40, 0.20, 4.0, 1.4, false,
      8.0, "NEC 220.84 multifamily demand factors"),
    p(Vertical::Casino, "Casino", SquareFeet, 0.030, 0.030, 0.80, 0.60, 6.0, 1.3, false, 24.0, CBECS),
    p(Vertical::Airport, "Airport terminal", SquareFeet, 0.020, 0.020, 0.70, 0.70, 6.0, 1.4, true,
      72.0, "FAA AC 150/5370-10; CBECS 2018"),
    p(Vertical::Agriculture, "Agriculture / irrigation", Units, 37.0, 0.003, 0.30, 0.30, 4.0, 1.8,
      false, 8.0, "USDA irrigation pump survey (50 hp pump)"),
    p(Vertical::IndoorFarm, "Indoor / vertical farm", SquareFeet, 0.050, 0.050, 0.70, 0.60, 6.0, 1.3,
      false, 24.0, "DLC horticultural lighting PPFD targets"),
    p(Vertical::GasStation, "Gas station / c-store", Units, 1.5, 0.025, 0.50, 0.40, 4.0, 1.5, false,
      24.0, CBECS),
    p(Vertical::Generic, "Generic commercial", SquareFeet, 0.008, 0.008, 0.45, 0.40, 4.0, 1.4, false,
      8.0, "generic commercial default"),
];

/// Returns the profile for `vertical`.
pub fn profile(vertical: Vertical) -> &'static FacilityProfile {
    PROFILES
        .iter()
        .find(|p| p.vertical == vertical)
        .unwrap_or(&PROFILES[PROFILES.len() - 1])
}

/// Resolves a profile by string key, falling back to the generic profile.
pub fn profile_for_key(key: &str) -> &'static FacilityProfile {
    profile(Vertical::from_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_vertical_has_its_own_profile() {
        for v in Vertical::ALL {
            assert_eq!(profile(v).vertical, v, "profile lookup for {v}");
        }
        assert_eq!(profile(Vertical::Generic).vertical, Vertical::Generic);
    }

    #[test]
    fn unknown_key_falls_back_to_generic() {
        assert_eq!(Vertical::from_key("bowling_alley"), Vertical::Generic);
        assert_eq!(profile_for_key("bowling_alley").name, "Generic commercial");
    }

    #[test]
    fn key_matching_is_lenient() {
        assert_eq!(Vertical::from_key("Data-Center"), Vertical::DataCenter);
        assert_eq!(Vertical::from_key(" car_wash "), Vertical::CarWash);
    }

    #[test]
    fn profile_values_are_in_range() {
        for v in Vertical::ALL.into_iter().chain([Vertical::Generic]) {
            let p = profile(v);
            assert!(p.power_density_kw > 0.0, "{v} density");
            assert!((0.0..=1.0).contains(&p.load_factor), "{v} load factor");
            assert!((0.0..=1.0).contains(&p.critical_load_fraction), "{v} critical fraction");
            assert!(p.peak_multiplier >= 1.0, "{v} peak multiplier");
            assert!(p.default_duration_hours > 0.0, "{v} duration");
        }
    }

    #[test]
    fn hotel_density_is_per_room() {
        let p = profile(Vertical::Hotel);
        assert_eq!(p.unit_field, SizeMetricKind::Units);
        assert_eq!(p.density_for(SizeMetricKind::Units), 2.0);
        assert_eq!(p.density_for(SizeMetricKind::SquareFeet), 0.012);
        assert_eq!(
            p.density_for(SizeMetricKind::Racks),
            SizeMetricKind::Racks.generic_density_kw()
        );
    }
}
