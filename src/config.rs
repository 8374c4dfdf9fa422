//! TOML-based quote configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::cost::PriceTable;
use crate::error::ValidationError;
use crate::finance::RateContext;
use crate::load::input::{
    CarWashInput, DataCenterInput, EvChargers, Facility, HospitalInput, HotelAmenity, HotelClass,
    HotelInput, TruckStopInput, UptimeTier, WashType, deserialize_facility,
};
use crate::load::{FacilityInput, SiteDetails};
use crate::quote::QuoteRequest;
use crate::sizing::{Objective, SizingOptions, SolarMount, SolarSite};

/// Top-level quote configuration parsed from TOML.
///
/// Every section except `[facility]` has defaults. Load from TOML with
/// [`QuoteConfig::from_toml_file`] or start from a named preset.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteConfig {
    /// Facility attributes, tagged by `vertical`.
    #[serde(deserialize_with = "deserialize_facility")]
    pub facility: Facility,
    /// Site-level facts.
    #[serde(default)]
    pub site: SiteDetails,
    /// Objective, duration, and sizing ratios.
    #[serde(default)]
    pub sizing: SizingOptions,
    /// Price snapshot; missing keys use built-in fallbacks.
    #[serde(default)]
    pub pricing: PriceTable,
    /// Utility rates and incentives.
    #[serde(default)]
    pub rates: RateContext,
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"rates.discount_rate"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl From<ValidationError> for ConfigError {
    fn from(e: ValidationError) -> Self {
        Self {
            field: e.field().to_string(),
            message: e.to_string(),
        }
    }
}

impl QuoteConfig {
    fn with_facility(facility: Facility) -> Self {
        Self {
            facility,
            site: SiteDetails::default(),
            sizing: SizingOptions::default(),
            pricing: PriceTable::new(),
            rates: RateContext::default(),
        }
    }

    /// 150-room midscale hotel with pool and restaurant, peak shaving.
    pub fn hotel_midscale() -> Self {
        let mut cfg = Self::with_facility(Facility::Hotel(HotelInput {
            rooms: Some(150),
            class: HotelClass::Midscale,
            amenities: vec![HotelAmenity::Pool, HotelAmenity::Restaurant],
            ..HotelInput::default()
        }));
        cfg.site.utility_rate_known = true;
        cfg
    }

    /// Two-bay tunnel car wash, peak shaving.
    pub fn car_wash_tunnel() -> Self {
        Self::with_facility(Facility::CarWash(CarWashInput {
            bays: Some(2),
            wash_type: WashType::Tunnel,
            vacuum_stations: 8,
            ..CarWashInput::default()
        }))
    }

    /// 200-bed hospital with N+1 generation and rooftop solar, resilience.
    pub fn hospital_resilience() -> Self {
        let mut cfg = Self::with_facility(Facility::Hospital(HospitalInput {
            beds: Some(200),
            operating_rooms: 8,
            imaging_units: 3,
            ..HospitalInput::default()
        }));
        cfg.site = SiteDetails {
            existing_backup_kw: Some(2_000.0),
            fuel_runtime_hours: Some(96.0),
            service_rating_kw: Some(5_000.0),
            critical_systems: ["icu", "operating rooms", "pharmacy", "imaging", "life safety"]
                .into_iter()
                .map(String::from)
                .collect(),
            solar_site: Some(SolarSite {
                mount: SolarMount::Rooftop,
                available_area_sqft: 60_000.0,
            }),
            ..SiteDetails::default()
        };
        cfg.sizing = SizingOptions {
            objective: Objective::Resilience,
            include_solar: true,
            include_generator: true,
            ..SizingOptions::default()
        };
        cfg
    }

    /// 400-rack Tier III data center, islanding microgrid.
    pub fn data_center_microgrid() -> Self {
        let mut cfg = Self::with_facility(Facility::DataCenter(DataCenterInput {
            racks: Some(400),
            tier: UptimeTier::Tier3,
            ..DataCenterInput::default()
        }));
        cfg.sizing = SizingOptions {
            objective: Objective::Microgrid,
            include_generator: true,
            ..SizingOptions::default()
        };
        cfg
    }

    /// Truck stop with DC fast charging, energy arbitrage.
    pub fn truck_stop_arbitrage() -> Self {
        let mut cfg = Self::with_facility(Facility::TruckStop(TruckStopInput {
            fueling_positions: Some(16),
            has_restaurant: true,
            ev_chargers: EvChargers {
                dcfc: 4,
                mcs: 1,
                ..EvChargers::default()
            },
            ..TruckStopInput::default()
        }));
        cfg.sizing.objective = Objective::Arbitrage;
        cfg.rates.price_spread_per_kwh = 0.12;
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "hotel_midscale",
        "car_wash_tunnel",
        "hospital_resilience",
        "data_center_microgrid",
        "truck_stop_arbitrage",
    ];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "hotel_midscale" => Ok(Self::hotel_midscale()),
            "car_wash_tunnel" => Ok(Self::car_wash_tunnel()),
            "hospital_resilience" => Ok(Self::hospital_resilience()),
            "data_center_microgrid" => Ok(Self::data_center_microgrid()),
            "truck_stop_arbitrage" => Ok(Self::truck_stop_arbitrage()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates every section and returns all errors found.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let input = FacilityInput {
            facility: self.facility.clone(),
            site: self.site.clone(),
        };
        [
            input.validate(),
            self.sizing.validate(),
            self.pricing.validate(),
            self.rates.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .map(ConfigError::from)
        .collect()
    }

    /// Converts into an engine request.
    pub fn into_request(self) -> QuoteRequest {
        QuoteRequest {
            input: FacilityInput {
                facility: self.facility,
                site: self.site,
            },
            sizing: self.sizing,
            pricing: self.pricing,
            rates: self.rates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::PriceKey;
    use crate::profiles::Vertical;

    #[test]
    fn from_preset_unknown() {
        let e = QuoteConfig::from_preset("nonexistent").unwrap_err();
        assert_eq!(e.field, "preset");
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in QuoteConfig::PRESETS {
            let cfg = QuoteConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[facility]
vertical = "hotel"
rooms = 200
class = "upscale"
amenities = ["pool", "spa"]

[site]
utility_rate_known = true
service_rating_kw = 1500.0

[sizing]
objective = "resilience"
duration_hours = 6.0
include_solar = true

[pricing]
battery_commercial_per_kwh = 320.0

[rates]
discount_rate = 0.07
analysis_years = 20
"#;
        let cfg = QuoteConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.facility.vertical(), Vertical::Hotel);
        assert_eq!(cfg.sizing.objective, Objective::Resilience);
        assert_eq!(cfg.sizing.duration_hours, Some(6.0));
        assert_eq!(cfg.pricing.get(PriceKey::BatteryCommercialPerKwh).value, 320.0);
        assert_eq!(cfg.rates.analysis_years, 20);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let toml = r#"
[facility]
vertical = "office"
square_feet = 40000.0

[bogus]
x = 1
"#;
        assert!(QuoteConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn missing_facility_is_rejected() {
        assert!(QuoteConfig::from_toml_str("[rates]\ndiscount_rate = 0.05\n").is_err());
    }

    #[test]
    fn unknown_vertical_falls_back_to_generic() {
        let toml = r#"
[facility]
vertical = "bowling_alley"
square_feet = 30000.0
"#;
        let cfg = QuoteConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.facility.vertical(), Vertical::Generic);
    }

    #[test]
    fn validation_collects_every_section() {
        let mut cfg = QuoteConfig::car_wash_tunnel();
        cfg.sizing.duration_hours = Some(0.0);
        cfg.rates.discount_rate = -0.01;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "sizing.duration_hours"));
        assert!(errors.iter().any(|e| e.field == "rates.discount_rate"));
    }

    #[test]
    fn missing_size_metric_is_reported() {
        let cfg = QuoteConfig::with_facility(Facility::Hotel(HotelInput::default()));
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "facility");
    }

    #[test]
    fn preset_converts_to_request() {
        let request = QuoteConfig::hospital_resilience().into_request();
        assert!(request.sizing.include_generator);
        assert_eq!(request.input.facility.vertical(), Vertical::Hospital);
    }
}
