//! Sizing engine: peak demand plus objective to a recommended system.

pub mod solar;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ValidationError, ensure_non_negative};
use crate::load::{FacilityInput, LoadEstimate};
use crate::profiles::{FacilityProfile, Vertical};

pub use solar::{SolarAssessment, SolarMitigation, SolarMount, SolarSite, assess_solar};

/// What the storage system is primarily bought for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    PeakShaving,
    Resilience,
    Arbitrage,
    Microgrid,
}

impl Objective {
    pub const ALL: [Objective; 4] = [
        Objective::PeakShaving,
        Objective::Resilience,
        Objective::Arbitrage,
        Objective::Microgrid,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::PeakShaving => "peak_shaving",
            Self::Resilience => "resilience",
            Self::Arbitrage => "arbitrage",
            Self::Microgrid => "microgrid",
        }
    }

    /// Parses a snake_case key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.key() == key)
    }

    /// Duration used when the caller gives none (hours).
    pub fn default_duration_hours(self, profile: &FacilityProfile) -> f64 {
        match self {
            Self::PeakShaving | Self::Arbitrage => 4.0,
            Self::Resilience => profile.default_duration_hours.max(6.0),
            Self::Microgrid => profile.default_duration_hours.max(8.0),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Named, overridable sizing ratios.
///
/// These are empirically tuned rather than derived from a standard; the audit
/// trail marks them as heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingRatios {
    /// Battery kW per kW of peak for peak shaving.
    pub peak_shaving: f64,
    /// Battery kW per kW of peak for resilience.
    pub resilience: f64,
    /// Battery kW per kW of peak for arbitrage.
    pub arbitrage: f64,
    /// Battery kW per kW of peak for an islanding microgrid.
    pub microgrid: f64,
    /// Upper bound on solar kW per kW of peak.
    pub max_solar_ratio: f64,
    /// Generator oversizing when N+1 redundancy is required.
    pub n_plus_one_multiplier: f64,
}

impl Default for SizingRatios {
    fn default() -> Self {
        Self {
            peak_shaving: 0.40,
            resilience: 0.70,
            arbitrage: 0.50,
            microgrid: 1.00,
            max_solar_ratio: 0.80,
            n_plus_one_multiplier: 1.5,
        }
    }
}

impl SizingRatios {
    /// Battery power ratio for `objective`.
    pub fn ratio(&self, objective: Objective) -> f64 {
        match objective {
            Objective::PeakShaving => self.peak_shaving,
            Objective::Resilience => self.resilience,
            Objective::Arbitrage => self.arbitrage,
            Objective::Microgrid => self.microgrid,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("sizing.ratios.peak_shaving", self.peak_shaving),
            ("sizing.ratios.resilience", self.resilience),
            ("sizing.ratios.arbitrage", self.arbitrage),
            ("sizing.ratios.microgrid", self.microgrid),
            ("sizing.ratios.max_solar_ratio", self.max_solar_ratio),
        ];
        for (field, value) in fields {
            ensure_non_negative(field, value)?;
        }
        ensure_non_negative("sizing.ratios.n_plus_one_multiplier", self.n_plus_one_multiplier)?;
        if self.n_plus_one_multiplier < 1.0 {
            return Err(ValidationError::out_of_range(
                "sizing.ratios.n_plus_one_multiplier",
                "must be >= 1.0",
            ));
        }
        Ok(())
    }
}

/// Caller choices for one sizing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingOptions {
    pub objective: Objective,
    /// Overrides the objective's default duration (hours).
    pub duration_hours: Option<f64>,
    pub include_solar: bool,
    pub include_generator: bool,
    /// Wind capacity requested by the caller (kW).
    pub wind_kw: f64,
    pub ratios: SizingRatios,
}

impl Default for SizingOptions {
    fn default() -> Self {
        Self {
            objective: Objective::PeakShaving,
            duration_hours: None,
            include_solar: false,
            include_generator: false,
            wind_kw: 0.0,
            ratios: SizingRatios::default(),
        }
    }
}

impl SizingOptions {
    /// Options for `objective` with everything else at defaults.
    pub fn for_objective(objective: Objective) -> Self {
        Self {
            objective,
            ..Self::default()
        }
    }

    /// Rejects negative or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(h) = self.duration_hours {
            ensure_non_negative("sizing.duration_hours", h)?;
            if h == 0.0 {
                return Err(ValidationError::out_of_range("sizing.duration_hours", "must be > 0"));
            }
        }
        ensure_non_negative("sizing.wind_kw", self.wind_kw)?;
        self.ratios.validate()
    }
}

/// Where the battery duration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    ObjectiveDefault,
    CallerOverride,
}

/// Recommended power/energy ratings per source.
///
/// `battery_kwh == battery_kw × duration_hours` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemConfiguration {
    pub vertical: Vertical,
    pub objective: Objective,
    /// Ratio applied to peak demand for battery power.
    pub sizing_ratio: f64,
    pub duration_hours: f64,
    pub duration_source: DurationSource,
    pub battery_kw: f64,
    pub battery_kwh: f64,
    pub solar_kw: f64,
    /// Present when solar was requested.
    pub solar: Option<SolarAssessment>,
    pub wind_kw: f64,
    pub generator_kw: f64,
    /// 1.0 normally, the N+1 multiplier when redundancy is required.
    pub generator_redundancy: f64,
    pub ev_charger_load_kw: f64,
}

/// Sizes a battery for `objective` alone, without solar or generation.
///
/// # Errors
///
/// Returns a [`ValidationError`] for a negative peak or invalid duration.
pub fn size_for_objective(
    load: &LoadEstimate,
    objective: Objective,
    duration_hours: Option<f64>,
) -> Result<SystemConfiguration, ValidationError> {
    let options = SizingOptions {
        objective,
        duration_hours,
        ..SizingOptions::default()
    };
    size_battery(load, &options, None, false)
}

/// Sizes the full system for a facility.
///
/// # Errors
///
/// Returns a [`ValidationError`] for a negative peak or invalid options.
pub fn size_system(
    load: &LoadEstimate,
    input: &FacilityInput,
    options: &SizingOptions,
) -> Result<SystemConfiguration, ValidationError> {
    size_battery(
        load,
        options,
        input.site.solar_site.as_ref(),
        input.requires_n_plus_one(),
    )
}

fn size_battery(
    load: &LoadEstimate,
    options: &SizingOptions,
    solar_site: Option<&SolarSite>,
    n_plus_one: bool,
) -> Result<SystemConfiguration, ValidationError> {
    options.validate()?;
    ensure_non_negative("load.peak_demand_kw", load.peak_demand_kw)?;
    ensure_non_negative("load.critical_load_kw", load.critical_load_kw)?;

    let profile = load.vertical.profile();
    let objective = options.objective;
    let sizing_ratio = options.ratios.ratio(objective);
    let (duration_hours, duration_source) = match options.duration_hours {
        Some(h) => (h, DurationSource::CallerOverride),
        None => (
            objective.default_duration_hours(profile),
            DurationSource::ObjectiveDefault,
        ),
    };

    let battery_kw = load.peak_demand_kw * sizing_ratio;
    let battery_kwh = battery_kw * duration_hours;

    let solar = options.include_solar.then(|| {
        assess_solar(
            load.peak_demand_kw,
            options.ratios.max_solar_ratio,
            solar_site,
            battery_kw,
        )
    });
    let solar_kw = solar.as_ref().map_or(0.0, |s| s.recommended_kw);

    let generator_redundancy = if n_plus_one {
        options.ratios.n_plus_one_multiplier
    } else {
        1.0
    };
    let generator_kw = if options.include_generator {
        load.critical_load_kw * generator_redundancy
    } else {
        0.0
    };

    debug!(
        objective = %objective,
        battery_kw,
        battery_kwh,
        solar_kw,
        generator_kw,
        "system sized"
    );

    Ok(SystemConfiguration {
        vertical: load.vertical,
        objective,
        sizing_ratio,
        duration_hours,
        duration_source,
        battery_kw,
        battery_kwh,
        solar_kw,
        solar,
        wind_kw: options.wind_kw,
        generator_kw,
        generator_redundancy,
        ev_charger_load_kw: load.ev_charger_kw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::estimate_load;
    use crate::load::input::{Facility, HospitalInput, HotelInput};

    fn hotel_load(rooms: u32) -> LoadEstimate {
        let input = FacilityInput::new(Facility::Hotel(HotelInput {
            rooms: Some(rooms),
            ..HotelInput::default()
        }));
        estimate_load(&input).unwrap()
    }

    #[test]
    fn peak_shaving_defaults() {
        let load = hotel_load(150);
        let cfg = size_for_objective(&load, Objective::PeakShaving, None).unwrap();
        assert!((cfg.battery_kw - load.peak_demand_kw * 0.40).abs() < 1e-9);
        assert_eq!(cfg.duration_hours, 4.0);
        assert_eq!(cfg.duration_source, DurationSource::ObjectiveDefault);
        assert_eq!(cfg.battery_kwh, cfg.battery_kw * cfg.duration_hours);
    }

    #[test]
    fn resilience_stores_more_energy_than_peak_shaving() {
        let load = hotel_load(150);
        let ps = size_for_objective(&load, Objective::PeakShaving, None).unwrap();
        let res = size_for_objective(&load, Objective::Resilience, None).unwrap();
        assert!(res.battery_kwh > ps.battery_kwh);
        assert!(res.duration_hours >= 6.0);
    }

    #[test]
    fn duration_override_is_honored() {
        let load = hotel_load(150);
        let cfg = size_for_objective(&load, Objective::PeakShaving, Some(2.0)).unwrap();
        assert_eq!(cfg.duration_hours, 2.0);
        assert_eq!(cfg.duration_source, DurationSource::CallerOverride);
        assert_eq!(cfg.battery_kwh, cfg.battery_kw * 2.0);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let load = hotel_load(150);
        assert!(size_for_objective(&load, Objective::PeakShaving, Some(0.0)).is_err());
    }

    #[test]
    fn zero_peak_yields_zero_system() {
        let mut load = hotel_load(150);
        load.peak_demand_kw = 0.0;
        load.critical_load_kw = 0.0;
        let input = FacilityInput::new(Facility::Hotel(HotelInput {
            rooms: Some(150),
            ..HotelInput::default()
        }));
        let options = SizingOptions {
            include_solar: true,
            include_generator: true,
            ..SizingOptions::default()
        };
        let cfg = size_system(&load, &input, &options).unwrap();
        assert_eq!(cfg.battery_kw, 0.0);
        assert_eq!(cfg.battery_kwh, 0.0);
        assert_eq!(cfg.solar_kw, 0.0);
        assert_eq!(cfg.generator_kw, 0.0);
    }

    #[test]
    fn negative_peak_is_rejected() {
        let mut load = hotel_load(150);
        load.peak_demand_kw = -5.0;
        assert!(size_for_objective(&load, Objective::Resilience, None).is_err());
    }

    #[test]
    fn generator_covers_critical_load_with_redundancy() {
        let input = FacilityInput::new(Facility::Hospital(HospitalInput {
            beds: Some(100),
            ..HospitalInput::default()
        }));
        let load = estimate_load(&input).unwrap();
        let options = SizingOptions {
            objective: Objective::Resilience,
            include_generator: true,
            ..SizingOptions::default()
        };
        let cfg = size_system(&load, &input, &options).unwrap();
        assert_eq!(cfg.generator_redundancy, 1.5);
        assert!((cfg.generator_kw - load.critical_load_kw * 1.5).abs() < 1e-9);
    }

    #[test]
    fn objective_keys_round_trip() {
        for o in Objective::ALL {
            assert_eq!(Objective::from_key(o.key()), Some(o));
        }
        assert_eq!(Objective::from_key("bogus"), None);
    }
}
