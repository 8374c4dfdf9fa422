//! Confidence scoring, feasibility warnings, and the methodology trail.
//!
//! Nothing here is fatal. Inconsistent or missing inputs lower the score
//! or add a warning; the quote itself is always complete.

pub mod trail;

use std::fmt;

use serde::Serialize;

use crate::cost::CostBreakdown;
use crate::finance::{FinancialResult, RateContext};
use crate::load::{EnergyBasis, FacilityInput, LoadEstimate};
use crate::sizing::SystemConfiguration;

pub use trail::{AuditEntry, ConstantBasis, methodology_trail};

/// Score with no optional inputs known.
pub const BASELINE_CONFIDENCE: f64 = 0.50;
/// Upper bound on the score.
pub const MAX_CONFIDENCE: f64 = 0.95;
/// Deducted when the IRR solve did not converge.
pub const IRR_PENALTY: f64 = 0.10;

/// Kind of feasibility warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    BackupBelowCriticalLoad,
    FuelRuntimeBelowMinimum,
    PeakExceedsServiceRating,
    SolarSpaceShortfall,
    IrrNotConverged,
    PaybackBeyondHorizon,
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BackupBelowCriticalLoad => "backup_below_critical_load",
            Self::FuelRuntimeBelowMinimum => "fuel_runtime_below_minimum",
            Self::PeakExceedsServiceRating => "peak_exceeds_service_rating",
            Self::SolarSpaceShortfall => "solar_space_shortfall",
            Self::IrrNotConverged => "irr_not_converged",
            Self::PaybackBeyondHorizon => "payback_beyond_horizon",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
}

impl Warning {
    fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceReport {
    /// In `[0, MAX_CONFIDENCE]`.
    pub confidence_score: f64,
    pub warnings: Vec<Warning>,
    pub methodology_audit_trail: Vec<AuditEntry>,
}

impl ConfidenceReport {
    pub fn has_warning(&self, code: WarningCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// Score from input completeness alone, before any IRR penalty.
pub fn input_confidence(input: &FacilityInput, load: &LoadEstimate) -> f64 {
    let site = &input.site;
    let mut score = BASELINE_CONFIDENCE;
    if site.utility_rate_known {
        score += 0.10;
    }
    if site.existing_backup_kw.is_some() {
        score += 0.10;
    }
    score += match site.critical_systems.len() {
        n if n >= 5 => 0.10,
        n if n >= 3 => 0.05,
        _ => 0.0,
    };
    if load.energy_basis == EnergyBasis::Metered {
        score += 0.10;
    }
    if site.service_rating_kw.is_some() {
        score += 0.05;
    }
    score.min(MAX_CONFIDENCE)
}

/// Scores the quote and collects warnings and the methodology trail.
pub fn assess_confidence(
    input: &FacilityInput,
    load: &LoadEstimate,
    config: &SystemConfiguration,
    costs: &CostBreakdown,
    financials: &FinancialResult,
    rates: &RateContext,
) -> ConfidenceReport {
    let site = &input.site;
    let profile = load.vertical.profile();
    let mut warnings = Vec::new();

    if let Some(backup) = site.existing_backup_kw
        && backup < load.critical_load_kw
    {
        warnings.push(Warning::new(
            WarningCode::BackupBelowCriticalLoad,
            format!(
                "existing backup {backup:.0} kW is below critical load {:.0} kW",
                load.critical_load_kw
            ),
        ));
    }
    if let Some(runtime) = site.fuel_runtime_hours
        && runtime < profile.min_fuel_runtime_hours
    {
        warnings.push(Warning::new(
            WarningCode::FuelRuntimeBelowMinimum,
            format!(
                "fuel runtime {runtime:.0} h is below the {:.0} h minimum for {}",
                profile.min_fuel_runtime_hours, profile.name
            ),
        ));
    }
    if let Some(rating) = site.service_rating_kw
        && load.peak_demand_kw > rating
    {
        warnings.push(Warning::new(
            WarningCode::PeakExceedsServiceRating,
            format!(
                "estimated peak {:.0} kW exceeds service rating {rating:.0} kW",
                load.peak_demand_kw
            ),
        ));
    }
    if let Some(solar) = config.solar.as_ref().filter(|s| !s.feasible) {
        warnings.push(Warning::new(
            WarningCode::SolarSpaceShortfall,
            format!(
                "available space supports {:.0} of {:.0} kW solar; {} alternative(s) offered",
                solar.recommended_kw,
                solar.load_based_kw,
                solar.mitigations.len()
            ),
        ));
    }
    if financials.low_confidence {
        warnings.push(Warning::new(
            WarningCode::IrrNotConverged,
            format!(
                "IRR solve ended {:?} after {} iterations; best candidate {:.4} reported",
                financials.irr.status, financials.irr.iterations, financials.irr.rate
            ),
        ));
    }
    if !financials.pays_back_within(rates.analysis_years) {
        warnings.push(Warning::new(
            WarningCode::PaybackBeyondHorizon,
            format!(
                "simple payback ({}) is beyond the {}-year analysis horizon",
                financials.simple_payback, rates.analysis_years
            ),
        ));
    }

    let mut confidence_score = input_confidence(input, load);
    if financials.low_confidence {
        confidence_score = (confidence_score - IRR_PENALTY).max(0.0);
    }

    ConfidenceReport {
        confidence_score,
        warnings,
        methodology_audit_trail: methodology_trail(load, config, costs, rates),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{PriceTable, price_system};
    use crate::finance::analyze_financials;
    use crate::load::estimate_load;
    use crate::load::input::{
        DataCenterInput, EquipmentItem, Facility, HospitalInput, HotelAmenity, HotelInput,
    };
    use crate::sizing::{Objective, SizingOptions, SolarMount, SolarSite, size_system};

    fn hospital(
        site: crate::load::SiteDetails,
        options: &SizingOptions,
    ) -> (ConfidenceReport, LoadEstimate) {
        let mut input = FacilityInput::new(Facility::Hospital(HospitalInput {
            beds: Some(200),
            ..HospitalInput::default()
        }));
        input.site = site;
        let rates = RateContext::default();
        let load = estimate_load(&input).unwrap();
        let config = size_system(&load, &input, options).unwrap();
        let costs = price_system(&config, &PriceTable::new()).unwrap();
        let fin = analyze_financials(&costs, &config, &load, &rates).unwrap();
        (assess_confidence(&input, &load, &config, &costs, &fin, &rates), load)
    }

    #[test]
    fn bare_input_scores_baseline() {
        let (report, _) = hospital(Default::default(), &SizingOptions::default());
        assert!((report.confidence_score - BASELINE_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn known_inputs_raise_score_up_to_cap() {
        let site = crate::load::SiteDetails {
            annual_kwh: Some(8_000_000.0),
            service_rating_kw: Some(10_000.0),
            existing_backup_kw: Some(5_000.0),
            utility_rate_known: true,
            critical_systems: (0..5).map(|i| format!("system {i}")).collect(),
            ..Default::default()
        };
        let (report, _) = hospital(site, &SizingOptions::default());
        assert!((report.confidence_score - MAX_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn three_critical_systems_add_half_increment() {
        let site = crate::load::SiteDetails {
            critical_systems: vec!["icu".into(), "or".into(), "pharmacy".into()],
            ..Default::default()
        };
        let (report, _) = hospital(site, &SizingOptions::default());
        assert!((report.confidence_score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn inconsistent_site_raises_warnings() {
        let site = crate::load::SiteDetails {
            service_rating_kw: Some(100.0),
            existing_backup_kw: Some(50.0),
            fuel_runtime_hours: Some(24.0),
            ..Default::default()
        };
        let (report, _) = hospital(site, &SizingOptions::default());
        assert!(report.has_warning(WarningCode::BackupBelowCriticalLoad));
        assert!(report.has_warning(WarningCode::FuelRuntimeBelowMinimum));
        assert!(report.has_warning(WarningCode::PeakExceedsServiceRating));
    }

    #[test]
    fn solar_shortfall_is_warned() {
        let site = crate::load::SiteDetails {
            solar_site: Some(SolarSite {
                mount: SolarMount::Rooftop,
                available_area_sqft: 1_000.0,
            }),
            ..Default::default()
        };
        let options = SizingOptions {
            objective: Objective::Resilience,
            include_solar: true,
            ..SizingOptions::default()
        };
        let (report, _) = hospital(site, &options);
        assert!(report.has_warning(WarningCode::SolarSpaceShortfall));
    }

    #[test]
    fn trail_marks_ratios_heuristic_and_prices_fallback() {
        let (report, _) = hospital(Default::default(), &SizingOptions::default());
        let trail = &report.methodology_audit_trail;
        assert!(trail.iter().any(|e| {
            e.standard == "peak_shaving sizing ratio" && e.basis == ConstantBasis::Heuristic
        }));
        assert!(trail.iter().any(|e| e.basis == ConstantBasis::PriceFallback));
        assert!(trail.iter().all(|e| !e.source.is_empty()));
    }

    fn trail_for(input: &FacilityInput, options: &SizingOptions) -> Vec<AuditEntry> {
        let load = estimate_load(input).unwrap();
        let config = size_system(&load, input, options).unwrap();
        let costs = price_system(&config, &PriceTable::new()).unwrap();
        methodology_trail(&load, &config, &costs, &RateContext::default())
    }

    fn density_entry(trail: &[AuditEntry]) -> &AuditEntry {
        trail
            .iter()
            .find(|e| e.standard.starts_with("power density per"))
            .unwrap()
    }

    #[test]
    fn stated_rack_density_is_caller_supplied() {
        let input = FacilityInput::new(Facility::DataCenter(DataCenterInput {
            racks: Some(40),
            kw_per_rack: Some(30.0),
            equipment: vec![EquipmentItem {
                name: "Chiller".into(),
                kw: 200.0,
                count: 1,
            }],
            ..DataCenterInput::default()
        }));
        let trail = trail_for(&input, &SizingOptions::default());

        let density = density_entry(&trail);
        assert_eq!(density.value, 30.0);
        assert_eq!(density.basis, ConstantBasis::CallerSupplied);
        let chiller = trail.iter().find(|e| e.standard == "Chiller x1 load").unwrap();
        assert_eq!(chiller.value, 200.0);
        assert_eq!(chiller.basis, ConstantBasis::CallerSupplied);
    }

    #[test]
    fn profile_and_class_densities_keep_their_basis() {
        let data_center = FacilityInput::new(Facility::DataCenter(DataCenterInput {
            racks: Some(40),
            ..DataCenterInput::default()
        }));
        let trail = trail_for(&data_center, &SizingOptions::default());
        assert_eq!(density_entry(&trail).basis, ConstantBasis::StandardsCited);

        let hotel = FacilityInput::new(Facility::Hotel(HotelInput {
            rooms: Some(120),
            amenities: vec![HotelAmenity::Pool],
            ..HotelInput::default()
        }));
        let trail = trail_for(&hotel, &SizingOptions::default());
        assert_eq!(density_entry(&trail).basis, ConstantBasis::Heuristic);
        let pool = trail.iter().find(|e| e.standard == "Pool load").unwrap();
        assert_eq!(pool.value, HotelAmenity::Pool.kw());
        assert_eq!(pool.basis, ConstantBasis::Heuristic);
    }

    #[test]
    fn solar_constants_are_traced() {
        let mut input = FacilityInput::new(Facility::Hospital(HospitalInput {
            beds: Some(200),
            ..HospitalInput::default()
        }));
        input.site.solar_site = Some(SolarSite {
            mount: SolarMount::Carport,
            available_area_sqft: 50_000.0,
        });
        let options = SizingOptions {
            include_solar: true,
            ..SizingOptions::default()
        };
        let trail = trail_for(&input, &options);

        let value_of = |name: &str| trail.iter().find(|e| e.standard == name).map(|e| e.value);
        assert_eq!(value_of("Carport area per kW"), Some(120.0));
        assert_eq!(
            value_of("material solar shortfall ratio"),
            Some(crate::sizing::solar::MATERIAL_SHORTFALL_RATIO)
        );
        assert_eq!(
            value_of("peak sun hours"),
            Some(crate::sizing::solar::PEAK_SUN_HOURS)
        );
    }
}
