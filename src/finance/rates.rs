//! Utility-rate and incentive context for the financial model.

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ensure_fraction, ensure_non_negative};

/// Longest accepted analysis horizon (years).
pub const MAX_ANALYSIS_YEARS: u32 = 100;

/// Read-only rate and incentive snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateContext {
    /// Retail energy rate ($/kWh).
    pub electricity_rate_per_kwh: f64,
    /// Demand charge ($/kW-month).
    pub demand_charge_per_kw_month: f64,
    /// Share of battery kW that actually shaves the billed peak.
    pub peak_shaving_fraction: f64,
    pub cycles_per_year: f64,
    /// Peak/off-peak energy price spread ($/kWh).
    pub price_spread_per_kwh: f64,
    pub federal_itc_rate: f64,
    pub state_incentive_rate: f64,
    pub discount_rate: f64,
    /// Yearly electricity price escalation.
    pub escalation_rate: f64,
    /// Yearly output degradation of battery and solar.
    pub degradation_rate: f64,
    pub analysis_years: u32,
    pub solar_capacity_factor: f64,
    pub wind_capacity_factor: f64,
    /// Applied to battery throughput for LCOS.
    pub round_trip_efficiency: f64,
}

impl Default for RateContext {
    fn default() -> Self {
        Self {
            electricity_rate_per_kwh: 0.15,
            demand_charge_per_kw_month: 15.0,
            peak_shaving_fraction: 0.75,
            cycles_per_year: 250.0,
            price_spread_per_kwh: 0.08,
            federal_itc_rate: 0.30,
            state_incentive_rate: 0.0,
            discount_rate: 0.08,
            escalation_rate: 0.025,
            degradation_rate: 0.02,
            analysis_years: 25,
            solar_capacity_factor: 0.20,
            wind_capacity_factor: 0.35,
            round_trip_efficiency: 0.88,
        }
    }
}

impl RateContext {
    /// Rejects negative prices, out-of-range fractions and a horizon outside
    /// `1..=MAX_ANALYSIS_YEARS`.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("rates.electricity_rate_per_kwh", self.electricity_rate_per_kwh),
            ("rates.demand_charge_per_kw_month", self.demand_charge_per_kw_month),
            ("rates.cycles_per_year", self.cycles_per_year),
            ("rates.price_spread_per_kwh", self.price_spread_per_kwh),
            ("rates.discount_rate", self.discount_rate),
        ] {
            ensure_non_negative(field, value)?;
        }
        for (field, value) in [
            ("rates.peak_shaving_fraction", self.peak_shaving_fraction),
            ("rates.federal_itc_rate", self.federal_itc_rate),
            ("rates.state_incentive_rate", self.state_incentive_rate),
            ("rates.degradation_rate", self.degradation_rate),
            ("rates.solar_capacity_factor", self.solar_capacity_factor),
            ("rates.wind_capacity_factor", self.wind_capacity_factor),
            ("rates.round_trip_efficiency", self.round_trip_efficiency),
        ] {
            ensure_fraction(field, value)?;
        }
        if !self.escalation_rate.is_finite() || self.escalation_rate <= -1.0 {
            return Err(ValidationError::out_of_range(
                "rates.escalation_rate",
                "must be finite and > -1.0",
            ));
        }
        if self.federal_itc_rate + self.state_incentive_rate > 1.0 {
            return Err(ValidationError::out_of_range(
                "rates.state_incentive_rate",
                "combined incentive rates must not exceed 1.0",
            ));
        }
        if !(1..=MAX_ANALYSIS_YEARS).contains(&self.analysis_years) {
            return Err(ValidationError::out_of_range(
                "rates.analysis_years",
                format!("must be between 1 and {MAX_ANALYSIS_YEARS}"),
            ));
        }
        Ok(())
    }
}
