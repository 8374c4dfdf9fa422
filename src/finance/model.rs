//! Financial model: costs and savings to incentive-adjusted returns.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::cashflow::{
    CashFlowYear, IrrSolution, IrrStatus, discounted_cash_flows, flat_cash_flows, npv, solve_irr,
};
use super::rates::RateContext;
use crate::cost::CostBreakdown;
use crate::error::ValidationError;
use crate::load::LoadEstimate;
use crate::profiles::HOURS_PER_YEAR;
use crate::sizing::SystemConfiguration;

/// Simple payback, with an explicit sentinel when savings never repay the cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    Years(f64),
    /// Annual savings are zero or negative.
    NotReached,
}

impl Payback {
    pub fn years(self) -> Option<f64> {
        match self {
            Self::Years(y) => Some(y),
            Self::NotReached => None,
        }
    }
}

impl fmt::Display for Payback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Years(y) => write!(f, "{y:.1} years"),
            Self::NotReached => f.write_str("not reached"),
        }
    }
}

/// Return metrics that depend only on net cost and first-year savings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReturns {
    pub simple_payback: Payback,
    pub npv: f64,
    pub irr: IrrSolution,
    pub ten_year_roi_pct: f64,
    pub cash_flows: Vec<CashFlowYear>,
}

/// Payback, NPV, IRR and ten-year ROI for a net outlay and yearly savings.
pub fn project_returns(net_cost: f64, annual_savings: f64, rates: &RateContext) -> ProjectReturns {
    let simple_payback = if annual_savings <= 0.0 {
        Payback::NotReached
    } else {
        Payback::Years(net_cost.max(0.0) / annual_savings)
    };

    let cash_flows = discounted_cash_flows(net_cost, annual_savings, rates);
    let npv = npv(&cash_flows);

    let tolerance = 1e-6 * net_cost.abs().max(1.0);
    let irr = solve_irr(
        &flat_cash_flows(net_cost, annual_savings, rates.analysis_years),
        tolerance,
    );

    let ten_year_roi_pct = if annual_savings <= 0.0 || net_cost <= 0.0 {
        0.0
    } else {
        (10.0 * annual_savings - net_cost) / net_cost * 100.0
    };

    ProjectReturns {
        simple_payback,
        npv,
        irr,
        ten_year_roi_pct,
        cash_flows,
    }
}

/// Mean of `(1 - d)^t` over `t = 0..years`.
pub fn average_degradation_factor(degradation_rate: f64, years: u32) -> f64 {
    if degradation_rate <= 0.0 || years == 0 {
        return 1.0;
    }
    let retained = 1.0 - degradation_rate;
    // retained is in [0, 1), so saturating the exponent only drives the power to 0
    let exponent = i32::try_from(years).unwrap_or(i32::MAX);
    (1.0 - retained.powi(exponent)) / (f64::from(years) * degradation_rate)
}

/// Full financial analysis of one quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialResult {
    /// Project cost less generator and EV-charger lines and their overheads.
    pub itc_eligible_cost: f64,
    pub federal_itc: f64,
    pub state_incentive: f64,
    pub total_incentives: f64,
    pub net_cost: f64,
    pub demand_charge_savings: f64,
    pub arbitrage_savings: f64,
    /// First-year renewable generation credited against purchases (kWh).
    pub annual_renewable_kwh: f64,
    pub renewable_offset_savings: f64,
    pub annual_savings: f64,
    pub simple_payback: Payback,
    pub npv: f64,
    pub irr: IrrSolution,
    pub ten_year_roi_pct: f64,
    /// Net cost per lifetime kWh delivered by storage and renewables.
    pub lcoe: Option<f64>,
    /// Net cost per lifetime kWh discharged by the battery.
    pub lcos: Option<f64>,
    pub lifetime_storage_kwh: f64,
    pub lifetime_renewable_kwh: f64,
    pub cash_flows: Vec<CashFlowYear>,
    /// Set when the IRR solve did not converge.
    pub low_confidence: bool,
}

impl FinancialResult {
    /// Whether payback falls inside the analysis horizon.
    pub fn pays_back_within(&self, years: u32) -> bool {
        self.simple_payback
            .years()
            .is_some_and(|y| y <= f64::from(years))
    }
}

/// Analyzes a priced system.
///
/// # Errors
///
/// Returns a [`ValidationError`] if `rates` is invalid.
pub fn analyze_financials(
    costs: &CostBreakdown,
    config: &SystemConfiguration,
    load: &LoadEstimate,
    rates: &RateContext,
) -> Result<FinancialResult, ValidationError> {
    rates.validate()?;

    let itc_eligible_cost = costs.itc_eligible_cost();
    let federal_itc = rates.federal_itc_rate * itc_eligible_cost;
    let state_incentive = rates.state_incentive_rate * itc_eligible_cost;
    let total_incentives = federal_itc + state_incentive;
    let net_cost = costs.total_project_cost - total_incentives;

    let demand_charge_savings =
        config.battery_kw * rates.peak_shaving_fraction * rates.demand_charge_per_kw_month * 12.0;
    let arbitrage_savings = config.battery_kwh * rates.cycles_per_year * rates.price_spread_per_kwh;
    let generated_kwh = (config.solar_kw * rates.solar_capacity_factor
        + config.wind_kw * rates.wind_capacity_factor)
        * HOURS_PER_YEAR;
    // Generation beyond the site's own consumption earns nothing here.
    let annual_renewable_kwh = generated_kwh.min(load.annual_kwh);
    let renewable_offset_savings = annual_renewable_kwh * rates.electricity_rate_per_kwh;
    let annual_savings = demand_charge_savings + arbitrage_savings + renewable_offset_savings;

    let returns = project_returns(net_cost, annual_savings, rates);

    let avg = average_degradation_factor(rates.degradation_rate, rates.analysis_years);
    let years = f64::from(rates.analysis_years);
    let lifetime_storage_kwh = config.battery_kwh
        * rates.cycles_per_year
        * rates.round_trip_efficiency
        * years
        * avg;
    let lifetime_renewable_kwh = annual_renewable_kwh * years * avg;
    let per_kwh = |kwh: f64| (kwh > 0.0).then(|| net_cost / kwh);
    let lcos = per_kwh(lifetime_storage_kwh);
    let lcoe = per_kwh(lifetime_storage_kwh + lifetime_renewable_kwh);

    let low_confidence = matches!(
        returns.irr.status,
        IrrStatus::NotConverged | IrrStatus::Unbounded
    );

    debug!(
        net_cost,
        annual_savings,
        npv = returns.npv,
        irr = returns.irr.rate,
        payback = %returns.simple_payback,
        "financials analyzed"
    );

    Ok(FinancialResult {
        itc_eligible_cost,
        federal_itc,
        state_incentive,
        total_incentives,
        net_cost,
        demand_charge_savings,
        arbitrage_savings,
        annual_renewable_kwh,
        renewable_offset_savings,
        annual_savings,
        simple_payback: returns.simple_payback,
        npv: returns.npv,
        irr: returns.irr,
        ten_year_roi_pct: returns.ten_year_roi_pct,
        lcoe,
        lcos,
        lifetime_storage_kwh,
        lifetime_renewable_kwh,
        cash_flows: returns.cash_flows,
        low_confidence,
    })
}
