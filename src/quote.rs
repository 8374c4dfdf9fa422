//! End-to-end quote pipeline.
//!
//! Profile, load, sizing, cost, finance and confidence run strictly in that
//! order over one immutable request. All inputs are validated before the
//! first stage, so a started pipeline always yields a complete [`Quote`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audit::{ConfidenceReport, assess_confidence};
use crate::cost::{CostBreakdown, PriceTable, price_system};
use crate::error::QuoteError;
use crate::finance::{FinancialResult, RateContext, analyze_financials};
use crate::load::{FacilityInput, LoadEstimate, estimate_load};
use crate::sizing::{SizingOptions, SystemConfiguration, size_system};

/// Everything one quote needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub input: FacilityInput,
    #[serde(default)]
    pub sizing: SizingOptions,
    #[serde(default)]
    pub pricing: PriceTable,
    #[serde(default)]
    pub rates: RateContext,
}

impl QuoteRequest {
    /// Request with default sizing, an empty price table and default rates.
    pub fn new(input: FacilityInput) -> Self {
        Self {
            input,
            sizing: SizingOptions::default(),
            pricing: PriceTable::new(),
            rates: RateContext::default(),
        }
    }

    /// Validates every part of the request.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), QuoteError> {
        self.input.validate()?;
        self.sizing.validate()?;
        self.pricing.validate()?;
        self.rates.validate()?;
        Ok(())
    }
}

/// Complete output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub load: LoadEstimate,
    pub system: SystemConfiguration,
    pub costs: CostBreakdown,
    pub financials: FinancialResult,
    pub confidence: ConfidenceReport,
}

/// Runs the full pipeline.
///
/// # Errors
///
/// Returns [`QuoteError::Validation`] if the request is rejected up front and
/// [`QuoteError::Invariant`] if a stage output breaks a cross-stage invariant.
pub fn generate_quote(request: &QuoteRequest) -> Result<Quote, QuoteError> {
    request.validate()?;

    let load = estimate_load(&request.input)?;
    let system = size_system(&load, &request.input, &request.sizing)?;
    let costs = price_system(&system, &request.pricing)?;
    let financials = analyze_financials(&costs, &system, &load, &request.rates)?;
    let confidence = assess_confidence(
        &request.input,
        &load,
        &system,
        &costs,
        &financials,
        &request.rates,
    );

    let quote = Quote {
        load,
        system,
        costs,
        financials,
        confidence,
    };
    quote.check_invariants()?;

    info!(
        vertical = %quote.load.vertical,
        objective = %quote.system.objective,
        peak_kw = quote.load.peak_demand_kw,
        battery_kwh = quote.system.battery_kwh,
        total_cost = quote.costs.total_project_cost,
        payback = %quote.financials.simple_payback,
        confidence = quote.confidence.confidence_score,
        "quote generated"
    );
    for w in &quote.confidence.warnings {
        warn!(code = %w.code, "{}", w.message);
    }

    Ok(quote)
}

impl Quote {
    fn check_invariants(&self) -> Result<(), QuoteError> {
        let s = &self.system;
        if (s.battery_kwh - s.battery_kw * s.duration_hours).abs() > 1e-9 * s.battery_kwh.max(1.0) {
            return Err(QuoteError::Invariant(format!(
                "battery_kwh {} != battery_kw {} x duration {}",
                s.battery_kwh, s.battery_kw, s.duration_hours
            )));
        }
        let sum: f64 = self.costs.component_subtotals().iter().map(|(_, v)| v).sum();
        if sum != self.costs.equipment_cost {
            return Err(QuoteError::Invariant(format!(
                "equipment_cost {} != component sum {sum}",
                self.costs.equipment_cost
            )));
        }
        if self.costs.total_project_cost != self.costs.equipment_cost + self.costs.installation_cost
        {
            return Err(QuoteError::Invariant(
                "total_project_cost != equipment_cost + installation_cost".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (load, sys, cost, fin) = (&self.load, &self.system, &self.costs, &self.financials);
        writeln!(f, "--- Quote: {} ({}) ---", load.vertical.profile().name, sys.objective)?;
        writeln!(f, "Peak demand:           {:.1} kW", load.peak_demand_kw)?;
        writeln!(f, "Critical load:         {:.1} kW", load.critical_load_kw)?;
        writeln!(f, "Annual energy:         {:.0} kWh ({:?})", load.annual_kwh, load.energy_basis)?;
        writeln!(
            f,
            "Battery:               {:.1} kW / {:.1} kWh ({:.1} h)",
            sys.battery_kw, sys.battery_kwh, sys.duration_hours
        )?;
        if sys.solar_kw > 0.0 {
            writeln!(f, "Solar:                 {:.1} kW", sys.solar_kw)?;
        }
        if sys.wind_kw > 0.0 {
            writeln!(f, "Wind:                  {:.1} kW", sys.wind_kw)?;
        }
        if sys.generator_kw > 0.0 {
            writeln!(f, "Generator:             {:.1} kW", sys.generator_kw)?;
        }
        writeln!(f, "Pricing tier:          {}", cost.tier)?;
        writeln!(f, "Equipment cost:        ${:.2}", cost.equipment_cost)?;
        writeln!(f, "Installation:          ${:.2}", cost.installation_cost)?;
        writeln!(f, "Total project cost:    ${:.2}", cost.total_project_cost)?;
        writeln!(f, "Incentives:            ${:.2}", fin.total_incentives)?;
        writeln!(f, "Net cost:              ${:.2}", fin.net_cost)?;
        writeln!(f, "Annual savings:        ${:.2}", fin.annual_savings)?;
        writeln!(f, "Simple payback:        {}", fin.simple_payback)?;
        writeln!(f, "NPV:                   ${:.2}", fin.npv)?;
        writeln!(f, "IRR:                   {:.2}% ({:?})", fin.irr.rate * 100.0, fin.irr.status)?;
        writeln!(f, "10-year ROI:           {:.1}%", fin.ten_year_roi_pct)?;
        if let Some(lcos) = fin.lcos {
            writeln!(f, "LCOS:                  ${lcos:.4}/kWh")?;
        }
        write!(f, "Confidence:            {:.2}", self.confidence.confidence_score)?;
        for w in &self.confidence.warnings {
            write!(f, "\nWarning: {w}")?;
        }
        Ok(())
    }
}
