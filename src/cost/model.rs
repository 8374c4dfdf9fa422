//! Equipment cost model: sized system to itemized costs.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::market::{BatteryPricing, battery_market_price};
use super::price_table::{Price, PriceKey, PriceSource, PriceTable};
use crate::error::{ValidationError, ensure_non_negative};
use crate::sizing::SystemConfiguration;

/// Pricing regime, chosen once for the whole system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemTier {
    /// Modular commercial equipment below the utility threshold.
    Commercial,
    /// Utility-scale equipment at or above the threshold.
    Utility,
}

impl SystemTier {
    /// Tier for a battery of `battery_kw` against `threshold_kw`.
    pub fn for_power(battery_kw: f64, threshold_kw: f64) -> Self {
        if battery_kw >= threshold_kw {
            Self::Utility
        } else {
            Self::Commercial
        }
    }
}

impl fmt::Display for SystemTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Commercial => "commercial",
            Self::Utility => "utility",
        })
    }
}

/// Cost line categories, in breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostComponent {
    Battery,
    Pcs,
    Transformer,
    Switchgear,
    Solar,
    Wind,
    Generator,
    EvChargers,
    Bos,
    Epc,
    Contingency,
}

impl CostComponent {
    pub fn label(self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::Pcs => "pcs",
            Self::Transformer => "transformer",
            Self::Switchgear => "switchgear",
            Self::Solar => "solar",
            Self::Wind => "wind",
            Self::Generator => "generator",
            Self::EvChargers => "ev_chargers",
            Self::Bos => "bos",
            Self::Epc => "epc",
            Self::Contingency => "contingency",
        }
    }
}

impl fmt::Display for CostComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One priced line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub component: CostComponent,
    pub quantity: f64,
    /// `"kWh"`, `"kW"`, or `"USD"` for percentage overheads.
    pub unit: &'static str,
    pub unit_price: f64,
    pub price_source: PriceSource,
    pub subtotal: f64,
}

/// Percentage overheads, each taken on the hardware subtotal independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overheads {
    pub logistics: f64,
    pub import_duty: f64,
    pub epc: f64,
    pub contingency: f64,
}

/// Itemized project cost.
///
/// `equipment_cost` is the literal sum of [`CostBreakdown::component_subtotals`]
/// and `total_project_cost == equipment_cost + installation_cost`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub tier: SystemTier,
    pub battery: f64,
    pub pcs: f64,
    pub transformer: f64,
    pub switchgear: f64,
    pub solar: f64,
    pub wind: f64,
    pub generator: f64,
    pub ev_chargers: f64,
    /// Logistics plus import duty.
    pub bos: f64,
    pub epc: f64,
    pub contingency: f64,
    /// Sum of the physical equipment lines, the base for every overhead.
    pub hardware_subtotal: f64,
    pub overheads: Overheads,
    pub equipment_cost: f64,
    pub installation_cost: f64,
    pub total_project_cost: f64,
    pub battery_pricing: BatteryPricing,
    pub line_items: Vec<LineItem>,
    /// Every price read, in lookup order.
    pub prices_used: Vec<Price>,
}

impl CostBreakdown {
    /// Component subtotals in breakdown order.
    pub fn component_subtotals(&self) -> [(CostComponent, f64); 11] {
        [
            (CostComponent::Battery, self.battery),
            (CostComponent::Pcs, self.pcs),
            (CostComponent::Transformer, self.transformer),
            (CostComponent::Switchgear, self.switchgear),
            (CostComponent::Solar, self.solar),
            (CostComponent::Wind, self.wind),
            (CostComponent::Generator, self.generator),
            (CostComponent::EvChargers, self.ev_chargers),
            (CostComponent::Bos, self.bos),
            (CostComponent::Epc, self.epc),
            (CostComponent::Contingency, self.contingency),
        ]
    }

    /// Subtotal for one component.
    pub fn subtotal(&self, component: CostComponent) -> f64 {
        self.component_subtotals()
            .into_iter()
            .find(|(c, _)| *c == component)
            .map_or(0.0, |(_, v)| v)
    }

    /// Project cost attributable to incentive-eligible hardware.
    ///
    /// Generator and EV-charger lines are excluded together with their share
    /// of every overhead and of installation, all of which scale with the
    /// hardware subtotal.
    pub fn itc_eligible_cost(&self) -> f64 {
        if self.hardware_subtotal <= 0.0 {
            return 0.0;
        }
        let eligible_hardware =
            (self.hardware_subtotal - self.generator - self.ev_chargers).max(0.0);
        round_cents(self.total_project_cost * eligible_hardware / self.hardware_subtotal)
    }

    fn sum_components(&self) -> f64 {
        self.component_subtotals().iter().map(|(_, v)| v).sum()
    }
}

/// Rounds a currency amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

struct Pricer<'a> {
    table: &'a PriceTable,
    line_items: Vec<LineItem>,
    used: Vec<Price>,
}

impl Pricer<'_> {
    fn line(
        &mut self,
        component: CostComponent,
        quantity: f64,
        unit: &'static str,
        price: Price,
    ) -> f64 {
        let subtotal = round_cents(quantity * price.value);
        self.line_items.push(LineItem {
            component,
            quantity,
            unit,
            unit_price: price.value,
            price_source: price.source,
            subtotal,
        });
        subtotal
    }

    fn per_kw(&mut self, component: CostComponent, kw: f64, key: PriceKey) -> f64 {
        let price = self.table.get(key);
        self.used.push(price);
        self.line(component, kw, "kW", price)
    }

    fn overhead(&mut self, key: PriceKey, base: f64) -> f64 {
        let price = self.table.get(key);
        self.used.push(price);
        round_cents(base * price.value)
    }
}

/// Prices a sized system.
///
/// # Errors
///
/// Returns a [`ValidationError`] for negative ratings or invalid table entries.
pub fn price_system(
    config: &SystemConfiguration,
    table: &PriceTable,
) -> Result<CostBreakdown, ValidationError> {
    table.validate()?;
    let ratings = [
        ("system.battery_kw", config.battery_kw),
        ("system.battery_kwh", config.battery_kwh),
        ("system.solar_kw", config.solar_kw),
        ("system.wind_kw", config.wind_kw),
        ("system.generator_kw", config.generator_kw),
        ("system.ev_charger_load_kw", config.ev_charger_load_kw),
    ];
    for (field, value) in ratings {
        ensure_non_negative(field, value)?;
    }

    let threshold_kw = config.vertical.profile().utility_threshold_kw;
    let tier = SystemTier::for_power(config.battery_kw, threshold_kw);
    let (battery_key, pcs_key, solar_key) = match tier {
        SystemTier::Commercial => (
            PriceKey::BatteryCommercialPerKwh,
            PriceKey::PcsCommercialPerKw,
            PriceKey::SolarCommercialPerKw,
        ),
        SystemTier::Utility => (
            PriceKey::BatteryUtilityPerKwh,
            PriceKey::PcsUtilityPerKw,
            PriceKey::SolarUtilityPerKw,
        ),
    };

    let mut pricer = Pricer {
        table,
        line_items: Vec::new(),
        used: Vec::new(),
    };

    let battery_pricing = battery_market_price(config.battery_kwh, tier, table, &mut pricer.used);
    let billed = Price {
        value: battery_pricing.billed_per_kwh,
        ..table.get(battery_key)
    };
    let battery = pricer.line(CostComponent::Battery, config.battery_kwh, "kWh", billed);

    let interconnect_kw = config.battery_kw + config.solar_kw + config.wind_kw;
    let pcs = pricer.per_kw(CostComponent::Pcs, config.battery_kw, pcs_key);
    let transformer = pricer.per_kw(
        CostComponent::Transformer,
        interconnect_kw,
        PriceKey::TransformerPerKw,
    );
    let switchgear =
        pricer.per_kw(CostComponent::Switchgear, interconnect_kw, PriceKey::SwitchgearPerKw);
    let solar = pricer.per_kw(CostComponent::Solar, config.solar_kw, solar_key);
    let wind = pricer.per_kw(CostComponent::Wind, config.wind_kw, PriceKey::WindPerKw);
    let generator =
        pricer.per_kw(CostComponent::Generator, config.generator_kw, PriceKey::GeneratorPerKw);
    let ev_chargers = pricer.per_kw(
        CostComponent::EvChargers,
        config.ev_charger_load_kw,
        PriceKey::EvChargingPerKw,
    );

    let hardware_subtotal =
        battery + pcs + transformer + switchgear + solar + wind + generator + ev_chargers;

    // Each overhead is independent of the others; none compounds.
    let overheads = Overheads {
        logistics: pricer.overhead(PriceKey::LogisticsPct, hardware_subtotal),
        import_duty: pricer.overhead(PriceKey::ImportDutyPct, hardware_subtotal),
        epc: pricer.overhead(PriceKey::EpcPct, hardware_subtotal),
        contingency: pricer.overhead(PriceKey::ContingencyPct, hardware_subtotal),
    };
    let installation_cost = pricer.overhead(PriceKey::InstallationPct, hardware_subtotal);

    let bos = overheads.logistics + overheads.import_duty;
    // BOS blends two keys; either one coming from the table makes it a table price.
    let bos_source = [PriceKey::LogisticsPct, PriceKey::ImportDutyPct]
        .into_iter()
        .map(|key| table.get(key).source)
        .find(|source| *source == PriceSource::Table)
        .unwrap_or(PriceSource::Fallback);
    for (component, amount, price_source) in [
        (CostComponent::Bos, bos, bos_source),
        (CostComponent::Epc, overheads.epc, table.get(PriceKey::EpcPct).source),
        (
            CostComponent::Contingency,
            overheads.contingency,
            table.get(PriceKey::ContingencyPct).source,
        ),
    ] {
        pricer.line_items.push(LineItem {
            component,
            quantity: hardware_subtotal,
            unit: "USD",
            unit_price: if hardware_subtotal > 0.0 { amount / hardware_subtotal } else { 0.0 },
            price_source,
            subtotal: amount,
        });
    }

    let mut breakdown = CostBreakdown {
        tier,
        battery,
        pcs,
        transformer,
        switchgear,
        solar,
        wind,
        generator,
        ev_chargers,
        bos,
        epc: overheads.epc,
        contingency: overheads.contingency,
        hardware_subtotal,
        overheads,
        equipment_cost: 0.0,
        installation_cost,
        total_project_cost: 0.0,
        battery_pricing,
        line_items: pricer.line_items,
        prices_used: pricer.used,
    };
    breakdown.equipment_cost = breakdown.sum_components();
    breakdown.total_project_cost = breakdown.equipment_cost + breakdown.installation_cost;

    debug!(
        tier = %tier,
        equipment = breakdown.equipment_cost,
        installation = breakdown.installation_cost,
        total = breakdown.total_project_cost,
        "system priced"
    );

    Ok(breakdown)
}
