//! Battery market pricing: reference curve, market blend, and ceiling.

use serde::Serialize;

use super::model::SystemTier;
use super::price_table::{Price, PriceKey, PriceTable};

/// Commercial reference curve as multiples of the table's commercial $/kWh.
///
/// Each entry is `(upper kWh bound, multiplier)`; above the last bound the
/// multiplier is 1.0.
const COMMERCIAL_CURVE: [(f64, f64); 3] = [
    (100.0, 600.0 / 350.0),
    (500.0, 450.0 / 350.0),
    (2000.0, 380.0 / 350.0),
];

/// How the billed battery $/kWh was reached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryPricing {
    pub tier: SystemTier,
    /// Published reference curve value.
    pub reference_per_kwh: f64,
    /// Reference blended with the market-intelligence observation.
    pub market_per_kwh: f64,
    pub ceiling_per_kwh: f64,
    /// Price actually billed: `min(reference, min(market, ceiling))`.
    pub billed_per_kwh: f64,
    /// True when the ceiling bound the market price.
    pub capped: bool,
}

/// Reference $/kWh for a battery of `kwh` in `tier`.
pub fn reference_price_per_kwh(kwh: f64, tier: SystemTier, table: &PriceTable) -> (f64, Price) {
    match tier {
        SystemTier::Utility => {
            let p = table.get(PriceKey::BatteryUtilityPerKwh);
            (p.value, p)
        }
        SystemTier::Commercial => {
            let p = table.get(PriceKey::BatteryCommercialPerKwh);
            let multiplier = COMMERCIAL_CURVE
                .iter()
                .find(|(bound, _)| kwh <= *bound)
                .map_or(1.0, |(_, m)| *m);
            (p.value * multiplier, p)
        }
    }
}

/// Prices battery energy for `kwh` in `tier`, recording each price read.
pub fn battery_market_price(
    kwh: f64,
    tier: SystemTier,
    table: &PriceTable,
    used: &mut Vec<Price>,
) -> BatteryPricing {
    let (reference_per_kwh, base) = reference_price_per_kwh(kwh, tier, table);
    let adjustment = table.get(PriceKey::BatteryMarketAdjustment);
    let weight = table.get(PriceKey::MarketBlendWeight);
    let ceiling = table.get(PriceKey::BatteryCeilingPerKwh);
    used.extend([base, adjustment, weight, ceiling]);

    let observed = reference_per_kwh * (1.0 + adjustment.value);
    let market_per_kwh = (1.0 - weight.value) * reference_per_kwh + weight.value * observed;
    let capped = market_per_kwh > ceiling.value;
    let capped_market = market_per_kwh.min(ceiling.value);

    BatteryPricing {
        tier,
        reference_per_kwh,
        market_per_kwh,
        ceiling_per_kwh: ceiling.value,
        billed_per_kwh: capped_market.min(reference_per_kwh),
        capped,
    }
}
