//! Equipment cost model.
//!
//! Prices come from a [`PriceTable`] snapshot; missing entries fall back to
//! built-in defaults and are tagged as such.

pub mod market;
pub mod model;
pub mod price_table;

pub use market::{BatteryPricing, battery_market_price, reference_price_per_kwh};
pub use model::{
    CostBreakdown, CostComponent, LineItem, Overheads, SystemTier, price_system, round_cents,
};
pub use price_table::{Price, PriceKey, PriceSource, PriceTable};
