//! Read-only price snapshot with per-price provenance.
//!
//! A [`PriceTable`] holds whatever the external pricing feed supplied. Every
//! lookup returns a [`Price`] tagged with [`PriceSource::Table`] or
//! [`PriceSource::Fallback`], so substituted defaults are visible in the
//! audit trail instead of silently replacing missing feed values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ensure_fraction, ensure_non_negative};

/// Every price or percentage the cost model reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKey {
    BatteryCommercialPerKwh,
    BatteryUtilityPerKwh,
    BatteryCeilingPerKwh,
    /// Fractional market-intelligence adjustment to the reference curve.
    BatteryMarketAdjustment,
    /// Weight (0–1) of the market observation in the blended battery price.
    MarketBlendWeight,
    PcsCommercialPerKw,
    PcsUtilityPerKw,
    SolarCommercialPerKw,
    SolarUtilityPerKw,
    TransformerPerKw,
    SwitchgearPerKw,
    GeneratorPerKw,
    WindPerKw,
    EvChargingPerKw,
    LogisticsPct,
    ImportDutyPct,
    EpcPct,
    ContingencyPct,
    InstallationPct,
}

impl PriceKey {
    pub const ALL: [PriceKey; 19] = [
        PriceKey::BatteryCommercialPerKwh,
        PriceKey::BatteryUtilityPerKwh,
        PriceKey::BatteryCeilingPerKwh,
        PriceKey::BatteryMarketAdjustment,
        PriceKey::MarketBlendWeight,
        PriceKey::PcsCommercialPerKw,
        PriceKey::PcsUtilityPerKw,
        PriceKey::SolarCommercialPerKw,
        PriceKey::SolarUtilityPerKw,
        PriceKey::TransformerPerKw,
        PriceKey::SwitchgearPerKw,
        PriceKey::GeneratorPerKw,
        PriceKey::WindPerKw,
        PriceKey::EvChargingPerKw,
        PriceKey::LogisticsPct,
        PriceKey::ImportDutyPct,
        PriceKey::EpcPct,
        PriceKey::ContingencyPct,
        PriceKey::InstallationPct,
    ];

    /// Value used when the table has no entry (USD or fraction).
    pub fn fallback(self) -> f64 {
        match self {
            Self::BatteryCommercialPerKwh => 350.0,
            Self::BatteryUtilityPerKwh => 175.0,
            Self::BatteryCeilingPerKwh => 450.0,
            Self::BatteryMarketAdjustment => -0.05,
            Self::MarketBlendWeight => 0.5,
            Self::PcsCommercialPerKw => 180.0,
            Self::PcsUtilityPerKw => 90.0,
            Self::SolarCommercialPerKw => 2200.0,
            Self::SolarUtilityPerKw => 1100.0,
            Self::TransformerPerKw => 50.0,
            Self::SwitchgearPerKw => 40.0,
            Self::GeneratorPerKw => 700.0,
            Self::WindPerKw => 1800.0,
            Self::EvChargingPerKw => 1200.0,
            Self::LogisticsPct => 0.08,
            Self::ImportDutyPct => 0.02,
            Self::EpcPct => 0.12,
            Self::ContingencyPct => 0.05,
            Self::InstallationPct => 0.15,
        }
    }

    /// Snake_case key as used in scenario files.
    pub fn key(self) -> &'static str {
        match self {
            Self::BatteryCommercialPerKwh => "battery_commercial_per_kwh",
            Self::BatteryUtilityPerKwh => "battery_utility_per_kwh",
            Self::BatteryCeilingPerKwh => "battery_ceiling_per_kwh",
            Self::BatteryMarketAdjustment => "battery_market_adjustment",
            Self::MarketBlendWeight => "market_blend_weight",
            Self::PcsCommercialPerKw => "pcs_commercial_per_kw",
            Self::PcsUtilityPerKw => "pcs_utility_per_kw",
            Self::SolarCommercialPerKw => "solar_commercial_per_kw",
            Self::SolarUtilityPerKw => "solar_utility_per_kw",
            Self::TransformerPerKw => "transformer_per_kw",
            Self::SwitchgearPerKw => "switchgear_per_kw",
            Self::GeneratorPerKw => "generator_per_kw",
            Self::WindPerKw => "wind_per_kw",
            Self::EvChargingPerKw => "ev_charging_per_kw",
            Self::LogisticsPct => "logistics_pct",
            Self::ImportDutyPct => "import_duty_pct",
            Self::EpcPct => "epc_pct",
            Self::ContingencyPct => "contingency_pct",
            Self::InstallationPct => "installation_pct",
        }
    }

    /// Whether the value is a fraction rather than a currency amount.
    pub fn is_fraction(self) -> bool {
        matches!(
            self,
            Self::MarketBlendWeight
                | Self::LogisticsPct
                | Self::ImportDutyPct
                | Self::EpcPct
                | Self::ContingencyPct
                | Self::InstallationPct
        )
    }
}

impl fmt::Display for PriceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Where a price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Supplied by the pricing feed snapshot.
    Table,
    /// Built-in default; the feed had no entry.
    Fallback,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Fallback => "fallback",
        })
    }
}

/// One looked-up price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Price {
    pub key: PriceKey,
    pub value: f64,
    pub source: PriceSource,
}

/// Snapshot of unit prices and overhead percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable {
    entries: BTreeMap<PriceKey, f64>,
}

impl PriceTable {
    /// Empty table: every lookup falls back.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: PriceKey, value: f64) -> Self {
        self.entries.insert(key, value);
        self
    }

    /// Looks up `key`, tagging the result with its source.
    pub fn get(&self, key: PriceKey) -> Price {
        match self.entries.get(&key) {
            Some(&value) => Price {
                key,
                value,
                source: PriceSource::Table,
            },
            None => Price {
                key,
                value: key.fallback(),
                source: PriceSource::Fallback,
            },
        }
    }

    /// Number of feed-supplied entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rejects negative prices and out-of-range fractions.
    ///
    /// # Errors
    ///
    /// Returns the first invalid entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (&key, &value) in &self.entries {
            let field = format!("pricing.{key}");
            if key == PriceKey::BatteryMarketAdjustment {
                ensure_non_negative(&field, value + 1.0)?;
            } else if key.is_fraction() {
                ensure_fraction(&field, value)?;
            } else {
                ensure_non_negative(&field, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_is_tagged_fallback() {
        let table = PriceTable::new();
        let p = table.get(PriceKey::GeneratorPerKw);
        assert_eq!(p.source, PriceSource::Fallback);
        assert_eq!(p.value, 700.0);
    }

    #[test]
    fn table_entry_is_tagged_table() {
        let table = PriceTable::new().with(PriceKey::GeneratorPerKw, 650.0);
        let p = table.get(PriceKey::GeneratorPerKw);
        assert_eq!(p.source, PriceSource::Table);
        assert_eq!(p.value, 650.0);
    }

    #[test]
    fn keys_match_serde_names() {
        let toml = PriceKey::ALL
            .iter()
            .map(|k| format!("{} = 0.01", k.key()))
            .collect::<Vec<_>>()
            .join("\n");
        let table: Result<PriceTable, _> = toml::from_str(&toml);
        assert_eq!(table.map(|t| t.len()).ok(), Some(PriceKey::ALL.len()));
    }

    #[test]
    fn unknown_key_fails_to_parse() {
        let table: Result<PriceTable, _> = toml::from_str("bogus_per_kw = 1.0");
        assert!(table.is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let table = PriceTable::new().with(PriceKey::PcsUtilityPerKw, -1.0);
        assert!(table.validate().is_err());
    }

    #[test]
    fn overhead_above_one_is_rejected() {
        let table = PriceTable::new().with(PriceKey::EpcPct, 1.2);
        assert!(table.validate().is_err());
    }

    #[test]
    fn negative_market_adjustment_is_allowed() {
        let table = PriceTable::new().with(PriceKey::BatteryMarketAdjustment, -0.2);
        assert!(table.validate().is_ok());
    }
}
