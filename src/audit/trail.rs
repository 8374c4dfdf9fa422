//! Methodology trail: every constant used, paired with where it came from.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::cost::{CostBreakdown, PriceKey, PriceSource};
use crate::finance::RateContext;
use crate::load::{DensitySource, LoadEstimate};
use crate::sizing::solar::{MATERIAL_SHORTFALL_RATIO, PEAK_SUN_HOURS};
use crate::sizing::{DurationSource, SizingRatios, SystemConfiguration};

/// How a constant was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantBasis {
    /// Traced to a published standard or survey.
    StandardsCited,
    /// Empirically tuned; no standard behind it.
    Heuristic,
    /// Supplied by the pricing feed snapshot.
    PriceTable,
    /// Built-in price used because the feed had none.
    PriceFallback,
    /// Given explicitly by the caller.
    CallerSupplied,
}

impl fmt::Display for ConstantBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StandardsCited => "standards-cited",
            Self::Heuristic => "heuristic",
            Self::PriceTable => "price table",
            Self::PriceFallback => "price fallback",
            Self::CallerSupplied => "caller supplied",
        })
    }
}

/// One traced constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Short name of the constant.
    pub standard: String,
    pub value: f64,
    pub description: String,
    /// Citation or origin.
    pub source: String,
    pub basis: ConstantBasis,
}

impl AuditEntry {
    fn new(
        standard: impl Into<String>,
        value: f64,
        description: impl Into<String>,
        source: impl Into<String>,
        basis: ConstantBasis,
    ) -> Self {
        Self {
            standard: standard.into(),
            value,
            description: description.into(),
            source: source.into(),
            basis,
        }
    }
}

const SIZING_SOURCE: &str = "internal sizing heuristics";
const ITC_SOURCE: &str = "IRC §48E clean electricity investment credit";
const AMENITY_SOURCE: &str = "built-in amenity load table";
const CLASS_SOURCE: &str = "built-in facility class table";

/// Builds the trail for one quote, in pipeline order.
pub fn methodology_trail(
    load: &LoadEstimate,
    config: &SystemConfiguration,
    costs: &CostBreakdown,
    rates: &RateContext,
) -> Vec<AuditEntry> {
    let profile = load.vertical.profile();
    let (density_source, density_basis) = match load.density_source {
        DensitySource::Profile => (profile.source, ConstantBasis::StandardsCited),
        DensitySource::ClassTable => (CLASS_SOURCE, ConstantBasis::Heuristic),
        DensitySource::Input => ("facility input", ConstantBasis::CallerSupplied),
    };
    let mut trail = vec![
        AuditEntry::new(
            format!("power density per {}", load.primary_metric),
            load.power_density_kw,
            format!(
                "{} kW per {} for {}",
                load.power_density_kw, load.primary_metric, profile.name
            ),
            density_source,
            density_basis,
        ),
        AuditEntry::new(
            "peak multiplier",
            load.peak_multiplier,
            "diversity factor from connected load to coincident peak",
            profile.source,
            ConstantBasis::StandardsCited,
        ),
        AuditEntry::new(
            "load factor",
            load.load_factor,
            "average-to-peak ratio for annual energy",
            profile.source,
            ConstantBasis::StandardsCited,
        ),
        AuditEntry::new(
            "critical load fraction",
            profile.critical_load_fraction,
            "share of peak that must survive an outage",
            profile.source,
            ConstantBasis::StandardsCited,
        ),
    ];
    for amenity in &load.amenities {
        let (source, basis) = if amenity.nameplate {
            ("facility input", ConstantBasis::CallerSupplied)
        } else {
            (AMENITY_SOURCE, ConstantBasis::Heuristic)
        };
        trail.push(AuditEntry::new(
            format!("{} load", amenity.name),
            amenity.kw,
            "fixed kW added to connected load",
            source,
            basis,
        ));
    }

    let defaults = SizingRatios::default();
    let ratio_basis = if config.sizing_ratio == defaults.ratio(config.objective) {
        ConstantBasis::Heuristic
    } else {
        ConstantBasis::CallerSupplied
    };
    trail.push(AuditEntry::new(
        format!("{} sizing ratio", config.objective),
        config.sizing_ratio,
        "battery kW per kW of peak demand",
        SIZING_SOURCE,
        ratio_basis,
    ));
    trail.push(AuditEntry::new(
        "storage duration",
        config.duration_hours,
        "battery hours at rated power",
        SIZING_SOURCE,
        match config.duration_source {
            DurationSource::ObjectiveDefault => ConstantBasis::Heuristic,
            DurationSource::CallerOverride => ConstantBasis::CallerSupplied,
        },
    ));
    if let Some(solar) = &config.solar {
        trail.push(AuditEntry::new(
            "max solar ratio",
            solar.max_solar_ratio,
            "upper bound on solar kW per kW of peak",
            SIZING_SOURCE,
            ConstantBasis::Heuristic,
        ));
        if let Some(mount) = solar.mount {
            trail.push(AuditEntry::new(
                format!("{mount:?} area per kW"),
                mount.area_per_kw_sqft(),
                "square feet of site per kW DC",
                SIZING_SOURCE,
                ConstantBasis::Heuristic,
            ));
        }
        trail.extend([
            AuditEntry::new(
                "material solar shortfall ratio",
                MATERIAL_SHORTFALL_RATIO,
                "space-limited share of target below which solar is infeasible",
                SIZING_SOURCE,
                ConstantBasis::Heuristic,
            ),
            AuditEntry::new(
                "peak sun hours",
                PEAK_SUN_HOURS,
                "daily full-sun hours for shortfall energy",
                SIZING_SOURCE,
                ConstantBasis::Heuristic,
            ),
        ]);
    }
    if config.generator_redundancy > 1.0 {
        trail.push(AuditEntry::new(
            "N+1 generator multiplier",
            config.generator_redundancy,
            "generator oversizing for redundant backup",
            "NFPA 110 Level 1 / Uptime Institute tier topology",
            ConstantBasis::StandardsCited,
        ));
    }
    trail.push(AuditEntry::new(
        "utility-scale threshold",
        profile.utility_threshold_kw,
        format!("battery kW at which {} pricing applies", costs.tier),
        SIZING_SOURCE,
        ConstantBasis::Heuristic,
    ));

    let mut seen = BTreeSet::new();
    for price in costs.prices_used.iter().filter(|p| seen.insert(p.key)) {
        let (basis, source) = match price.source {
            PriceSource::Table => (ConstantBasis::PriceTable, "pricing feed snapshot"),
            PriceSource::Fallback => (ConstantBasis::PriceFallback, "built-in default price"),
        };
        trail.push(AuditEntry::new(
            price.key.key(),
            price.value,
            match price.key {
                PriceKey::BatteryMarketAdjustment | PriceKey::MarketBlendWeight => {
                    "battery market blend parameter"
                }
                k if k.is_fraction() => "overhead fraction of hardware subtotal",
                _ => "unit price",
            },
            source,
            basis,
        ));
    }

    trail.extend([
        AuditEntry::new(
            "federal ITC rate",
            rates.federal_itc_rate,
            "credit on incentive-eligible cost",
            ITC_SOURCE,
            ConstantBasis::StandardsCited,
        ),
        AuditEntry::new(
            "discount rate",
            rates.discount_rate,
            "NPV discount rate",
            "rate context",
            ConstantBasis::CallerSupplied,
        ),
        AuditEntry::new(
            "escalation rate",
            rates.escalation_rate,
            "yearly electricity price escalation",
            "rate context",
            ConstantBasis::CallerSupplied,
        ),
        AuditEntry::new(
            "degradation rate",
            rates.degradation_rate,
            "yearly output degradation",
            "rate context",
            ConstantBasis::CallerSupplied,
        ),
    ]);
    trail
}
