//! Facility input records: one strongly-typed variant per vertical.
//!
//! Every variant reports its size metrics through [`SizeMetrics`] so that
//! primary-metric resolution is shared, and its amenities/equipment through
//! [`AmenityLoad`] so that amenity load stays strictly additive.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ValidationError, ensure_non_negative};
use crate::profiles::{SizeMetricKind, Vertical};
use crate::sizing::SolarSite;

/// Level 2 AC charger rating (kW).
pub const LEVEL2_KW: f64 = 7.2;
/// DC fast charger rating (kW).
pub const DCFC_KW: f64 = 150.0;
/// High-power charger rating (kW).
pub const HPC_KW: f64 = 350.0;
/// Megawatt Charging System rating for heavy trucks (kW).
pub const MCS_KW: f64 = 1000.0;

/// Where the per-unit power density of the primary metric came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DensitySource {
    /// The vertical's profile table.
    Profile,
    /// A built-in class table (hotel class, wash type).
    ClassTable,
    /// Given on the input (kW per rack, pump horsepower).
    Input,
}

/// Present-or-absent size metrics of one facility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeMetrics {
    pub units: Option<f64>,
    pub beds: Option<f64>,
    pub racks: Option<f64>,
    pub bays: Option<f64>,
    pub square_feet: Option<f64>,
}

impl SizeMetrics {
    /// Value recorded for `kind`, if any.
    pub fn get(&self, kind: SizeMetricKind) -> Option<f64> {
        match kind {
            SizeMetricKind::Units => self.units,
            SizeMetricKind::Beds => self.beds,
            SizeMetricKind::Racks => self.racks,
            SizeMetricKind::Bays => self.bays,
            SizeMetricKind::SquareFeet => self.square_feet,
        }
    }

    /// First metric in [`SizeMetricKind::PRIORITY`] order that is present and non-zero.
    pub fn primary(&self) -> Option<(SizeMetricKind, f64)> {
        SizeMetricKind::PRIORITY
            .into_iter()
            .find_map(|kind| match self.get(kind) {
                Some(v) if v > 0.0 => Some((kind, v)),
                _ => None,
            })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for kind in SizeMetricKind::PRIORITY {
            if let Some(v) = self.get(kind) {
                ensure_non_negative(&format!("facility.{kind}"), v)?;
            }
        }
        Ok(())
    }
}

fn count(n: Option<u32>) -> Option<f64> {
    n.map(f64::from)
}

/// One additive load contribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenityLoad {
    /// Amenity or equipment name.
    pub name: String,
    /// Total kW for this line (per-item kW times count).
    pub kw: f64,
    /// Whether this load is EV charging.
    pub ev: bool,
    /// Whether the kW came from a caller-described nameplate.
    pub nameplate: bool,
}

impl AmenityLoad {
    fn new(name: impl Into<String>, kw: f64) -> Self {
        Self {
            name: name.into(),
            kw,
            ev: false,
            nameplate: false,
        }
    }

    fn per_item(name: &str, count: u32, kw_each: f64) -> Option<Self> {
        (count > 0).then(|| Self::new(format!("{name} x{count}"), f64::from(count) * kw_each))
    }
}

/// Installed or planned EV chargers by class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvChargers {
    pub level2: u32,
    pub dcfc: u32,
    pub hpc: u32,
    pub mcs: u32,
}

impl EvChargers {
    /// Total number of charging ports.
    pub fn total(&self) -> u32 {
        self.level2 + self.dcfc + self.hpc + self.mcs
    }

    fn loads(&self) -> impl Iterator<Item = AmenityLoad> {
        [
            ("Level 2 charger", self.level2, LEVEL2_KW),
            ("DC fast charger", self.dcfc, DCFC_KW),
            ("High-power charger", self.hpc, HPC_KW),
            ("MCS truck charger", self.mcs, MCS_KW),
        ]
        .into_iter()
        .filter_map(|(name, n, kw)| {
            AmenityLoad::per_item(name, n, kw).map(|mut a| {
                a.ev = true;
                a
            })
        })
    }
}

/// Caller-described piece of equipment with a fixed nameplate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentItem {
    pub name: String,
    /// kW per item.
    pub kw: f64,
    #[serde(default = "one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

fn equipment_loads(items: &[EquipmentItem]) -> impl Iterator<Item = AmenityLoad> + '_ {
    items.iter().filter_map(|e| {
        AmenityLoad::per_item(&e.name, e.count, e.kw).map(|mut a| {
            a.nameplate = true;
            a
        })
    })
}

fn validate_equipment(items: &[EquipmentItem]) -> Result<(), ValidationError> {
    for (i, e) in items.iter().enumerate() {
        ensure_non_negative(&format!("facility.equipment[{i}].kw"), e.kw)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Hotel

/// Hotel chain scale, which sets the per-room density.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotelClass {
    Economy,
    #[default]
    Midscale,
    Upscale,
    Luxury,
}

impl HotelClass {
    /// Peak-basis kW per guest room.
    pub fn kw_per_room(self) -> f64 {
        match self {
            Self::Economy => 1.5,
            Self::Midscale => 2.0,
            Self::Upscale => 2.5,
            Self::Luxury => 3.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotelAmenity {
    Pool,
    Restaurant,
    Spa,
    FitnessCenter,
    Laundry,
    ConferenceCenter,
}

impl HotelAmenity {
    /// Fixed kW contribution.
    pub fn kw(self) -> f64 {
        match self {
            Self::Pool => 50.0,
            Self::Restaurant => 75.0,
            Self::Spa => 40.0,
            Self::FitnessCenter => 15.0,
            Self::Laundry => 60.0,
            Self::ConferenceCenter => 80.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pool => "Pool",
            Self::Restaurant => "Restaurant",
            Self::Spa => "Spa",
            Self::FitnessCenter => "Fitness center",
            Self::Laundry => "Laundry",
            Self::ConferenceCenter => "Conference center",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelInput {
    pub rooms: Option<u32>,
    pub square_feet: Option<f64>,
    pub class: HotelClass,
    pub amenities: Vec<HotelAmenity>,
    pub ev_chargers: EvChargers,
}

// ---------------------------------------------------------------------------
// Health care, data, and campus facilities

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalInput {
    pub beds: Option<u32>,
    pub square_feet: Option<f64>,
    pub operating_rooms: u32,
    /// MRI and CT units.
    pub imaging_units: u32,
    pub ev_chargers: EvChargers,
}

/// Uptime Institute tier classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UptimeTier {
    Tier1,
    #[default]
    Tier2,
    Tier3,
    Tier4,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataCenterInput {
    pub racks: Option<u32>,
    pub square_feet: Option<f64>,
    /// Overrides the profile's kW per rack.
    pub kw_per_rack: Option<f64>,
    pub tier: UptimeTier,
    pub equipment: Vec<EquipmentItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollegeInput {
    pub students: Option<u32>,
    pub square_feet: Option<f64>,
    /// Research labs with fume hoods and process loads.
    pub labs: u32,
    pub ev_chargers: EvChargers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApartmentInput {
    pub units: Option<u32>,
    pub square_feet: Option<f64>,
    pub has_pool: bool,
    pub has_fitness_center: bool,
    pub elevators: u32,
    pub ev_chargers: EvChargers,
}

// ---------------------------------------------------------------------------
// Transportation and fueling

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruckStopInput {
    pub fueling_positions: Option<u32>,
    pub square_feet: Option<f64>,
    pub has_restaurant: bool,
    pub truck_wash_bays: u32,
    pub ev_chargers: EvChargers,
}

/// Car wash format, which sets the per-bay density.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WashType {
    #[default]
    Tunnel,
    InBayAutomatic,
    SelfServe,
}

impl WashType {
    /// Peak-basis kW per bay.
    pub fn kw_per_bay(self) -> f64 {
        match self {
            Self::Tunnel => 120.0,
            Self::InBayAutomatic => 50.0,
            Self::SelfServe => 15.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarWashInput {
    pub bays: Option<u32>,
    pub square_feet: Option<f64>,
    pub wash_type: WashType,
    pub vacuum_stations: u32,
    pub has_water_heater: bool,
    pub ev_chargers: EvChargers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvChargingInput {
    /// Charging ports; defaults to the charger count when absent.
    pub ports: Option<u32>,
    pub square_feet: Option<f64>,
    pub chargers: EvChargers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasStationInput {
    pub dispensers: Option<u32>,
    pub square_feet: Option<f64>,
    pub has_car_wash: bool,
    pub ev_chargers: EvChargers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportInput {
    pub square_feet: Option<f64>,
    /// Gates with jet bridge, pre-conditioned air, and 400 Hz ground power.
    pub gates: u32,
    pub baggage_systems: u32,
    pub ev_chargers: EvChargers,
}

// ---------------------------------------------------------------------------
// Commercial and industrial buildings

/// Shared shape for floor-area-driven buildings (office, retail, etc.).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingInput {
    pub square_feet: Option<f64>,
    pub equipment: Vec<EquipmentItem>,
    pub ev_chargers: EvChargers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColdStorageInput {
    pub square_feet: Option<f64>,
    pub blast_freezers: u32,
    pub dock_doors: u32,
    pub ev_chargers: EvChargers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManufacturingInput {
    pub square_feet: Option<f64>,
    pub production_lines: u32,
    /// Compressed-air plant nameplate (kW).
    pub compressed_air_kw: f64,
    pub equipment: Vec<EquipmentItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoInput {
    /// Gaming floor plus back-of-house area.
    pub square_feet: Option<f64>,
    pub slot_machines: u32,
    pub restaurants: u32,
    pub hotel_rooms: u32,
}

// ---------------------------------------------------------------------------
// Agriculture

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgricultureInput {
    pub irrigation_pumps: Option<u32>,
    pub square_feet: Option<f64>,
    /// Pump horsepower; overrides the profile's kW per pump.
    pub pump_hp: Option<f64>,
    pub grain_dryers: u32,
    pub milking_parlors: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndoorFarmInput {
    /// Canopy area under grow lights.
    pub grow_area_sqft: Option<f64>,
    pub dehumidifiers: u32,
}

/// Facility without a dedicated profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericInput {
    /// Original vertical key when it was not recognized.
    pub label: Option<String>,
    pub units: Option<f64>,
    pub beds: Option<f64>,
    pub racks: Option<f64>,
    pub bays: Option<f64>,
    pub square_feet: Option<f64>,
    pub equipment: Vec<EquipmentItem>,
    pub ev_chargers: EvChargers,
}

/// Vertical-specific facility description, tagged by `vertical`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "vertical", rename_all = "snake_case")]
pub enum Facility {
    Hotel(HotelInput),
    Hospital(HospitalInput),
    DataCenter(DataCenterInput),
    TruckStop(TruckStopInput),
    CarWash(CarWashInput),
    EvCharging(EvChargingInput),
    Office(BuildingInput),
    Retail(BuildingInput),
    ShoppingCenter(BuildingInput),
    Warehouse(BuildingInput),
    Government(BuildingInput),
    ColdStorage(ColdStorageInput),
    Manufacturing(ManufacturingInput),
    College(CollegeInput),
    Apartment(ApartmentInput),
    Casino(CasinoInput),
    Airport(AirportInput),
    Agriculture(AgricultureInput),
    IndoorFarm(IndoorFarmInput),
    GasStation(GasStationInput),
    Generic(GenericInput),
}

impl Facility {
    /// Vertical whose profile applies to this facility.
    pub fn vertical(&self) -> Vertical {
        match self {
            Self::Hotel(_) => Vertical::Hotel,
            Self::Hospital(_) => Vertical::Hospital,
            Self::DataCenter(_) => Vertical::DataCenter,
            Self::TruckStop(_) => Vertical::TruckStop,
            Self::CarWash(_) => Vertical::CarWash,
            Self::EvCharging(_) => Vertical::EvCharging,
            Self::Office(_) => Vertical::Office,
            Self::Retail(_) => Vertical::Retail,
            Self::ShoppingCenter(_) => Vertical::ShoppingCenter,
            Self::Warehouse(_) => Vertical::Warehouse,
            Self::Government(_) => Vertical::Government,
            Self::ColdStorage(_) => Vertical::ColdStorage,
            Self::Manufacturing(_) => Vertical::Manufacturing,
            Self::College(_) => Vertical::College,
            Self::Apartment(_) => Vertical::Apartment,
            Self::Casino(_) => Vertical::Casino,
            Self::Airport(_) => Vertical::Airport,
            Self::Agriculture(_) => Vertical::Agriculture,
            Self::IndoorFarm(_) => Vertical::IndoorFarm,
            Self::GasStation(_) => Vertical::GasStation,
            Self::Generic(_) => Vertical::Generic,
        }
    }

    /// Key shown in messages: the caller's original key for generic inputs.
    pub fn label(&self) -> &str {
        match self {
            Self::Generic(g) => g.label.as_deref().unwrap_or("generic"),
            other => other.vertical().key(),
        }
    }

    /// Size metrics declared by this facility.
    pub fn size_metrics(&self) -> SizeMetrics {
        match self {
            Self::Hotel(h) => SizeMetrics {
                units: count(h.rooms),
                square_feet: h.square_feet,
                ..SizeMetrics::default()
            },
            Self::Hospital(h) => SizeMetrics {
                beds: count(h.beds),
                square_feet: h.square_feet,
                ..SizeMetrics::default()
            },
            Self::DataCenter(d) => SizeMetrics {
                racks: count(d.racks),
                square_feet: d.square_feet,
                ..SizeMetrics::default()
            },
            Self::TruckStop(t) => SizeMetrics {
                units: count(t.fueling_positions),
                square_feet: t.square_feet,
                ..SizeMetrics::default()
            },
            Self::CarWash(c) => SizeMetrics {
                bays: count(c.bays),
                square_feet: c.square_feet,
                ..SizeMetrics::default()
            },
            Self::EvCharging(e) => {
                let ports = e
                    .ports
                    .or_else(|| (e.chargers.total() > 0).then(|| e.chargers.total()));
                SizeMetrics {
                    units: count(ports),
                    square_feet: e.square_feet,
                    ..SizeMetrics::default()
                }
            }
            Self::Office(b)
            | Self::Retail(b)
            | Self::ShoppingCenter(b)
            | Self::Warehouse(b)
            | Self::Government(b) => SizeMetrics {
                square_feet: b.square_feet,
                ..SizeMetrics::default()
            },
            Self::ColdStorage(c) => SizeMetrics {
                square_feet: c.square_feet,
                ..SizeMetrics::default()
            },
            Self::Manufacturing(m) => SizeMetrics {
                square_feet: m.square_feet,
                ..SizeMetrics::default()
            },
            Self::College(c) => SizeMetrics {
                units: count(c.students),
                square_feet: c.square_feet,
                ..SizeMetrics::default()
            },
            Self::Apartment(a) => SizeMetrics {
                units: count(a.units),
                square_feet: a.square_feet,
                ..SizeMetrics::default()
            },
            Self::Casino(c) => SizeMetrics {
                square_feet: c.square_feet,
                ..SizeMetrics::default()
            },
            Self::Airport(a) => SizeMetrics {
                square_feet: a.square_feet,
                ..SizeMetrics::default()
            },
            Self::Agriculture(a) => SizeMetrics {
                units: count(a.irrigation_pumps),
                square_feet: a.square_feet,
                ..SizeMetrics::default()
            },
            Self::IndoorFarm(f) => SizeMetrics {
                square_feet: f.grow_area_sqft,
                ..SizeMetrics::default()
            },
            Self::GasStation(g) => SizeMetrics {
                units: count(g.dispensers),
                square_feet: g.square_feet,
                ..SizeMetrics::default()
            },
            Self::Generic(g) => SizeMetrics {
                units: g.units,
                beds: g.beds,
                racks: g.racks,
                bays: g.bays,
                square_feet: g.square_feet,
            },
        }
    }

    /// Input-specific kW per unit of `kind`, replacing the profile density.
    ///
    /// Only consulted when `kind` is the profile's headline unit.
    pub fn density_override(&self, kind: SizeMetricKind) -> Option<(f64, DensitySource)> {
        match (self, kind) {
            (Self::Hotel(h), SizeMetricKind::Units) => {
                Some((h.class.kw_per_room(), DensitySource::ClassTable))
            }
            (Self::CarWash(c), SizeMetricKind::Bays) => {
                Some((c.wash_type.kw_per_bay(), DensitySource::ClassTable))
            }
            (Self::DataCenter(d), SizeMetricKind::Racks) => {
                d.kw_per_rack.map(|kw| (kw, DensitySource::Input))
            }
            (Self::Agriculture(a), SizeMetricKind::Units) => {
                a.pump_hp.map(|hp| (hp * KW_PER_HP, DensitySource::Input))
            }
            _ => None,
        }
    }

    /// Additive amenity and equipment loads.
    pub fn amenity_loads(&self) -> Vec<AmenityLoad> {
        let mut loads = Vec::new();
        let flag = |loads: &mut Vec<AmenityLoad>, on: bool, name: &str, kw: f64| {
            if on {
                loads.push(AmenityLoad::new(name, kw));
            }
        };
        match self {
            Self::Hotel(h) => {
                loads.extend(h.amenities.iter().map(|a| AmenityLoad::new(a.label(), a.kw())));
                loads.extend(h.ev_chargers.loads());
            }
            Self::Hospital(h) => {
                loads.extend(AmenityLoad::per_item("Operating room", h.operating_rooms, 30.0));
                loads.extend(AmenityLoad::per_item("Imaging unit", h.imaging_units, 100.0));
                loads.extend(h.ev_chargers.loads());
            }
            Self::DataCenter(d) => loads.extend(equipment_loads(&d.equipment)),
            Self::TruckStop(t) => {
                flag(&mut loads, t.has_restaurant, "Restaurant", 75.0);
                loads.extend(AmenityLoad::per_item("Truck wash bay", t.truck_wash_bays, 120.0));
                loads.extend(t.ev_chargers.loads());
            }
            Self::CarWash(c) => {
                loads.extend(AmenityLoad::per_item("Vacuum station", c.vacuum_stations, 3.0));
                flag(&mut loads, c.has_water_heater, "Water heater", 30.0);
                loads.extend(c.ev_chargers.loads());
            }
            Self::EvCharging(e) => loads.extend(e.chargers.loads()),
            Self::Office(b)
            | Self::Retail(b)
            | Self::ShoppingCenter(b)
            | Self::Warehouse(b)
            | Self::Government(b) => {
                loads.extend(equipment_loads(&b.equipment));
                loads.extend(b.ev_chargers.loads());
            }
            Self::ColdStorage(c) => {
                loads.extend(AmenityLoad::per_item("Blast freezer", c.blast_freezers, 75.0));
                loads.extend(AmenityLoad::per_item("Dock door", c.dock_doors, 5.0));
                loads.extend(c.ev_chargers.loads());
            }
            Self::Manufacturing(m) => {
                loads.extend(AmenityLoad::per_item("Production line", m.production_lines, 150.0));
                if m.compressed_air_kw > 0.0 {
                    loads.push(AmenityLoad {
                        nameplate: true,
                        ..AmenityLoad::new("Compressed air", m.compressed_air_kw)
                    });
                }
                loads.extend(equipment_loads(&m.equipment));
            }
            Self::College(c) => {
                loads.extend(AmenityLoad::per_item("Research lab", c.labs, 50.0));
                loads.extend(c.ev_chargers.loads());
            }
            Self::Apartment(a) => {
                flag(&mut loads, a.has_pool, "Pool", 30.0);
                flag(&mut loads, a.has_fitness_center, "Fitness center", 10.0);
                loads.extend(AmenityLoad::per_item("Elevator", a.elevators, 20.0));
                loads.extend(a.ev_chargers.loads());
            }
            Self::Casino(c) => {
                loads.extend(AmenityLoad::per_item("Slot machine", c.slot_machines, 0.4));
                loads.extend(AmenityLoad::per_item("Restaurant", c.restaurants, 75.0));
                loads.extend(AmenityLoad::per_item("Hotel room", c.hotel_rooms, 2.0));
            }
            Self::Airport(a) => {
                loads.extend(AmenityLoad::per_item("Gate", a.gates, 180.0));
                loads.extend(AmenityLoad::per_item("Baggage system", a.baggage_systems, 100.0));
                loads.extend(a.ev_chargers.loads());
            }
            Self::Agriculture(a) => {
                loads.extend(AmenityLoad::per_item("Grain dryer", a.grain_dryers, 100.0));
                loads.extend(AmenityLoad::per_item("Milking parlor", a.milking_parlors, 40.0));
            }
            Self::IndoorFarm(f) => {
                loads.extend(AmenityLoad::per_item("Dehumidifier", f.dehumidifiers, 25.0));
            }
            Self::GasStation(g) => {
                flag(&mut loads, g.has_car_wash, "In-bay car wash", 50.0);
                loads.extend(g.ev_chargers.loads());
            }
            Self::Generic(g) => {
                loads.extend(equipment_loads(&g.equipment));
                loads.extend(g.ev_chargers.loads());
            }
        }
        loads
    }

    /// Redundancy implied by the facility itself, if any.
    pub fn implied_n_plus_one(&self) -> Option<bool> {
        match self {
            Self::DataCenter(d) => Some(matches!(d.tier, UptimeTier::Tier3 | UptimeTier::Tier4)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.size_metrics().validate()?;
        match self {
            Self::DataCenter(d) => {
                if let Some(kw) = d.kw_per_rack {
                    ensure_non_negative("facility.kw_per_rack", kw)?;
                }
                validate_equipment(&d.equipment)
            }
            Self::Agriculture(a) => match a.pump_hp {
                Some(hp) => ensure_non_negative("facility.pump_hp", hp),
                None => Ok(()),
            },
            Self::Manufacturing(m) => {
                ensure_non_negative("facility.compressed_air_kw", m.compressed_air_kw)?;
                validate_equipment(&m.equipment)
            }
            Self::Office(b)
            | Self::Retail(b)
            | Self::ShoppingCenter(b)
            | Self::Warehouse(b)
            | Self::Government(b) => validate_equipment(&b.equipment),
            Self::Generic(g) => validate_equipment(&g.equipment),
            _ => Ok(()),
        }
    }
}

/// Motor horsepower to kW.
const KW_PER_HP: f64 = 0.746;

/// Reads a `vertical`-tagged facility leniently.
///
/// The tag is matched like [`Vertical::from_key`] (case-insensitive, `-` for
/// `_`). An unrecognized tag becomes [`Facility::Generic`] labelled with the
/// original key. Field errors of a recognized vertical are reported as they
/// occurred, prefixed with the vertical.
pub(crate) fn deserialize_facility<'de, D>(deserializer: D) -> Result<Facility, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    // Null-valued fields are dropped so they fall back to their defaults.
    let raw: BTreeMap<String, Option<toml::Value>> = BTreeMap::deserialize(deserializer)?;
    let mut fields: toml::Table = raw
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect();

    let key = match fields.remove("vertical") {
        Some(toml::Value::String(key)) => key,
        Some(other) => {
            return Err(D::Error::custom(format!(
                "`vertical` must be a string, found {}",
                other.type_str()
            )));
        }
        None => return Err(D::Error::missing_field("vertical")),
    };
    let vertical = Vertical::from_key(&key);

    if vertical == Vertical::Generic {
        let mut generic = GenericInput::deserialize(toml::Value::Table(fields))
            .map_err(|e| D::Error::custom(format!("invalid `generic` facility: {e}")))?;
        if !key.trim().eq_ignore_ascii_case(Vertical::Generic.key()) {
            generic.label = Some(key);
        }
        return Ok(Facility::Generic(generic));
    }

    fields.insert(
        "vertical".to_string(),
        toml::Value::String(vertical.key().to_string()),
    );
    Facility::deserialize(toml::Value::Table(fields))
        .map_err(|e| D::Error::custom(format!("invalid `{vertical}` facility: {e}")))
}

/// Site-level facts that apply regardless of vertical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteDetails {
    /// Metered annual consumption (kWh), when known from utility bills.
    pub annual_kwh: Option<f64>,
    /// Rated capacity of the electrical service (kW).
    pub service_rating_kw: Option<f64>,
    /// Existing backup generation or storage (kW).
    pub existing_backup_kw: Option<f64>,
    /// On-site fuel runtime at full backup load (hours).
    pub fuel_runtime_hours: Option<f64>,
    /// Whether the electricity tariff came from an actual bill.
    pub utility_rate_known: bool,
    /// Named systems that must stay powered in an outage.
    pub critical_systems: Vec<String>,
    /// Forces N+1 generator redundancy regardless of the profile.
    pub requires_n_plus_one: Option<bool>,
    /// Space available for solar, if solar is considered.
    pub solar_site: Option<SolarSite>,
}

impl SiteDetails {
    fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("site.annual_kwh", self.annual_kwh),
            ("site.service_rating_kw", self.service_rating_kw),
            ("site.existing_backup_kw", self.existing_backup_kw),
            ("site.fuel_runtime_hours", self.fuel_runtime_hours),
        ];
        for (field, value) in fields {
            if let Some(v) = value {
                ensure_non_negative(field, v)?;
            }
        }
        if let Some(site) = &self.solar_site {
            ensure_non_negative("site.solar_site.available_area_sqft", site.available_area_sqft)?;
        }
        Ok(())
    }
}

/// Immutable input snapshot for one quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityInput {
    #[serde(deserialize_with = "deserialize_facility")]
    pub facility: Facility,
    #[serde(default)]
    pub site: SiteDetails,
}

impl FacilityInput {
    /// Wraps a facility with default site details.
    pub fn new(facility: Facility) -> Self {
        Self {
            facility,
            site: SiteDetails::default(),
        }
    }

    /// Re-checks the size-metric and non-negativity invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.facility.validate()?;
        self.site.validate()?;
        if self.facility.size_metrics().primary().is_none() {
            return Err(ValidationError::MissingSizeMetric {
                vertical: self.facility.label().to_string(),
            });
        }
        Ok(())
    }

    /// Whether generation must be N+1: site flag, then facility, then profile.
    pub fn requires_n_plus_one(&self) -> bool {
        self.site
            .requires_n_plus_one
            .or_else(|| self.facility.implied_n_plus_one())
            .unwrap_or_else(|| self.facility.vertical().profile().n_plus_one)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(rooms: u32) -> Facility {
        Facility::Hotel(HotelInput {
            rooms: Some(rooms),
            ..HotelInput::default()
        })
    }

    #[test]
    fn primary_metric_follows_priority_order() {
        let m = SizeMetrics {
            units: Some(0.0),
            beds: None,
            racks: Some(40.0),
            bays: Some(3.0),
            square_feet: Some(10_000.0),
        };
        assert_eq!(m.primary(), Some((SizeMetricKind::Racks, 40.0)));
    }

    #[test]
    fn no_metric_is_rejected() {
        let input = FacilityInput::new(Facility::Hotel(HotelInput::default()));
        let err = input.validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingSizeMetric { .. }));
    }

    #[test]
    fn negative_area_is_rejected() {
        let input = FacilityInput::new(Facility::Office(BuildingInput {
            square_feet: Some(-10.0),
            ..BuildingInput::default()
        }));
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("facility.square_feet"));
    }

    #[test]
    fn negative_site_value_is_rejected() {
        let mut input = FacilityInput::new(hotel(100));
        input.site.existing_backup_kw = Some(-1.0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn hotel_amenities_are_itemized() {
        let f = Facility::Hotel(HotelInput {
            rooms: Some(150),
            amenities: vec![HotelAmenity::Pool, HotelAmenity::Restaurant],
            ..HotelInput::default()
        });
        let total: f64 = f.amenity_loads().iter().map(|a| a.kw).sum();
        assert_eq!(total, 125.0);
    }

    #[test]
    fn ev_charger_loads_are_flagged() {
        let f = Facility::EvCharging(EvChargingInput {
            chargers: EvChargers {
                level2: 10,
                dcfc: 4,
                ..EvChargers::default()
            },
            ..EvChargingInput::default()
        });
        let loads = f.amenity_loads();
        assert!(loads.iter().all(|l| l.ev));
        let kw: f64 = loads.iter().map(|l| l.kw).sum();
        assert!((kw - (10.0 * LEVEL2_KW + 4.0 * DCFC_KW)).abs() < 1e-9);
        // ports default to the charger count
        assert_eq!(f.size_metrics().units, Some(14.0));
    }

    #[test]
    fn data_center_tier_implies_redundancy() {
        let input = FacilityInput::new(Facility::DataCenter(DataCenterInput {
            racks: Some(100),
            tier: UptimeTier::Tier3,
            ..DataCenterInput::default()
        }));
        assert!(input.requires_n_plus_one());
    }

    #[test]
    fn site_flag_overrides_profile_redundancy() {
        let mut input = FacilityInput::new(Facility::Hospital(HospitalInput {
            beds: Some(200),
            ..HospitalInput::default()
        }));
        assert!(input.requires_n_plus_one());
        input.site.requires_n_plus_one = Some(false);
        assert!(!input.requires_n_plus_one());
    }

    #[test]
    fn unknown_vertical_deserializes_as_generic() {
        let toml = r#"
[facility]
vertical = "bowling_alley"
square_feet = 30000.0
"#;
        let input: Result<FacilityInput, _> = toml::from_str(toml);
        let input = input.ok();
        let facility = input.as_ref().map(|i| &i.facility);
        assert!(matches!(facility, Some(Facility::Generic(_))));
        assert_eq!(facility.map(Facility::label), Some("bowling_alley"));
    }

    #[test]
    fn known_vertical_deserializes_to_its_variant() {
        let toml = r#"
[facility]
vertical = "hotel"
rooms = 150
class = "upscale"
amenities = ["pool"]
"#;
        let input: Result<FacilityInput, _> = toml::from_str(toml);
        assert!(input.is_ok(), "hotel should parse: {:?}", input.err());
        let input = input.ok();
        match input.map(|i| i.facility) {
            Some(Facility::Hotel(h)) => {
                assert_eq!(h.rooms, Some(150));
                assert_eq!(h.class, HotelClass::Upscale);
            }
            other => panic!("expected hotel, got {other:?}"),
        }
    }

    #[test]
    fn vertical_tag_is_matched_leniently() {
        let input: FacilityInput =
            toml::from_str("[facility]\nvertical = \"Data-Center\"\nracks = 40\n").unwrap();
        assert!(matches!(input.facility, Facility::DataCenter(_)));

        let input: FacilityInput =
            toml::from_str("[facility]\nvertical = \"HOTEL\"\nrooms = 80\n").unwrap();
        assert!(matches!(input.facility, Facility::Hotel(HotelInput { rooms: Some(80), .. })));
    }

    #[test]
    fn bad_field_of_known_vertical_is_reported() {
        let text = "[facility]\nvertical = \"hotel\"\nrooms = -5\n";
        let err = toml::from_str::<FacilityInput>(text).unwrap_err().to_string();
        assert!(err.contains("invalid `hotel` facility"), "{err}");
        assert!(err.contains("-5"), "{err}");
    }

    #[test]
    fn missing_vertical_is_reported() {
        let err = toml::from_str::<FacilityInput>("[facility]\nrooms = 5\n")
            .unwrap_err()
            .to_string();
        assert!(err.contains("vertical"), "{err}");
    }
}
