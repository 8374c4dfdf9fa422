//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use bess_quote::load::FacilityInput;
use bess_quote::load::input::{
    BuildingInput, CarWashInput, DataCenterInput, Facility, HospitalInput, HotelAmenity,
    HotelClass, HotelInput, WashType,
};
use bess_quote::profiles::Vertical;
use bess_quote::sizing::{DurationSource, Objective, SystemConfiguration};

/// Midscale hotel with the given rooms and amenities.
pub fn hotel(rooms: u32, amenities: Vec<HotelAmenity>) -> FacilityInput {
    FacilityInput::new(Facility::Hotel(HotelInput {
        rooms: Some(rooms),
        class: HotelClass::Midscale,
        amenities,
        ..HotelInput::default()
    }))
}

/// Tunnel car wash with the given bay count.
pub fn tunnel_car_wash(bays: u32) -> FacilityInput {
    FacilityInput::new(Facility::CarWash(CarWashInput {
        bays: Some(bays),
        wash_type: WashType::Tunnel,
        ..CarWashInput::default()
    }))
}

/// Amenity-free input of `size` primary units for one of several verticals.
pub fn bare_facility(vertical: Vertical, size: u32) -> FacilityInput {
    let facility = match vertical {
        Vertical::Hotel => Facility::Hotel(HotelInput {
            rooms: Some(size),
            ..HotelInput::default()
        }),
        Vertical::Hospital => Facility::Hospital(HospitalInput {
            beds: Some(size),
            ..HospitalInput::default()
        }),
        Vertical::DataCenter => Facility::DataCenter(DataCenterInput {
            racks: Some(size),
            ..DataCenterInput::default()
        }),
        Vertical::CarWash => Facility::CarWash(CarWashInput {
            bays: Some(size),
            ..CarWashInput::default()
        }),
        _ => Facility::Office(BuildingInput {
            square_feet: Some(f64::from(size) * 1_000.0),
            ..BuildingInput::default()
        }),
    };
    FacilityInput::new(facility)
}

/// Verticals covered by [`bare_facility`].
pub const BARE_VERTICALS: [Vertical; 5] = [
    Vertical::Hotel,
    Vertical::Hospital,
    Vertical::DataCenter,
    Vertical::CarWash,
    Vertical::Office,
];

/// Battery-only office configuration at the given power and 4 h duration.
pub fn battery_only(battery_kw: f64) -> SystemConfiguration {
    SystemConfiguration {
        vertical: Vertical::Office,
        objective: Objective::PeakShaving,
        sizing_ratio: 0.4,
        duration_hours: 4.0,
        duration_source: DurationSource::ObjectiveDefault,
        battery_kw,
        battery_kwh: battery_kw * 4.0,
        solar_kw: battery_kw * 0.5,
        solar: None,
        wind_kw: 0.0,
        generator_kw: battery_kw * 0.25,
        generator_redundancy: 1.0,
        ev_charger_load_kw: 0.0,
    }
}
