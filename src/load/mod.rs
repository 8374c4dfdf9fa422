//! Facility inputs and the load estimator.

pub mod estimator;
pub mod input;

pub use estimator::{EnergyBasis, LoadEstimate, estimate_load};
pub use input::{AmenityLoad, DensitySource, Facility, FacilityInput, SiteDetails, SizeMetrics};
