//! Load-to-financial quotation engine for battery energy storage projects.
//!
//! Facility attributes flow through a fixed pipeline: [`load`] estimates
//! peak demand and energy, [`sizing`] recommends a system, [`cost`] prices
//! it, [`finance`] computes returns, and [`audit`] scores confidence.
//! [`quote::generate_quote`] runs all of it over one immutable request.

pub mod audit;
pub mod config;
pub mod cost;
pub mod error;
pub mod finance;
pub mod io;
pub mod load;
pub mod profiles;
pub mod quote;
pub mod session;
pub mod sizing;

#[cfg(feature = "api")]
pub mod api;

pub use error::{QuoteError, ValidationError};
pub use quote::{Quote, QuoteRequest, generate_quote};
