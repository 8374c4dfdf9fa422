//! File output for quotes.

pub mod export;
