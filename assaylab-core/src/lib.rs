//! Calculation and result-aggregation engine for plant biochemistry assays.
//!
//! Everything here is synchronous and free of shared state: callers hand in
//! samples and calibration as plain data and get new derived records back.

pub mod assay;
pub mod error;
pub mod export;
pub mod grouping;
pub mod hplc;
pub mod ingest;
pub mod numeric;
pub mod samples;
pub mod stats;

pub use error::AssayLabError;
