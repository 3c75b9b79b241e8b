pub mod assay;
pub mod calibration;
pub mod file_formats;
pub mod hplc;
pub mod sample;
pub mod stats;
