use serde::{Deserialize, Serialize};

/// One bar of a chart or one row of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatGroup {
    pub name: String,
    /// Group mean.
    pub value: f64,
    /// Standard error of the mean.
    pub error_y: f64,
    pub n: usize,
    /// Member values in input order.
    pub raw_values: Vec<f64>,
}
