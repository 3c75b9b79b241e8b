use crate::hplc::RawPeak;
use serde::{Deserialize, Serialize};

/// Normalized output of the document-extraction service for one chromatogram.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionFile {
    /// Original chromatogram name (`Factor_Treatment_Replicate.pdf`).
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub peaks: Vec<RawPeak>,
}
