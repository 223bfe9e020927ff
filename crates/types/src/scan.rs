// crates/types/src/scan.rs
//! `GET /scan-pdfs` — enumeration of the source documents folder.

use serde::Deserialize;

/// One source PDF as reported by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScannedFile {
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
}

/// Response to `GET /scan-pdfs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub files: Vec<ScannedFile>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub folder: Option<String>,
    /// Total size of all files in bytes.
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub error: Option<String>,
}
