// crates/types/src/extract.rs
//! `POST /extract-info` — synchronous personal-info extraction.
//!
//! The server derives entries from file names of the form
//! `<name>_<birthdate>.pdf`; files that don't match the convention are
//! silently skipped, so `personal_info` may be shorter than the scan list.

use serde::Deserialize;

/// One extracted person record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersonalInfoEntry {
    pub order: u32,
    pub name: String,
    pub birth_date: String,
    pub original_filename: String,
}

/// Response to `POST /extract-info`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub personal_info: Vec<PersonalInfoEntry>,
    #[serde(default)]
    pub total_extracted: usize,
    #[serde(default)]
    pub error: Option<String>,
}
