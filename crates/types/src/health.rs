// crates/types/src/health.rs
//! `GET /health` — connectivity probe and folder inventory.

use serde::Deserialize;

/// Existence and file count for one server-side folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FolderStatus {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub count: usize,
}

/// The `folders` section of the health response.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct FolderInventory {
    #[serde(default)]
    pub pdfs: FolderStatus,
    #[serde(default)]
    pub masked_pdfs: FolderStatus,
}

/// Response to `GET /health`. Extra server fields (version, worker
/// counts, timestamps) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub folders: FolderInventory,
}
