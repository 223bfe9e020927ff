// crates/types/src/mask.rs
//! Result payload of a completed MASKING job.
//!
//! The masking step anonymizes file names by renumbering (`1.pdf`,
//! `2.pdf`, ...); `file_mapping` preserves the number → original-name
//! correspondence so the caller can de-anonymize later.

use serde::Deserialize;

/// One masked output file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaskedFile {
    pub original_name: String,
    pub masked_name: String,
    /// Size of the masked output in bytes.
    #[serde(default)]
    pub size: u64,
}

/// Mapping between an assigned number and the original file name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileMappingEntry {
    pub number: u32,
    pub original_name: String,
    pub masked_name: String,
}

/// The `result` field of a completed masking job's status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaskingResult {
    #[serde(default)]
    pub processed_files: Vec<MaskedFile>,
    #[serde(default)]
    pub file_mapping: Vec<FileMappingEntry>,
    #[serde(default)]
    pub total_processed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn masking_result_deserializes() {
        let json = r#"{
            "processed_files": [
                {"original_name": "kim_900101.pdf", "masked_name": "1.pdf", "size": 900000}
            ],
            "file_mapping": [
                {"number": 1, "original_name": "kim_900101.pdf", "masked_name": "1.pdf"}
            ],
            "total_processed": 1
        }"#;
        let result: MaskingResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.processed_files.len(), 1);
        assert_eq!(result.file_mapping[0].number, 1);
        assert_eq!(result.file_mapping[0].masked_name, "1.pdf");
        assert_eq!(result.total_processed, 1);
    }

    #[test]
    fn masking_result_tolerates_empty_object() {
        // Older server builds returned {} when nothing was processed.
        let result: MaskingResult = serde_json::from_str("{}").unwrap();
        assert!(result.processed_files.is_empty());
        assert!(result.file_mapping.is_empty());
    }
}
