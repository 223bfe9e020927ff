// crates/core/src/export.rs
//! Client-side artifact generation from already-fetched data.
//!
//! The export surface is deliberately dumb: pure string builders over the
//! session's tabular data. Writing the result to disk is the caller's
//! business.

use chrono::Local;
use maskdeck_types::{FileMappingEntry, PersonalInfoEntry};

/// Build the personal-info spreadsheet as RFC 4180 CSV.
///
/// Columns mirror the extraction table: order, name, birth date, and the
/// original file name the entry was derived from.
pub fn build_personal_info_csv(entries: &[PersonalInfoEntry]) -> String {
    let mut csv = String::new();
    csv.push_str("order,name,birth_date,original_filename\n");

    for entry in entries {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            entry.order,
            escape_csv_field(&entry.name),
            escape_csv_field(&entry.birth_date),
            escape_csv_field(&entry.original_filename),
        ));
    }

    csv
}

/// Build the number → original-name mapping text file.
pub fn build_mapping_text(mapping: &[FileMappingEntry]) -> String {
    let mut text = String::new();
    text.push_str("masked -> original\n");
    text.push_str(&"=".repeat(30));
    text.push('\n');

    for entry in mapping {
        text.push_str(&format!("{} -> {}\n", entry.masked_name, entry.original_name));
    }

    text
}

/// Escape a CSV field per RFC 4180.
///
/// Fields containing a comma, double quote, or newline are wrapped in
/// double quotes with internal quotes doubled.
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Dated default file name for the personal-info CSV.
pub fn personal_info_file_name() -> String {
    format!("personal_info_{}.csv", Local::now().format("%Y-%m-%d"))
}

/// Dated default file name for the mapping text file.
pub fn mapping_file_name() -> String {
    format!("file_mapping_{}.txt", Local::now().format("%Y-%m-%d"))
}

/// Dated default file name for the masked-files archive.
pub fn masked_archive_file_name() -> String {
    format!("masked_pdfs_{}.zip", Local::now().format("%Y-%m-%d"))
}
