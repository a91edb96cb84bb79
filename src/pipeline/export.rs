//! Tabular export: serialise one field mapping into a single-row workbook.
//!
//! The artifact is produced entirely in memory — this stage never touches a
//! named file on disk. Output is deterministic: the same mapping always
//! yields the same column order (the mapping's insertion order, not sorted),
//! one header row of field names and one data row of values.

use crate::error::PipelineError;
use crate::fields::FieldMapping;
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::debug;

/// Content type the published artifact is tagged with.
pub const SPREADSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Worksheet name inside the exported workbook.
pub const WORKSHEET_NAME: &str = "License Renewal Data";

/// Serialise a field mapping into xlsx workbook bytes.
///
/// The only failure mode is an ambient serialisation fault, which is fatal
/// to the run and never retried.
pub fn export_mapping(mapping: &FieldMapping) -> Result<Vec<u8>, PipelineError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WORKSHEET_NAME).map_err(export_error)?;

    for (column, (name, value)) in mapping.iter().enumerate() {
        let column = column as u16;
        worksheet.write_string(0, column, name).map_err(export_error)?;
        worksheet.write_string(1, column, value).map_err(export_error)?;
    }

    let bytes = workbook.save_to_buffer().map_err(export_error)?;
    debug!(
        columns = mapping.len(),
        bytes = bytes.len(),
        "exported workbook"
    );
    Ok(bytes)
}

/// Timestamped artifact filename, e.g. `license_renewal_20260830_143000.xlsx`.
pub fn artifact_filename(at: DateTime<Local>) -> String {
    format!("license_renewal_{}.xlsx", at.format("%Y%m%d_%H%M%S"))
}

fn export_error(e: XlsxError) -> PipelineError {
    PipelineError::ExportFailed {
        detail: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use serde_json::json;
    use std::io::Cursor;

    fn mapping(value: serde_json::Value) -> FieldMapping {
        match value {
            serde_json::Value::Object(map) => FieldMapping::from_json_object(map),
            other => panic!("expected object, got {other}"),
        }
    }

    fn read_back(bytes: &[u8]) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).expect("open workbook");
        let range = workbook
            .worksheet_range(WORKSHEET_NAME)
            .expect("worksheet present");
        range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Data::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn one_header_row_one_data_row_in_mapping_order() {
        let bytes = export_mapping(&mapping(json!({
            "license_number": "A123",
            "applicant_name": "Jane Doe",
            "office_code": "NW-7"
        })))
        .unwrap();

        let rows = read_back(&bytes);
        assert_eq!(rows.len(), 2, "expected header + one data row");
        assert_eq!(rows[0], ["license_number", "applicant_name", "office_code"]);
        assert_eq!(rows[1], ["A123", "Jane Doe", "NW-7"]);
    }

    #[test]
    fn export_is_deterministic() {
        let m = mapping(json!({ "a": "1", "b": "2" }));
        assert_eq!(export_mapping(&m).unwrap(), export_mapping(&m).unwrap());
    }

    #[test]
    fn filename_is_timestamped_xlsx() {
        let at = Local::now();
        let name = artifact_filename(at);
        assert!(name.starts_with("license_renewal_"), "got: {name}");
        assert!(name.ends_with(".xlsx"));
        // license_renewal_ + YYYYMMDD_HHMMSS + .xlsx
        assert_eq!(name.len(), "license_renewal_".len() + 15 + ".xlsx".len());
    }
}
