// 📊 Validation Workbook - Multi-sheet xlsx report
//
// Sheets:
//   Comparison   - the outer-join diff table
//   Our Data     - every internal record, all years
//   OSPI Raw     - official district rows near the target names (skipped when empty)
//   Data Sources - input files with SHA-256 and the creation date
//
// The whole workbook is built in memory and saved once, so a failure never
// leaves a half-written file behind.

use crate::districts::{dump_columns, InternalDistrictRecord};
use crate::enrollment::OfficialEnrollmentRecord;
use crate::validation::comparison::ComparisonRow;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const SHEET_COMPARISON: &str = "Comparison";
pub const SHEET_OUR_DATA: &str = "Our Data";
pub const SHEET_OSPI_RAW: &str = "OSPI Raw";
pub const SHEET_SOURCES: &str = "Data Sources";

pub const COMPARISON_HEADERS: [&str; 14] = [
    "District Name",
    "Our Enrollment",
    "OSPI Enrollment",
    "Enrollment Diff",
    "Enrollment Diff %",
    "Our Low-Income %",
    "OSPI Low-Income %",
    "Low-Income Diff",
    "Our ELL %",
    "OSPI ELL %",
    "ELL Diff",
    "Our SpEd %",
    "OSPI SpEd %",
    "SpEd Diff",
];

const NAME_COLUMN_WIDTH: f64 = 32.0;
const VALUE_COLUMN_WIDTH: f64 = 14.0;

// ============================================================================
// INPUT PROVENANCE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub label: String,
    pub path: PathBuf,
    pub sha256: String,
}

impl SourceFile {
    /// Hash the file contents
    pub fn fingerprint(label: &str, path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read {} for fingerprint", path.display()))?;

        Ok(SourceFile {
            label: label.to_string(),
            path: path.to_path_buf(),
            sha256: format!("{:x}", Sha256::digest(&bytes)),
        })
    }
}

// ============================================================================
// WORKBOOK CONTENT
// ============================================================================

pub struct ValidationReport<'a> {
    pub comparison: &'a [ComparisonRow],
    pub internal: &'a [InternalDistrictRecord],
    pub raw_headers: &'a [String],
    pub raw_rows: &'a [&'a OfficialEnrollmentRecord],
    pub sources: &'a [SourceFile],
    pub created: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookSummary {
    pub sheets: Vec<String>,
    pub comparison_rows: usize,
    pub internal_rows: usize,
    pub raw_rows: usize,
}

impl ComparisonRow {
    /// Numeric cells in `COMPARISON_HEADERS` order (after the name)
    fn numeric_cells(&self) -> [Option<f64>; 13] {
        [
            self.our_enrollment,
            self.ospi_enrollment,
            self.enrollment_diff,
            self.enrollment_diff_pct,
            self.our_low_income_pct,
            self.ospi_low_income_pct,
            self.low_income_diff,
            self.our_ell_pct,
            self.ospi_ell_pct,
            self.ell_diff,
            self.our_special_ed_pct,
            self.ospi_special_ed_pct,
            self.special_ed_diff,
        ]
    }
}

// ============================================================================
// CELL HELPERS
// ============================================================================

fn write_header<S: AsRef<str>>(
    worksheet: &mut Worksheet,
    headers: &[S],
    bold: &Format,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header.as_ref(), bold)?;
    }
    Ok(())
}

fn write_json_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, s.as_str())?;
        }
        other => {
            worksheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

/// Numbers as numbers, codes with leading zeros and everything else as text
fn write_raw_cell(worksheet: &mut Worksheet, row: u32, col: u16, text: &str) -> Result<(), XlsxError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let leading_zero = trimmed.len() > 1 && trimmed.starts_with('0') && !trimmed.starts_with("0.");
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && !leading_zero => {
            worksheet.write_number(row, col, n)?;
        }
        _ => {
            worksheet.write_string(row, col, text)?;
        }
    }
    Ok(())
}

// ============================================================================
// SHEETS
// ============================================================================

fn comparison_sheet(worksheet: &mut Worksheet, rows: &[ComparisonRow], bold: &Format) -> Result<(), XlsxError> {
    worksheet.set_name(SHEET_COMPARISON)?;
    write_header(worksheet, &COMPARISON_HEADERS, bold)?;

    worksheet.set_column_width(0, NAME_COLUMN_WIDTH)?;
    for col in 1..COMPARISON_HEADERS.len() as u16 {
        worksheet.set_column_width(col, VALUE_COLUMN_WIDTH)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        worksheet.write_string(r, 0, row.district_name.as_str())?;
        for (offset, cell) in row.numeric_cells().iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_number(r, offset as u16 + 1, *value)?;
            }
        }
    }
    Ok(())
}

fn internal_sheet(
    worksheet: &mut Worksheet,
    records: &[InternalDistrictRecord],
    bold: &Format,
) -> Result<(), XlsxError> {
    worksheet.set_name(SHEET_OUR_DATA)?;

    let columns = dump_columns(records);
    write_header(worksheet, &columns, bold)?;

    for (idx, record) in records.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, key) in columns.iter().enumerate() {
            if let Some(value) = record.field(key) {
                write_json_value(worksheet, r, col as u16, &value)?;
            }
        }
    }
    worksheet.set_column_width(0, NAME_COLUMN_WIDTH)?;
    Ok(())
}

fn raw_sheet(
    worksheet: &mut Worksheet,
    headers: &[String],
    rows: &[&OfficialEnrollmentRecord],
    bold: &Format,
) -> Result<(), XlsxError> {
    worksheet.set_name(SHEET_OSPI_RAW)?;
    write_header(worksheet, headers, bold)?;

    for (idx, record) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, text) in record.raw.iter().enumerate() {
            write_raw_cell(worksheet, r, col as u16, text)?;
        }
    }
    Ok(())
}

fn sources_sheet(
    worksheet: &mut Worksheet,
    sources: &[SourceFile],
    created: NaiveDate,
    bold: &Format,
) -> Result<(), XlsxError> {
    worksheet.set_name(SHEET_SOURCES)?;
    write_header(worksheet, &["Source", "Path", "SHA-256"], bold)?;

    for (idx, source) in sources.iter().enumerate() {
        let r = idx as u32 + 1;
        worksheet.write_string(r, 0, source.label.as_str())?;
        worksheet.write_string(r, 1, source.path.display().to_string())?;
        worksheet.write_string(r, 2, source.sha256.as_str())?;
    }

    let r = sources.len() as u32 + 1;
    worksheet.write_string(r, 0, "Validation Created")?;
    worksheet.write_string(r, 1, created.format("%Y-%m-%d").to_string())?;

    worksheet.set_column_width(0, 22)?;
    worksheet.set_column_width(1, 48)?;
    worksheet.set_column_width(2, 66)?;
    Ok(())
}

/// Build every sheet and save the workbook to `path` (overwriting it)
pub fn write_validation_workbook(path: &Path, report: &ValidationReport) -> Result<WorkbookSummary> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let mut sheets = Vec::new();

    comparison_sheet(workbook.add_worksheet(), report.comparison, &bold)
        .context("Failed to build Comparison sheet")?;
    sheets.push(SHEET_COMPARISON.to_string());

    internal_sheet(workbook.add_worksheet(), report.internal, &bold)
        .context("Failed to build Our Data sheet")?;
    sheets.push(SHEET_OUR_DATA.to_string());

    if !report.raw_rows.is_empty() {
        raw_sheet(workbook.add_worksheet(), report.raw_headers, report.raw_rows, &bold)
            .context("Failed to build OSPI Raw sheet")?;
        sheets.push(SHEET_OSPI_RAW.to_string());
    }

    sources_sheet(workbook.add_worksheet(), report.sources, report.created, &bold)
        .context("Failed to build Data Sources sheet")?;
    sheets.push(SHEET_SOURCES.to_string());

    workbook
        .save(path)
        .with_context(|| format!("Failed to save workbook: {}", path.display()))?;

    Ok(WorkbookSummary {
        sheets,
        comparison_rows: report.comparison.len(),
        internal_rows: report.internal.len(),
        raw_rows: report.raw_rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::OrganizationLevel;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn official(name: &str, raw: &[&str]) -> OfficialEnrollmentRecord {
        OfficialEnrollmentRecord {
            organization_level: OrganizationLevel::District,
            district_name: name.to_string(),
            district_code: raw[1].to_string(),
            county: "King".to_string(),
            grade_level: None,
            total_students: raw[2].to_string(),
            low_income_count: "0".to_string(),
            ell_count: "0".to_string(),
            special_ed_count: "0".to_string(),
            raw: raw.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sample_rows() -> Vec<ComparisonRow> {
        let ours = InternalDistrictRecord::new("Kent School District", "2024-25")
            .with_metrics(100.0, 0.5, 0.2, 0.1);
        vec![
            ComparisonRow::new("Kent School District", Some(&ours), None),
            ComparisonRow {
                district_name: "Seattle Public Schools".to_string(),
                our_enrollment: Some(100.0),
                ospi_enrollment: Some(110.0),
                enrollment_diff: Some(10.0),
                enrollment_diff_pct: Some(9.1),
                our_low_income_pct: Some(0.5),
                ospi_low_income_pct: Some(0.52),
                low_income_diff: Some(2.0),
                our_ell_pct: None,
                ospi_ell_pct: Some(0.2),
                ell_diff: None,
                our_special_ed_pct: Some(0.1),
                ospi_special_ed_pct: Some(0.13),
                special_ed_diff: Some(3.0),
            },
        ]
    }

    #[test]
    fn test_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(&path, "abc").unwrap();

        let source = SourceFile::fingerprint("Input", &path).unwrap();
        assert_eq!(
            source.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(source.label, "Input");
    }

    #[test]
    fn test_write_workbook_sheets_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation.xlsx");

        let rows = sample_rows();
        let internal = vec![InternalDistrictRecord::new("Kent School District", "2024-25")
            .with_metrics(100.0, 0.5, 0.2, 0.1)];
        let headers = vec!["DistrictName".to_string(), "DistrictCode".to_string(), "All Students".to_string()];
        let kent = official("Kent School District #415", &["Kent School District #415", "17415", "25000"]);
        let raw_rows = vec![&kent];
        let created = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let report = ValidationReport {
            comparison: &rows,
            internal: &internal,
            raw_headers: &headers,
            raw_rows: &raw_rows,
            sources: &[],
            created,
        };

        let summary = write_validation_workbook(&path, &report).unwrap();
        assert_eq!(
            summary.sheets,
            vec![SHEET_COMPARISON, SHEET_OUR_DATA, SHEET_OSPI_RAW, SHEET_SOURCES]
        );
        assert_eq!(summary.comparison_rows, 2);

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            book.sheet_names(),
            vec![SHEET_COMPARISON, SHEET_OUR_DATA, SHEET_OSPI_RAW, SHEET_SOURCES]
        );

        let comparison = book.worksheet_range(SHEET_COMPARISON).unwrap();
        assert_eq!(
            comparison.get_value((0, 0)),
            Some(&Data::String("District Name".to_string()))
        );
        assert_eq!(
            comparison.get_value((2, 0)),
            Some(&Data::String("Seattle Public Schools".to_string()))
        );
        assert_eq!(comparison.get_value((2, 4)), Some(&Data::Float(9.1)));

        let raw = book.worksheet_range(SHEET_OSPI_RAW).unwrap();
        assert_eq!(raw.get_value((1, 1)), Some(&Data::Float(17415.0)));
        assert_eq!(raw.get_value((1, 2)), Some(&Data::Float(25000.0)));
    }

    #[test]
    fn test_our_data_and_sources_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation.xlsx");
        let input = dir.path().join("districts.json");
        fs::write(&input, "abc").unwrap();

        let mut seattle = InternalDistrictRecord::new("Seattle Public Schools", "2024-25")
            .with_metrics(49000.0, 0.35, 0.15, 0.16);
        seattle
            .extra
            .insert("d".to_string(), Value::String("17001".to_string()));
        let kent = InternalDistrictRecord::new("Kent School District", "2023-24");
        let internal = vec![seattle, kent];

        let sources = vec![SourceFile::fingerprint("Internal districts", &input).unwrap()];
        let created = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let report = ValidationReport {
            comparison: &[],
            internal: &internal,
            raw_headers: &[],
            raw_rows: &[],
            sources: &sources,
            created,
        };
        let summary = write_validation_workbook(&path, &report).unwrap();
        assert_eq!(summary.internal_rows, 2);

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();

        let ours = book.worksheet_range(SHEET_OUR_DATA).unwrap();
        assert_eq!(ours.get_value((0, 0)), Some(&Data::String("n".to_string())));
        assert_eq!(ours.get_value((0, 6)), Some(&Data::String("d".to_string())));
        assert_eq!(
            ours.get_value((1, 0)),
            Some(&Data::String("Seattle Public Schools".to_string()))
        );
        assert_eq!(ours.get_value((1, 1)), Some(&Data::String("2024-25".to_string())));
        assert_eq!(ours.get_value((1, 2)), Some(&Data::Float(49000.0)));
        assert_eq!(ours.get_value((1, 3)), Some(&Data::Float(0.35)));
        assert_eq!(ours.get_value((1, 6)), Some(&Data::String("17001".to_string())));
        assert_eq!(ours.get_value((2, 1)), Some(&Data::String("2023-24".to_string())));
        assert!(matches!(ours.get_value((2, 2)), None | Some(Data::Empty)));

        let sheet = book.worksheet_range(SHEET_SOURCES).unwrap();
        assert_eq!(sheet.get_value((0, 2)), Some(&Data::String("SHA-256".to_string())));
        assert_eq!(
            sheet.get_value((1, 0)),
            Some(&Data::String("Internal districts".to_string()))
        );
        assert_eq!(
            sheet.get_value((1, 1)),
            Some(&Data::String(input.display().to_string()))
        );
        assert_eq!(
            sheet.get_value((1, 2)),
            Some(&Data::String(
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad".to_string()
            ))
        );
        assert_eq!(
            sheet.get_value((2, 0)),
            Some(&Data::String("Validation Created".to_string()))
        );
        assert_eq!(sheet.get_value((2, 1)), Some(&Data::String("2025-06-02".to_string())));
    }

    #[test]
    fn test_raw_sheet_skipped_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation.xlsx");
        let created = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let report = ValidationReport {
            comparison: &[],
            internal: &[],
            raw_headers: &[],
            raw_rows: &[],
            sources: &[],
            created,
        };

        let summary = write_validation_workbook(&path, &report).unwrap();
        assert_eq!(summary.sheets, vec![SHEET_COMPARISON, SHEET_OUR_DATA, SHEET_SOURCES]);
        assert!(path.exists());
    }

    #[test]
    fn test_leading_zero_codes_stay_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.xlsx");
        let created = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let headers = vec!["DistrictName".to_string(), "DistrictCode".to_string(), "All Students".to_string()];
        let vancouver = official("Vancouver Public Schools", &["Vancouver Public Schools", "06037", "22000"]);
        let raw_rows = vec![&vancouver];

        let report = ValidationReport {
            comparison: &[],
            internal: &[],
            raw_headers: &headers,
            raw_rows: &raw_rows,
            sources: &[],
            created,
        };
        write_validation_workbook(&path, &report).unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        let raw = book.worksheet_range(SHEET_OSPI_RAW).unwrap();
        assert_eq!(raw.get_value((1, 1)), Some(&Data::String("06037".to_string())));
    }
}
