// 📋 Official Enrollment Export - State education agency report card CSV
//
// Header-driven: columns are located by name, so column order in the export
// does not matter. Metric columns are kept as raw text; numeric coercion
// happens per district in validation::metrics, where a bad value is
// recoverable instead of fatal.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;

pub const COL_ORGANIZATION_LEVEL: &str = "OrganizationLevel";
pub const COL_DISTRICT_NAME: &str = "DistrictName";
pub const COL_DISTRICT_CODE: &str = "DistrictCode";
pub const COL_COUNTY: &str = "County";
pub const COL_GRADE_LEVEL: &str = "GradeLevel";
pub const COL_ALL_STUDENTS: &str = "All Students";
pub const COL_LOW_INCOME: &str = "Low-Income";
pub const COL_ELL: &str = "English Language Learners";
pub const COL_SPECIAL_ED: &str = "Students with Disabilities";

/// Grade-level value of a whole-district total row
pub const ALL_GRADES: &str = "All Grades";

// ============================================================================
// ORGANIZATION LEVEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationLevel {
    District,
    School,
    Grade,
    Other(String),
}

impl OrganizationLevel {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "District" => OrganizationLevel::District,
            "School" => OrganizationLevel::School,
            "Grade" => OrganizationLevel::Grade,
            other => OrganizationLevel::Other(other.to_string()),
        }
    }
}

// ============================================================================
// OFFICIAL RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct OfficialEnrollmentRecord {
    pub organization_level: OrganizationLevel,
    pub district_name: String,
    pub district_code: String,
    pub county: String,

    /// None when the export has no GradeLevel column
    pub grade_level: Option<String>,

    // Raw metric text, coerced later
    pub total_students: String,
    pub low_income_count: String,
    pub ell_count: String,
    pub special_ed_count: String,

    /// Every column of the source row, in header order
    pub raw: Vec<String>,
}

impl OfficialEnrollmentRecord {
    pub fn is_district_level(&self) -> bool {
        self.organization_level == OrganizationLevel::District
            && self
                .grade_level
                .as_deref()
                .map_or(true, |g| g.trim() == ALL_GRADES)
    }
}

// ============================================================================
// ENROLLMENT TABLE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct EnrollmentTable {
    pub headers: Vec<String>,
    pub records: Vec<OfficialEnrollmentRecord>,
}

struct ColumnIndex {
    organization_level: usize,
    district_name: usize,
    district_code: usize,
    county: usize,
    grade_level: Option<usize>,
    total_students: usize,
    low_income: usize,
    ell: usize,
    special_ed: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &[String], source: &str) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).with_context(|| format!("Missing column '{}' in {}", name, source))
        };

        Ok(ColumnIndex {
            organization_level: require(COL_ORGANIZATION_LEVEL)?,
            district_name: require(COL_DISTRICT_NAME)?,
            district_code: require(COL_DISTRICT_CODE)?,
            county: require(COL_COUNTY)?,
            grade_level: find(COL_GRADE_LEVEL),
            total_students: require(COL_ALL_STUDENTS)?,
            low_income: require(COL_LOW_INCOME)?,
            ell: require(COL_ELL)?,
            special_ed: require(COL_SPECIAL_ED)?,
        })
    }
}

impl EnrollmentTable {
    /// Parse an enrollment export already loaded in memory
    pub fn from_csv_str(content: &str, source: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read header row of {}", source))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let cols = ColumnIndex::from_headers(&headers, source)?;

        let mut records = Vec::new();
        for (line_num, result) in reader.records().enumerate() {
            let row = result.with_context(|| {
                format!("Failed to parse CSV line {} in {}", line_num + 2, source)
            })?;

            let get = |idx: usize| row.get(idx).unwrap_or("").to_string();

            records.push(OfficialEnrollmentRecord {
                organization_level: OrganizationLevel::parse(&get(cols.organization_level)),
                district_name: get(cols.district_name),
                district_code: get(cols.district_code),
                county: get(cols.county),
                grade_level: cols.grade_level.map(get),
                total_students: get(cols.total_students),
                low_income_count: get(cols.low_income),
                ell_count: get(cols.ell),
                special_ed_count: get(cols.special_ed),
                raw: row.iter().map(|s| s.to_string()).collect(),
            });
        }

        Ok(EnrollmentTable { headers, records })
    }

    /// Whole-file load
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read enrollment file: {}", path.display()))?;

        Self::from_csv_str(&content, &path.display().to_string())
    }

    /// Whole-district rows only (no School or Grade rows, no per-grade breakdowns)
    pub fn district_level(&self) -> Vec<&OfficialEnrollmentRecord> {
        self.records.iter().filter(|r| r.is_district_level()).collect()
    }

    pub fn school_level(&self) -> impl Iterator<Item = &OfficialEnrollmentRecord> {
        self.records
            .iter()
            .filter(|r| r.organization_level == OrganizationLevel::School)
    }
}
