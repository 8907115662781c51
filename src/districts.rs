// 🏫 Internal District Dataset - Locally maintained district statistics
//
// Source file is a JSON array of district-year records with short keys:
//   n = name, y = school year, t = enrollment, li/el/sp = fractions (0.0 - 1.0)
// Any other keys (d, c, cis, lea, av, ...) are carried through untouched.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Keys with a typed field, in dump order
pub const KNOWN_KEYS: [&str; 6] = ["n", "y", "t", "li", "el", "sp"];

/// One district for one school year. Identity is (name, school_year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalDistrictRecord {
    #[serde(rename = "n")]
    pub name: String,

    #[serde(rename = "y")]
    pub school_year: String,

    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<f64>,

    /// Fraction of low-income students
    #[serde(rename = "li", default, skip_serializing_if = "Option::is_none")]
    pub low_income_pct: Option<f64>,

    /// Fraction of English language learners
    #[serde(rename = "el", default, skip_serializing_if = "Option::is_none")]
    pub ell_pct: Option<f64>,

    /// Fraction of special education students
    #[serde(rename = "sp", default, skip_serializing_if = "Option::is_none")]
    pub special_ed_pct: Option<f64>,

    /// Untyped fields preserved for the raw dump and the enriched output
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InternalDistrictRecord {
    pub fn new(name: &str, school_year: &str) -> Self {
        InternalDistrictRecord {
            name: name.to_string(),
            school_year: school_year.to_string(),
            enrollment: None,
            low_income_pct: None,
            ell_pct: None,
            special_ed_pct: None,
            extra: Map::new(),
        }
    }

    pub fn with_metrics(mut self, enrollment: f64, low_income: f64, ell: f64, special_ed: f64) -> Self {
        self.enrollment = Some(enrollment);
        self.low_income_pct = Some(low_income);
        self.ell_pct = Some(ell);
        self.special_ed_pct = Some(special_ed);
        self
    }

    /// Cell value for a dump column (known short key or extra key)
    pub fn field(&self, key: &str) -> Option<Value> {
        let number = |v: Option<f64>| v.and_then(serde_json::Number::from_f64).map(Value::Number);

        match key {
            "n" => Some(Value::String(self.name.clone())),
            "y" => Some(Value::String(self.school_year.clone())),
            "t" => number(self.enrollment),
            "li" => number(self.low_income_pct),
            "el" => number(self.ell_pct),
            "sp" => number(self.special_ed_pct),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// Load the whole internal dataset
pub fn load_internal_districts(path: &Path) -> Result<Vec<InternalDistrictRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read district dataset: {}", path.display()))?;

    let records: Vec<InternalDistrictRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse district dataset: {}", path.display()))?;

    Ok(records)
}

/// Records for one school year, input order preserved
pub fn for_school_year<'a>(
    records: &'a [InternalDistrictRecord],
    school_year: &str,
) -> Vec<&'a InternalDistrictRecord> {
    records
        .iter()
        .filter(|r| r.school_year == school_year)
        .collect()
}

/// Column keys for a raw dump: typed keys first, then every extra key (sorted)
pub fn dump_columns(records: &[InternalDistrictRecord]) -> Vec<String> {
    let mut extra: Vec<String> = records
        .iter()
        .flat_map(|r| r.extra.keys().cloned())
        .collect();
    extra.sort();
    extra.dedup();

    KNOWN_KEYS
        .iter()
        .map(|k| k.to_string())
        .chain(extra)
        .collect()
}
