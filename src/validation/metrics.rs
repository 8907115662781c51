// 📐 Metric Calculator - Official counts → comparable fractions
//
// pct = round(count / total, 3) when total > 0, otherwise 0.
// A field that cannot be coerced to a number is a per-district error: the
// caller warns and skips that district, the run continues.

use crate::enrollment::{
    OfficialEnrollmentRecord, COL_ALL_STUDENTS, COL_ELL, COL_LOW_INCOME, COL_SPECIAL_ED,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("{district}: field '{field}' is not numeric ({value:?})")]
    Unparseable {
        district: String,
        field: &'static str,
        value: String,
    },
}

/// Round to `places` decimals, ties to even on the exact binary value.
///
/// Float formatting is exact and breaks ties to even, so -2.25 → -2.2 and
/// 2.675 (stored as 2.67499...) → 2.67.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

/// Fraction of `total`, 3 decimals; 0 for an empty district
pub fn share(count: f64, total: f64) -> f64 {
    if total > 0.0 {
        round_to(count / total, 3)
    } else {
        0.0
    }
}

/// Strict numeric coercion of a raw CSV field
fn coerce(district: &str, field: &'static str, value: &str) -> Result<f64, MetricError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MetricError::Unparseable {
            district: district.to_string(),
            field,
            value: value.to_string(),
        })
}

// ============================================================================
// OFFICIAL METRICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficialMetrics {
    /// Canonical internal name the metrics were matched for
    pub district_name: String,

    pub enrollment: f64,
    pub low_income: f64,
    pub low_income_pct: f64,
    pub ell: f64,
    pub ell_pct: f64,
    pub special_ed: f64,
    pub special_ed_pct: f64,
}

impl OfficialMetrics {
    /// Compute metrics for `district_name` from one official district row
    pub fn from_record(
        district_name: &str,
        record: &OfficialEnrollmentRecord,
    ) -> Result<Self, MetricError> {
        let enrollment = coerce(district_name, COL_ALL_STUDENTS, &record.total_students)?;
        let low_income = coerce(district_name, COL_LOW_INCOME, &record.low_income_count)?;
        let ell = coerce(district_name, COL_ELL, &record.ell_count)?;
        let special_ed = coerce(district_name, COL_SPECIAL_ED, &record.special_ed_count)?;

        Ok(OfficialMetrics {
            district_name: district_name.to_string(),
            enrollment,
            low_income,
            low_income_pct: share(low_income, enrollment),
            ell,
            ell_pct: share(ell, enrollment),
            special_ed,
            special_ed_pct: share(special_ed, enrollment),
        })
    }
}
