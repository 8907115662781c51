// ⚖️ Comparison Builder - Internal vs official, full outer join by district name
//
// One row per district present on either side. Rows are ordered by district
// name. Diffs are only filled when both sides carry the value:
//   enrollment_diff      = official - ours
//   enrollment_diff_pct  = round(enrollment_diff / official * 100, 1)  (None if official == 0)
//   <metric>_diff        = round((official_pct - our_pct) * 100, 1)   percentage points

use crate::districts::InternalDistrictRecord;
use crate::validation::metrics::{round_to, OfficialMetrics};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub district_name: String,

    pub our_enrollment: Option<f64>,
    pub ospi_enrollment: Option<f64>,
    pub enrollment_diff: Option<f64>,
    pub enrollment_diff_pct: Option<f64>,

    pub our_low_income_pct: Option<f64>,
    pub ospi_low_income_pct: Option<f64>,
    pub low_income_diff: Option<f64>,

    pub our_ell_pct: Option<f64>,
    pub ospi_ell_pct: Option<f64>,
    pub ell_diff: Option<f64>,

    pub our_special_ed_pct: Option<f64>,
    pub ospi_special_ed_pct: Option<f64>,
    pub special_ed_diff: Option<f64>,
}

/// Percentage-point difference between two fractions
fn point_diff(official: Option<f64>, ours: Option<f64>) -> Option<f64> {
    match (official, ours) {
        (Some(o), Some(u)) => Some(round_to((o - u) * 100.0, 1)),
        _ => None,
    }
}

impl ComparisonRow {
    pub fn new(
        district_name: &str,
        ours: Option<&InternalDistrictRecord>,
        official: Option<&OfficialMetrics>,
    ) -> Self {
        let our_enrollment = ours.and_then(|r| r.enrollment);
        let our_low_income_pct = ours.and_then(|r| r.low_income_pct);
        let our_ell_pct = ours.and_then(|r| r.ell_pct);
        let our_special_ed_pct = ours.and_then(|r| r.special_ed_pct);

        let ospi_enrollment = official.map(|m| m.enrollment);
        let ospi_low_income_pct = official.map(|m| m.low_income_pct);
        let ospi_ell_pct = official.map(|m| m.ell_pct);
        let ospi_special_ed_pct = official.map(|m| m.special_ed_pct);

        let enrollment_diff = match (ospi_enrollment, our_enrollment) {
            (Some(o), Some(u)) => Some(o - u),
            _ => None,
        };

        let enrollment_diff_pct = match (enrollment_diff, ospi_enrollment) {
            (Some(diff), Some(o)) if o != 0.0 => Some(round_to(diff / o * 100.0, 1)),
            _ => None,
        };

        ComparisonRow {
            district_name: district_name.to_string(),
            our_enrollment,
            ospi_enrollment,
            enrollment_diff,
            enrollment_diff_pct,
            our_low_income_pct,
            ospi_low_income_pct,
            low_income_diff: point_diff(ospi_low_income_pct, our_low_income_pct),
            our_ell_pct,
            ospi_ell_pct,
            ell_diff: point_diff(ospi_ell_pct, our_ell_pct),
            our_special_ed_pct,
            ospi_special_ed_pct,
            special_ed_diff: point_diff(ospi_special_ed_pct, our_special_ed_pct),
        }
    }

    pub fn has_both_sides(&self) -> bool {
        self.our_enrollment.is_some() && self.ospi_enrollment.is_some()
    }
}

/// Full outer join of internal records and official metrics on district name.
///
/// Repeated names on both sides produce every pairing, like a SQL join.
pub fn build_comparison(
    ours: &[&InternalDistrictRecord],
    official: &[OfficialMetrics],
) -> Vec<ComparisonRow> {
    let mut joined: BTreeMap<&str, (Vec<&InternalDistrictRecord>, Vec<&OfficialMetrics>)> =
        BTreeMap::new();

    for &record in ours {
        joined.entry(record.name.as_str()).or_default().0.push(record);
    }
    for metrics in official {
        joined
            .entry(metrics.district_name.as_str())
            .or_default()
            .1
            .push(metrics);
    }

    let mut rows = Vec::new();
    for (name, (left, right)) in joined {
        match (left.is_empty(), right.is_empty()) {
            (false, true) => rows.extend(left.iter().map(|l| ComparisonRow::new(name, Some(*l), None))),
            (true, false) => rows.extend(right.iter().map(|r| ComparisonRow::new(name, None, Some(*r)))),
            _ => {
                for l in &left {
                    for r in &right {
                        rows.push(ComparisonRow::new(name, Some(*l), Some(*r)));
                    }
                }
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(name: &str, enrollment: f64, li: f64, ell: f64, sped: f64) -> OfficialMetrics {
        OfficialMetrics {
            district_name: name.to_string(),
            enrollment,
            low_income: li * enrollment,
            low_income_pct: li,
            ell: ell * enrollment,
            ell_pct: ell,
            special_ed: sped * enrollment,
            special_ed_pct: sped,
        }
    }

    #[test]
    fn test_enrollment_diff() {
        let ours = InternalDistrictRecord::new("Kent School District", "2024-25")
            .with_metrics(100.0, 0.5, 0.2, 0.1);
        let official = metrics("Kent School District", 110.0, 0.52, 0.2, 0.13);

        let row = ComparisonRow::new("Kent School District", Some(&ours), Some(&official));

        assert_eq!(row.enrollment_diff, Some(10.0));
        assert_eq!(row.enrollment_diff_pct, Some(9.1));
        assert_eq!(row.low_income_diff, Some(2.0));
        assert_eq!(row.ell_diff, Some(0.0));
        assert_eq!(row.special_ed_diff, Some(3.0));
        assert!(row.has_both_sides());
    }

    #[test]
    fn test_negative_diff() {
        let ours = InternalDistrictRecord::new("Auburn School District", "2024-25")
            .with_metrics(20000.0, 0.6, 0.2, 0.15);
        let official = metrics("Auburn School District", 19000.0, 0.55, 0.2, 0.15);

        let row = ComparisonRow::new("Auburn School District", Some(&ours), Some(&official));

        assert_eq!(row.enrollment_diff, Some(-1000.0));
        assert_eq!(row.enrollment_diff_pct, Some(-5.3));
        assert_eq!(row.low_income_diff, Some(-5.0));
    }

    #[test]
    fn test_half_tenth_diff_pct_rounds_to_even() {
        let ours = InternalDistrictRecord::new("Renton School District", "2024-25")
            .with_metrics(409.0, 0.5, 0.2, 0.1);
        let official = metrics("Renton School District", 400.0, 0.5, 0.2, 0.1);

        let row = ComparisonRow::new("Renton School District", Some(&ours), Some(&official));

        assert_eq!(row.enrollment_diff, Some(-9.0));
        assert_eq!(row.enrollment_diff_pct, Some(-2.2));
    }

    #[test]
    fn test_zero_official_enrollment_has_no_pct() {
        let ours = InternalDistrictRecord::new("Ghost District", "2024-25")
            .with_metrics(10.0, 0.0, 0.0, 0.0);
        let official = metrics("Ghost District", 0.0, 0.0, 0.0, 0.0);

        let row = ComparisonRow::new("Ghost District", Some(&ours), Some(&official));

        assert_eq!(row.enrollment_diff, Some(-10.0));
        assert_eq!(row.enrollment_diff_pct, None);
    }

    #[test]
    fn test_outer_join_keeps_unmatched_rows() {
        let seattle = InternalDistrictRecord::new("Seattle Public Schools", "2024-25")
            .with_metrics(50000.0, 0.35, 0.15, 0.16);
        let bellevue = InternalDistrictRecord::new("Bellevue School District", "2024-25")
            .with_metrics(19000.0, 0.2, 0.18, 0.12);
        let ours = vec![&seattle, &bellevue];
        let official = vec![
            metrics("Seattle Public Schools", 49000.0, 0.35, 0.15, 0.16),
            metrics("Yakima School District", 15000.0, 0.8, 0.2, 0.14),
        ];

        let rows = build_comparison(&ours, &official);

        let names: Vec<&str> = rows.iter().map(|r| r.district_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Bellevue School District", "Seattle Public Schools", "Yakima School District"]
        );

        // Only ours
        assert_eq!(rows[0].our_enrollment, Some(19000.0));
        assert_eq!(rows[0].ospi_enrollment, None);
        assert_eq!(rows[0].enrollment_diff, None);
        assert_eq!(rows[0].low_income_diff, None);

        // Both
        assert_eq!(rows[1].enrollment_diff, Some(-1000.0));

        // Only official
        assert_eq!(rows[2].our_enrollment, None);
        assert_eq!(rows[2].ospi_low_income_pct, Some(0.8));
        assert_eq!(rows[2].enrollment_diff_pct, None);
    }

    #[test]
    fn test_missing_internal_metric_leaves_diff_empty() {
        let mut ours = InternalDistrictRecord::new("Renton School District", "2024-25")
            .with_metrics(15000.0, 0.4, 0.2, 0.15);
        ours.ell_pct = None;
        let official = metrics("Renton School District", 15000.0, 0.4, 0.25, 0.15);

        let row = ComparisonRow::new("Renton School District", Some(&ours), Some(&official));

        assert_eq!(row.ell_diff, None);
        assert_eq!(row.low_income_diff, Some(0.0));
        assert_eq!(row.enrollment_diff_pct, Some(0.0));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build_comparison(&[], &[]).is_empty());
    }
}
