// 📇 District Directory - Names for revenue districts
//
// The revenue export only carries County District Codes. School-level rows of
// the enrollment export give DistrictCode → (DistrictName, County). The two
// code schemes differ, so districts are joined on county name plus the last
// three digits of the code.

use crate::enrollment::EnrollmentTable;
use crate::revenue::aggregate::RevenueSummary;
use std::collections::{HashMap, HashSet};

/// Last three characters of a code (the whole code if shorter)
pub fn district_suffix(code: &str) -> &str {
    let count = code.chars().count();
    if count <= 3 {
        return code;
    }
    match code.char_indices().nth(count - 3) {
        Some((idx, _)) => &code[idx..],
        None => code,
    }
}

fn join_key(county: &str, code: &str) -> String {
    format!("{}_{}", county, district_suffix(code))
}

#[derive(Debug, Clone, Default)]
pub struct DistrictDirectory {
    /// DistrictCodes already taken from the enrollment export
    seen_codes: HashSet<String>,
    by_county_suffix: HashMap<String, String>,
}

impl DistrictDirectory {
    /// First School-level row per DistrictCode wins
    pub fn from_enrollment(table: &EnrollmentTable) -> Self {
        let mut directory = DistrictDirectory::default();
        for row in table.school_level() {
            directory.insert(&row.district_code, &row.district_name, &row.county);
        }
        directory
    }

    pub fn insert(&mut self, district_code: &str, name: &str, county: &str) {
        if !self.seen_codes.insert(district_code.to_string()) {
            return;
        }

        self.by_county_suffix
            .entry(join_key(county, district_code))
            .or_insert_with(|| name.to_string());
    }

    pub fn len(&self) -> usize {
        self.seen_codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_codes.is_empty()
    }

    /// District name for a revenue County District Code in `county_name`
    pub fn lookup(&self, county_name: &str, county_district_code: &str) -> Option<&str> {
        self.by_county_suffix
            .get(&join_key(county_name, county_district_code))
            .map(|s| s.as_str())
    }

    /// Fill `district_name` where possible; returns the named summaries in input order
    pub fn attach_names(&self, summaries: &mut [RevenueSummary]) -> Vec<RevenueSummary> {
        let mut matched = Vec::new();
        for summary in summaries.iter_mut() {
            if let Some(name) = self.lookup(&summary.county_name, &summary.county_district_code) {
                summary.district_name = Some(name.to_string());
                matched.push(summary.clone());
            }
        }
        matched
    }
}
