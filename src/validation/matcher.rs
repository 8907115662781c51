// 🔎 District Name Matcher - Internal names → official district rows
//
// The two sources name districts independently ("Kent School District" vs
// "Kent School District #415"). Matching is heuristic and order-sensitive:
//   1. Exact equality on DistrictName → every equal row.
//   2. Otherwise strip " School District" / " Public Schools" from the target
//      and scan official rows in order; the FIRST row whose DistrictName
//      contains the stripped text wins, and every row sharing that row's full
//      DistrictName is returned.
// Duplicate district-level rows with the same name are passed through as-is.

use crate::enrollment::OfficialEnrollmentRecord;

/// Suffixes removed before the substring scan
pub const NAME_SUFFIXES: [&str; 2] = [" School District", " Public Schools"];

// ============================================================================
// MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MatchPath {
    /// DistrictName equals the target
    Exact,

    /// DistrictName of the first row containing the stripped target
    Partial { stripped: String, matched_name: String },

    /// Nothing matched (recoverable: the district is skipped)
    NotFound,
}

#[derive(Debug, Clone)]
pub struct DistrictMatch<'a> {
    pub target: String,
    pub path: MatchPath,
    pub records: Vec<&'a OfficialEnrollmentRecord>,
}

impl<'a> DistrictMatch<'a> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// District-level data should be one row; the first one is authoritative
    pub fn first(&self) -> Option<&'a OfficialEnrollmentRecord> {
        self.records.first().copied()
    }
}

// ============================================================================
// MATCHING
// ============================================================================

/// Remove the known suffixes wherever they occur in the name
pub fn strip_suffixes(name: &str) -> String {
    NAME_SUFFIXES
        .iter()
        .fold(name.to_string(), |acc, suffix| acc.replace(suffix, ""))
}

/// Resolve a canonical internal district name against district-level rows
pub fn find_district<'a>(
    target: &str,
    official: &[&'a OfficialEnrollmentRecord],
) -> DistrictMatch<'a> {
    let exact: Vec<&'a OfficialEnrollmentRecord> = official
        .iter()
        .copied()
        .filter(|r| r.district_name == target)
        .collect();

    if !exact.is_empty() {
        return DistrictMatch {
            target: target.to_string(),
            path: MatchPath::Exact,
            records: exact,
        };
    }

    let stripped = strip_suffixes(target);

    // First substring hit decides which full name is used
    let first_hit = official
        .iter()
        .find(|r| r.district_name.contains(&stripped));

    match first_hit {
        Some(hit) => {
            let matched_name = hit.district_name.clone();
            let records = official
                .iter()
                .copied()
                .filter(|r| r.district_name == matched_name)
                .collect();

            DistrictMatch {
                target: target.to_string(),
                path: MatchPath::Partial {
                    stripped,
                    matched_name,
                },
                records,
            }
        }
        None => DistrictMatch {
            target: target.to_string(),
            path: MatchPath::NotFound,
            records: Vec::new(),
        },
    }
}

/// Coarse first-word filter for the raw official dump.
///
/// Keeps rows whose DistrictName contains (case-insensitive) the first word of
/// any target name. Broader than `find_district`: "Lake" also pulls
/// in "Lake Stevens" and "Lake Chelan".
pub fn first_word_filter<'a>(
    official: &[&'a OfficialEnrollmentRecord],
    targets: &[String],
) -> Vec<&'a OfficialEnrollmentRecord> {
    let prefixes: Vec<String> = targets
        .iter()
        .filter_map(|t| t.split_whitespace().next())
        .map(|w| w.to_lowercase())
        .collect();

    official
        .iter()
        .copied()
        .filter(|r| {
            let name = r.district_name.to_lowercase();
            prefixes.iter().any(|p| name.contains(p.as_str()))
        })
        .collect()
}
