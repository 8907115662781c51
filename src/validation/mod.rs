// Validation - internal district statistics vs the official enrollment export
//
// matcher → metrics → comparison → workbook

pub mod matcher;
pub mod metrics;
pub mod comparison;
pub mod workbook;

pub use matcher::{find_district, first_word_filter, strip_suffixes, DistrictMatch, MatchPath};
pub use metrics::{round_to, share, MetricError, OfficialMetrics};
pub use comparison::{build_comparison, ComparisonRow};
pub use workbook::{write_validation_workbook, SourceFile, ValidationReport, WorkbookSummary};
