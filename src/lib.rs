// OSPI Reconcile - Core Library
// District enrollment validation and revenue aggregation against official state exports

pub mod config;
pub mod logging;
pub mod districts;   // Internal district dataset (JSON)
pub mod enrollment;  // Official enrollment export (CSV)
pub mod validation;  // Matching, metrics, comparison, workbook
pub mod revenue;     // Funding-source aggregation, county names, district directory
pub mod enrichment;  // Revenue fields merged into internal records
pub mod pipeline;

// Re-export commonly used types
pub use config::{Config, EnrichmentConfig, PathsConfig, ResolvedPaths, ValidationConfig};
pub use districts::{load_internal_districts, InternalDistrictRecord};
pub use enrollment::{EnrollmentTable, OfficialEnrollmentRecord, OrganizationLevel};
pub use validation::{
    build_comparison, find_district, ComparisonRow, DistrictMatch, MetricError, OfficialMetrics,
};
pub use revenue::{
    aggregate_revenue, summarize, DistrictDirectory, DistrictRevenueAggregate, FundingSource,
    RevenueLineItem, RevenueSummary,
};
pub use enrichment::{DistrictWithRevenue, EnrichmentSummary, RevenueEnricher};
pub use pipeline::{run_enrichment, run_revenue, run_validation, RevenueOutcome, ValidationOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
