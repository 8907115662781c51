// Revenue - per-district funding mix from the official revenue export

pub mod county;
pub mod aggregate;
pub mod directory;

pub use county::{county_code, county_name, UNKNOWN_COUNTY};
pub use aggregate::{
    aggregate_revenue, load_revenue_items, load_revenue_summaries, parse_revenue_csv, summarize,
    DistrictRevenueAggregate, FundingSource, RevenueAggregator, RevenueLineItem, RevenueSummary,
};
pub use directory::{district_suffix, DistrictDirectory};
