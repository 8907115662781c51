// 💰 Revenue Categorizer & Aggregator - Line items → per-district funding mix
//
// Every line item falls in exactly one bucket by revenue code:
//   1000-2999 Local | 3000-4999 State | 5000-6999 Federal | anything else Other
// Amounts are added as-is (negative adjustments included). Totals stay
// unrounded until a summary is produced, so bucket sums equal the total.

use crate::revenue::county::{county_code, county_name};
use crate::validation::metrics::round_to;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const COL_COUNTY_DISTRICT_CODE: &str = "County District Code";
pub const COL_REVENUE_CODE: &str = "Revenue Code";
pub const COL_AMOUNT: &str = "Amount";

// ============================================================================
// FUNDING SOURCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundingSource {
    Local,
    State,
    Federal,
    Other,
}

impl FundingSource {
    pub const ALL: [FundingSource; 4] = [
        FundingSource::Local,
        FundingSource::State,
        FundingSource::Federal,
        FundingSource::Other,
    ];

    /// Bucket for a revenue code. Total over all integers.
    pub fn from_code(code: i64) -> Self {
        match code {
            1000..=2999 => FundingSource::Local,
            3000..=4999 => FundingSource::State,
            5000..=6999 => FundingSource::Federal,
            _ => FundingSource::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FundingSource::Local => "Local",
            FundingSource::State => "State",
            FundingSource::Federal => "Federal",
            FundingSource::Other => "Other",
        }
    }
}

// ============================================================================
// LINE ITEMS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RevenueLineItem {
    pub county_district_code: String,
    pub revenue_code: i64,
    pub amount: f64,
}

impl RevenueLineItem {
    pub fn new(county_district_code: &str, revenue_code: i64, amount: f64) -> Self {
        RevenueLineItem {
            county_district_code: county_district_code.to_string(),
            revenue_code,
            amount,
        }
    }

    pub fn source(&self) -> FundingSource {
        FundingSource::from_code(self.revenue_code)
    }
}

/// Parse revenue line items from CSV text (a leading BOM is ignored)
pub fn parse_revenue_csv(content: &str, source: &str) -> Result<Vec<RevenueLineItem>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header row of {}", source))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("Missing column '{}' in {}", name, source))
    };
    let code_col = column(COL_COUNTY_DISTRICT_CODE)?;
    let revenue_col = column(COL_REVENUE_CODE)?;
    let amount_col = column(COL_AMOUNT)?;

    let mut items = Vec::new();
    for (line_num, result) in reader.records().enumerate() {
        let line = line_num + 2;
        let record = result
            .with_context(|| format!("Failed to parse CSV line {} in {}", line, source))?;

        let district = record.get(code_col).unwrap_or("").trim();
        let revenue_text = record.get(revenue_col).unwrap_or("").trim();
        let amount_text = record.get(amount_col).unwrap_or("").trim();

        let revenue_code: i64 = revenue_text.parse().with_context(|| {
            format!("Invalid revenue code {:?} on line {} in {}", revenue_text, line, source)
        })?;
        let amount: f64 = amount_text.parse().with_context(|| {
            format!("Invalid amount {:?} on line {} in {}", amount_text, line, source)
        })?;

        items.push(RevenueLineItem::new(district, revenue_code, amount));
    }

    Ok(items)
}

/// Whole-file load of the revenue export
pub fn load_revenue_items(path: &Path) -> Result<Vec<RevenueLineItem>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read revenue file: {}", path.display()))?;

    parse_revenue_csv(&content, &path.display().to_string())
}

// ============================================================================
// AGGREGATE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictRevenueAggregate {
    pub county_district_code: String,
    pub local: f64,
    pub state: f64,
    pub federal: f64,
    pub other: f64,
    pub total: f64,
}

impl DistrictRevenueAggregate {
    pub fn new(county_district_code: &str) -> Self {
        DistrictRevenueAggregate {
            county_district_code: county_district_code.to_string(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, source: FundingSource, amount: f64) {
        match source {
            FundingSource::Local => self.local += amount,
            FundingSource::State => self.state += amount,
            FundingSource::Federal => self.federal += amount,
            FundingSource::Other => self.other += amount,
        }
        self.total += amount;
    }

    pub fn bucket(&self, source: FundingSource) -> f64 {
        match source {
            FundingSource::Local => self.local,
            FundingSource::State => self.state,
            FundingSource::Federal => self.federal,
            FundingSource::Other => self.other,
        }
    }

    /// Share of total in percent, 1 decimal; 0 when total <= 0
    pub fn pct(&self, source: FundingSource) -> f64 {
        if self.total > 0.0 {
            round_to(self.bucket(source) / self.total * 100.0, 1)
        } else {
            0.0
        }
    }

    pub fn county_code(&self) -> &str {
        county_code(&self.county_district_code)
    }

    pub fn county_name(&self) -> &'static str {
        county_name(self.county_code())
    }
}

/// Per-district accumulator keyed by County District Code, first-seen order kept
#[derive(Debug, Default)]
pub struct RevenueAggregator {
    districts: Vec<DistrictRevenueAggregate>,
    index: HashMap<String, usize>,
    line_items: usize,
}

impl RevenueAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate for `code`, created with zero totals on first encounter
    fn get_or_insert(&mut self, code: &str) -> &mut DistrictRevenueAggregate {
        let idx = match self.index.get(code) {
            Some(&idx) => idx,
            None => {
                let idx = self.districts.len();
                self.districts.push(DistrictRevenueAggregate::new(code));
                self.index.insert(code.to_string(), idx);
                idx
            }
        };
        &mut self.districts[idx]
    }

    pub fn add(&mut self, item: &RevenueLineItem) {
        let source = item.source();
        self.get_or_insert(&item.county_district_code)
            .add(source, item.amount);
        self.line_items += 1;
    }

    pub fn extend<'a, I: IntoIterator<Item = &'a RevenueLineItem>>(&mut self, items: I) {
        for item in items {
            self.add(item);
        }
    }

    pub fn line_items(&self) -> usize {
        self.line_items
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    /// Districts by total revenue, highest first; ties keep first-seen order
    pub fn into_sorted(self) -> Vec<DistrictRevenueAggregate> {
        let mut districts = self.districts;
        districts.sort_by(|a, b| b.total.total_cmp(&a.total));
        districts
    }
}

/// Aggregate a batch of line items and sort
pub fn aggregate_revenue(items: &[RevenueLineItem]) -> Vec<DistrictRevenueAggregate> {
    let mut aggregator = RevenueAggregator::new();
    aggregator.extend(items);
    aggregator.into_sorted()
}

// ============================================================================
// SUMMARY (JSON output)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub county_district_code: String,
    pub county_code: String,
    pub county_name: String,
    pub total_revenue: f64,
    pub state_revenue: f64,
    pub local_revenue: f64,
    pub federal_revenue: f64,
    pub other_revenue: f64,
    pub state_pct: f64,
    pub local_pct: f64,
    pub federal_pct: f64,
    #[serde(default)]
    pub other_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_name: Option<String>,
}

impl From<&DistrictRevenueAggregate> for RevenueSummary {
    fn from(agg: &DistrictRevenueAggregate) -> Self {
        RevenueSummary {
            county_district_code: agg.county_district_code.clone(),
            county_code: agg.county_code().to_string(),
            county_name: agg.county_name().to_string(),
            total_revenue: round_to(agg.total, 2),
            state_revenue: round_to(agg.state, 2),
            local_revenue: round_to(agg.local, 2),
            federal_revenue: round_to(agg.federal, 2),
            other_revenue: round_to(agg.other, 2),
            state_pct: agg.pct(FundingSource::State),
            local_pct: agg.pct(FundingSource::Local),
            federal_pct: agg.pct(FundingSource::Federal),
            other_pct: agg.pct(FundingSource::Other),
            district_name: None,
        }
    }
}

pub fn summarize(aggregates: &[DistrictRevenueAggregate]) -> Vec<RevenueSummary> {
    aggregates.iter().map(RevenueSummary::from).collect()
}

/// Load a previously written revenue summary
pub fn load_revenue_summaries(path: &Path) -> Result<Vec<RevenueSummary>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read revenue summary: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse revenue summary: {}", path.display()))
}
