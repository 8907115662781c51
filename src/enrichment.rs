// 🔗 Revenue Enrichment - Attach funding mix to internal district records
//
// Internal names map to County District Codes through a fixed table in the
// config. Dollar amounts are divided by the configured divisor and rounded to
// whole dollars; percentage shares are copied unchanged. Districts without a
// mapping or without revenue pass through untouched.

use crate::districts::InternalDistrictRecord;
use crate::revenue::aggregate::RevenueSummary;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueFields {
    pub rev: f64,
    pub rev_state: f64,
    pub rev_local: f64,
    pub rev_federal: f64,
    pub rev_other: f64,
    pub rev_state_pct: f64,
    pub rev_local_pct: f64,
    pub rev_federal_pct: f64,
}

impl RevenueFields {
    pub fn from_summary(summary: &RevenueSummary, divisor: f64) -> Self {
        let scale = |v: f64| (v / divisor).round();

        RevenueFields {
            rev: scale(summary.total_revenue),
            rev_state: scale(summary.state_revenue),
            rev_local: scale(summary.local_revenue),
            rev_federal: scale(summary.federal_revenue),
            rev_other: scale(summary.other_revenue),
            rev_state_pct: summary.state_pct,
            rev_local_pct: summary.local_pct,
            rev_federal_pct: summary.federal_pct,
        }
    }
}

/// Internal record plus optional revenue, serialized as one flat object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictWithRevenue {
    #[serde(flatten)]
    pub district: InternalDistrictRecord,

    #[serde(flatten)]
    pub revenue: Option<RevenueFields>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentStatus {
    Enriched { code: String },
    NoMapping,
    MissingRevenue { code: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentSummary {
    pub enriched: usize,
    pub unmapped: usize,
    pub missing_revenue: usize,
}

impl EnrichmentSummary {
    fn record(&mut self, status: &EnrichmentStatus) {
        match status {
            EnrichmentStatus::Enriched { .. } => self.enriched += 1,
            EnrichmentStatus::NoMapping => self.unmapped += 1,
            EnrichmentStatus::MissingRevenue { .. } => self.missing_revenue += 1,
        }
    }
}

pub struct RevenueEnricher<'a> {
    codes: &'a BTreeMap<String, String>,
    by_code: HashMap<&'a str, &'a RevenueSummary>,
    divisor: f64,
}

impl<'a> RevenueEnricher<'a> {
    pub fn new(
        codes: &'a BTreeMap<String, String>,
        revenues: &'a [RevenueSummary],
        divisor: f64,
    ) -> Self {
        // Later entries win, as with a plain map insert
        let by_code = revenues
            .iter()
            .map(|r| (r.county_district_code.as_str(), r))
            .collect();

        RevenueEnricher {
            codes,
            by_code,
            divisor,
        }
    }

    pub fn enrich_one(&self, district: &InternalDistrictRecord) -> (DistrictWithRevenue, EnrichmentStatus) {
        let Some(code) = self.codes.get(&district.name) else {
            return (
                DistrictWithRevenue {
                    district: district.clone(),
                    revenue: None,
                },
                EnrichmentStatus::NoMapping,
            );
        };

        match self.by_code.get(code.as_str()) {
            Some(summary) => (
                DistrictWithRevenue {
                    district: district.clone(),
                    revenue: Some(RevenueFields::from_summary(summary, self.divisor)),
                },
                EnrichmentStatus::Enriched { code: code.clone() },
            ),
            None => (
                DistrictWithRevenue {
                    district: district.clone(),
                    revenue: None,
                },
                EnrichmentStatus::MissingRevenue { code: code.clone() },
            ),
        }
    }

    pub fn enrich_all(
        &self,
        districts: &[InternalDistrictRecord],
    ) -> (Vec<DistrictWithRevenue>, EnrichmentSummary) {
        let mut summary = EnrichmentSummary::default();
        let mut output = Vec::with_capacity(districts.len());

        for district in districts {
            let (enriched, status) = self.enrich_one(district);
            match &status {
                EnrichmentStatus::Enriched { code } => {
                    tracing::debug!(district = %district.name, %code, "revenue attached");
                }
                EnrichmentStatus::NoMapping => {
                    tracing::debug!(district = %district.name, "no district code mapping");
                }
                EnrichmentStatus::MissingRevenue { code } => {
                    tracing::warn!(district = %district.name, %code, "district code not found in revenue data");
                }
            }
            summary.record(&status);
            output.push(enriched);
        }

        (output, summary)
    }
}
