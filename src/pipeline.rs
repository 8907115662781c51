// 🚚 Pipelines - read → transform → write, one pass each
//
// Every pipeline takes explicit paths and computes and serializes all of its
// results in memory before writing anything. A pipeline with two outputs
// removes the first when the second cannot be written, so a fatal error
// leaves no partial output.
// Recoverable conditions (unmatched district, unparseable metric) are logged
// and counted in the outcome.

use crate::config::{EnrichmentConfig, ResolvedPaths, ValidationConfig};
use crate::districts::{for_school_year, load_internal_districts};
use crate::enrichment::{EnrichmentSummary, RevenueEnricher};
use crate::enrollment::EnrollmentTable;
use crate::revenue::{
    load_revenue_items, load_revenue_summaries, summarize, DistrictDirectory, FundingSource,
    RevenueAggregator, RevenueSummary,
};
use crate::validation::{
    build_comparison, find_district, first_word_filter, write_validation_workbook, ComparisonRow,
    MatchPath, MetricError, OfficialMetrics, SourceFile, ValidationReport, WorkbookSummary,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Districts logged after aggregation
const TOP_DISTRICTS: usize = 20;

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize JSON output")
}

/// Write `contents`, creating parent directories; an existing file is overwritten
fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// Pretty JSON, parent directories created, file overwritten
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_output(path, &to_pretty_json(value)?)
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug)]
pub struct ValidationOutcome {
    pub official: Vec<OfficialMetrics>,
    pub unmatched: Vec<String>,
    pub metric_errors: Vec<MetricError>,
    pub comparison: Vec<ComparisonRow>,
    pub workbook: WorkbookSummary,
}

pub fn run_validation(paths: &ResolvedPaths, settings: &ValidationConfig) -> Result<ValidationOutcome> {
    let internal = load_internal_districts(&paths.internal_districts)?;
    let current = for_school_year(&internal, &settings.school_year);
    info!(
        total = internal.len(),
        school_year = %settings.school_year,
        current = current.len(),
        "loaded internal district dataset"
    );

    let table = EnrollmentTable::load(&paths.enrollment_csv)?;
    let district_rows = table.district_level();
    info!(
        rows = table.records.len(),
        district_level = district_rows.len(),
        "loaded official enrollment export"
    );

    let mut official = Vec::new();
    let mut unmatched = Vec::new();
    let mut metric_errors = Vec::new();

    for target in &settings.target_districts {
        let found = find_district(target, &district_rows);

        let Some(record) = found.first() else {
            warn!(district = %target, "no official data found");
            unmatched.push(target.clone());
            continue;
        };

        if let MatchPath::Partial { matched_name, .. } = &found.path {
            info!(district = %target, official = %matched_name, "matched by partial name");
        }
        if found.records.len() > 1 {
            warn!(district = %target, rows = found.records.len(), "multiple official rows, using the first");
        }

        match OfficialMetrics::from_record(target, record) {
            Ok(metrics) => {
                info!(district = %target, students = metrics.enrollment, "found official enrollment");
                official.push(metrics);
            }
            Err(err) => {
                warn!(error = %err, "skipping district");
                metric_errors.push(err);
            }
        }
    }

    let comparison = build_comparison(&current, &official);
    let raw_rows = first_word_filter(&district_rows, &settings.target_districts);

    let sources = vec![
        SourceFile::fingerprint("Internal districts", &paths.internal_districts)?,
        SourceFile::fingerprint("OSPI enrollment", &paths.enrollment_csv)?,
    ];

    let report = ValidationReport {
        comparison: &comparison,
        internal: &internal,
        raw_headers: &table.headers,
        raw_rows: &raw_rows,
        sources: &sources,
        created: chrono::Local::now().date_naive(),
    };
    let workbook = write_validation_workbook(&paths.validation_workbook, &report)?;
    info!(
        path = %paths.validation_workbook.display(),
        sheets = ?workbook.sheets,
        "validation workbook written"
    );

    for row in comparison.iter().filter(|r| r.has_both_sides()) {
        info!(
            district = %row.district_name,
            enrollment_diff_pct = ?row.enrollment_diff_pct,
            low_income_diff_pts = ?row.low_income_diff,
            "comparison"
        );
    }

    Ok(ValidationOutcome {
        official,
        unmatched,
        metric_errors,
        comparison,
        workbook,
    })
}

// ============================================================================
// REVENUE
// ============================================================================

#[derive(Debug)]
pub struct RevenueOutcome {
    pub line_items: usize,
    pub summaries: Vec<RevenueSummary>,

    /// None when no enrollment export was available for names
    pub named: Option<Vec<RevenueSummary>>,
}

pub fn run_revenue(paths: &ResolvedPaths) -> Result<RevenueOutcome> {
    let items = load_revenue_items(&paths.revenue_csv)?;
    info!(line_items = items.len(), "loaded revenue line items");

    let mut aggregator = RevenueAggregator::new();
    aggregator.extend(&items);
    let line_items = aggregator.line_items();
    info!(districts = aggregator.district_count(), "aggregated revenue by district");

    let aggregates = aggregator.into_sorted();
    for source in FundingSource::ALL {
        let total: f64 = aggregates.iter().map(|a| a.bucket(source)).sum();
        info!(
            source = source.as_str(),
            total_millions = %format!("{:.1}", total / 1_000_000.0),
            "statewide revenue by source"
        );
    }

    let summaries = summarize(&aggregates);

    for s in summaries.iter().take(TOP_DISTRICTS) {
        info!(
            code = %s.county_district_code,
            county = %s.county_name,
            total_millions = %format!("{:.1}", s.total_revenue / 1_000_000.0),
            state_pct = s.state_pct,
            local_pct = s.local_pct,
            federal_pct = s.federal_pct,
            "top district"
        );
    }

    let named = if paths.enrollment_csv.exists() {
        let table = EnrollmentTable::load(&paths.enrollment_csv)?;
        let directory = DistrictDirectory::from_enrollment(&table);
        if directory.is_empty() {
            warn!(path = %paths.enrollment_csv.display(), "no School-level rows, no districts will be named");
        } else {
            info!(districts = directory.len(), "district names from enrollment export");
        }

        let mut with_names = summaries.clone();
        let matched = directory.attach_names(&mut with_names);
        info!(
            matched = matched.len(),
            unmatched = summaries.len() - matched.len(),
            "named revenue districts"
        );
        Some(matched)
    } else {
        warn!(
            path = %paths.enrollment_csv.display(),
            "enrollment export not found, skipping district names"
        );
        None
    };

    let summary_json = to_pretty_json(&summaries)?;
    let named_json = named.as_ref().map(|matched| to_pretty_json(matched)).transpose()?;

    write_output(&paths.revenue_json, &summary_json)?;
    info!(path = %paths.revenue_json.display(), districts = summaries.len(), "revenue summary written");

    if let (Some(matched), Some(json)) = (&named, &named_json) {
        if let Err(err) = write_output(&paths.matched_revenue_json, json) {
            // Leave neither file behind
            let _ = fs::remove_file(&paths.revenue_json);
            return Err(err);
        }
        info!(
            path = %paths.matched_revenue_json.display(),
            districts = matched.len(),
            "named revenue summary written"
        );
    }

    Ok(RevenueOutcome {
        line_items,
        summaries,
        named,
    })
}

// ============================================================================
// ENRICHMENT
// ============================================================================

pub fn run_enrichment(paths: &ResolvedPaths, settings: &EnrichmentConfig) -> Result<EnrichmentSummary> {
    let districts = load_internal_districts(&paths.internal_districts)?;
    let revenues = load_revenue_summaries(&paths.revenue_json)?;

    let enricher = RevenueEnricher::new(&settings.district_codes, &revenues, settings.revenue_divisor);
    let (enriched, summary) = enricher.enrich_all(&districts);

    write_json(&paths.districts_with_revenue_json, &enriched)?;
    info!(
        path = %paths.districts_with_revenue_json.display(),
        enriched = summary.enriched,
        unmapped = summary.unmapped,
        missing_revenue = summary.missing_revenue,
        "districts with revenue written"
    );

    Ok(summary)
}
