//! Enrichment: validate additions, append them, write the processed copy
//!
//! Raw rows pass through untouched; additions are appended, never merged
//! into existing rows. Malformed additions are rejected with a reason, and
//! duplicates (by id or content hash) are skipped, which makes re-running
//! enrichment over already-processed data a no-op.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{Record, RecordType};
use crate::store::{record_hash, Dataset};
use crate::validate::{record_errors, record_warnings, RefTable, RowIssue};

/// An addition refused by validation, with every reason it failed
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    /// 1-based line in the additions CSV (header is line 1)
    pub line: usize,
    pub id: String,
    pub reasons: Vec<String>,
}

/// Accounting for one enrichment run
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichmentReport {
    pub raw_rows: usize,
    pub appended: usize,
    pub skipped_duplicates: usize,
    pub rejected: Vec<RejectedRow>,
    pub warnings: Vec<RowIssue>,
    /// Ids of the rows that were appended, in file order
    pub appended_ids: Vec<String>,
}

/// Validate `additions` against `raw` and append the acceptable rows.
///
/// Returns the processed dataset and the run report. Reference resolution is
/// two-pass: events, observations, and targets are accepted first so that an
/// impact_link addition may reference an event introduced in the same batch.
pub fn enrich(raw: &Dataset, additions: &Dataset) -> (Dataset, EnrichmentReport) {
    let mut report = EnrichmentReport {
        raw_rows: raw.len(),
        ..Default::default()
    };

    let mut existing_ids: HashSet<String> =
        raw.records().iter().map(|r| r.id.clone()).collect();
    let mut existing_hashes: HashSet<String> =
        raw.records().iter().map(record_hash).collect();

    let mut refs = RefTable::from_dataset(raw);
    let mut accepted: Vec<Record> = Vec::new();

    // Pass 1: everything except impact links
    for (idx, rec) in additions.records().iter().enumerate() {
        if matches!(rec.kind(), Ok(RecordType::ImpactLink)) {
            continue;
        }
        try_accept(
            rec,
            idx + 2,
            &refs,
            &mut existing_ids,
            &mut existing_hashes,
            &mut accepted,
            &mut report,
        );
    }

    // Links resolve against raw plus whatever pass 1 accepted
    refs.extend(&accepted);

    // Pass 2: impact links
    for (idx, rec) in additions.records().iter().enumerate() {
        if !matches!(rec.kind(), Ok(RecordType::ImpactLink)) {
            continue;
        }
        try_accept(
            rec,
            idx + 2,
            &refs,
            &mut existing_ids,
            &mut existing_hashes,
            &mut accepted,
            &mut report,
        );
    }

    // Restore additions-file order before appending
    accepted.sort_by_key(|rec| {
        additions
            .records()
            .iter()
            .position(|r| r.id == rec.id)
            .unwrap_or(usize::MAX)
    });

    report.appended = accepted.len();
    report.appended_ids = accepted.iter().map(|r| r.id.clone()).collect();

    info!(
        appended = report.appended,
        skipped = report.skipped_duplicates,
        rejected = report.rejected.len(),
        "Enrichment complete"
    );

    let mut records = raw.records().to_vec();
    records.extend(accepted);
    (Dataset::new(records), report)
}

fn try_accept(
    rec: &Record,
    line: usize,
    refs: &RefTable,
    existing_ids: &mut HashSet<String>,
    existing_hashes: &mut HashSet<String>,
    accepted: &mut Vec<Record>,
    report: &mut EnrichmentReport,
) {
    let reasons = record_errors(rec, refs);
    if !reasons.is_empty() {
        debug!(id = %rec.id, ?reasons, "Rejecting addition");
        report.rejected.push(RejectedRow {
            line,
            id: rec.id.clone(),
            reasons,
        });
        return;
    }

    let hash = record_hash(rec);
    if existing_ids.contains(&rec.id) || existing_hashes.contains(&hash) {
        report.skipped_duplicates += 1;
        return;
    }

    for message in record_warnings(rec) {
        report.warnings.push(RowIssue {
            line,
            id: rec.id.clone(),
            message,
        });
    }

    existing_ids.insert(rec.id.clone());
    existing_hashes.insert(hash);
    accepted.push(rec.clone());
}

/// Render the human-readable change log for an enrichment run
pub fn render_change_log(report: &EnrichmentReport, raw_name: &str, out_name: &str) -> String {
    let mut log = String::new();

    log.push_str(&format!("Enrichment change log: {} -> {}\n", raw_name, out_name));
    log.push_str(&format!("Raw rows carried through unchanged: {}\n", report.raw_rows));
    log.push_str(&format!("Rows appended: {}\n", report.appended));
    for id in &report.appended_ids {
        log.push_str(&format!("  + {}\n", id));
    }
    log.push_str(&format!(
        "Rows skipped as duplicates: {}\n",
        report.skipped_duplicates
    ));

    if report.rejected.is_empty() {
        log.push_str("Rows rejected: 0\n");
    } else {
        log.push_str(&format!("Rows rejected: {}\n", report.rejected.len()));
        for rejected in &report.rejected {
            log.push_str(&format!("  ! line {} ({})\n", rejected.line, rejected.id));
            for reason in &rejected.reasons {
                log.push_str(&format!("      - {}\n", reason));
            }
        }
    }

    if !report.warnings.is_empty() {
        log.push_str(&format!("Warnings: {}\n", report.warnings.len()));
        for warning in &report.warnings {
            log.push_str(&format!(
                "  ~ line {} ({}): {}\n",
                warning.line, warning.id, warning.message
            ));
        }
    }

    log
}
