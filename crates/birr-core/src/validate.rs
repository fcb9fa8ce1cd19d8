//! Schema validation for the unified dataset
//!
//! Validation never drops rows silently: every failing row is reported with
//! its line number, id, and reason. Errors reject a row; warnings keep it.

use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;

use crate::models::{
    parse_flex_date, parse_number, Event, ImpactLink, Observation, Pillar, Record, RecordType,
    Target,
};
use crate::store::Dataset;

/// One problem found on one row
#[derive(Debug, Clone, Serialize)]
pub struct RowIssue {
    /// 1-based line in the CSV file (header is line 1)
    pub line: usize,
    pub id: String,
    pub message: String,
}

/// Outcome of validating a dataset
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<RowIssue>,
    pub warnings: Vec<RowIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Reference table for resolving impact_link foreign keys
#[derive(Debug, Clone, Default)]
pub struct RefTable {
    pub event_ids: HashSet<String>,
    pub indicators: HashSet<String>,
}

impl RefTable {
    /// Collect event ids and indicator codes from a dataset.
    ///
    /// Indicator codes come from observations and targets; the two pillar
    /// names are accepted as indicator references as well, resolving to the
    /// pillar's headline indicator downstream.
    pub fn from_dataset(ds: &Dataset) -> Self {
        let mut table = Self::default();
        table.extend(ds.records());
        table
    }

    pub fn extend(&mut self, records: &[Record]) {
        for rec in records {
            match rec.kind() {
                Ok(RecordType::Event) => {
                    self.event_ids.insert(rec.id.clone());
                }
                Ok(RecordType::Observation) | Ok(RecordType::Target) => {
                    if let Some(code) = rec.indicator.as_deref() {
                        let code = code.trim();
                        if !code.is_empty() {
                            self.indicators.insert(code.to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }

    pub fn resolves_indicator(&self, indicator_ref: &str) -> bool {
        self.indicators.contains(indicator_ref) || indicator_ref.parse::<Pillar>().is_ok()
    }
}

/// Schema errors for a single record. Empty means the row is acceptable.
pub fn record_errors(rec: &Record, refs: &RefTable) -> Vec<String> {
    let kind = match rec.kind() {
        Ok(kind) => kind,
        Err(e) => return vec![e.to_string()],
    };

    let mut errors = Vec::new();

    if rec.id.trim().is_empty() {
        errors.push("missing required field 'id'".to_string());
    }

    match kind {
        RecordType::Observation => {
            if let Err(e) = Observation::from_record(rec) {
                errors.push(e.to_string());
            }
        }
        RecordType::Event => {
            if let Err(e) = Event::from_record(rec) {
                errors.push(e.to_string());
            }
            // Events are pillar-neutral by construction; a pillar here would
            // bias which indicator the event is presumed to affect.
            if rec.pillar.as_deref().map(str::trim).is_some_and(|p| !p.is_empty()) {
                errors.push(format!(
                    "{}: event records must not carry a pillar (use an impact_link)",
                    rec.id
                ));
            }
        }
        RecordType::ImpactLink => match ImpactLink::from_record(rec) {
            Ok(link) => {
                if !refs.event_ids.contains(&link.event_ref) {
                    errors.push(format!(
                        "{}: event_ref '{}' does not resolve to an event record",
                        rec.id, link.event_ref
                    ));
                }
                if !refs.resolves_indicator(&link.indicator_ref) {
                    errors.push(format!(
                        "{}: indicator_ref '{}' does not resolve to a known indicator or pillar",
                        rec.id, link.indicator_ref
                    ));
                }
            }
            Err(e) => errors.push(e.to_string()),
        },
        RecordType::Target => {
            if let Err(e) = Target::from_record(rec) {
                errors.push(e.to_string());
            }
        }
    }

    errors
}

/// Data-quality warnings for a single record
pub fn record_warnings(rec: &Record) -> Vec<String> {
    let mut warnings = Vec::new();

    // Percentage-domain indicators should stay within 0-100
    if matches!(rec.kind(), Ok(RecordType::Observation)) {
        if let Some(value) = rec.value.as_deref().and_then(parse_number) {
            if !(0.0..=100.0).contains(&value) {
                warnings.push(format!(
                    "{}: value {} outside the 0-100 percentage range",
                    rec.id, value
                ));
            }
        }
        if let Some(date) = rec.date.as_deref().and_then(parse_flex_date) {
            if date > Utc::now().date_naive() {
                warnings.push(format!("{}: observation dated in the future ({})", rec.id, date));
            }
        }
    }

    if matches!(rec.kind(), Ok(RecordType::ImpactLink)) {
        if let Some(effect) = rec.effect.as_deref().and_then(parse_number) {
            if effect == 0.0 {
                warnings.push(format!("{}: impact_link with zero effect", rec.id));
            }
        }
    }

    warnings
}

/// Validate a whole dataset: per-row schema checks, reference resolution,
/// and cross-row duplicate-id detection.
pub fn validate(ds: &Dataset) -> ValidationReport {
    let refs = RefTable::from_dataset(ds);
    let mut report = ValidationReport::default();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for (idx, rec) in ds.records().iter().enumerate() {
        let line = idx + 2; // header occupies line 1

        for message in record_errors(rec, &refs) {
            report.errors.push(RowIssue {
                line,
                id: rec.id.clone(),
                message,
            });
        }
        for message in record_warnings(rec) {
            report.warnings.push(RowIssue {
                line,
                id: rec.id.clone(),
                message,
            });
        }

        if !seen_ids.insert(rec.id.as_str()) {
            report.warnings.push(RowIssue {
                line,
                id: rec.id.clone(),
                message: format!("duplicate id '{}'", rec.id),
            });
        }
    }

    report
}
