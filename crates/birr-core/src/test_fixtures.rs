//! Shared dataset fixtures for unit tests

use crate::models::Record;
use crate::store::Dataset;

/// Build a record with the given fields; everything else empty.
/// Positional helpers keep fixture rows readable at the call site.
pub(crate) fn record(id: &str, record_type: &str) -> Record {
    Record {
        id: id.to_string(),
        record_type: record_type.to_string(),
        date: None,
        pillar: None,
        category: None,
        indicator: None,
        value: None,
        event_ref: None,
        indicator_ref: None,
        lag_months: None,
        effect: None,
        target_value: None,
        target_date: None,
        source: None,
        description: None,
    }
}

pub(crate) fn observation(id: &str, date: &str, pillar: &str, indicator: &str, value: &str) -> Record {
    let mut rec = record(id, "observation");
    rec.date = Some(date.to_string());
    rec.pillar = Some(pillar.to_string());
    rec.indicator = Some(indicator.to_string());
    rec.value = Some(value.to_string());
    rec.source = Some("Findex".to_string());
    rec
}

pub(crate) fn event(id: &str, date: &str, category: &str, description: &str) -> Record {
    let mut rec = record(id, "event");
    if !date.is_empty() {
        rec.date = Some(date.to_string());
    }
    rec.category = Some(category.to_string());
    rec.description = Some(description.to_string());
    rec
}

pub(crate) fn impact_link(
    id: &str,
    event_ref: &str,
    indicator_ref: &str,
    lag_months: &str,
    effect: &str,
) -> Record {
    let mut rec = record(id, "impact_link");
    rec.event_ref = Some(event_ref.to_string());
    rec.indicator_ref = Some(indicator_ref.to_string());
    rec.lag_months = Some(lag_months.to_string());
    rec.effect = Some(effect.to_string());
    rec
}

pub(crate) fn target(id: &str, indicator: &str, target_value: &str, target_date: &str) -> Record {
    let mut rec = record(id, "target");
    rec.indicator = Some(indicator.to_string());
    rec.target_value = Some(target_value.to_string());
    rec.target_date = Some(target_date.to_string());
    rec.source = Some("NFIS-II".to_string());
    rec
}

/// A small but fully-linked dataset: two indicators over three survey years,
/// one dated event, one lagged impact link, one policy target.
pub(crate) fn sample_dataset() -> Dataset {
    Dataset::new(vec![
        observation("OBS-001", "2014", "Access", "ACC_OWNERSHIP", "22"),
        observation("OBS-002", "2017", "Access", "ACC_OWNERSHIP", "35"),
        observation("OBS-003", "2021", "Access", "ACC_OWNERSHIP", "46"),
        observation("OBS-004", "2017", "Usage", "USG_DIGITAL_PAYMENT", "11.9"),
        observation("OBS-005", "2021", "Usage", "USG_DIGITAL_PAYMENT", "20.3"),
        event("EVT-001", "2021-05", "product_launch", "Telebirr mobile money launched"),
        impact_link("IMP-001", "EVT-001", "USG_DIGITAL_PAYMENT", "12", "2.5"),
        target("TGT-001", "ACC_OWNERSHIP", "60", "2027-12-31"),
    ])
}
