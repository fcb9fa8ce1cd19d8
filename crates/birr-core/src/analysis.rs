//! Exploratory analysis over the processed dataset
//!
//! Everything here is a derived view; the underlying records are never
//! mutated.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Event, Pillar};
use crate::store::Dataset;

/// Record counts and date span, for `birr status` and the dashboard overview
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub observations: usize,
    pub events: usize,
    pub impact_links: usize,
    pub targets: usize,
    pub indicators: Vec<String>,
    pub first_observation: Option<NaiveDate>,
    pub last_observation: Option<NaiveDate>,
}

pub fn summarize(ds: &Dataset) -> DatasetSummary {
    let observations = ds.observations();
    let mut dates: Vec<NaiveDate> = observations.iter().map(|o| o.date).collect();
    dates.sort();

    DatasetSummary {
        observations: observations.len(),
        events: ds.events().len(),
        impact_links: ds.impact_links().len(),
        targets: ds.targets().len(),
        indicators: ds.indicator_codes(),
        first_observation: dates.first().copied(),
        last_observation: dates.last().copied(),
    }
}

/// A missing indicator × year cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageGap {
    pub indicator: String,
    pub year: i32,
}

/// Observation counts per indicator per year, over the dataset's full span
#[derive(Debug, Clone, Serialize)]
pub struct CoverageMatrix {
    pub indicators: Vec<String>,
    pub years: Vec<i32>,
    /// counts[i][j] = observations of indicators[i] in years[j]
    pub counts: Vec<Vec<u32>>,
}

impl CoverageMatrix {
    /// Cells with zero observations
    pub fn gaps(&self) -> Vec<CoverageGap> {
        let mut gaps = Vec::new();
        for (i, indicator) in self.indicators.iter().enumerate() {
            for (j, year) in self.years.iter().enumerate() {
                if self.counts[i][j] == 0 {
                    gaps.push(CoverageGap {
                        indicator: indicator.clone(),
                        year: *year,
                    });
                }
            }
        }
        gaps
    }
}

/// Pivot observations into an indicator × year count matrix.
///
/// Columns are the years in which anything at all was observed; a gap is an
/// indicator missing from a survey period other indicators covered.
pub fn coverage(ds: &Dataset) -> CoverageMatrix {
    let observations = ds.observations();

    let mut counts: BTreeMap<(String, i32), u32> = BTreeMap::new();
    for obs in &observations {
        *counts
            .entry((obs.indicator.clone(), obs.date.year()))
            .or_default() += 1;
    }

    let mut indicators: Vec<String> = observations.iter().map(|o| o.indicator.clone()).collect();
    indicators.sort();
    indicators.dedup();

    let mut years: Vec<i32> = observations.iter().map(|o| o.date.year()).collect();
    years.sort_unstable();
    years.dedup();
    let grid = indicators
        .iter()
        .map(|indicator| {
            years
                .iter()
                .map(|year| *counts.get(&(indicator.clone(), *year)).unwrap_or(&0))
                .collect()
        })
        .collect();

    CoverageMatrix {
        indicators,
        years,
        counts: grid,
    }
}

/// One point of an indicator trend series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Time series for one indicator, sorted by date
pub fn indicator_series(ds: &Dataset, indicator: &str) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = ds
        .observations()
        .into_iter()
        .filter(|o| o.indicator == indicator)
        .map(|o| TrendPoint {
            date: o.date,
            value: o.value,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Most recent value for an indicator
pub fn latest_value(ds: &Dataset, indicator: &str) -> Option<TrendPoint> {
    indicator_series(ds, indicator).into_iter().last()
}

/// An impact_link joined to its event and resolved to concrete indicators
#[derive(Debug, Clone, Serialize)]
pub struct LinkedImpact {
    pub link_id: String,
    pub event: Event,
    /// As written in the dataset: an indicator code or a pillar name
    pub indicator_ref: String,
    /// Concrete indicator codes the effect applies to
    pub indicators: Vec<String>,
    pub lag_months: u32,
    pub effect: f64,
}

/// Join impact_link -> event and impact_link -> indicator.
///
/// Analysis runs on validated data, so a dangling reference here means the
/// processed file was edited by hand; fail loudly rather than skip.
pub fn event_overlay(ds: &Dataset) -> Result<Vec<LinkedImpact>> {
    let events: BTreeMap<String, Event> =
        ds.events().into_iter().map(|e| (e.id.clone(), e)).collect();
    let known = ds.indicator_codes();

    let mut overlay = Vec::new();
    for link in ds.impact_links() {
        let event = events.get(&link.event_ref).cloned().ok_or_else(|| {
            Error::NotFound(format!(
                "{}: event_ref '{}' not present in dataset",
                link.id, link.event_ref
            ))
        })?;

        let indicators = if let Ok(pillar) = link.indicator_ref.parse::<Pillar>() {
            vec![pillar.headline_indicator().to_string()]
        } else if known.contains(&link.indicator_ref) {
            vec![link.indicator_ref.clone()]
        } else {
            return Err(Error::NotFound(format!(
                "{}: indicator_ref '{}' not present in dataset",
                link.id, link.indicator_ref
            )));
        };

        overlay.push(LinkedImpact {
            link_id: link.id,
            event,
            indicator_ref: link.indicator_ref,
            indicators,
            lag_months: link.lag_months,
            effect: link.effect,
        });
    }

    Ok(overlay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{observation, sample_dataset};
    use crate::store::Dataset;

    #[test]
    fn test_summary() {
        let summary = summarize(&sample_dataset());
        assert_eq!(summary.observations, 5);
        assert_eq!(summary.events, 1);
        assert_eq!(summary.impact_links, 1);
        assert_eq!(summary.targets, 1);
        assert_eq!(
            summary.first_observation,
            NaiveDate::from_ymd_opt(2014, 1, 1)
        );
        assert_eq!(
            summary.last_observation,
            NaiveDate::from_ymd_opt(2021, 1, 1)
        );
    }

    #[test]
    fn test_coverage_flags_known_gaps() {
        // 3 periods x 2 indicators, 2 cells missing: A@2017 and B@2014
        let ds = Dataset::new(vec![
            observation("O1", "2014", "Access", "A", "10"),
            observation("O2", "2021", "Access", "A", "20"),
            observation("O3", "2017", "Usage", "B", "5"),
            observation("O4", "2021", "Usage", "B", "8"),
            observation("O5", "2014", "Usage", "B", "3"),
        ]);

        let matrix = coverage(&ds);
        assert_eq!(matrix.years, vec![2014, 2017, 2021]);

        let gaps = matrix.gaps();
        assert_eq!(
            gaps,
            vec![
                CoverageGap {
                    indicator: "A".into(),
                    year: 2017
                },
                CoverageGap {
                    indicator: "B".into(),
                    year: 2014
                },
            ]
        );
    }

    #[test]
    fn test_indicator_series_sorted() {
        let series = indicator_series(&sample_dataset(), "ACC_OWNERSHIP");
        assert_eq!(series.len(), 3);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series[2].value, 46.0);

        let latest = latest_value(&sample_dataset(), "ACC_OWNERSHIP").unwrap();
        assert_eq!(latest.value, 46.0);
    }

    #[test]
    fn test_event_overlay_joins() {
        let overlay = event_overlay(&sample_dataset()).unwrap();
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay[0].event.id, "EVT-001");
        assert_eq!(overlay[0].indicators, vec!["USG_DIGITAL_PAYMENT"]);
        assert_eq!(overlay[0].lag_months, 12);
    }

    #[test]
    fn test_event_overlay_fails_on_dangling_ref() {
        let mut records = sample_dataset().records().to_vec();
        records.retain(|r| r.id != "EVT-001");
        let err = event_overlay(&Dataset::new(records)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
