//! Lagged event-impact features
//!
//! Turns the event overlay into per-indicator monthly effect series: each
//! impact link contributes its signed effect from `lag_months` after the
//! event date onward, never earlier. The series feed the forecast step and
//! are exported as the Task-3 style artifacts.

use std::io::Write;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tracing::warn;

use crate::analysis::LinkedImpact;
use crate::error::Result;

/// First day of the month containing `date`
pub fn month_floor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("valid month floor")
}

/// The month an impact link starts contributing: event date + lag
pub fn activation_month(event_date: NaiveDate, lag_months: u32) -> NaiveDate {
    month_floor(event_date) + Months::new(lag_months)
}

/// Cumulative event effects per indicator on a monthly timeline
#[derive(Debug, Clone, Serialize)]
pub struct EventFeatures {
    /// First-of-month timeline, ascending
    pub months: Vec<NaiveDate>,
    pub indicators: Vec<String>,
    /// effects[i][m] = cumulative effect on indicators[i] at months[m]
    pub effects: Vec<Vec<f64>>,
}

impl EventFeatures {
    /// Cumulative effect on `indicator` as of `date` (0.0 before the
    /// timeline starts or for unknown indicators)
    pub fn cumulative_effect_at(&self, indicator: &str, date: NaiveDate) -> f64 {
        let Some(i) = self.indicators.iter().position(|code| code == indicator) else {
            return 0.0;
        };
        let floor = month_floor(date);
        match self.months.iter().rposition(|m| *m <= floor) {
            Some(m) => self.effects[i][m],
            None => 0.0,
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["month".to_string()];
        header.extend(
            self.indicators
                .iter()
                .map(|code| format!("event_effect_{}", code)),
        );
        wtr.write_record(&header)?;

        for (m, month) in self.months.iter().enumerate() {
            let mut row = vec![month.to_string()];
            for series in &self.effects {
                row.push(format!("{:.4}", series[m]));
            }
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Build cumulative effect series for every indicator the overlay touches,
/// on a monthly timeline spanning `from..=to`.
pub fn build_event_features(
    overlay: &[LinkedImpact],
    from: NaiveDate,
    to: NaiveDate,
) -> EventFeatures {
    let mut months = Vec::new();
    let mut month = month_floor(from);
    let end = month_floor(to);
    while month <= end {
        months.push(month);
        month = month + Months::new(1);
    }

    let mut indicators: Vec<String> = overlay
        .iter()
        .flat_map(|link| link.indicators.iter().cloned())
        .collect();
    indicators.sort();
    indicators.dedup();

    let mut effects = vec![vec![0.0; months.len()]; indicators.len()];
    for link in overlay {
        let Some(event_date) = link.event.date else {
            warn!(
                link = %link.link_id,
                event = %link.event.id,
                "Skipping impact link: event has no date"
            );
            continue;
        };
        let activation = activation_month(event_date, link.lag_months);

        for indicator in &link.indicators {
            let i = indicators
                .iter()
                .position(|code| code == indicator)
                .expect("indicator collected above");
            for (m, month) in months.iter().enumerate() {
                if *month >= activation {
                    effects[i][m] += link.effect;
                }
            }
        }
    }

    EventFeatures {
        months,
        indicators,
        effects,
    }
}

/// Event × indicator effect weights
#[derive(Debug, Clone, Serialize)]
pub struct EventIndicatorMatrix {
    /// (event id, event description) row index
    pub events: Vec<(String, String)>,
    pub indicators: Vec<String>,
    /// weights[e][i] = summed effect of events[e] on indicators[i]
    pub weights: Vec<Vec<f64>>,
}

impl EventIndicatorMatrix {
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["event_id".to_string(), "event".to_string()];
        header.extend(self.indicators.iter().cloned());
        wtr.write_record(&header)?;

        for (e, (id, description)) in self.events.iter().enumerate() {
            let mut row = vec![id.clone(), description.clone()];
            for weight in &self.weights[e] {
                row.push(format!("{:.4}", weight));
            }
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

pub fn event_indicator_matrix(overlay: &[LinkedImpact]) -> EventIndicatorMatrix {
    let mut events: Vec<(String, String)> = overlay
        .iter()
        .map(|link| {
            (
                link.event.id.clone(),
                link.event.description.clone().unwrap_or_default(),
            )
        })
        .collect();
    events.sort();
    events.dedup();

    let mut indicators: Vec<String> = overlay
        .iter()
        .flat_map(|link| link.indicators.iter().cloned())
        .collect();
    indicators.sort();
    indicators.dedup();

    let mut weights = vec![vec![0.0; indicators.len()]; events.len()];
    for link in overlay {
        let e = events
            .iter()
            .position(|(id, _)| *id == link.event.id)
            .expect("event collected above");
        for indicator in &link.indicators {
            let i = indicators
                .iter()
                .position(|code| code == indicator)
                .expect("indicator collected above");
            weights[e][i] += link.effect;
        }
    }

    EventIndicatorMatrix {
        events,
        indicators,
        weights,
    }
}
