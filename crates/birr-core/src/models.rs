//! Domain models for birr

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The four record kinds sharing the unified schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Observation,
    Event,
    ImpactLink,
    Target,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Observation => "observation",
            Self::Event => "event",
            Self::ImpactLink => "impact_link",
            Self::Target => "target",
        }
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "observation" => Ok(Self::Observation),
            "event" => Ok(Self::Event),
            "impact_link" => Ok(Self::ImpactLink),
            "target" => Ok(Self::Target),
            _ => Err(format!("Unknown record_type: {}", s)),
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Financial-inclusion pillar an indicator belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    Access,
    Usage,
}

impl Pillar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "Access",
            Self::Usage => "Usage",
        }
    }

    /// Headline indicator code for the pillar (Findex naming)
    pub fn headline_indicator(&self) -> &'static str {
        match self {
            Self::Access => "ACC_OWNERSHIP",
            Self::Usage => "USG_DIGITAL_PAYMENT",
        }
    }
}

impl std::str::FromStr for Pillar {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "access" => Ok(Self::Access),
            "usage" => Ok(Self::Usage),
            _ => Err(format!("Unknown pillar: {}", s)),
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forecast scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Base,
    Optimistic,
    Pessimistic,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Optimistic => "optimistic",
            Self::Pessimistic => "pessimistic",
        }
    }

    pub fn all() -> &'static [Scenario] {
        &[Self::Base, Self::Optimistic, Self::Pessimistic]
    }
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "optimistic" => Ok(Self::Optimistic),
            "pessimistic" => Ok(Self::Pessimistic),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A raw row of the unified dataset.
///
/// Fields are kept as strings so that validation can reject individual rows
/// with a reason instead of failing the whole file, and so that enrichment
/// passes untouched rows through unchanged. Typed access goes through the
/// `Observation`/`Event`/`ImpactLink`/`Target` projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub record_type: String,
    pub date: Option<String>,
    pub pillar: Option<String>,
    pub category: Option<String>,
    pub indicator: Option<String>,
    pub value: Option<String>,
    pub event_ref: Option<String>,
    pub indicator_ref: Option<String>,
    pub lag_months: Option<String>,
    pub effect: Option<String>,
    pub target_value: Option<String>,
    pub target_date: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
}

impl Record {
    /// Parse the record_type column
    pub fn kind(&self) -> Result<RecordType> {
        self.record_type
            .parse()
            .map_err(Error::InvalidData)
    }

    fn field<'a>(&'a self, value: &'a Option<String>, name: &str) -> Result<&'a str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::InvalidData(format!("{}: missing required field '{}'", self.id, name))
            })
    }
}

/// A time-stamped, pillar-tagged indicator measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub id: String,
    pub indicator: String,
    pub pillar: Pillar,
    pub date: NaiveDate,
    pub value: f64,
    pub source: Option<String>,
    pub description: Option<String>,
}

impl Observation {
    pub fn from_record(rec: &Record) -> Result<Self> {
        let indicator = rec.field(&rec.indicator, "indicator")?.to_string();
        let pillar: Pillar = rec
            .field(&rec.pillar, "pillar")?
            .parse()
            .map_err(|e: String| Error::InvalidData(format!("{}: {}", rec.id, e)))?;
        let date = parse_flex_date(rec.field(&rec.date, "date")?)
            .ok_or_else(|| Error::InvalidData(format!("{}: unparseable date", rec.id)))?;
        let value = parse_number(rec.field(&rec.value, "value")?)
            .ok_or_else(|| Error::InvalidData(format!("{}: unparseable value", rec.id)))?;

        Ok(Self {
            id: rec.id.clone(),
            indicator,
            pillar,
            date,
            value,
            source: clean(&rec.source),
            description: clean(&rec.description),
        })
    }
}

/// A pillar-neutral event. Influence on indicators is expressed only through
/// impact_link records, never by a pillar on the event itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub category: String,
    /// Not every curated event has a known date
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl Event {
    pub fn from_record(rec: &Record) -> Result<Self> {
        let category = rec.field(&rec.category, "category")?.to_string();
        let date = match clean(&rec.date) {
            Some(s) => Some(
                parse_flex_date(&s)
                    .ok_or_else(|| Error::InvalidData(format!("{}: unparseable date", rec.id)))?,
            ),
            None => None,
        };

        Ok(Self {
            id: rec.id.clone(),
            category,
            date,
            description: clean(&rec.description),
        })
    }
}

/// Links one event to one indicator (or pillar) with an estimated lag and
/// effect magnitude in percentage points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactLink {
    pub id: String,
    pub event_ref: String,
    pub indicator_ref: String,
    pub lag_months: u32,
    pub effect: f64,
    pub description: Option<String>,
}

impl ImpactLink {
    pub fn from_record(rec: &Record) -> Result<Self> {
        let event_ref = rec.field(&rec.event_ref, "event_ref")?.to_string();
        let indicator_ref = rec.field(&rec.indicator_ref, "indicator_ref")?.to_string();
        let lag_months = rec
            .field(&rec.lag_months, "lag_months")?
            .parse::<u32>()
            .map_err(|_| Error::InvalidData(format!("{}: unparseable lag_months", rec.id)))?;
        let effect = parse_number(rec.field(&rec.effect, "effect")?)
            .ok_or_else(|| Error::InvalidData(format!("{}: unparseable effect", rec.id)))?;

        Ok(Self {
            id: rec.id.clone(),
            event_ref,
            indicator_ref,
            lag_months,
            effect,
            description: clean(&rec.description),
        })
    }
}

/// A policy goal for an indicator (NFIS-II)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub id: String,
    pub indicator: String,
    pub target_value: f64,
    pub target_date: NaiveDate,
    pub source: Option<String>,
    pub description: Option<String>,
}

impl Target {
    pub fn from_record(rec: &Record) -> Result<Self> {
        let indicator = rec.field(&rec.indicator, "indicator")?.to_string();
        let target_value = parse_number(rec.field(&rec.target_value, "target_value")?)
            .ok_or_else(|| Error::InvalidData(format!("{}: unparseable target_value", rec.id)))?;
        let target_date = parse_flex_date(rec.field(&rec.target_date, "target_date")?)
            .ok_or_else(|| Error::InvalidData(format!("{}: unparseable target_date", rec.id)))?;

        Ok(Self {
            id: rec.id.clone(),
            indicator,
            target_value,
            target_date,
            source: clean(&rec.source),
            description: clean(&rec.description),
        })
    }
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a date at day, month, or year granularity.
///
/// The curated data mixes granularities (survey years, launch months, exact
/// dates); month- and year-only values normalize to the first day.
pub fn parse_flex_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // Month granularity: 2021-05
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
        return Some(date);
    }
    // Year granularity: 2014
    if let Ok(year) = s.parse::<i32>() {
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

/// Parse a numeric field, tolerating a trailing percent sign
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().trim_end_matches('%').trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flex_date() {
        assert_eq!(
            parse_flex_date("2021-05-11"),
            NaiveDate::from_ymd_opt(2021, 5, 11)
        );
        assert_eq!(
            parse_flex_date("2021-05"),
            NaiveDate::from_ymd_opt(2021, 5, 1)
        );
        assert_eq!(parse_flex_date("2014"), NaiveDate::from_ymd_opt(2014, 1, 1));
        assert_eq!(parse_flex_date("last year"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("46.5"), Some(46.5));
        assert_eq!(parse_number("46%"), Some(46.0));
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn test_record_type_round_trip() {
        for s in ["observation", "event", "impact_link", "target"] {
            let kind: RecordType = s.parse().unwrap();
            assert_eq!(kind.as_str(), s);
        }
        assert!("obs".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_pillar_headline_indicators() {
        assert_eq!(Pillar::Access.headline_indicator(), "ACC_OWNERSHIP");
        assert_eq!(Pillar::Usage.headline_indicator(), "USG_DIGITAL_PAYMENT");
    }

    #[test]
    fn test_observation_requires_fields() {
        let rec = Record {
            id: "OBS-001".into(),
            record_type: "observation".into(),
            date: Some("2021".into()),
            pillar: None,
            category: None,
            indicator: Some("ACC_OWNERSHIP".into()),
            value: Some("46".into()),
            event_ref: None,
            indicator_ref: None,
            lag_months: None,
            effect: None,
            target_value: None,
            target_date: None,
            source: None,
            description: None,
        };
        let err = Observation::from_record(&rec).unwrap_err();
        assert!(err.to_string().contains("pillar"));
    }
}
