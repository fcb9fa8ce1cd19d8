//! Event-conditioned forecasts for the headline indicators
//!
//! The model is deliberately small for the data: an ordinary least-squares
//! linear trend per indicator (a handful of annual survey points), plus the
//! cumulative lagged event effects that activate after the last observation,
//! scaled per scenario. Uncertainty is the trend's residual standard error
//! widened with the square root of the horizon.

use std::io::{Read, Write};
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{event_overlay, indicator_series, TrendPoint};
use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::impact::{build_event_features, EventFeatures};
use crate::models::{Pillar, Scenario};
use crate::store::Dataset;

/// Fitted linear trend: value = intercept + slope * fractional_year
#[derive(Debug, Clone)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    /// Standard error of the residuals (0.0 for a 2-point fit)
    pub residual_std: f64,
    pub n: usize,
}

impl LinearTrend {
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fractional year of a date, for trend x-values
pub fn year_fraction(date: NaiveDate) -> f64 {
    date.year() as f64 + date.ordinal0() as f64 / 365.25
}

/// Ordinary least squares over (fractional year, value) pairs
pub fn fit_trend(series: &[TrendPoint]) -> Result<LinearTrend> {
    let n = series.len();
    if n < 2 {
        return Err(Error::Forecast(format!(
            "need at least 2 observations to fit a trend, have {}",
            n
        )));
    }

    let xs: Vec<f64> = series.iter().map(|p| year_fraction(p.date)).collect();
    let ys: Vec<f64> = series.iter().map(|p| p.value).collect();

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;

    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return Err(Error::Forecast(
            "observations share a single date; trend is undefined".to_string(),
        ));
    }
    let sxy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let sse: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let residual_std = if n > 2 {
        (sse / (n - 2) as f64).sqrt()
    } else {
        0.0
    };

    Ok(LinearTrend {
        slope,
        intercept,
        residual_std,
        n,
    })
}

/// One forecast cell
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub indicator: String,
    pub year: i32,
    pub scenario: Scenario,
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// All forecast cells for one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForecastSet {
    pub points: Vec<ForecastPoint>,
}

#[derive(Debug, Deserialize)]
struct LongRow {
    indicator: String,
    year: i32,
    scenario: String,
    forecast_value: f64,
    lower: f64,
    upper: f64,
}

impl ForecastSet {
    pub fn get(&self, indicator: &str, year: i32, scenario: Scenario) -> Option<&ForecastPoint> {
        self.points
            .iter()
            .find(|p| p.indicator == indicator && p.year == year && p.scenario == scenario)
    }

    pub fn indicators(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.points.iter().map(|p| p.indicator.clone()).collect();
        codes.sort();
        codes.dedup();
        codes
    }

    /// Long form: one row per indicator × year × scenario
    pub fn write_long_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["indicator", "year", "scenario", "forecast_value", "lower", "upper"])?;
        for p in &self.points {
            wtr.write_record([
                p.indicator.clone(),
                p.year.to_string(),
                p.scenario.to_string(),
                format!("{:.2}", p.value),
                format!("{:.2}", p.lower),
                format!("{:.2}", p.upper),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Wide form: one row per indicator × year, scenarios as columns, with
    /// the base scenario's uncertainty band
    pub fn write_wide_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "indicator",
            "year",
            "base",
            "lower",
            "upper",
            "optimistic",
            "pessimistic",
        ])?;

        let mut keys: Vec<(String, i32)> = self
            .points
            .iter()
            .map(|p| (p.indicator.clone(), p.year))
            .collect();
        keys.sort();
        keys.dedup();

        for (indicator, year) in keys {
            let cell = |scenario| self.get(&indicator, year, scenario);
            let base = cell(Scenario::Base);
            wtr.write_record([
                indicator.clone(),
                year.to_string(),
                fmt_opt(base.map(|p| p.value)),
                fmt_opt(base.map(|p| p.lower)),
                fmt_opt(base.map(|p| p.upper)),
                fmt_opt(cell(Scenario::Optimistic).map(|p| p.value)),
                fmt_opt(cell(Scenario::Pessimistic).map(|p| p.value)),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Read a long-form forecast artifact back (the dashboard's input)
    pub fn read_long_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut points = Vec::new();
        for result in rdr.deserialize() {
            let row: LongRow = result?;
            let scenario: Scenario = row.scenario.parse().map_err(Error::InvalidData)?;
            points.push(ForecastPoint {
                indicator: row.indicator,
                year: row.year,
                scenario,
                value: row.forecast_value,
                lower: row.lower,
                upper: row.upper,
            });
        }
        Ok(Self { points })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "forecast file not found: {}",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        Self::read_long_csv(file)
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Forecast one indicator across all scenarios over the config horizon.
///
/// The trend is anchored at its fitted value on the last observation date;
/// event adjustments count only effects that activate after that date, so
/// history is never double-counted.
pub fn forecast_indicator(
    indicator: &str,
    series: &[TrendPoint],
    features: &EventFeatures,
    cfg: &ForecastConfig,
) -> Result<Vec<ForecastPoint>> {
    let trend = fit_trend(series)?;
    let last = series.last().expect("fit_trend requires 2+ points");
    let x_last = year_fraction(last.date);
    let anchor = trend.value_at(x_last);
    let effect_at_last = features.cumulative_effect_at(indicator, last.date);

    let spread = trend.residual_std.max(cfg.interval_floor);

    let mut points = Vec::new();
    for year in cfg.horizon_years() {
        let date = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| Error::Forecast(format!("invalid horizon year {}", year)))?;
        let x = year_fraction(date);
        let h = (x - x_last).max(0.0);
        let adjustment = features.cumulative_effect_at(indicator, date) - effect_at_last;

        for &scenario in Scenario::all() {
            let params = cfg.params(scenario);
            let value = anchor
                + trend.slope * params.growth_multiplier * h
                + adjustment * params.effect_multiplier;
            let half_width = cfg.interval_z * spread * h.sqrt();

            points.push(ForecastPoint {
                indicator: indicator.to_string(),
                year,
                scenario,
                value: clamp_pct(value),
                lower: clamp_pct(value - half_width),
                upper: clamp_pct(value + half_width),
            });
        }
    }

    Ok(points)
}

/// Run the full forecast: both headline indicators, all scenarios.
pub fn run_forecast(ds: &Dataset, cfg: &ForecastConfig) -> Result<ForecastSet> {
    let overlay = event_overlay(ds)?;

    let observations = ds.observations();
    let earliest = observations
        .iter()
        .map(|o| o.date)
        .min()
        .ok_or_else(|| Error::Forecast("dataset has no observations".to_string()))?;
    let horizon_end = NaiveDate::from_ymd_opt(cfg.horizon_end, 12, 1)
        .ok_or_else(|| Error::Forecast(format!("invalid horizon year {}", cfg.horizon_end)))?;
    let features = build_event_features(&overlay, earliest, horizon_end);

    let mut points = Vec::new();
    for pillar in [Pillar::Access, Pillar::Usage] {
        let code = pillar.headline_indicator();
        let series = indicator_series(ds, code);
        if series.len() < 2 {
            return Err(Error::Forecast(format!(
                "indicator {} has {} observations; cannot forecast the {} pillar",
                code,
                series.len(),
                pillar
            )));
        }
        points.extend(forecast_indicator(code, &series, &features, cfg)?);
    }

    points.sort_by(|a, b| {
        (a.indicator.as_str(), a.year, a.scenario.as_str())
            .cmp(&(b.indicator.as_str(), b.year, b.scenario.as_str()))
    });

    info!(points = points.len(), "Forecast complete");
    Ok(ForecastSet { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{event, impact_link, observation, sample_dataset};

    fn point(year: i32, value: f64) -> TrendPoint {
        TrendPoint {
            date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            value,
        }
    }

    #[test]
    fn test_fit_trend_on_exact_line() {
        let series = vec![point(2014, 10.0), point(2017, 16.0), point(2020, 22.0)];
        let trend = fit_trend(&series).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-9);
        assert!(trend.residual_std < 1e-9);
        assert!((trend.value_at(2021.0) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_trend_needs_two_points() {
        assert!(matches!(
            fit_trend(&[point(2021, 46.0)]),
            Err(Error::Forecast(_))
        ));
    }

    #[test]
    fn test_fit_trend_rejects_single_date() {
        let series = vec![point(2021, 40.0), point(2021, 50.0)];
        assert!(matches!(fit_trend(&series), Err(Error::Forecast(_))));
    }

    #[test]
    fn test_adjustment_waits_for_lag() {
        // Flat baseline; one event at 2025-01 with lag 12 and effect +0.05
        // must not move the 2025 forecast, only 2026 onward.
        let ds = Dataset::new(vec![
            observation("O1", "2023", "Usage", "USG_DIGITAL_PAYMENT", "20"),
            observation("O2", "2024", "Usage", "USG_DIGITAL_PAYMENT", "20"),
            observation("O3", "2023", "Access", "ACC_OWNERSHIP", "40"),
            observation("O4", "2024", "Access", "ACC_OWNERSHIP", "40"),
            event("E1", "2025-01", "product_launch", "Pilot"),
            impact_link("I1", "E1", "Usage", "12", "0.05"),
        ]);
        let cfg = ForecastConfig::default();
        let set = run_forecast(&ds, &cfg).unwrap();

        let usage = |year| set.get("USG_DIGITAL_PAYMENT", year, Scenario::Base).unwrap();
        assert!((usage(2025).value - 20.0).abs() < 1e-9);
        assert!((usage(2026).value - 20.05).abs() < 1e-9);
        assert!((usage(2027).value - 20.05).abs() < 1e-9);
    }

    #[test]
    fn test_run_forecast_on_sample() {
        let cfg = ForecastConfig::default();
        let set = run_forecast(&sample_dataset(), &cfg).unwrap();

        // 2 indicators x 3 years x 3 scenarios
        assert_eq!(set.points.len(), 18);

        // Usage: 2 points at (2017, 11.9) and (2021, 20.3) -> slope 2.1/yr,
        // plus the Telebirr link (+2.5 activating 2022-05)
        let base_2025 = set
            .get("USG_DIGITAL_PAYMENT", 2025, Scenario::Base)
            .unwrap();
        assert!((base_2025.value - 31.2).abs() < 1e-6);

        // Optimistic outgrows base when the slope is positive
        let opt_2027 = set
            .get("ACC_OWNERSHIP", 2027, Scenario::Optimistic)
            .unwrap();
        let base_2027 = set.get("ACC_OWNERSHIP", 2027, Scenario::Base).unwrap();
        assert!(opt_2027.value > base_2027.value);

        // Bands bracket the point forecast and widen with the horizon
        assert!(base_2025.lower < base_2025.value && base_2025.value < base_2025.upper);
        let base_2026 = set
            .get("USG_DIGITAL_PAYMENT", 2026, Scenario::Base)
            .unwrap();
        assert!(
            base_2026.upper - base_2026.lower > base_2025.upper - base_2025.lower
        );
    }

    #[test]
    fn test_values_clamp_to_percentage_domain() {
        let ds = Dataset::new(vec![
            observation("O1", "2023", "Access", "ACC_OWNERSHIP", "90"),
            observation("O2", "2024", "Access", "ACC_OWNERSHIP", "99"),
            observation("O3", "2023", "Usage", "USG_DIGITAL_PAYMENT", "10"),
            observation("O4", "2024", "Usage", "USG_DIGITAL_PAYMENT", "12"),
        ]);
        let cfg = ForecastConfig::default();
        let set = run_forecast(&ds, &cfg).unwrap();

        for p in &set.points {
            assert!(p.value <= 100.0 && p.lower >= 0.0 && p.upper <= 100.0);
        }
        let access_2027 = set.get("ACC_OWNERSHIP", 2027, Scenario::Base).unwrap();
        assert_eq!(access_2027.value, 100.0);
    }

    #[test]
    fn test_long_csv_round_trip() {
        let cfg = ForecastConfig::default();
        let set = run_forecast(&sample_dataset(), &cfg).unwrap();

        let mut buf = Vec::new();
        set.write_long_csv(&mut buf).unwrap();
        let reread = ForecastSet::read_long_csv(buf.as_slice()).unwrap();

        assert_eq!(reread.points.len(), set.points.len());
        let a = set.get("ACC_OWNERSHIP", 2026, Scenario::Pessimistic).unwrap();
        let b = reread
            .get("ACC_OWNERSHIP", 2026, Scenario::Pessimistic)
            .unwrap();
        assert!((a.value - b.value).abs() < 0.01);
    }

    #[test]
    fn test_wide_csv_shape() {
        let cfg = ForecastConfig::default();
        let set = run_forecast(&sample_dataset(), &cfg).unwrap();

        let mut buf = Vec::new();
        set.write_wide_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("indicator,year,base,lower,upper,optimistic,pessimistic")
        );
        // 2 indicators x 3 years
        assert_eq!(lines.count(), 6);
    }
}
