//! Status, coverage, trends, and events commands

use std::path::Path;

use anyhow::Result;

use birr_core::{
    coverage, event_overlay, indicator_series, latest_value, summarize, Pillar,
};

use super::load_dataset;

pub fn cmd_status(data_dir: &Path) -> Result<()> {
    let ds = load_dataset(data_dir)?;
    let summary = summarize(&ds);

    println!("📊 Dataset status");
    println!("   Observations: {}", summary.observations);
    println!("   Events: {}", summary.events);
    println!("   Impact links: {}", summary.impact_links);
    println!("   Targets: {}", summary.targets);
    println!("   Indicators: {}", summary.indicators.join(", "));
    if let (Some(first), Some(last)) = (summary.first_observation, summary.last_observation) {
        println!("   Observation span: {} .. {}", first, last);
    }

    for pillar in [Pillar::Access, Pillar::Usage] {
        let code = pillar.headline_indicator();
        match latest_value(&ds, code) {
            Some(point) => println!(
                "   Latest {} ({}): {:.1}% as of {}",
                pillar, code, point.value, point.date
            ),
            None => println!("   Latest {} ({}): no observations", pillar, code),
        }
    }

    Ok(())
}

pub fn cmd_coverage(data_dir: &Path) -> Result<()> {
    let ds = load_dataset(data_dir)?;
    let matrix = coverage(&ds);

    if matrix.indicators.is_empty() {
        println!("No observations in dataset");
        return Ok(());
    }

    let width = matrix
        .indicators
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or(0);

    print!("{:width$}", "", width = width + 2);
    for year in &matrix.years {
        print!("{:>6}", year);
    }
    println!();

    for (i, indicator) in matrix.indicators.iter().enumerate() {
        print!("{:width$}  ", indicator, width = width);
        for count in &matrix.counts[i] {
            if *count == 0 {
                print!("{:>6}", "·");
            } else {
                print!("{:>6}", count);
            }
        }
        println!();
    }

    let gaps = matrix.gaps();
    if gaps.is_empty() {
        println!("\n✅ No coverage gaps");
    } else {
        println!("\n⚠️  {} coverage gaps:", gaps.len());
        for gap in gaps {
            println!("   - {} has no observation in {}", gap.indicator, gap.year);
        }
    }

    Ok(())
}

pub fn cmd_trends(data_dir: &Path, indicator: Option<String>) -> Result<()> {
    let ds = load_dataset(data_dir)?;

    let codes: Vec<String> = match indicator {
        Some(code) => vec![code],
        None => vec![
            Pillar::Access.headline_indicator().to_string(),
            Pillar::Usage.headline_indicator().to_string(),
        ],
    };

    for code in codes {
        let series = indicator_series(&ds, &code);
        if series.is_empty() {
            println!("📉 {}: no observations", code);
            continue;
        }

        println!("📉 {} ({} points)", code, series.len());
        for point in &series {
            println!("   {}  {:6.1}", point.date, point.value);
        }

        for target in ds.targets().iter().filter(|t| t.indicator == code) {
            println!(
                "   🎯 target {:.0}% by {} ({})",
                target.target_value,
                target.target_date,
                target.source.as_deref().unwrap_or("unsourced")
            );
        }
    }

    Ok(())
}

pub fn cmd_events(data_dir: &Path) -> Result<()> {
    let ds = load_dataset(data_dir)?;
    let overlay = event_overlay(&ds)?;

    println!("🔗 {} impact links", overlay.len());
    for link in &overlay {
        let date = link
            .event
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "undated".to_string());
        println!(
            "   {} [{}] {} -> {} (lag {} months, effect {:+.2}pp)",
            date,
            link.event.category,
            link.event
                .description
                .as_deref()
                .unwrap_or(link.event.id.as_str()),
            link.indicators.join(", "),
            link.lag_months,
            link.effect
        );
    }

    Ok(())
}
