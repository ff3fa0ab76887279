//! Handlers for the `plot` and `timeline` commands.
//!
//! Charts are drawn with block characters so they work in any terminal.

use std::collections::BTreeMap;

use serde_json::json;

use super::command::{PlotArgs, TimelineArgs};
use super::output;
use super::source::Source;
use crate::domain::time::{localize, time_category, TimeCategory};
use crate::domain::SeriesFrame;
use crate::error::Result;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const ON: char = '█';
const OFF: char = '·';

/// Average `values` into at most `width` buckets, skipping NaN.
fn buckets(values: &[f64], width: usize) -> Vec<f64> {
    if values.is_empty() || width == 0 {
        return Vec::new();
    }
    let count = width.min(values.len());
    (0..count)
        .map(|bucket| {
            let start = bucket * values.len() / count;
            let end = ((bucket + 1) * values.len() / count).max(start + 1);
            let finite: Vec<f64> = values[start..end]
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            if finite.is_empty() {
                f64::NAN
            } else {
                finite.iter().sum::<f64>() / finite.len() as f64
            }
        })
        .collect()
}

/// Render values as a sparkline of at most `width` characters.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let points = buckets(values, width);
    let (min, max) = points
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let range = max - min;

    points
        .iter()
        .map(|value| {
            if !value.is_finite() {
                ' '
            } else if range <= 0.0 {
                BARS[0]
            } else {
                let level = ((value - min) / range * (BARS.len() - 1) as f64).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            }
        })
        .collect()
}

/// Render 0/1 values as an on/off strip; a bucket is on when it is on at
/// least half of the time.
pub fn on_off_strip(values: &[f64], width: usize) -> String {
    buckets(values, width)
        .iter()
        .map(|value| if *value >= 0.5 { ON } else { OFF })
        .collect()
}

/// Share of samples that are on, per time-of-day category.
fn on_share_by_category(series: &SeriesFrame) -> BTreeMap<TimeCategory, f64> {
    let mut totals: BTreeMap<TimeCategory, (usize, usize)> = BTreeMap::new();
    for (timestamp, value) in &series.points {
        let entry = totals
            .entry(time_category(localize(*timestamp)))
            .or_default();
        entry.1 += 1;
        if *value >= 0.5 {
            entry.0 += 1;
        }
    }
    totals
        .into_iter()
        .map(|(category, (on, total))| (category, on as f64 / total as f64))
        .collect()
}

fn span(series: &SeriesFrame) -> String {
    match (series.points.first(), series.points.last()) {
        (Some((first, _)), Some((last, _))) => format!(
            "{} .. {}",
            localize(*first).format("%Y-%m-%d %H:%M"),
            localize(*last).format("%Y-%m-%d %H:%M")
        ),
        _ => String::new(),
    }
}

/// Draw a sparkline per entity over one shared time base.
pub fn plot(source: &Source, args: &PlotArgs) -> Result<()> {
    let detective = source.detective()?;
    let pb = output::spinner("Fetching history");
    let series = detective.aligned_series(&args.entities);
    output::spinner_done(&pb);
    let series = series?;

    if output::is_json() {
        output::json_output(json!({
            "command": "plot",
            "series": series,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    for frame in &series {
        let values: Vec<f64> = frame.values().collect();
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        output::section(&frame.entity);
        output::field("Span", span(frame));
        output::field("Points", values.len());
        output::field("Range", format!("{min} .. {max}"));
        output::lines(&output::highlight(sparkline(&values, args.width)));
    }
    Ok(())
}

/// Draw the on/off strip of a binary entity.
pub fn timeline(source: &Source, args: &TimelineArgs) -> Result<()> {
    let detective = source.detective()?;
    let pb = output::spinner("Fetching history");
    let series = detective.single_entity_series(&args.entity);
    output::spinner_done(&pb);
    let series = series?.resample(args.freq);
    let values: Vec<f64> = series.values().collect();
    let shares = on_share_by_category(&series);

    if output::is_json() {
        output::json_output(json!({
            "command": "timeline",
            "entity": series.entity,
            "frequency": args.freq.to_string(),
            "series": series.points,
            "on_share": shares,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section(&series.entity);
    output::field("Span", span(&series));
    output::field("Step", args.freq);
    output::lines(&on_off_strip(&values, args.width));
    for (category, share) in shares {
        output::field(&category.to_string(), format!("{:.0}% on", share * 100.0));
    }
    Ok(())
}
