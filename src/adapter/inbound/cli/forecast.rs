//! Handler for the `forecast` command.

use std::fmt::Write as _;

use serde_json::json;
use tabled::{Table, Tabled};

use super::chart::sparkline;
use super::command::ForecastArgs;
use super::output;
use super::source::Source;
use crate::adapter::outbound::forecast::HoltWintersForecaster;
use crate::domain::time::localize;
use crate::domain::{ForecastKind, ForecastTable};
use crate::error::Result;

#[derive(Tabled)]
struct PredictionRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Forecast")]
    yhat: String,
}

/// `timestamp,yhat,kind` rows for every fitted and predicted point.
fn forecast_csv(table: &ForecastTable) -> String {
    let mut out = String::from("timestamp,yhat,kind\n");
    for point in &table.points {
        let kind = match point.kind {
            ForecastKind::Fitted => "fitted",
            ForecastKind::Predicted => "predicted",
        };
        let _ = writeln!(
            out,
            "{},{},{kind}",
            point.timestamp.and_utc().to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            point.yhat
        );
    }
    out
}

/// Forecast one sensor.
pub fn execute(source: &Source, args: &ForecastArgs) -> Result<()> {
    let season_length = args
        .season_length
        .or(source.config().analysis.season_length);
    let model = HoltWintersForecaster::default().with_season_length(season_length)?;
    let detective = source.detective()?;

    let pb = output::spinner("Fitting model");
    let table = detective.forecast(&model, &args.entity, args.periods, args.freq);
    output::spinner_done(&pb);
    let table = table?;

    if args.csv {
        output::raw(&forecast_csv(&table));
        return Ok(());
    }
    if output::is_json() {
        output::json_output(json!({
            "command": "forecast",
            "frequency": args.freq.to_string(),
            "forecast": table,
        }));
        return Ok(());
    }

    let fitted: Vec<f64> = table.fitted().map(|p| p.yhat).collect();
    let predicted: Vec<f64> = table.predictions().map(|p| p.yhat).collect();

    output::header(env!("CARGO_PKG_VERSION"));
    output::section(&table.entity);
    output::field("Model", &table.model);
    output::field("Step", args.freq);
    output::field("History", fitted.len());
    output::lines(&format!(
        "{}{}",
        output::muted(sparkline(&fitted, 40)),
        output::highlight(sparkline(&predicted, 20))
    ));

    let rows: Vec<PredictionRow> = table
        .predictions()
        .map(|point| PredictionRow {
            time: localize(point.timestamp)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            yhat: format!("{:.3}", point.yhat),
        })
        .collect();
    output::section("Predictions");
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
