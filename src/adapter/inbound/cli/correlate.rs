//! Handler for the `correlations` command.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::CorrelationsArgs;
use super::output;
use super::source::Source;
use crate::domain::{CorrelationRecord, PairMode};
use crate::error::Result;

#[derive(Tabled)]
struct CorrelationRow {
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "r")]
    coefficient: String,
}

fn colored(coefficient: f64) -> String {
    let text = format!("{coefficient:+.3}");
    if coefficient >= 0.0 {
        output::positive(text)
    } else {
        output::negative(text)
    }
}

/// Rank correlations between numeric sensors.
pub fn execute(source: &Source, args: &CorrelationsArgs) -> Result<()> {
    let mut detective = source.detective()?;
    if args.ordered {
        detective = detective.with_pair_mode(PairMode::Ordered);
    }

    let pb = output::spinner("Correlating sensors");
    let records = if args.entities.is_empty() {
        detective.sensor_correlations()
    } else {
        detective
            .fetch_by_list(&args.entities)
            .and_then(|table| detective.correlate(&table))
    };
    output::spinner_done(&pb);
    let mut records = records?;
    if let Some(top) = args.top {
        records.truncate(top);
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "correlations",
            "pair_mode": detective.pair_mode(),
            "correlations": records,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Pairs", records.len());
    output::field("Mode", detective.pair_mode());
    if records.is_empty() {
        output::hint("no pair of sensors varies together");
        return Ok(());
    }
    output::lines(&Table::new(rows(&records)).to_string());
    Ok(())
}

fn rows(records: &[CorrelationRecord]) -> Vec<CorrelationRow> {
    records
        .iter()
        .map(|record| CorrelationRow {
            pair: record.pair.clone(),
            coefficient: colored(record.coefficient),
        })
        .collect()
}
