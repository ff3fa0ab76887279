//! Handlers for the `fetch`, `sensors` and `binary` commands.

use serde_json::{json, Value};
use tabled::builder::Builder;

use super::command::{FetchArgs, TableArgs};
use super::output;
use super::source::Source;
use crate::domain::time::localize;
use crate::domain::{require_single_domain, TimeSeriesTable};
use crate::error::Result;

/// Rows shown in the terminal preview.
const PREVIEW_ROWS: usize = 10;

/// Fetch a table for an explicit entity list.
pub fn fetch(source: &Source, args: &FetchArgs) -> Result<()> {
    require_single_domain(&args.entities)?;
    let detective = source.detective()?;
    let pb = output::spinner("Fetching states");
    let table = detective.fetch_by_list(&args.entities);
    output::spinner_done(&pb);
    render("fetch", &table?, args.csv);
    Ok(())
}

/// Fetch the numeric sensor table.
pub fn sensors(source: &Source, args: &TableArgs) -> Result<()> {
    let detective = source.detective()?;
    let pb = output::spinner("Fetching sensors");
    let table = detective.numeric_sensors();
    output::spinner_done(&pb);
    render("sensors", &table?, args.csv);
    Ok(())
}

/// Fetch the binary sensor table.
pub fn binary(source: &Source, args: &TableArgs) -> Result<()> {
    let detective = source.detective()?;
    let pb = output::spinner("Fetching binary sensors");
    let table = detective.binary_sensors();
    output::spinner_done(&pb);
    render("binary", &table?, args.csv);
    Ok(())
}

fn cell(value: f64) -> Value {
    if value.is_nan() {
        Value::Null
    } else {
        json!(value)
    }
}

/// JSON document for a table; missing cells become `null`.
pub(super) fn table_json(table: &TimeSeriesTable) -> Value {
    let rows: Vec<Value> = table
        .index()
        .iter()
        .zip(table.rows())
        .map(|(timestamp, row)| {
            let values: serde_json::Map<String, Value> = table
                .columns()
                .iter()
                .zip(row)
                .map(|(column, value)| (column.clone(), cell(*value)))
                .collect();
            json!({
                "timestamp": timestamp.and_utc().to_rfc3339(),
                "values": values,
            })
        })
        .collect();
    json!({
        "columns": table.columns(),
        "rows": rows,
    })
}

fn render(command: &str, table: &TimeSeriesTable, csv: bool) {
    if csv {
        output::raw(&table.to_csv());
        return;
    }
    if output::is_json() {
        let mut document = table_json(table);
        document["command"] = json!(command);
        output::json_output(document);
        return;
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Columns", table.columns().len());
    output::field("Rows", table.len());
    if let (Some(first), Some(last)) = (table.index().first(), table.index().last()) {
        output::field(
            "Span",
            format!(
                "{} .. {}",
                localize(*first).format("%Y-%m-%d %H:%M:%S"),
                localize(*last).format("%Y-%m-%d %H:%M:%S")
            ),
        );
    }
    if table.is_empty() {
        output::hint("no complete rows; try --no-limit to read more history");
        return;
    }

    output::section("Most recent rows");
    output::lines(&preview(table, PREVIEW_ROWS));
    if table.len() > PREVIEW_ROWS {
        output::hint("use --csv to export the whole table");
    }
}

/// Last `rows` rows of the table as a text grid.
fn preview(table: &TimeSeriesTable, rows: usize) -> String {
    let mut builder = Builder::default();
    let mut header = vec!["time".to_string()];
    header.extend(table.columns().iter().cloned());
    builder.push_record(header);

    let skip = table.len().saturating_sub(rows);
    for (timestamp, row) in table.index().iter().zip(table.rows()).skip(skip) {
        let mut record = vec![localize(*timestamp).format("%Y-%m-%d %H:%M:%S").to_string()];
        record.extend(row.iter().map(|value| {
            if value.is_nan() {
                String::new()
            } else {
                format!("{value}")
            }
        }));
        builder.push_record(record);
    }
    builder.build().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table() -> TimeSeriesTable {
        let t0 = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        TimeSeriesTable::from_parts(
            vec![t0, t0 + chrono::TimeDelta::minutes(1)],
            vec!["sensor.a".into(), "sensor.b".into()],
            vec![vec![1.0, f64::NAN], vec![2.0, 3.5]],
        )
        .unwrap()
    }

    #[test]
    fn json_uses_null_for_missing_cells() {
        let doc = table_json(&table());
        assert_eq!(doc["columns"], json!(["sensor.a", "sensor.b"]));
        assert_eq!(doc["rows"][0]["values"]["sensor.b"], Value::Null);
        assert_eq!(doc["rows"][1]["values"]["sensor.b"], json!(3.5));
        assert_eq!(doc["rows"][0]["timestamp"], json!("2024-03-01T12:00:00+00:00"));
    }

    #[test]
    fn preview_keeps_the_last_rows() {
        let text = preview(&table(), 1);
        assert!(text.contains("sensor.a"));
        assert!(text.contains("3.5"));
        assert!(!text.contains("| 1 "));
    }
}
