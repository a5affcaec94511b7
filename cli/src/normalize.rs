use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::config::HistoryColumns;
use crate::error::Diagnostic;
use crate::models::{Cell, NormalizedTable, RawEvent};

/// Build a uniform table from heterogeneous events.
///
/// Columns are the union of all event fields in first-seen order; fields an
/// event lacks become nulls. With more than one row, columns holding a single
/// value across all rows are moved to the table constants. The timestamp
/// column, when present, is replaced by `date` and `time` at the front.
pub fn normalize(records: &[RawEvent], names: &HistoryColumns) -> (NormalizedTable, Option<Diagnostic>) {
    if records.is_empty() {
        warn!("normalize called with no records");
        return (NormalizedTable::default(), Some(Diagnostic::NoData));
    }

    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<Cell>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).map(Cell::from_json).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    let (columns, rows, constants) = drop_constant_columns(columns, rows);
    let (columns, rows, constants) = split_timestamp(columns, rows, constants, names);

    debug!(
        rows = rows.len(),
        columns = columns.len(),
        constants = constants.len(),
        "normalized history"
    );
    (NormalizedTable::new(columns, rows, constants), None)
}

type Parts = (Vec<String>, Vec<Vec<Cell>>, Vec<(String, Cell)>);

fn drop_constant_columns(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Parts {
    // A single row would lose every column
    if rows.len() < 2 {
        return (columns, rows, Vec::new());
    }

    let constant: Vec<bool> = (0..columns.len())
        .map(|i| {
            let first = rows[0][i].key();
            rows.iter().all(|r| r[i].key() == first)
        })
        .collect();

    let constants: Vec<(String, Cell)> = columns
        .iter()
        .enumerate()
        .filter(|(i, _)| constant[*i])
        .map(|(i, name)| (name.clone(), rows[0][i].clone()))
        .collect();

    let kept_columns: Vec<String> = columns
        .iter()
        .enumerate()
        .filter(|(i, _)| !constant[*i])
        .map(|(_, name)| name.clone())
        .collect();

    let kept_rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|(i, _)| !constant[*i])
                .map(|(_, cell)| cell)
                .collect()
        })
        .collect();

    (kept_columns, kept_rows, constants)
}

fn split_timestamp(
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    mut constants: Vec<(String, Cell)>,
    names: &HistoryColumns,
) -> Parts {
    if let Some(pos) = constants.iter().position(|(c, _)| *c == names.timestamp) {
        let (_, ts) = constants.remove(pos);
        let (date, time) = split_cell(&ts);
        constants.insert(pos, (names.time.clone(), time));
        constants.insert(pos, (names.date.clone(), date));
        return (columns, rows, constants);
    }

    let ts_idx = match columns.iter().position(|c| *c == names.timestamp) {
        Some(idx) => idx,
        None => return (columns, rows, constants),
    };

    let mut new_columns = vec![names.date.clone(), names.time.clone()];
    new_columns.extend(columns.into_iter().enumerate().filter(|(i, _)| *i != ts_idx).map(|(_, c)| c));

    let mut unparsed = 0usize;
    let new_rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .map(|row| {
            let mut out = Vec::with_capacity(row.len() + 1);
            let mut rest = Vec::with_capacity(row.len());
            for (i, cell) in row.into_iter().enumerate() {
                if i == ts_idx {
                    let (date, time) = split_cell(&cell);
                    if date.is_null() {
                        unparsed += 1;
                    }
                    out.push(date);
                    out.push(time);
                } else {
                    rest.push(cell);
                }
            }
            out.extend(rest);
            out
        })
        .collect();

    if unparsed > 0 {
        warn!(count = unparsed, column = %names.timestamp, "unparseable timestamps set to null");
    }
    (new_columns, new_rows, constants)
}

fn split_cell(cell: &Cell) -> (Cell, Cell) {
    match cell.as_str().and_then(parse_timestamp) {
        Some((date, time)) => (Cell::Date(date), Cell::Time(time)),
        None => (Cell::Null, Cell::Null),
    }
}

/// Parse an export timestamp into UTC calendar date and time of day.
pub fn parse_timestamp(raw: &str) -> Option<(NaiveDate, NaiveTime)> {
    let raw = raw.trim();
    let naive = DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc).naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Some((naive.date(), naive.time()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> RawEvent {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("event fixture must be an object"),
        }
    }

    fn names() -> HistoryColumns {
        HistoryColumns::audio()
    }

    #[test]
    fn empty_input_reports_no_data() {
        let (table, diag) = normalize(&[], &names());
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert_eq!(diag, Some(Diagnostic::NoData));
    }

    #[test]
    fn constant_columns_are_moved_to_constants() {
        let records = vec![
            event(json!({"ts": "2024-01-01T10:00:00Z", "platform": "ios", "ms_played": 1000})),
            event(json!({"ts": "2024-01-02T10:00:00Z", "platform": "ios", "ms_played": 2000})),
        ];
        let (table, diag) = normalize(&records, &names());
        assert!(diag.is_none());
        assert_eq!(table.columns(), &["date", "time", "ms_played"]);
        assert_eq!(table.constant("platform"), Some(&Cell::Text("ios".into())));
        let row = table.row(0).unwrap();
        assert_eq!(row.value("platform"), Some(&Cell::Text("ios".into())));
    }

    #[test]
    fn single_row_keeps_all_columns() {
        let records = vec![event(json!({"ts": "2024-03-05T23:59:01Z", "ms_played": 10, "x": null}))];
        let (table, _) = normalize(&records, &names());
        assert_eq!(table.columns(), &["date", "time", "ms_played", "x"]);
        assert!(table.constants().is_empty());
    }

    #[test]
    fn timestamp_split_into_date_then_time() {
        let records = vec![
            event(json!({"a": 1, "ts": "2024-01-01T10:00:00Z"})),
            event(json!({"a": 2, "ts": "2023-12-31T23:30:15Z"})),
        ];
        let (table, _) = normalize(&records, &names());
        assert_eq!(table.columns(), &["date", "time", "a"]);
        let row = table.row(1).unwrap();
        assert_eq!(row.cells()[0], Cell::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
        assert_eq!(row.cells()[1], Cell::Time(NaiveTime::from_hms_opt(23, 30, 15).unwrap()));
        assert_eq!(row.cells()[2], Cell::Int(2));
    }

    #[test]
    fn offset_timestamps_are_converted_to_utc() {
        let (date, time) = parse_timestamp("2024-01-01T01:00:00+02:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(23, 0, 0).unwrap());
    }

    #[test]
    fn unparseable_timestamp_yields_null_for_that_row() {
        let records = vec![
            event(json!({"ts": "yesterday", "a": 1})),
            event(json!({"ts": "2024-01-01T10:00:00Z", "a": 2})),
        ];
        let (table, _) = normalize(&records, &names());
        let bad = table.row(0).unwrap();
        assert!(bad.value("date").unwrap().is_null());
        assert!(bad.value("time").unwrap().is_null());
        assert!(table.row(1).unwrap().value("date").unwrap().as_date().is_some());
    }

    #[test]
    fn constant_timestamp_splits_into_constants() {
        let records = vec![
            event(json!({"ts": "2024-01-01T10:00:00Z", "a": 1})),
            event(json!({"ts": "2024-01-01T10:00:00Z", "a": 2})),
        ];
        let (table, _) = normalize(&records, &names());
        assert_eq!(table.columns(), &["a"]);
        assert_eq!(
            table.constant("date"),
            Some(&Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        );
        assert!(table.constant("time").is_some());
        assert!(table.constant("ts").is_none());
    }

    #[test]
    fn missing_fields_become_null_and_union_keeps_first_seen_order() {
        let records = vec![
            event(json!({"b": 1, "a": 1})),
            event(json!({"a": 2, "c": "x"})),
        ];
        let (table, _) = normalize(&records, &names());
        assert_eq!(table.columns(), &["b", "a", "c"]);
        assert_eq!(table.row(1).unwrap().value("b"), Some(&Cell::Null));
    }

    #[test]
    fn integral_floats_match_integers_when_counting_values() {
        let records = vec![
            event(json!({"a": 1, "ms_played": 1000})),
            event(json!({"a": 2, "ms_played": 1000.0})),
        ];
        let (table, _) = normalize(&records, &names());
        assert_eq!(table.columns(), &["a"]);
        assert_eq!(table.constant("ms_played"), Some(&Cell::Int(1000)));
    }

    #[test]
    fn output_is_deterministic() {
        let records = vec![
            event(json!({"ts": "2024-01-01T10:00:00Z", "a": 1, "b": "x"})),
            event(json!({"ts": "2024-02-01T10:00:00Z", "a": 2, "b": "y"})),
        ];
        assert_eq!(normalize(&records, &names()).0, normalize(&records, &names()).0);
    }

    fn arb_records() -> impl Strategy<Value = Vec<RawEvent>> {
        let field = prop_oneof![Just("a"), Just("b"), Just("c"), Just("d")];
        let value = prop_oneof![
            Just(serde_json::Value::Null),
            (0i64..3).prop_map(|n| json!(n)),
            prop_oneof![Just("x"), Just("y")].prop_map(|s| json!(s)),
        ];
        prop::collection::vec(prop::collection::btree_map(field, value, 0..4), 0..12).prop_map(|rows| {
            rows.into_iter()
                .map(|r| r.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
                .collect()
        })
    }

    proptest! {
        #[test]
        fn every_row_has_the_same_columns(records in arb_records()) {
            let (table, _) = normalize(&records, &names());
            for row in table.rows() {
                prop_assert_eq!(row.cells().len(), table.columns().len());
            }
        }

        #[test]
        fn single_valued_columns_are_absent(records in arb_records()) {
            let (table, _) = normalize(&records, &names());
            if records.len() > 1 {
                for (i, _) in table.columns().iter().enumerate() {
                    let first = table.row(0).unwrap().cells()[i].key();
                    prop_assert!(table.rows().any(|r| r.cells()[i].key() != first));
                }
            }
        }
    }
}
