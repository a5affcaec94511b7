use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeSet, HashSet};

use crate::config::HistoryColumns;
use crate::error::{Diagnostic, Result, StatsError};
use crate::models::{ListeningPeriod, NormalizedTable, RawEvent, RowRef};
use crate::normalize::normalize;

/// Read-only playback history with date-aware accessors.
///
/// Every operation returns a new table; the wrapped rows are never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    table: NormalizedTable,
    date_column: String,
}

impl HistoryTable {
    pub fn new(table: NormalizedTable, date_column: impl Into<String>) -> Self {
        Self { table, date_column: date_column.into() }
    }

    /// Normalize raw events and wrap the result.
    pub fn from_records(records: &[RawEvent], names: &HistoryColumns) -> (Self, Option<Diagnostic>) {
        let (table, diagnostic) = normalize(records, names);
        (Self::new(table, names.date.clone()), diagnostic)
    }

    pub fn table(&self) -> &NormalizedTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.table.rows()
    }

    /// Calendar date of a row, `None` when missing or unparsed.
    pub fn row_date(&self, row: &RowRef<'_>) -> Option<NaiveDate> {
        row.value(&self.date_column).and_then(|c| c.as_date())
    }

    /// First and last listening date and the whole days between them.
    pub fn listening_period(&self) -> Result<ListeningPeriod> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for row in self.rows() {
            if let Some(date) = self.row_date(&row) {
                bounds = Some(match bounds {
                    None => (date, date),
                    Some((start, end)) => (start.min(date), end.max(date)),
                });
            }
        }

        let (start, end) = bounds.ok_or(StatsError::EmptyTable { operation: "listening period" })?;
        Ok(ListeningPeriod {
            start,
            end,
            days: (end - start).num_days(),
        })
    }

    /// Rows dated strictly after `start` and strictly before `end`.
    ///
    /// Both bounds are exclusive. Without bounds this is a full copy,
    /// including rows whose date could not be parsed; with any bound those
    /// rows are dropped.
    pub fn filter_by_time(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        if start.is_none() && end.is_none() {
            return self.clone();
        }

        let table = self.table.retain_rows(|row| match self.row_date(&row) {
            Some(date) => start.map_or(true, |s| date > s) && end.map_or(true, |e| date < e),
            None => false,
        });
        Self::new(table, self.date_column.clone())
    }

    /// Keep the first row for each distinct value of `column`, in order.
    pub fn deduplicate_by(&self, column: &str) -> Result<Self> {
        self.require_column(column)?;
        let mut seen = HashSet::new();
        let table = self.table.retain_rows(|row| {
            let key = row.value(column).map(|c| c.key());
            seen.insert(key)
        });
        Ok(Self::new(table, self.date_column.clone()))
    }

    /// Years with at least one dated row, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.rows()
            .filter_map(|row| self.row_date(&row))
            .map(|d| d.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn require_column(&self, column: &str) -> Result<()> {
        // An empty table has no schema to check against
        if self.table.is_empty() || self.table.has_column(column) {
            Ok(())
        } else {
            Err(StatsError::UnknownColumn(column.to_string()))
        }
    }
}
