use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// --- Raw export types ---

/// One playback or account event as exported: field name -> scalar JSON value.
pub type RawEvent = serde_json::Map<String, serde_json::Value>;

/// Parsed account-data files keyed by file key ("Identity", "Userdata", ...).
pub type AccountFiles = BTreeMap<String, serde_json::Value>;

/// Parsed streaming-history files keyed by file key.
pub type HistoryFiles = BTreeMap<String, Vec<RawEvent>>;

// --- Normalized table ---

// -0.0 and 0.0 compare equal, so they must hash alike
fn num_bits(n: f64) -> u64 {
    (n + 0.0).to_bits()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
}

/// Hashable identity of a cell, used for distinct counting and dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey<'a> {
    Null,
    Bool(bool),
    /// Integers and floats share one key so `1000` and `1000.0` are equal.
    Num(u64),
    Text(&'a str),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl Cell {
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::Bool(b) => Cell::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            // Nested values are not expected in playback records; keep them readable
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn key(&self) -> CellKey<'_> {
        match self {
            Cell::Null => CellKey::Null,
            Cell::Bool(b) => CellKey::Bool(*b),
            Cell::Int(i) => CellKey::Num(num_bits(*i as f64)),
            Cell::Float(f) => CellKey::Num(num_bits(*f)),
            Cell::Text(s) => CellKey::Text(s),
            Cell::Date(d) => CellKey::Date(*d),
            Cell::Time(t) => CellKey::Time(*t),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// Row-oriented table with a uniform schema.
///
/// Every row holds exactly one cell per column. Columns that were constant
/// across all input rows live in `constants` instead of the rows; `value`
/// falls back to them so well-known columns still resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    constants: Vec<(String, Cell)>,
}

impl NormalizedTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>, constants: Vec<(String, Cell)>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows, constants }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn constants(&self) -> &[(String, Cell)] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |cells| RowRef { table: self, cells: cells.as_slice() })
    }

    #[cfg(test)]
    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|cells| RowRef { table: self, cells: cells.as_slice() })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn constant(&self, name: &str) -> Option<&Cell> {
        self.constants.iter().find(|(c, _)| c == name).map(|(_, v)| v)
    }

    /// True if `name` is either a row column or a retained constant.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some() || self.constant(name).is_some()
    }

    /// Same schema and constants, only the rows selected by `keep`.
    pub fn retain_rows<'a, F>(&'a self, mut keep: F) -> Self
    where
        F: FnMut(RowRef<'a>) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|cells| keep(RowRef { table: self, cells: cells.as_slice() }))
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
            constants: self.constants.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a NormalizedTable,
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    #[cfg(test)]
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    /// Cell for `column`, falling back to the table constant of that name.
    pub fn value(&self, column: &str) -> Option<&'a Cell> {
        match self.table.column_index(column) {
            Some(idx) => self.cells.get(idx),
            None => self.table.constant(column),
        }
    }
}

// --- Aggregate results ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPlayedEntry {
    pub rank: usize,
    #[serde(rename = "Song")]
    pub song: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "minutes played")]
    pub minutes_played: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TopPlayed {
    pub entries: Vec<TopPlayedEntry>,
    pub total_minutes: i64,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListeningPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListeningStats {
    pub period: ListeningPeriod,
    pub total_plays: usize,
    pub distinct_tracks: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct YearlyMinutes {
    pub totals: BTreeMap<i32, f64>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyMinutes {
    pub year: i32,
    /// January..December.
    pub minutes: [f64; 12],
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct YearMonthMinutes {
    pub years: BTreeMap<i32, BTreeMap<u32, f64>>,
    pub skipped: usize,
}

impl YearMonthMinutes {
    /// Chronological `("YYYY-M", minutes)` points across every year.
    pub fn series(&self) -> Vec<(String, f64)> {
        self.years
            .iter()
            .flat_map(|(year, months)| {
                months
                    .iter()
                    .map(move |(month, minutes)| (format!("{}-{}", year, month), *minutes))
            })
            .collect()
    }
}

// --- Account ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub user_reference: Option<String>,
    pub created_on: Option<NaiveDate>,
    pub birthday: Option<NaiveDate>,
    pub birthday_today: bool,
    pub playlists: Vec<Playlist>,
}

// --- Loaded data, as handed to the presentation layer ---

#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryReport {
    /// "audio" or "video".
    pub label: String,
    pub stats: Option<ListeningStats>,
    pub top: TopPlayed,
    pub yearly: YearlyMinutes,
    pub year_month: YearMonthMinutes,
    /// Per-month breakdown for every year present in the data.
    pub monthly: BTreeMap<i32, MonthlyMinutes>,
    pub selected_year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub username: Option<String>,
    pub account_files: Vec<String>,
    pub history_files: Vec<String>,
    pub account: Option<AccountSummary>,
    pub history: HistoryReport,
    pub diagnostics: Vec<String>,
}

impl Report {
    pub fn selected_month(&self) -> Option<&MonthlyMinutes> {
        self.history
            .selected_year
            .and_then(|y| self.history.monthly.get(&y))
    }
}

// --- Export discovery ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    /// File name without the `.json` extension.
    pub key: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportLocation {
    pub account_files: Vec<ExportFile>,
    pub history_files: Vec<ExportFile>,
}
