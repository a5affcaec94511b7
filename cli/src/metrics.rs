use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::config::HistoryColumns;
use crate::error::{Diagnostic, Result};
use crate::history::HistoryTable;
use crate::models::{
    ListeningStats, MonthlyMinutes, TopPlayed, TopPlayedEntry, YearMonthMinutes, YearlyMinutes,
};

fn ms_to_minutes(ms: f64) -> f64 {
    ms / 1000.0 / 60.0
}

// Skips reach the user as diagnostics; the log only traces them
fn report_skipped(operation: &'static str, count: usize) {
    if let Some(diag) = Diagnostic::skipped(operation, count) {
        debug!(operation, count, "{}", diag);
    }
}

struct Group {
    track: String,
    artist: String,
    ms: f64,
}

/// Rank tracks by cumulative play time.
///
/// Plays are grouped by (track, artist) in first-seen order, then reduced to
/// one group per track name (the first one seen), stably sorted by total
/// play time and cut to `k`. Rows without a track or artist are left out of
/// the ranking but still count towards `total_minutes`.
pub fn top_played(history: &HistoryTable, columns: &HistoryColumns, k: usize) -> Result<TopPlayed> {
    for column in [&columns.duration, &columns.track, &columns.artist] {
        history.require_column(column)?;
    }

    let mut total_ms = 0.0f64;
    let mut skipped = 0usize;
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for row in history.rows() {
        let ms = row.value(&columns.duration).and_then(|c| c.as_f64());
        let track = row.value(&columns.track).and_then(|c| c.as_str());
        let artist = row.value(&columns.artist).and_then(|c| c.as_str());

        if let Some(ms) = ms {
            total_ms += ms;
        }

        let (track, artist) = match (track, artist) {
            (Some(t), Some(a)) => (t, a),
            _ => {
                skipped += 1;
                continue;
            }
        };
        if ms.is_none() {
            skipped += 1;
        }

        let slot = *index.entry((track, artist)).or_insert_with(|| {
            groups.push(Group {
                track: track.to_string(),
                artist: artist.to_string(),
                ms: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].ms += ms.unwrap_or(0.0);
    }

    let mut seen_tracks: HashSet<String> = HashSet::new();
    let mut unique: Vec<Group> = groups
        .into_iter()
        .filter(|g| seen_tracks.insert(g.track.clone()))
        .collect();

    // Stable: equal totals keep first-seen order
    unique.sort_by(|a, b| b.ms.total_cmp(&a.ms));
    unique.truncate(k);

    let entries = unique
        .into_iter()
        .enumerate()
        .map(|(i, g)| TopPlayedEntry {
            rank: i + 1,
            song: g.track,
            author: g.artist,
            minutes_played: ms_to_minutes(g.ms),
        })
        .collect();

    report_skipped("top played", skipped);
    Ok(TopPlayed {
        entries,
        total_minutes: ms_to_minutes(total_ms).round_ties_even() as i64,
        skipped,
    })
}

/// Single pass over the table: (date, minutes) for every usable row.
fn dated_minutes(history: &HistoryTable, columns: &HistoryColumns) -> Result<(Vec<(NaiveDate, f64)>, usize)> {
    history.require_column(&columns.duration)?;

    let mut points = Vec::with_capacity(history.len());
    let mut skipped = 0usize;
    for row in history.rows() {
        let date = history.row_date(&row);
        let ms = row.value(&columns.duration).and_then(|c| c.as_f64());
        match (date, ms) {
            (Some(date), Some(ms)) => points.push((date, ms_to_minutes(ms))),
            _ => skipped += 1,
        }
    }
    Ok((points, skipped))
}

pub fn minutes_by_year(history: &HistoryTable, columns: &HistoryColumns) -> Result<YearlyMinutes> {
    let (points, skipped) = dated_minutes(history, columns)?;

    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for (date, minutes) in points {
        *totals.entry(date.year()).or_insert(0.0) += minutes;
    }

    report_skipped("minutes by year", skipped);
    Ok(YearlyMinutes { totals, skipped })
}

/// Minutes for January..December of `year`; silent months are zero.
pub fn minutes_by_month(history: &HistoryTable, columns: &HistoryColumns, year: i32) -> Result<MonthlyMinutes> {
    let (points, skipped) = dated_minutes(history, columns)?;

    let mut minutes = [0.0f64; 12];
    for (date, m) in points.into_iter().filter(|(d, _)| d.year() == year) {
        minutes[date.month0() as usize] += m;
    }

    report_skipped("minutes by month", skipped);
    Ok(MonthlyMinutes { year, minutes, skipped })
}

/// Minutes per month for every year in the data, all twelve months present.
pub fn minutes_by_year_and_month(history: &HistoryTable, columns: &HistoryColumns) -> Result<YearMonthMinutes> {
    let (points, skipped) = dated_minutes(history, columns)?;

    let mut years: BTreeMap<i32, BTreeMap<u32, f64>> = BTreeMap::new();
    for (date, minutes) in points {
        let months = years
            .entry(date.year())
            .or_insert_with(|| (1..=12).map(|m| (m, 0.0)).collect());
        *months.entry(date.month()).or_insert(0.0) += minutes;
    }

    debug!(years = years.len(), "built year/month series");
    report_skipped("minutes by year and month", skipped);
    Ok(YearMonthMinutes { years, skipped })
}

/// Period, play count and distinct track count of a history.
pub fn listening_stats(history: &HistoryTable, columns: &HistoryColumns) -> Result<ListeningStats> {
    let period = history.listening_period()?;
    let distinct_tracks = history.deduplicate_by(&columns.track)?.len();
    Ok(ListeningStats {
        period,
        total_plays: history.len(),
        distinct_tracks,
    })
}
