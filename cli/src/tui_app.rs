use ratatui::widgets::TableState;
use std::sync::mpsc;

use crate::models::{MonthlyMinutes, Report};
use crate::theme::{load_saved_theme, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    TopPlayed,
    Monthly,
    Account,
}

/// Messages from background data loading
pub enum LoadMessage {
    Progress(String),
    Done(Box<Report>),
    Failed(String),
}

pub struct App {
    pub report: Report,
    pub view: View,
    pub theme: Theme,
    pub top_table_state: TableState,
    pub selected_top: usize,
    /// Year shown by the monthly view
    pub year: Option<i32>,
    pub should_quit: bool,
    // Async loading
    pub loading: bool,
    pub loading_status: String,
    pub load_error: Option<String>,
    pub load_receiver: Option<mpsc::Receiver<LoadMessage>>,
}

impl App {
    /// Create an app in loading state
    pub fn loading(rx: mpsc::Receiver<LoadMessage>) -> Self {
        Self {
            report: Report::default(),
            view: View::Dashboard,
            theme: load_saved_theme(),
            top_table_state: TableState::default(),
            selected_top: 0,
            year: None,
            should_quit: false,
            loading: true,
            loading_status: "Starting...".to_string(),
            load_error: None,
            load_receiver: Some(rx),
        }
    }

    /// Check if background loading has completed or has progress updates
    pub fn poll_load(&mut self) {
        if !self.loading {
            return;
        }
        if let Some(ref rx) = self.load_receiver {
            while let Ok(msg) = rx.try_recv() {
                match msg {
                    LoadMessage::Progress(status) => {
                        self.loading_status = status;
                    }
                    LoadMessage::Done(report) => {
                        self.set_report(*report);
                        return;
                    }
                    LoadMessage::Failed(err) => {
                        self.loading = false;
                        self.load_error = Some(err);
                        self.load_receiver = None;
                        return;
                    }
                }
            }
        }
    }

    pub fn set_report(&mut self, report: Report) {
        self.year = report.history.selected_year;
        self.report = report;
        self.loading = false;
        self.load_receiver = None;
        self.selected_top = 0;
        if !self.report.history.top.entries.is_empty() {
            self.top_table_state.select(Some(0));
        }
    }

    pub fn switch_to(&mut self, view: View) {
        self.view = view;
    }

    pub fn current_month(&self) -> Option<&MonthlyMinutes> {
        self.year.and_then(|y| self.report.history.monthly.get(&y))
    }

    pub fn move_up(&mut self) {
        if self.view == View::TopPlayed && self.selected_top > 0 {
            self.selected_top -= 1;
            self.top_table_state.select(Some(self.selected_top));
        }
    }

    pub fn move_down(&mut self) {
        if self.view == View::TopPlayed {
            let max = self.report.history.top.entries.len().saturating_sub(1);
            if self.selected_top < max {
                self.selected_top += 1;
                self.top_table_state.select(Some(self.selected_top));
            }
        }
    }

    pub fn page_up(&mut self) {
        for _ in 0..10 {
            self.move_up();
        }
    }

    pub fn page_down(&mut self) {
        for _ in 0..10 {
            self.move_down();
        }
    }

    pub fn go_home(&mut self) {
        if self.view == View::TopPlayed {
            self.selected_top = 0;
            self.top_table_state.select(Some(0));
        }
    }

    pub fn go_end(&mut self) {
        if self.view == View::TopPlayed {
            let max = self.report.history.top.entries.len().saturating_sub(1);
            self.selected_top = max;
            self.top_table_state.select(Some(max));
        }
    }

    /// Step the monthly view to the previous (-1) or next (+1) year with data.
    ///
    /// A year outside the data steps to the nearest data year in that direction.
    pub fn shift_year(&mut self, step: i32) {
        let current = match self.year {
            Some(y) => y,
            None => return,
        };
        let mut years = self.report.history.monthly.keys().copied();
        let next = if step < 0 {
            years.rev().find(|&y| y < current)
        } else {
            years.find(|&y| y > current)
        };
        if let Some(year) = next {
            self.year = Some(year);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TopPlayed, TopPlayedEntry};

    fn app_with(years: &[i32], entries: usize) -> App {
        let (_tx, rx) = mpsc::channel();
        let mut app = App::loading(rx);
        let mut report = Report::default();
        for &y in years {
            report.history.monthly.insert(
                y,
                MonthlyMinutes { year: y, minutes: [0.0; 12], skipped: 0 },
            );
        }
        report.history.selected_year = years.last().copied();
        report.history.top = TopPlayed {
            entries: (0..entries)
                .map(|i| TopPlayedEntry {
                    rank: i + 1,
                    song: format!("s{}", i),
                    author: "a".into(),
                    minutes_played: 1.0,
                })
                .collect(),
            total_minutes: entries as i64,
            skipped: 0,
        };
        app.set_report(report);
        app
    }

    #[test]
    fn year_paging_stays_within_data() {
        let mut app = app_with(&[2021, 2023, 2024], 0);
        assert_eq!(app.year, Some(2024));
        app.shift_year(1);
        assert_eq!(app.year, Some(2024));
        app.shift_year(-1);
        assert_eq!(app.year, Some(2023));
        app.shift_year(-1);
        app.shift_year(-1);
        assert_eq!(app.year, Some(2021));
    }

    #[test]
    fn year_outside_data_steps_to_nearest_data_year() {
        let mut app = app_with(&[2021, 2023, 2024], 0);
        app.year = Some(2019);
        app.shift_year(-1);
        assert_eq!(app.year, Some(2019));
        app.shift_year(1);
        assert_eq!(app.year, Some(2021));

        app.year = Some(2022);
        app.shift_year(1);
        assert_eq!(app.year, Some(2023));

        app.year = Some(2030);
        app.shift_year(-1);
        assert_eq!(app.year, Some(2024));
    }

    #[test]
    fn top_selection_is_clamped() {
        let mut app = app_with(&[], 3);
        app.switch_to(View::TopPlayed);
        app.page_down();
        assert_eq!(app.selected_top, 2);
        app.move_up();
        assert_eq!(app.selected_top, 1);
        app.go_home();
        assert_eq!(app.selected_top, 0);
        app.go_end();
        assert_eq!(app.selected_top, 2);
    }

    #[test]
    fn failed_load_is_recorded() {
        let (tx, rx) = mpsc::channel();
        let mut app = App::loading(rx);
        tx.send(LoadMessage::Failed("boom".into())).unwrap();
        app.poll_load();
        assert!(!app.loading);
        assert_eq!(app.load_error.as_deref(), Some("boom"));
    }
}
