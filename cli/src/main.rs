mod account;
mod config;
mod display;
mod error;
mod format;
mod history;
mod metrics;
mod models;
mod normalize;
mod parser;
mod scanner;
mod theme;
mod tui_app;
mod tui_events;
mod tui_ui;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::account::parse_date;
use crate::config::{Config, DEFAULT_DATA_DIR, DEFAULT_TOP_K};
use crate::display::{print_cli_table, print_json};
use crate::error::{Diagnostic, StatsError};
use crate::history::HistoryTable;
use crate::metrics::{listening_stats, minutes_by_month, minutes_by_year, minutes_by_year_and_month, top_played};
use crate::models::{HistoryReport, Report};
use crate::parser::{concat_events, load_export, split_history};
use crate::scanner::scan_export;
use crate::tui_app::{App, LoadMessage};

#[derive(Parser)]
#[command(name = "sst", about = "Spotify Stats: explore your Spotify data export")]
struct Cli {
    /// Directory holding the extracted export folders
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Print table output instead of interactive TUI
    #[arg(long)]
    cli: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Number of most played entries to show
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top: usize,

    /// Only rank plays after this date (YYYY-MM-DD, exclusive)
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Only rank plays before this date (YYYY-MM-DD, exclusive)
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,

    /// Year for the per-month breakdown (defaults to the latest year)
    #[arg(long)]
    year: Option<i32>,

    /// Analyze video history instead of audio history
    #[arg(long)]
    video: bool,

    /// More logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(raw).map_err(|e| e.to_string())
}

/// What to compute beyond the defaults in [`Config`].
#[derive(Debug, Clone, Default)]
struct ReportOptions {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    year: Option<i32>,
    video: bool,
}

/// Load all data (scan + parse + aggregate), optionally sending progress
fn load_data(
    config: &Config,
    options: &ReportOptions,
    progress: Option<mpsc::Sender<LoadMessage>>,
) -> Result<Report> {
    let send = |msg: &str| {
        if let Some(ref tx) = progress {
            let _ = tx.send(LoadMessage::Progress(msg.to_string()));
        }
    };

    send("Scanning export...");
    let location = scan_export(&config.data_dir, &config.layout)?;

    send("Parsing JSON files...");
    let export = load_export(&location);
    let username = export.account.username(&config.account);
    info!(user = ?username, "export extracted");

    send("Normalizing history...");
    let (audio, video) = split_history(&export.history, &config.layout);
    let (files, columns, label) = if options.video {
        (video, &config.video_columns, "videos")
    } else {
        (audio, &config.audio_columns, "songs")
    };

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let (history, no_data) = HistoryTable::from_records(&concat_events(&files), columns);
    diagnostics.extend(no_data);
    info!(
        rows = history.len(),
        columns = ?history.table().columns(),
        constant_columns = history.table().constants().len(),
        "history table ready"
    );

    send("Building statistics...");
    let mut notes: Vec<String> = Vec::new();
    let stats = if history.is_empty() {
        None
    } else {
        match listening_stats(&history, columns) {
            Ok(s) => Some(s),
            Err(StatsError::EmptyTable { .. }) => None,
            Err(e) => {
                notes.push(e.to_string());
                None
            }
        }
    };

    let windowed = history.filter_by_time(options.from, options.to);
    let top = top_played(&windowed, columns, config.top_k).context("ranking most played")?;
    let yearly = minutes_by_year(&history, columns)?;
    let year_month = minutes_by_year_and_month(&history, columns)?;
    let mut monthly = history
        .years()
        .into_iter()
        .map(|y| minutes_by_month(&history, columns, y).map(|m| (y, m)))
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;
    // A requested year without plays still gets its (all zero) months
    if let Some(year) = options.year {
        if !monthly.contains_key(&year) {
            monthly.insert(year, minutes_by_month(&history, columns, year)?);
        }
    }
    let selected_year = options.year.or_else(|| monthly.keys().next_back().copied());

    diagnostics.extend(Diagnostic::skipped("top played", top.skipped));
    diagnostics.extend(Diagnostic::skipped("minutes by year", yearly.skipped));

    send("Reading account data...");
    let today = chrono::Local::now().date_naive();
    let account = match export.account.summary(&config.account, today) {
        Ok(summary) => Some(summary),
        Err(e) => {
            notes.push(e.to_string());
            None
        }
    };

    let mut all_notes: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
    all_notes.extend(notes);

    Ok(Report {
        username,
        account_files: export.account.file_keys().map(str::to_string).collect(),
        history_files: export.history.keys().cloned().collect(),
        account,
        history: HistoryReport {
            label: label.to_string(),
            stats,
            top,
            yearly,
            year_month,
            monthly,
            selected_year,
        },
        diagnostics: all_notes,
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let config = Config {
        data_dir: args.data_dir.clone(),
        top_k: args.top,
        ..Config::default()
    };
    let options = ReportOptions {
        from: args.from,
        to: args.to,
        year: args.year,
        video: args.video,
    };

    // Non-TUI modes: load synchronously
    if args.json || args.cli {
        init_tracing(args.verbose);
        let report = load_data(&config, &options, None)?;
        if args.json {
            print_json(&report)?;
        } else {
            print_cli_table(&report);
        }
        return Ok(());
    }

    // TUI mode: show immediately, load in background
    run_tui(config, options)
}

fn run_tui(config: Config, options: ReportOptions) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Spawn background data loading with progress
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let progress_tx = tx.clone();
        let msg = match load_data(&config, &options, Some(progress_tx)) {
            Ok(report) => LoadMessage::Done(Box::new(report)),
            Err(e) => LoadMessage::Failed(format!("{:#}", e)),
        };
        let _ = tx.send(msg);
    });

    let mut app = App::loading(rx);

    // Main loop
    loop {
        app.poll_load();

        terminal.draw(|f| tui_ui::draw(f, &mut app))?;
        tui_events::handle_events(&mut app)?;

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
