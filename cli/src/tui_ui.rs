use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Sparkline, Table, Wrap,
    },
    Frame,
};

use crate::format::{format_date, format_minutes, format_number, month_name, truncate};
use crate::theme::ThemeColors;
use crate::tui_app::{App, View};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let tc = app.theme.colors();
    let size = frame.area();

    // Clear background
    let bg_block = Block::default().style(Style::default().bg(tc.bg));
    frame.render_widget(bg_block, size);

    // Main layout: header + content + footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // content
            Constraint::Length(1), // footer
        ])
        .split(size);

    draw_header(frame, app, &tc, chunks[0]);

    if app.loading || app.load_error.is_some() {
        draw_status(frame, app, &tc, chunks[1]);
    } else {
        match app.view {
            View::Dashboard => draw_dashboard(frame, app, &tc, chunks[1]),
            View::TopPlayed => draw_top_played(frame, app, &tc, chunks[1]),
            View::Monthly => draw_monthly(frame, app, &tc, chunks[1]),
            View::Account => draw_account(frame, app, &tc, chunks[1]),
        }
    }

    draw_footer(frame, app, &tc, chunks[2]);
}

fn block<'a>(title: &'a str, tc: &ThemeColors) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, Style::default().fg(tc.title)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tc.border))
}

fn draw_header(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let r = &app.report;
    let who = r.username.clone().unwrap_or_else(|| "listener".to_string());
    let plays = r.history.stats.as_ref().map(|s| s.total_plays).unwrap_or(0);
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" sst ", Style::default().fg(tc.accent).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(tc.border)),
        Span::styled(who, Style::default().fg(tc.fg)),
        Span::styled(" │ ", Style::default().fg(tc.border)),
        Span::styled(
            format!("{} {}", format_number(plays as u64), r.history.label),
            Style::default().fg(tc.fg),
        ),
        Span::styled(" │ ", Style::default().fg(tc.border)),
        Span::styled(
            format!("{} min", format_number(r.history.top.total_minutes.max(0) as u64)),
            Style::default().fg(tc.success).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(tc.border)),
        Span::styled(format!("Theme: {}", app.theme), Style::default().fg(tc.muted)),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(tc.border)),
    );
    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let keys = match app.view {
        View::Dashboard => "1-4/Tab: Views │ t: Theme │ q: Quit",
        View::TopPlayed => "j/k: Navigate │ u/d: Page │ g/G: Top/Bottom │ Tab: Next │ q: Quit",
        View::Monthly => "h/l: Year │ Tab: Next │ t: Theme │ q: Quit",
        View::Account => "1-4/Tab: Views │ t: Theme │ q: Quit",
    };

    let footer = Paragraph::new(Span::styled(
        format!(" {}", keys),
        Style::default().fg(tc.muted),
    ));
    frame.render_widget(footer, area);
}

fn draw_status(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let (text, color) = match &app.load_error {
        Some(err) => (err.clone(), tc.warning),
        None => (app.loading_status.clone(), tc.muted),
    };
    let status = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, Style::default().fg(color)))])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block(" Loading ", tc));
    frame.render_widget(status, area);
}

fn draw_dashboard(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(6),  // stats cards
            Constraint::Min(10),    // yearly bars
            Constraint::Length(6),  // monthly series
            Constraint::Length(4),  // notes
        ])
        .split(area);

    let card_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
        ])
        .split(chunks[0]);

    let history = &app.report.history;
    let (plays, distinct, period) = match &history.stats {
        Some(s) => (
            format_number(s.total_plays as u64),
            format_number(s.distinct_tracks as u64),
            format!(
                "{} → {} ({} days)",
                format_date(s.period.start),
                format_date(s.period.end),
                s.period.days
            ),
        ),
        None => ("0".to_string(), "0".to_string(), "no listening data".to_string()),
    };
    draw_stat_card(frame, tc, card_chunks[0], "Plays", &plays, tc.accent);
    draw_stat_card(frame, tc, card_chunks[1], "Different tracks", &distinct, tc.accent);
    draw_stat_card(
        frame,
        tc,
        card_chunks[2],
        "Listening time",
        &format_minutes(history.top.total_minutes as f64),
        tc.success,
    );
    draw_stat_card(frame, tc, card_chunks[3], "Period", &period, tc.fg);

    // Minutes per year
    let bars: Vec<Bar> = history
        .yearly
        .totals
        .iter()
        .map(|(year, minutes)| {
            Bar::default()
                .label(Line::from(year.to_string()))
                .value(minutes.round() as u64)
                .text_value(format_number(minutes.round() as u64))
                .style(Style::default().fg(tc.bar))
        })
        .collect();
    let year_chart = BarChart::default()
        .block(block(" Minutes per year ", tc))
        .data(BarGroup::default().bars(&bars))
        .bar_width(8)
        .bar_gap(2)
        .bar_style(Style::default().fg(tc.bar))
        .value_style(Style::default().fg(tc.highlight_fg).bg(tc.bar));
    frame.render_widget(year_chart, chunks[1]);

    // Minutes per month across years
    let series: Vec<u64> = history
        .year_month
        .series()
        .iter()
        .map(|(_, minutes)| minutes.round() as u64)
        .collect();
    let sparkline = Sparkline::default()
        .block(block(" Minutes per month ", tc))
        .data(&series)
        .style(Style::default().fg(tc.bar_alt));
    frame.render_widget(sparkline, chunks[2]);

    let notes: Vec<Line> = if app.report.diagnostics.is_empty() {
        vec![Line::from(Span::styled("No issues while reading the export", Style::default().fg(tc.muted)))]
    } else {
        app.report
            .diagnostics
            .iter()
            .map(|d| Line::from(Span::styled(d.as_str(), Style::default().fg(tc.warning))))
            .collect()
    };
    let notes = Paragraph::new(notes).wrap(Wrap { trim: true }).block(block(" Notes ", tc));
    frame.render_widget(notes, chunks[3]);
}

fn draw_stat_card(frame: &mut Frame, tc: &ThemeColors, area: Rect, label: &str, value: &str, color: Color) {
    let card = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(label, Style::default().fg(tc.muted))),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(tc.border)),
    );
    frame.render_widget(card, area);
}

fn draw_top_played(frame: &mut Frame, app: &mut App, tc: &ThemeColors, area: Rect) {
    let header = Row::new(
        ["#", "Song", "Author", "minutes played"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(tc.accent))),
    )
    .height(1);

    let rows: Vec<Row> = app
        .report
        .history
        .top
        .entries
        .iter()
        .map(|e| {
            Row::new(vec![
                Cell::from(e.rank.to_string()).style(Style::default().fg(tc.muted)),
                Cell::from(truncate(&e.song, 50)).style(Style::default().fg(tc.fg)),
                Cell::from(truncate(&e.author, 30)).style(Style::default().fg(tc.fg)),
                Cell::from(format!("{:.1}", e.minutes_played)).style(Style::default().fg(tc.success)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(50),
            Constraint::Percentage(30),
            Constraint::Length(15),
        ],
    )
    .header(header)
    .block(block(" Most played ", tc))
    .row_highlight_style(
        Style::default()
            .bg(tc.highlight_bg)
            .fg(tc.highlight_fg)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(table, area, &mut app.top_table_state);

    let content_len = app.report.history.top.entries.len();
    if content_len > 0 {
        let mut scrollbar_state = ScrollbarState::new(content_len).position(app.selected_top);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .style(Style::default().fg(tc.muted));
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

fn draw_monthly(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let monthly = match app.current_month() {
        Some(m) => m,
        None => {
            let empty = Paragraph::new("No dated plays in this export")
                .style(Style::default().fg(tc.muted))
                .block(block(" Minutes per month ", tc));
            frame.render_widget(empty, area);
            return;
        }
    };

    let bars: Vec<Bar> = monthly
        .minutes
        .iter()
        .enumerate()
        .map(|(i, minutes)| {
            Bar::default()
                .label(Line::from(month_name(i as u32 + 1)))
                .value(minutes.round() as u64)
                .style(Style::default().fg(if i % 2 == 0 { tc.bar } else { tc.bar_alt }))
        })
        .collect();

    let title = format!(" Minutes per month in {} ", monthly.year);
    let chart = BarChart::default()
        .block(block(&title, tc))
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(1)
        .value_style(Style::default().fg(tc.fg));
    frame.render_widget(chart, area);
}

fn draw_account(frame: &mut Frame, app: &App, tc: &ThemeColors, area: Rect) {
    let account = match &app.report.account {
        Some(a) => a,
        None => {
            let empty = Paragraph::new("No account data in this export")
                .style(Style::default().fg(tc.muted))
                .block(block(" Account ", tc));
            frame.render_widget(empty, area);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);

    let label = |s: &'static str| Span::styled(s, Style::default().fg(tc.muted));
    let value = |s: String| Span::styled(s, Style::default().fg(tc.fg));
    let mut info = vec![Line::from(vec![
        label("Name:     "),
        value(account.user_reference.clone().unwrap_or_else(|| "-".to_string())),
    ])];
    if let Some(created) = account.created_on {
        info.push(Line::from(vec![label("Created:  "), value(format_date(created))]));
    }
    if let Some(birthday) = account.birthday {
        let mut line = vec![label("Birthday: "), value(format_date(birthday))];
        if account.birthday_today {
            line.push(Span::styled(
                "  Happy birthday!",
                Style::default().fg(tc.accent).add_modifier(Modifier::BOLD),
            ));
        }
        info.push(Line::from(line));
    }
    frame.render_widget(Paragraph::new(info).block(block(" Account ", tc)), chunks[0]);

    let rows: Vec<Row> = account
        .playlists
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.name.clone()).style(Style::default().fg(tc.fg)),
                Cell::from(p.description.clone().unwrap_or_default()).style(Style::default().fg(tc.muted)),
            ])
        })
        .collect();
    let title = format!(" Playlists ({}) ", account.playlists.len());
    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
        .header(Row::new(vec![
            Cell::from("Name").style(Style::default().fg(tc.accent)),
            Cell::from("Description").style(Style::default().fg(tc.accent)),
        ]))
        .block(block(&title, tc));
    frame.render_widget(table, chunks[1]);
}
