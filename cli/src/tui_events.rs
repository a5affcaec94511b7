use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::theme::save_theme;
use crate::tui_app::{App, View};

pub fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            // Ctrl+C always quits
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                app.should_quit = true;
                return Ok(());
            }

            handle_input(app, key.code);
        }
    }
    Ok(())
}

fn handle_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('h') | KeyCode::Left => {
            if app.view == View::Monthly {
                app.shift_year(-1);
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.view == View::Monthly {
                app.shift_year(1);
            }
        }
        KeyCode::Char('u') => app.page_up(),
        KeyCode::Char('d') => app.page_down(),
        KeyCode::Char('g') => app.go_home(),
        KeyCode::Char('G') => app.go_end(),
        KeyCode::Char('t') => {
            app.theme = app.theme.next();
            save_theme(app.theme);
        }
        KeyCode::Char('1') => app.switch_to(View::Dashboard),
        KeyCode::Char('2') => app.switch_to(View::TopPlayed),
        KeyCode::Char('3') => app.switch_to(View::Monthly),
        KeyCode::Char('4') => app.switch_to(View::Account),
        KeyCode::Tab => {
            let next = match app.view {
                View::Dashboard => View::TopPlayed,
                View::TopPlayed => View::Monthly,
                View::Monthly => View::Account,
                View::Account => View::Dashboard,
            };
            app.switch_to(next);
        }
        _ => {}
    }
}
