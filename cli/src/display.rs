use anyhow::Result;
use colored::Colorize;
use tabled::{builder::Builder, settings::Style};

use crate::format::{format_date, format_minutes, format_number, month_name, truncate};
use crate::models::{AccountSummary, Report};

pub fn print_cli_table(report: &Report) {
    println!();
    match &report.username {
        Some(name) => println!("{} {}", "All good".bold().cyan(), format!("{}!", name).bold()),
        None => println!("{}", "Spotify Stats".bold().cyan()),
    }
    println!(
        "  Account data: {}",
        if report.account_files.is_empty() {
            "-".to_string()
        } else {
            report.account_files.join(", ")
        }
    );
    println!("  History data: {} files", report.history_files.len());
    println!();

    if let Some(account) = &report.account {
        print_account(account);
    }

    let history = &report.history;
    if let Some(stats) = &history.stats {
        println!(
            "Between {} and {} ({} days) you listened to:",
            format_date(stats.period.start).bold(),
            format_date(stats.period.end).bold(),
            stats.period.days,
        );
        println!("  - {} {} (in total)", format_number(stats.total_plays as u64).bold(), history.label);
        println!("  - {} different tracks", format_number(stats.distinct_tracks as u64).bold());
        println!();
    }

    println!(
        "{} {} minutes ({})",
        "Total listening time:".bold(),
        history.top.total_minutes.to_string().green().bold(),
        format_minutes(history.top.total_minutes as f64),
    );
    println!();

    // Top played
    let mut builder = Builder::default();
    builder.push_record(["#", "Song", "Author", "minutes played"]);
    for e in &history.top.entries {
        builder.push_record([
            e.rank.to_string(),
            truncate(&e.song, 48),
            truncate(&e.author, 32),
            format!("{:.1}", e.minutes_played),
        ]);
    }
    println!("{}", "Most played".bold().cyan());
    println!("{}", builder.build().with(Style::rounded()));
    println!();

    // Per year
    if !history.yearly.totals.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Year", "Minutes", "Time"]);
        for (year, minutes) in &history.yearly.totals {
            builder.push_record([
                year.to_string(),
                format!("{:.0}", minutes),
                format_minutes(*minutes),
            ]);
        }
        println!("{}", "Minutes per year".bold().cyan());
        println!("{}", builder.build().with(Style::rounded()));
        println!();
    }

    // Per month of the selected year
    if let Some(monthly) = report.selected_month() {
        let mut builder = Builder::default();
        builder.push_record(["Month", "Minutes", "Time"]);
        for (i, minutes) in monthly.minutes.iter().enumerate() {
            builder.push_record([
                month_name(i as u32 + 1).to_string(),
                format!("{:.0}", minutes),
                format_minutes(*minutes),
            ]);
        }
        println!("{}", format!("Minutes per month in {}", monthly.year).bold().cyan());
        println!("{}", builder.build().with(Style::rounded()));
        println!();
    }

    for diag in &report.diagnostics {
        println!("{} {}", "note:".yellow().bold(), diag);
    }
}

fn print_account(account: &AccountSummary) {
    println!("{}", "#".repeat(50).dimmed());
    println!(
        "Hello {}! Here is some info about you and your account",
        account.user_reference.as_deref().unwrap_or("there").bold()
    );
    if let Some(created) = account.created_on {
        println!("  - You created this account on {}.", format_date(created));
    }
    if let Some(birthday) = account.birthday {
        let greeting = if account.birthday_today {
            " Oh wait... It's today! Well, happy birthday then!".magenta().to_string()
        } else {
            String::new()
        };
        println!("  - Your birthday is on {}.{}", format_date(birthday), greeting);
    }
    println!();

    if account.playlists.is_empty() {
        println!("It looks like you did not create any playlists.");
    } else {
        println!("It looks like you created some playlists:");
        for p in &account.playlists {
            match &p.description {
                Some(desc) => println!("  - {}\t-\t{}", p.name.bold(), desc.dimmed()),
                None => println!("  - {}", p.name.bold()),
            }
        }
    }
    println!("{}", "#".repeat(50).dimmed());
    println!();
}

pub fn print_json(report: &Report) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
