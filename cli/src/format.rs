use chrono::NaiveDate;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Minutes as a compact "Xh Ym" / "Ym" / "Ys" string.
pub fn format_minutes(minutes: f64) -> String {
    if minutes < 1.0 {
        return format!("{}s", (minutes * 60.0).round() as u64);
    }
    let total = minutes.round() as u64;
    let hours = total / 60;
    let remain = total % 60;
    if hours == 0 {
        format!("{}m", remain)
    } else {
        format!("{}h {}m", hours, remain)
    }
}

/// Dates are shown day first, as in the export's home locale.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("?")
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(2_000_000), "2.0M");
    }

    #[test]
    fn minutes() {
        assert_eq!(format_minutes(0.5), "30s");
        assert_eq!(format_minutes(42.2), "42m");
        assert_eq!(format_minutes(125.0), "2h 5m");
    }

    #[test]
    fn dates_and_months() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(d), "07/03/2024");
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
        assert_eq!(month_name(0), "?");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("àèìòù", 3), "àèì...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
