use ratatui::style::Color;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Default,
    Dracula,
    Nord,
    Gruvbox,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Theme::Default, Theme::Dracula, Theme::Nord, Theme::Gruvbox]
    }

    pub fn next(self) -> Theme {
        let all = Self::all();
        let idx = all.iter().position(|&t| t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Default => ThemeColors::default_theme(),
            Theme::Dracula => ThemeColors::dracula(),
            Theme::Nord => ThemeColors::nord(),
            Theme::Gruvbox => ThemeColors::gruvbox(),
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        match name.to_lowercase().as_str() {
            "default" => Some(Theme::Default),
            "dracula" => Some(Theme::Dracula),
            "nord" => Some(Theme::Nord),
            "gruvbox" => Some(Theme::Gruvbox),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Default => write!(f, "Default"),
            Theme::Dracula => write!(f, "Dracula"),
            Theme::Nord => write!(f, "Nord"),
            Theme::Gruvbox => write!(f, "Gruvbox"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub title: Color,
    pub success: Color,
    pub warning: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub bar: Color,
    pub bar_alt: Color,
}

impl ThemeColors {
    fn default_theme() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            accent: Color::Green,
            title: Color::Green,
            success: Color::Green,
            warning: Color::Yellow,
            highlight_bg: Color::Green,
            highlight_fg: Color::Black,
            bar: Color::Green,
            bar_alt: Color::LightGreen,
        }
    }

    fn dracula() -> Self {
        Self {
            bg: Color::Rgb(40, 42, 54),
            fg: Color::Rgb(248, 248, 242),
            muted: Color::Rgb(98, 114, 164),
            border: Color::Rgb(68, 71, 90),
            accent: Color::Rgb(189, 147, 249),
            title: Color::Rgb(255, 121, 198),
            success: Color::Rgb(80, 250, 123),
            warning: Color::Rgb(241, 250, 140),
            highlight_bg: Color::Rgb(189, 147, 249),
            highlight_fg: Color::Rgb(40, 42, 54),
            bar: Color::Rgb(189, 147, 249),
            bar_alt: Color::Rgb(255, 121, 198),
        }
    }

    fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(216, 222, 233),
            muted: Color::Rgb(76, 86, 106),
            border: Color::Rgb(59, 66, 82),
            accent: Color::Rgb(136, 192, 208),
            title: Color::Rgb(129, 161, 193),
            success: Color::Rgb(163, 190, 140),
            warning: Color::Rgb(235, 203, 139),
            highlight_bg: Color::Rgb(136, 192, 208),
            highlight_fg: Color::Rgb(46, 52, 64),
            bar: Color::Rgb(136, 192, 208),
            bar_alt: Color::Rgb(94, 129, 172),
        }
    }

    fn gruvbox() -> Self {
        Self {
            bg: Color::Rgb(40, 40, 40),
            fg: Color::Rgb(235, 219, 178),
            muted: Color::Rgb(146, 131, 116),
            border: Color::Rgb(80, 73, 69),
            accent: Color::Rgb(250, 189, 47),
            title: Color::Rgb(254, 128, 25),
            success: Color::Rgb(184, 187, 38),
            warning: Color::Rgb(250, 189, 47),
            highlight_bg: Color::Rgb(250, 189, 47),
            highlight_fg: Color::Rgb(40, 40, 40),
            bar: Color::Rgb(184, 187, 38),
            bar_alt: Color::Rgb(142, 192, 124),
        }
    }
}

fn theme_path() -> std::path::PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join("spotify-stats")
        .join("theme")
}

/// Load saved theme from config
pub fn load_saved_theme() -> Theme {
    match std::fs::read_to_string(theme_path()) {
        Ok(name) => Theme::from_name(name.trim()).unwrap_or(Theme::Default),
        Err(_) => Theme::Default,
    }
}

/// Save theme to config
pub fn save_theme(theme: Theme) {
    let path = theme_path();
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    if let Err(e) = std::fs::write(&path, theme.to_string()) {
        tracing::debug!(error = %e, "could not persist theme");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn themes_cycle_and_round_trip_by_name() {
        let mut t = Theme::Default;
        for _ in 0..Theme::all().len() {
            assert_eq!(Theme::from_name(&t.to_string()), Some(t));
            t = t.next();
        }
        assert_eq!(t, Theme::Default);
    }
}
