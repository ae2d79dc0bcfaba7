use ratatui::style::{Color, Modifier, Style};

// KIUMA board palette: deep green ground, cream text, brass accents.
pub const BG: Color = Color::Rgb(10, 24, 18);
pub const SURFACE: Color = Color::Rgb(16, 36, 27);
pub const BORDER: Color = Color::Rgb(44, 78, 60);
pub const TEXT: Color = Color::Rgb(236, 228, 208);
pub const TEXT_DIM: Color = Color::Rgb(132, 150, 132);
pub const GOLD: Color = Color::Rgb(212, 175, 55);
pub const GREEN: Color = Color::Rgb(102, 187, 106);
pub const AMBER: Color = Color::Rgb(230, 150, 60);
pub const RED: Color = Color::Rgb(200, 80, 64);
pub const HIGHLIGHT: Color = Color::Rgb(30, 64, 46);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

/// Row style for the upcoming prayer.
pub fn highlight() -> Style {
    Style::default()
        .fg(GOLD)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}
