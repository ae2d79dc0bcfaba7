use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::calendar::RamadanStatus;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, status: &RamadanStatus) {
    let block = Block::default()
        .title(Span::styled(format!(" {} ", status.headline()), theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let body = match status {
        RamadanStatus::Active { day } => vec![
            Line::from(Span::styled(
                format!("  Day {} of Ramadan", day),
                theme::green().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "  May this blessed month bring you peace and blessings.",
                theme::dim(),
            )),
        ],
        RamadanStatus::Distant { days, year } => vec![
            Line::from(Span::styled(
                format!("  ~{} days until Ramadan {}", days, year),
                theme::bold(),
            )),
            Line::from(Span::styled(
                "  Exact dates follow the moon sighting.",
                theme::dim(),
            )),
        ],
        RamadanStatus::Countdown {
            days,
            hours,
            minutes,
            seconds,
            year,
        } => vec![
            Line::from(Span::styled(
                format!("  {}d {:02}h {:02}m {:02}s", days, hours, minutes, seconds),
                theme::amber().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("  until Ramadan {}", year), theme::dim())),
        ],
    };

    let paragraph = Paragraph::new(body)
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}
