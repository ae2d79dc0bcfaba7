use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::models::{NextEvent, Phase};
use crate::prayer_times::clock::format_opt_12h;
use crate::tui::theme;
use crate::utils::format::format_countdown;

pub fn render(frame: &mut Frame, area: Rect, next: &NextEvent, remaining_secs: Option<i64>) {
    let block = Block::default()
        .title(Span::styled(" Next ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let phase_style = match next.phase {
        Phase::Call => theme::amber(),
        Phase::Congregation => theme::green(),
    };
    let when = if next.tomorrow { "  tomorrow" } else { "" };

    let countdown = remaining_secs
        .map(format_countdown)
        .unwrap_or_else(|| "--:--:--".to_string());

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("  {}", next.prayer.display_name().to_uppercase()),
                theme::gold().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {}", next.phase), phase_style),
        ]),
        Line::from(Span::styled(
            format!("  at {}{}", format_opt_12h(next.minute), when),
            theme::dim(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  in  ", theme::dim()),
            Span::styled(countdown, theme::amber().add_modifier(Modifier::BOLD)),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
