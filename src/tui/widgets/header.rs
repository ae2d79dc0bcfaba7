use chrono::NaiveDate;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::calendar::HijriDisplay;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, location: &str, hijri: &HijriDisplay, today: NaiveDate) {
    let title_line = Line::from(vec![
        Span::styled("  KIUMA  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled(location, theme::dim()),
    ]);

    let mut date_spans = vec![Span::styled(hijri.formatted(), theme::amber())];
    if let Some(ar) = hijri.info().and_then(|h| h.month_name_ar.as_deref()) {
        date_spans.push(Span::styled(format!("  {}", ar), theme::gold()));
    }
    date_spans.push(Span::styled("  ·  ", theme::dim()));
    date_spans.push(Span::styled(
        today.format("%A, %d %B %Y").to_string(),
        theme::dim(),
    ));

    let text = vec![title_line, Line::from(""), Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
