use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::theme;

const HINTS: [(&str, &str); 3] = [("[r]", " reload  "), ("[?]", " help  "), ("[q]", " quit")];

pub fn render(frame: &mut Frame, area: Rect, status: Option<&str>) {
    let mut spans = Vec::new();
    if let Some(msg) = status {
        spans.push(Span::styled(format!("{}   ", msg), theme::green()));
    }
    for (key, label) in HINTS {
        spans.push(Span::styled(key, theme::gold()));
        spans.push(Span::styled(label, theme::dim()));
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
