use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
};

use crate::services::notifications::NoticeView;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, notices: &[NoticeView]) {
    let unread = notices.iter().filter(|n| n.unread).count();
    let title = if unread > 0 {
        format!(" Notices ({} new) ", unread)
    } else {
        " Notices ".to_string()
    };

    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    if notices.is_empty() {
        let empty = List::new(vec![ListItem::new(Line::from(Span::styled(
            "  No notifications yet",
            theme::dim(),
        )))])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Two lines per notice; show as many as fit.
    let fits = (area.height.saturating_sub(2) / 2) as usize;
    let items: Vec<ListItem> = notices
        .iter()
        .take(fits.max(1))
        .map(|n| {
            let marker = if n.unread {
                Span::styled("● ", theme::amber())
            } else {
                Span::styled("  ", theme::dim())
            };
            let mut head = vec![
                Span::raw(" "),
                marker,
                Span::styled(n.title.clone(), theme::bold()),
            ];
            if let Some(badge) = n.badge {
                head.push(Span::styled(
                    format!("  {}", badge),
                    theme::red().add_modifier(Modifier::BOLD),
                ));
            }
            let meta = Line::from(Span::styled(
                format!("     {} · {}", n.label, n.age),
                theme::dim(),
            ));
            ListItem::new(vec![Line::from(head), meta])
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
