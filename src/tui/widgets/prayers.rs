use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, BorderType, Borders, Cell, Row, Table},
};

use crate::models::{DerivedSchedule, NextEvent};
use crate::prayer_times::clock::format_opt_12h;
use crate::tui::theme;

/// Prayer, adhan and iqaama per prayer. Today's upcoming prayer is highlighted.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: &DerivedSchedule,
    next: &NextEvent,
    source: &str,
) {
    let block = Block::default()
        .title(Span::styled(" Prayer Times ", theme::gold()))
        .title_bottom(Span::styled(format!(" {} ", source), theme::dim()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let header = Row::new(vec!["", "Time", "Adhan", "Iqaama"])
        .style(theme::dim())
        .bottom_margin(1);

    let rows: Vec<Row> = schedule
        .slots
        .iter()
        .map(|slot| {
            let upcoming = !next.tomorrow && slot.prayer == next.prayer;
            let row = Row::new(vec![
                Cell::from(format!("  {}", slot.prayer.display_name())),
                Cell::from(format_opt_12h(slot.prayer_minute)),
                Cell::from(format_opt_12h(slot.call)),
                Cell::from(format_opt_12h(slot.congregation)),
            ]);
            if upcoming {
                row.style(theme::highlight())
            } else {
                row.style(theme::bold())
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}
