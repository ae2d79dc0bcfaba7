use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::time::Duration;

use crate::calendar::{HijriDisplay, RamadanStart, RamadanStatus, ramadan_status, resolve_hijri, resolve_ramadan_start};
use crate::config::AppConfig;
use crate::db::Repository;
use crate::models::NextEvent;
use crate::prayer_times::deriver::seconds_until;
use crate::prayer_times::{Providers, ScheduleDeriver};
use crate::services::notifications::{self, NoticeView};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{header, next_prayer, notices, prayers, ramadan, statusbar};

pub struct App {
    pub config: AppConfig,
    pub should_quit: bool,
    pub show_help: bool,
    pub status: Option<String>,

    // Rebuilt on load, on reload and when the day changes
    pub deriver: ScheduleDeriver,
    pub hijri: HijriDisplay,
    pub ramadan_start: RamadanStart,
    pub notices: Vec<NoticeView>,
    /// Store revision the cached state was read at.
    pub data_version: Option<i64>,

    // Refreshed every tick
    pub now: NaiveDateTime,
    pub next: NextEvent,
    pub ramadan: RamadanStatus,
}

impl App {
    pub fn new(config: AppConfig, repo: &dyn Repository, providers: &Providers, now: NaiveDateTime) -> Self {
        let today = now.date();
        let deriver = providers.load_schedule(repo, &config, today);
        let hijri = Self::hijri_for(&config, &deriver, providers);
        let ramadan_start = resolve_ramadan_start(providers.calendar(), today);
        let next = deriver.next_event(now.time());
        let data_version = Self::read_version(repo);

        App {
            should_quit: false,
            show_help: false,
            status: None,
            hijri,
            ramadan: ramadan_status(ramadan_start.date, now),
            ramadan_start,
            notices: notifications::list_notices(repo, chrono::Utc::now()),
            data_version,
            next,
            now,
            deriver,
            config,
        }
    }

    /// The provider's Hijri date is only trusted when no local offset applies.
    fn hijri_for(config: &AppConfig, deriver: &ScheduleDeriver, providers: &Providers) -> HijriDisplay {
        let offset = config.location.hijri_offset;
        match deriver.hijri() {
            Some(info) if offset == 0 => HijriDisplay::Known(info.clone()),
            _ => resolve_hijri(providers.calendar(), deriver.date(), offset),
        }
    }

    fn read_version(repo: &dyn Repository) -> Option<i64> {
        repo.data_version()
            .map_err(|e| log::warn!("cannot read store revision: {}", e))
            .ok()
    }

    pub fn tick(&mut self, repo: &dyn Repository, providers: &Providers, now: NaiveDateTime) {
        self.now = now;
        let version = Self::read_version(repo);
        if self
            .deriver
            .refresh_if_stale(repo, providers.times(), now.date())
        {
            self.refresh_calendar(providers);
            self.notices = notifications::list_notices(repo, chrono::Utc::now());
        } else if version != self.data_version {
            // Another process (usually `kiuma admin`) wrote to the store
            log::info!("store changed, re-reading schedule and notices");
            self.deriver.reload(repo, providers.times());
            self.notices = notifications::list_notices(repo, chrono::Utc::now());
        }
        self.data_version = version;
        self.next = self.deriver.next_event(now.time());
        self.ramadan = ramadan_status(self.ramadan_start.date, now);
    }

    fn refresh_calendar(&mut self, providers: &Providers) {
        self.hijri = Self::hijri_for(&self.config, &self.deriver, providers);
        self.ramadan_start = resolve_ramadan_start(providers.calendar(), self.deriver.date());
    }

    pub fn reload(&mut self, repo: &dyn Repository, providers: &Providers) {
        self.deriver.reload(repo, providers.times());
        self.refresh_calendar(providers);
        self.notices = notifications::list_notices(repo, chrono::Utc::now());
        self.next = self.deriver.next_event(self.now.time());
        self.status = Some(format!("Reloaded ({})", self.deriver.source().label()));
    }

    pub fn handle_key(&mut self, key: KeyEvent, repo: &dyn Repository, providers: &Providers) {
        // Only handle actual key presses; some terminals also report release/repeat
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.reload(repo, providers),
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        self.draw_board(frame);
        if self.show_help {
            self.draw_help_overlay(frame);
        }
    }

    fn draw_board(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer_chunks[0],
            &self.config.location.name,
            &self.hijri,
            self.deriver.date(),
        );
        statusbar::render(frame, outer_chunks[2], self.status.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9), // prayer table
                Constraint::Min(0),    // notices
            ])
            .split(columns[0]);

        prayers::render(
            frame,
            left_chunks[0],
            self.deriver.schedule(),
            &self.next,
            self.deriver.source().label(),
        );
        notices::render(frame, left_chunks[1], &self.notices);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // next event
                Constraint::Length(4), // ramadan
                Constraint::Min(0),
            ])
            .split(columns[1]);

        next_prayer::render(
            frame,
            right_chunks[0],
            &self.next,
            seconds_until(&self.next, self.now.time()),
        );
        ramadan::render(frame, right_chunks[1], &self.ramadan);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).min(12),
        };

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [r]        ", theme::gold()),
                Span::styled("Reload times and notices", theme::dim()),
            ]),
            Line::from(vec![
                Span::styled("  [?]        ", theme::gold()),
                Span::styled("Toggle help", theme::dim()),
            ]),
            Line::from(vec![
                Span::styled("  [q] / Esc  ", theme::gold()),
                Span::styled("Quit", theme::dim()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Admin tools: kiuma admin --help",
                theme::dim(),
            )),
        ];

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, popup_area);
    }
}

/// Run the board until the user quits.
pub fn run(repo: &dyn Repository, providers: &Providers, config: AppConfig) -> Result<()> {
    let tick_rate = Duration::from_millis(config.board.tick_rate_ms.max(100));
    let mut app = App::new(config, repo, providers, Local::now().naive_local());

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key, repo, providers);
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Resize) => {}
            Ok(Event::Tick) => app.tick(repo, providers, Local::now().naive_local()),
            Err(e) => break Err(e.into()),
        }
    };

    ratatui::restore();
    result
}
