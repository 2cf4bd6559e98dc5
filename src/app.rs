//! Application shell
//!
//! Owns every widget and drains all their input streams once per loop
//! turn: terminal events, the signal bus, media notifications, render
//! outcomes, and debounce deadlines. Widget failures stay local - a lesson
//! with a broken document renders its diagnostic while everything else
//! keeps working.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use log::debug;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::accordion::AccordionItem;
use crate::audio::{ClockMedia, Player, PlayerRegistry, TimeJumpAction, TimeJumpDialog};
use crate::event_source::EventSource;
use crate::lessons::{Lesson, load_lessons};
use crate::notification::{NotificationLevel, NotificationManager};
use crate::pdf::{CellSize, SessionManager};
use crate::settings;
use crate::signals::{Signal, SignalBus};
use crate::theme::{self, current_palette};
use crate::widget::player_row;
use crate::widget::{
    FONT_STEP, IntroAction, IntroPopup, PlayerRowHit, PlayerRowLayout, SettingsAction,
    SettingsPopup, pdf_view,
};

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// A row in the flattened lessons list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Row {
    Lesson(usize),
    Recording { lesson: usize, recording: usize },
}

pub struct App {
    lessons_dir: PathBuf,
    lessons: Vec<Lesson>,
    accordions: Vec<AccordionItem>,
    selected_row: usize,

    sessions: SessionManager,
    players: PlayerRegistry,
    /// (lesson, recording) -> registry index
    player_index: HashMap<(usize, usize), usize>,

    signals: SignalBus,
    _settings_watcher: Option<notify::RecommendedWatcher>,
    notifications: NotificationManager,

    settings_popup: Option<SettingsPopup>,
    intro_popup: Option<IntroPopup>,
    time_jump: Option<TimeJumpDialog>,

    cell_size: CellSize,
    active_player_layout: Option<(usize, PlayerRowLayout)>,
    should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(lessons_dir: impl Into<PathBuf>) -> Self {
        let lessons_dir = lessons_dir.into();
        let lessons = load_lessons(&lessons_dir).lessons;

        let accordions: Vec<AccordionItem> = lessons
            .iter()
            .map(|lesson| AccordionItem::new(lesson.open))
            .collect();

        // Each player is constructed independently so one bad recording
        // never takes the rest down
        let mut players = PlayerRegistry::new();
        let mut player_index = HashMap::new();
        for (lesson_idx, lesson) in lessons.iter().enumerate() {
            for (rec_idx, recording) in lesson.recordings.iter().enumerate() {
                let media = ClockMedia::new(recording.duration_secs);
                let idx = players.add(Player::new(recording.title.clone(), Box::new(media)));
                player_index.insert((lesson_idx, rec_idx), idx);
            }
        }

        let intro_popup = if settings::is_intro_seen() {
            None
        } else {
            Some(IntroPopup::new())
        };

        debug!(
            "App ready: {} lessons, {} recordings",
            lessons.len(),
            players.len()
        );

        Self {
            lessons_dir,
            lessons,
            accordions,
            selected_row: 0,
            sessions: SessionManager::new(),
            players,
            player_index,
            signals: SignalBus::new(),
            _settings_watcher: None,
            notifications: NotificationManager::new(),
            settings_popup: None,
            intro_popup,
            time_jump: None,
            cell_size: CellSize::default(),
            active_player_layout: None,
            should_quit: false,
        }
    }

    /// Subscribe to external settings-file changes (kept off in tests)
    pub fn enable_settings_watcher(&mut self) {
        self._settings_watcher = settings::spawn_settings_watcher(self.signals.sender());
    }

    /// Drop the first-run intro without persisting anything
    pub fn skip_intro(&mut self) {
        self.intro_popup = None;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn accordions(&self) -> &[AccordionItem] {
        &self.accordions
    }

    #[must_use]
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    #[must_use]
    pub fn signals(&self) -> &SignalBus {
        &self.signals
    }

    fn visible_rows(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        for (lesson_idx, lesson) in self.lessons.iter().enumerate() {
            rows.push(Row::Lesson(lesson_idx));
            if self.accordions[lesson_idx].is_open() {
                for rec_idx in 0..lesson.recordings.len() {
                    rows.push(Row::Recording {
                        lesson: lesson_idx,
                        recording: rec_idx,
                    });
                }
            }
        }
        rows
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_rows().len();
        if count == 0 {
            self.selected_row = 0;
        } else if self.selected_row >= count {
            self.selected_row = count - 1;
        }
    }

    fn selected(&self) -> Option<Row> {
        self.visible_rows().get(self.selected_row).copied()
    }

    /// Lesson the selection belongs to
    fn selected_lesson(&self) -> Option<usize> {
        match self.selected()? {
            Row::Lesson(lesson) | Row::Recording { lesson, .. } => Some(lesson),
        }
    }

    /// Registry index of the selected recording's player
    fn selected_player(&self) -> Option<usize> {
        match self.selected()? {
            Row::Recording { lesson, recording } => {
                self.player_index.get(&(lesson, recording)).copied()
            }
            Row::Lesson(_) => None,
        }
    }

    /// Create the viewer session for the selected lesson on first visit
    fn ensure_selected_session(&mut self) {
        #[cfg(feature = "pdf")]
        {
            let Some(lesson_idx) = self.selected_lesson() else {
                return;
            };
            let Some(document) = self.lessons[lesson_idx].document.clone() else {
                return;
            };

            let path = crate::lessons::resolve_lesson_path(&self.lessons_dir, &document);
            let content_scale = settings::content_scale();
            let session = self.sessions.ensure(lesson_idx, || {
                debug!("Opening document {path:?} for lesson {lesson_idx}");
                crate::pdf::ViewerSession::spawn(crate::pdf::MupdfBackend, path)
            });
            session.set_content_scale(content_scale);
        }
    }

    // --- event handling ---

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    self.handle_click(mouse.column, mouse.row);
                }
            }
            Event::Resize(..) => {
                // The new geometry lands on the next draw; sessions pick it
                // up there and debounce the re-render
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Popups get the keys first, most transient on top
        if let Some(mut dialog) = self.time_jump.take() {
            let duration = self
                .players
                .get(dialog.player_index)
                .map(|p| p.duration())
                .unwrap_or(0.0);
            match dialog.handle_key(key, duration) {
                Some(TimeJumpAction::Jump(target)) => {
                    if let Some(player) = self.players.get_mut(dialog.player_index) {
                        player.jump_to(target);
                    }
                }
                Some(TimeJumpAction::Close) => {}
                None => self.time_jump = Some(dialog),
            }
            return;
        }

        if let Some(popup) = &mut self.settings_popup {
            if let Some(SettingsAction::Close) = popup.handle_key(key, &self.signals) {
                self.settings_popup = None;
            }
            return;
        }

        if let Some(popup) = &mut self.intro_popup {
            if let Some(IntroAction::Dismiss) = popup.handle_key(key) {
                self.intro_popup = None;
                settings::mark_intro_seen();
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('j') | KeyCode::Down => {
                let count = self.visible_rows().len();
                if count > 0 {
                    self.selected_row = (self.selected_row + 1).min(count - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }

            KeyCode::Enter | KeyCode::Char('o') => match self.selected() {
                Some(Row::Lesson(lesson)) => {
                    self.accordions[lesson].toggle();
                    self.clamp_selection();
                }
                Some(Row::Recording { .. }) => self.toggle_selected_playback(),
                None => {}
            },
            KeyCode::Char(' ') => match self.selected() {
                Some(Row::Recording { .. }) => self.toggle_selected_playback(),
                Some(Row::Lesson(lesson)) => {
                    self.accordions[lesson].toggle();
                    self.clamp_selection();
                }
                None => {}
            },

            KeyCode::Char('E') => self.signals.broadcast(Signal::ExpandAll),
            KeyCode::Char('C') => self.signals.broadcast(Signal::CollapseAll),

            KeyCode::Char('n') | KeyCode::Right => self.with_selected_session(|s| s.next_page()),
            KeyCode::Char('p') | KeyCode::Left => self.with_selected_session(|s| s.prev_page()),

            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.signals.broadcast(Signal::FontChange(FONT_STEP));
            }
            KeyCode::Char('-') => self.signals.broadcast(Signal::FontChange(-FONT_STEP)),
            KeyCode::Char('0') => self.signals.broadcast(Signal::FontReset),
            KeyCode::Char('d') => self.signals.broadcast(Signal::ThemeToggle),

            KeyCode::Char('s') => self.settings_popup = Some(SettingsPopup::new()),

            KeyCode::Char('t') => self.open_time_jump(),

            KeyCode::Char(']') => self.step_selected_rate(crate::audio::RATE_STEP),
            KeyCode::Char('[') => self.step_selected_rate(-crate::audio::RATE_STEP),
            KeyCode::Char(c @ '1'..='3') => {
                let preset_idx = (c as usize) - ('1' as usize);
                if let Some(player_idx) = self.selected_player() {
                    if let Some(player) = self.players.get_mut(player_idx) {
                        player.set_rate(crate::audio::RATE_PRESETS[preset_idx]);
                    }
                }
            }

            _ => {}
        }
    }

    fn handle_click(&mut self, x: u16, y: u16) {
        // A click outside a popup dismisses it
        if let Some(dialog) = &self.time_jump {
            if dialog.is_outside_popup_area(x, y) {
                self.time_jump = None;
            }
            return;
        }
        if let Some(popup) = &self.settings_popup {
            if popup.is_outside_popup_area(x, y) {
                self.settings_popup = None;
            }
            return;
        }
        if let Some(popup) = &self.intro_popup {
            if popup.is_outside_popup_area(x, y) {
                self.intro_popup = None;
                settings::mark_intro_seen();
            }
            return;
        }

        let Some((player_idx, layout)) = self.active_player_layout else {
            return;
        };
        match player_row::hit_test(&layout, x, y) {
            PlayerRowHit::PlayPause => self.players.toggle(player_idx),
            PlayerRowHit::Elapsed => self.open_time_jump(),
            PlayerRowHit::Bar { offset, width } => {
                if let Some(player) = self.players.get_mut(player_idx) {
                    player.seek_fraction(offset, width);
                }
            }
            PlayerRowHit::Speed | PlayerRowHit::Outside => {}
        }
    }

    fn toggle_selected_playback(&mut self) {
        if let Some(player_idx) = self.selected_player() {
            self.players.toggle(player_idx);
        }
    }

    fn step_selected_rate(&mut self, delta: f64) {
        if let Some(player_idx) = self.selected_player() {
            if let Some(player) = self.players.get_mut(player_idx) {
                player.step_rate(delta);
            }
        }
    }

    /// Replace any live dialog: at most one time-jump exists at a time
    fn open_time_jump(&mut self) {
        let Some(player_idx) = self.selected_player() else {
            return;
        };
        let position = self
            .players
            .get(player_idx)
            .map(|p| p.position())
            .unwrap_or(0.0);
        self.time_jump = Some(TimeJumpDialog::open_for(player_idx, position));
    }

    fn with_selected_session(&mut self, op: impl FnOnce(&mut crate::pdf::ViewerSession)) {
        if let Some(lesson_idx) = self.selected_lesson() {
            if let Some(session) = self.sessions.get_mut(lesson_idx) {
                op(session);
            }
        }
    }

    // --- signals and background work ---

    fn apply_signal(&mut self, signal: Signal) {
        match signal {
            Signal::ExpandAll | Signal::CollapseAll => {
                for accordion in &mut self.accordions {
                    accordion.apply_signal(signal);
                }
                self.clamp_selection();
            }

            Signal::FontChange(delta) => {
                let applied = settings::change_font_size(delta);
                self.apply_content_scale();
                self.notifications.info(format!("Font size: {applied}px"));
            }

            Signal::FontReset => {
                let applied = settings::reset_font_size();
                self.apply_content_scale();
                self.notifications.info(format!("Font size: {applied}px"));
            }

            Signal::ThemeToggle => {
                let dark = settings::toggle_dark_mode();
                theme::set_dark_mode(dark);
            }

            Signal::PreferencesChanged => {
                settings::reload_settings();
                theme::set_dark_mode(settings::is_dark_mode());
                self.apply_content_scale();
                self.notifications.info("Settings reloaded");
            }
        }
    }

    /// Push the font-derived content scale into the visible session
    fn apply_content_scale(&mut self) {
        let scale = settings::content_scale();
        if let Some(lesson_idx) = self.selected_lesson() {
            if let Some(session) = self.sessions.get_mut(lesson_idx) {
                session.set_content_scale(scale);
                session.refresh();
            }
        }
    }

    /// Drain every non-terminal input stream once
    pub fn pump(&mut self) {
        for signal in self.signals.drain() {
            self.apply_signal(signal);
        }

        self.players.drain_all();
        self.sessions.poll_all();
        self.sessions.tick_all();
        self.notifications.update();
    }

    // --- drawing ---

    pub fn draw(&mut self, f: &mut Frame) {
        self.ensure_selected_session();

        let palette = current_palette();
        f.render_widget(
            Block::default().style(Style::default().bg(palette.base_00)),
            f.area(),
        );

        let has_player = self.selected_player().is_some();
        let player_height = if has_player { 2 } else { 0 };

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(player_height),
                Constraint::Length(1),
            ])
            .split(f.area());

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(20)])
            .split(vertical[0]);

        self.draw_lessons_panel(f, horizontal[0]);
        self.draw_document_panel(f, horizontal[1]);
        self.draw_player_panel(f, vertical[1]);
        self.draw_status_line(f, vertical[2]);

        if let Some(popup) = &mut self.settings_popup {
            popup.render(f, f.area());
        }
        if let Some(popup) = &mut self.intro_popup {
            popup.render(f, f.area());
        }
        if let Some(dialog) = &mut self.time_jump {
            dialog.render(f, f.area());
        }
    }

    fn draw_lessons_panel(&mut self, f: &mut Frame, area: Rect) {
        let palette = current_palette();
        let rows = self.visible_rows();

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| match *row {
                Row::Lesson(lesson_idx) => {
                    let accordion = &self.accordions[lesson_idx];
                    let lesson = &self.lessons[lesson_idx];
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            format!("{} ", accordion.indicator()),
                            Style::default().fg(palette.base_0d),
                        ),
                        Span::styled(
                            lesson.title.clone(),
                            Style::default()
                                .fg(palette.base_06)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]))
                }
                Row::Recording { lesson, recording } => {
                    let rec = &self.lessons[lesson].recordings[recording];
                    let playing = self
                        .player_index
                        .get(&(lesson, recording))
                        .and_then(|&idx| self.players.get(idx))
                        .is_some_and(Player::is_playing);
                    let glyph = if playing { "⏸" } else { "▶" };
                    ListItem::new(Line::from(vec![
                        Span::raw("   "),
                        Span::styled(format!("{glyph} "), Style::default().fg(palette.base_0b)),
                        Span::styled(rec.title.clone(), Style::default().fg(palette.base_05)),
                    ]))
                }
            })
            .collect();

        let (selection_bg, selection_fg) = palette.get_selection_colors(true);
        let (_, border_color, _) = palette.get_panel_colors(true);
        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Lessons ")
                    .title_bottom(Line::from(" E expand all  C collapse all ").right_aligned())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color)),
            )
            .highlight_style(
                Style::default()
                    .bg(selection_bg)
                    .fg(selection_fg)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = ListState::default();
        if !rows.is_empty() {
            state.select(Some(self.selected_row.min(rows.len() - 1)));
        }
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_document_panel(&mut self, f: &mut Frame, area: Rect) {
        let selected = self.selected_lesson();

        if let Some(lesson_idx) = selected {
            let viewport_px = self.cell_size.viewport_px(area.width.saturating_sub(2));
            if let Some(session) = self.sessions.get_mut(lesson_idx) {
                session.on_resize(viewport_px);
            }
        }

        let session = selected.and_then(|idx| self.sessions.get(idx));
        pdf_view::render(f, area, session);
    }

    fn draw_player_panel(&mut self, f: &mut Frame, area: Rect) {
        self.active_player_layout = None;
        if area.height == 0 {
            return;
        }
        let Some(player_idx) = self.selected_player() else {
            return;
        };
        let Some(player) = self.players.get(player_idx) else {
            return;
        };

        let row_area = Rect { height: 1, ..area };
        let layout = player_row::render_row(f, row_area, player);
        self.active_player_layout = Some((player_idx, layout));

        if area.height > 1 {
            let menu_area = Rect {
                y: area.y + 1,
                height: 1,
                ..area
            };
            player_row::render_speed_menu(f, menu_area, player);
        }
    }

    fn draw_status_line(&mut self, f: &mut Frame, area: Rect) {
        let palette = current_palette();

        let line = if let Some(notification) = self.notifications.current() {
            let color = match notification.level {
                NotificationLevel::Info => palette.base_0b,
                NotificationLevel::Warning => palette.base_0a,
                NotificationLevel::Error => palette.base_08,
            };
            Line::from(Span::styled(
                format!(" {}", notification.message),
                Style::default().fg(color),
            ))
        } else {
            Line::from(Span::styled(
                " j/k move  Enter open  n/p pages  Space play  t jump  s settings  q quit",
                Style::default().fg(palette.base_03),
            ))
        };

        f.render_widget(Paragraph::new(line), area);
    }
}

/// Main loop: draw, feed events to the app, pump background work
pub fn run_app_with_event_source<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    while !app.should_quit() {
        terminal.draw(|f| app.draw(f))?;

        if events.poll(POLL_TIMEOUT)? {
            let event = events.read()?;
            app.handle_event(event);
        }

        app.pump();
    }
    Ok(())
}
