use crate::settings;
use crate::signals::{Signal, SignalBus};
use crate::theme::{Base16Palette, current_palette};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Delta applied per font-size step from the popup controls
pub const FONT_STEP: i32 = 2;

pub enum SettingsAction {
    Close,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SettingsRow {
    FontSmaller,
    FontLarger,
    FontReset,
    DarkMode,
}

const ROWS: [SettingsRow; 4] = [
    SettingsRow::FontSmaller,
    SettingsRow::FontLarger,
    SettingsRow::FontReset,
    SettingsRow::DarkMode,
];

pub struct SettingsPopup {
    selected_idx: usize,
    last_popup_area: Option<Rect>,
}

impl Default for SettingsPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsPopup {
    pub fn new() -> Self {
        SettingsPopup {
            selected_idx: 0,
            last_popup_area: None,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(46, 12, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let palette = current_palette();

        let block = Block::default()
            .title(" Settings ")
            .title_bottom(Line::from(" j/k navigate  Enter select  Esc close ").right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.popup_border_color()))
            .style(Style::default().bg(palette.base_00));

        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let padded = Rect {
            x: inner.x + 2,
            y: inner.y + 1,
            width: inner.width.saturating_sub(4),
            height: inner.height.saturating_sub(2),
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // spacer
                Constraint::Length(1), // font smaller
                Constraint::Length(1), // font larger
                Constraint::Length(1), // font reset
                Constraint::Length(1), // dark mode
            ])
            .split(padded);

        let header = Line::from(Span::styled(
            format!("Content font: {}px", settings::font_size()),
            Style::default()
                .fg(palette.base_06)
                .add_modifier(Modifier::BOLD),
        ));
        f.render_widget(Paragraph::new(header), chunks[0]);

        for (idx, row) in ROWS.iter().enumerate() {
            self.render_row(f, chunks[idx + 2], *row, idx == self.selected_idx, palette);
        }
    }

    fn render_row(
        &self,
        f: &mut Frame,
        area: Rect,
        row: SettingsRow,
        selected: bool,
        palette: &Base16Palette,
    ) {
        let label = match row {
            SettingsRow::FontSmaller => format!("Smaller text   (−{FONT_STEP}px)"),
            SettingsRow::FontLarger => format!("Larger text    (+{FONT_STEP}px)"),
            SettingsRow::FontReset => {
                format!("Reset text size ({}px)", settings::FONT_SIZE_DEFAULT)
            }
            SettingsRow::DarkMode => {
                let state = if settings::is_dark_mode() { "On" } else { "Off" };
                format!("Dark mode: {state}")
            }
        };

        let style = if selected {
            Style::default()
                .fg(palette.base_06)
                .bg(palette.base_02)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.base_05)
        };
        let marker = if selected { "» " } else { "  " };

        f.render_widget(
            Paragraph::new(Line::from(vec![Span::raw(marker), Span::styled(label, style)])),
            area,
        );
    }

    /// Keys either move the selection or broadcast the matching signal;
    /// mutations go through the bus so the app applies them in one place.
    pub fn handle_key(
        &mut self,
        key: crossterm::event::KeyEvent,
        bus: &SignalBus,
    ) -> Option<SettingsAction> {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.selected_idx = (self.selected_idx + 1).min(ROWS.len() - 1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_idx = self.selected_idx.saturating_sub(1);
                None
            }
            KeyCode::Char('-') => {
                bus.broadcast(Signal::FontChange(-FONT_STEP));
                None
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                bus.broadcast(Signal::FontChange(FONT_STEP));
                None
            }
            KeyCode::Char('r') => {
                bus.broadcast(Signal::FontReset);
                None
            }
            KeyCode::Char('d') => {
                bus.broadcast(Signal::ThemeToggle);
                None
            }
            KeyCode::Enter => {
                match ROWS[self.selected_idx] {
                    SettingsRow::FontSmaller => bus.broadcast(Signal::FontChange(-FONT_STEP)),
                    SettingsRow::FontLarger => bus.broadcast(Signal::FontChange(FONT_STEP)),
                    SettingsRow::FontReset => bus.broadcast(Signal::FontReset),
                    SettingsRow::DarkMode => bus.broadcast(Signal::ThemeToggle),
                }
                None
            }
            KeyCode::Esc => Some(SettingsAction::Close),
            _ => None,
        }
    }

    pub fn is_outside_popup_area(&self, x: u16, y: u16) -> bool {
        if let Some(popup_area) = self.last_popup_area {
            x < popup_area.x
                || x >= popup_area.x + popup_area.width
                || y < popup_area.y
                || y >= popup_area.y + popup_area.height
        } else {
            true
        }
    }
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + r.width.saturating_sub(width) / 2;
    let y = r.y + r.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn keys_broadcast_font_signals() {
        let bus = SignalBus::new();
        let mut popup = SettingsPopup::new();

        assert!(popup.handle_key(key(KeyCode::Char('-')), &bus).is_none());
        assert!(popup.handle_key(key(KeyCode::Char('+')), &bus).is_none());
        assert!(popup.handle_key(key(KeyCode::Char('r')), &bus).is_none());
        assert!(popup.handle_key(key(KeyCode::Char('d')), &bus).is_none());

        assert_eq!(
            bus.drain(),
            vec![
                Signal::FontChange(-FONT_STEP),
                Signal::FontChange(FONT_STEP),
                Signal::FontReset,
                Signal::ThemeToggle,
            ]
        );
    }

    #[test]
    fn enter_activates_selected_row() {
        let bus = SignalBus::new();
        let mut popup = SettingsPopup::new();

        // First row: smaller text
        let _ = popup.handle_key(key(KeyCode::Enter), &bus);
        assert_eq!(bus.drain(), vec![Signal::FontChange(-FONT_STEP)]);

        // Last row: dark mode
        for _ in 0..ROWS.len() {
            let _ = popup.handle_key(key(KeyCode::Char('j')), &bus);
        }
        let _ = popup.handle_key(key(KeyCode::Enter), &bus);
        assert_eq!(bus.drain(), vec![Signal::ThemeToggle]);
    }

    #[test]
    fn escape_closes() {
        let bus = SignalBus::new();
        let mut popup = SettingsPopup::new();
        assert!(matches!(
            popup.handle_key(key(KeyCode::Esc), &bus),
            Some(SettingsAction::Close)
        ));
    }
}
