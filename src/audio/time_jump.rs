//! Time-jump dialog
//!
//! A transient popup seeded from the current position. At most one
//! instance exists at a time (the app replaces any live dialog when
//! opening a new one). Confirm validates minutes*60+seconds against the
//! track duration; an out-of-range target leaves the dialog open with a
//! validation message.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::theme::current_palette;

const INVALID_TIME_MESSAGE: &str = "Time is out of range";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpField {
    Minutes,
    Seconds,
}

/// What the app should do after a key was handled
#[derive(Debug, PartialEq)]
pub enum TimeJumpAction {
    Close,
    Jump(f64),
}

pub struct TimeJumpDialog {
    /// Index of the player this dialog seeks
    pub player_index: usize,
    minutes: String,
    seconds: String,
    focus: JumpField,
    error: Option<String>,
    last_popup_area: Option<Rect>,
}

impl TimeJumpDialog {
    /// Seed the fields from the current playback position
    #[must_use]
    pub fn open_for(player_index: usize, position: f64) -> Self {
        let position = if position.is_finite() && position > 0.0 {
            position
        } else {
            0.0
        };
        let minutes = (position / 60.0).floor() as u64;
        let seconds = (position % 60.0).floor() as u64;

        Self {
            player_index,
            minutes: minutes.to_string(),
            seconds: seconds.to_string(),
            focus: JumpField::Minutes,
            error: None,
            last_popup_area: None,
        }
    }

    #[must_use]
    pub fn focus(&self) -> JumpField {
        self.focus
    }

    #[must_use]
    pub fn minutes_text(&self) -> &str {
        &self.minutes
    }

    #[must_use]
    pub fn seconds_text(&self) -> &str {
        &self.seconds
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Handle a key against the given track duration
    pub fn handle_key(
        &mut self,
        key: crossterm::event::KeyEvent,
        duration: f64,
    ) -> Option<TimeJumpAction> {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.push_digit(c);
                None
            }
            KeyCode::Backspace => {
                self.pop_digit();
                None
            }
            KeyCode::Tab | KeyCode::Char(':') => {
                self.focus = match self.focus {
                    JumpField::Minutes => JumpField::Seconds,
                    JumpField::Seconds => JumpField::Minutes,
                };
                None
            }
            KeyCode::Esc => Some(TimeJumpAction::Close),
            KeyCode::Enter => self.confirm(duration),
            _ => None,
        }
    }

    fn push_digit(&mut self, c: char) {
        self.error = None;
        match self.focus {
            JumpField::Minutes => {
                if self.minutes.len() < 3 {
                    self.minutes.push(c);
                }
                // Two digits entered: advance to the seconds field
                if self.minutes.len() >= 2 {
                    self.focus = JumpField::Seconds;
                }
            }
            JumpField::Seconds => {
                if self.seconds.len() < 2 {
                    self.seconds.push(c);
                }
            }
        }
    }

    fn pop_digit(&mut self) {
        self.error = None;
        match self.focus {
            JumpField::Minutes => {
                self.minutes.pop();
            }
            JumpField::Seconds => {
                if self.seconds.pop().is_none() {
                    self.focus = JumpField::Minutes;
                }
            }
        }
    }

    /// Validate and resolve the target. Out-of-range targets set the
    /// validation message and keep the dialog open.
    pub fn confirm(&mut self, duration: f64) -> Option<TimeJumpAction> {
        let minutes: u64 = self.minutes.parse().unwrap_or(0);
        let seconds: u64 = self.seconds.parse().unwrap_or(0);
        let target = (minutes * 60 + seconds) as f64;

        if duration.is_finite() && target <= duration {
            Some(TimeJumpAction::Jump(target))
        } else {
            self.error = Some(INVALID_TIME_MESSAGE.to_string());
            None
        }
    }

    #[must_use]
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

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(34, 9, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let palette = current_palette();

        let block = Block::default()
            .title(" Jump to ")
            .title_bottom(Line::from(" Enter confirm  Esc cancel ").right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.popup_border_color()))
            .style(Style::default().bg(palette.base_00));

        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // spacer
                Constraint::Length(1), // inputs
                Constraint::Length(1), // spacer
                Constraint::Length(1), // error
            ])
            .split(inner);

        let field_style = |focused: bool| {
            if focused {
                Style::default()
                    .fg(palette.base_07)
                    .bg(palette.base_02)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.base_05)
            }
        };

        let inputs = Line::from(vec![
            Span::raw("   "),
            Span::styled(
                format!(" {:>3} ", self.minutes),
                field_style(self.focus == JumpField::Minutes),
            ),
            Span::styled(" : ", Style::default().fg(palette.base_04)),
            Span::styled(
                format!(" {:>2} ", self.seconds),
                field_style(self.focus == JumpField::Seconds),
            ),
        ]);
        f.render_widget(Paragraph::new(inputs), chunks[1]);

        if let Some(error) = &self.error {
            let line = Line::from(Span::styled(
                format!("   {error}"),
                Style::default().fg(palette.base_08),
            ));
            f.render_widget(Paragraph::new(line), chunks[3]);
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
