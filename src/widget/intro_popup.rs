use crate::theme::current_palette;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub enum IntroAction {
    Dismiss,
}

/// First-run welcome popup. Shown until dismissed once; the dismissal is
/// persisted so it never comes back.
pub struct IntroPopup {
    last_popup_area: Option<Rect>,
}

impl Default for IntroPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl IntroPopup {
    pub fn new() -> Self {
        IntroPopup {
            last_popup_area: None,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(52, 12, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let palette = current_palette();

        let block = Block::default()
            .title(" Welcome to lectern ")
            .title_bottom(Line::from(" Enter close ").right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.popup_border_color()))
            .style(Style::default().bg(palette.base_00));

        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Browse lessons on the left, read pages on the right.",
                Style::default().fg(palette.base_05),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Enter toggles a section, n/p turns pages, Space plays",
                Style::default().fg(palette.base_05),
            )),
            Line::from(Span::styled(
                "a recording, s opens settings.",
                Style::default().fg(palette.base_05),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "This message is shown only once.",
                Style::default()
                    .fg(palette.base_03)
                    .add_modifier(Modifier::ITALIC),
            )),
        ];

        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }),
            Rect {
                x: inner.x + 2,
                y: inner.y,
                width: inner.width.saturating_sub(4),
                height: inner.height,
            },
        );
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Option<IntroAction> {
        use crossterm::event::KeyCode;

        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char(' ') => {
                Some(IntroAction::Dismiss)
            }
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
