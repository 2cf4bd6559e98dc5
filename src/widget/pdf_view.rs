//! Document page view
//!
//! Renders the current page of a viewer session as halfblock cells, or an
//! in-place diagnostic when the document failed to load. The diagnostic
//! distinguishes a missing file, an unreadable file, and a parse failure.

use crate::pdf::{DocStatus, ViewerSession, bitmap_to_halfblocks};
use crate::theme::current_palette;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub fn render(f: &mut Frame, area: Rect, session: Option<&ViewerSession>) {
    let palette = current_palette();

    let footer = session
        .map(|s| {
            let state = s.state();
            if state.is_ready() && state.page_count > 0 {
                format!(" page {} / {} ", state.current_page, state.page_count)
            } else {
                String::new()
            }
        })
        .unwrap_or_default();

    let (_, border_color, _) = palette.get_panel_colors(false);
    let block = Block::default()
        .title(" Document ")
        .title_bottom(Line::from(footer).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(palette.base_00));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(session) = session else {
        render_message(f, inner, "No document for this lesson", palette.base_03);
        return;
    };

    match &session.state().status {
        DocStatus::Idle | DocStatus::Loading => {
            render_message(f, inner, "Loading document…", palette.base_04);
        }
        DocStatus::Failed(error) => {
            render_message(f, inner, &error.diagnostic(), palette.base_08);
        }
        DocStatus::Ready => match session.current_render() {
            Some(rendered) => render_page(f, inner, &rendered.bitmap),
            None => render_message(f, inner, "Rendering…", palette.base_04),
        },
    }
}

fn render_message(f: &mut Frame, area: Rect, message: &str, color: Color) {
    let lines: Vec<Line> = message
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(color))))
        .collect();

    let y = area.y + area.height / 3;
    let message_area = Rect {
        x: area.x + 2,
        y: y.min(area.y + area.height.saturating_sub(1)),
        width: area.width.saturating_sub(4),
        height: (lines.len() as u16).min(area.height),
    };
    f.render_widget(Paragraph::new(lines).centered(), message_area);
}

fn render_page(f: &mut Frame, area: Rect, bitmap: &crate::pdf::PageBitmap) {
    let Some(image) = bitmap_to_halfblocks(bitmap, area.width, area.height) else {
        return;
    };

    // Center the page inside the view
    let x0 = area.x + area.width.saturating_sub(image.width) / 2;
    let y0 = area.y + area.height.saturating_sub(image.height) / 2;

    let buf = f.buffer_mut();
    for cy in 0..image.height {
        for cx in 0..image.width {
            let Some(cell) = image.cell(cx, cy) else {
                continue;
            };
            let position = Position::new(x0 + cx, y0 + cy);
            if let Some(buf_cell) = buf.cell_mut(position) {
                buf_cell.set_symbol("▀");
                buf_cell.set_fg(Color::Rgb(cell.top.0, cell.top.1, cell.top.2));
                buf_cell.set_bg(Color::Rgb(cell.bottom.0, cell.bottom.1, cell.bottom.2));
            }
        }
    }
}
