//! Audio player row
//!
//! One horizontal row per recording: play control, elapsed time, progress
//! bar, total time, and the playback rate. A second line carries the speed
//! presets when the row is active. The layout is exposed for mouse
//! hit-testing: clicking the elapsed time opens the time-jump dialog,
//! clicking the bar seeks.

use crate::audio::{Player, RATE_PRESETS};
use crate::theme::current_palette;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerRowLayout {
    pub row: Rect,
    pub button: Rect,
    pub elapsed: Rect,
    pub bar: Rect,
    pub total: Rect,
    pub speed: Rect,
}

/// What a click inside the row maps to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerRowHit {
    PlayPause,
    /// Click on the elapsed time: open the time-jump dialog
    Elapsed,
    /// Click on the progress bar at `offset` of `width` cells
    Bar { offset: u16, width: u16 },
    Speed,
    Outside,
}

#[must_use]
pub fn layout(area: Rect) -> PlayerRowLayout {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(3), // play button
            Constraint::Length(6), // elapsed
            Constraint::Min(8),    // progress bar
            Constraint::Length(7), // total
            Constraint::Length(8), // rate
        ])
        .split(area);

    PlayerRowLayout {
        row: area,
        button: chunks[0],
        elapsed: chunks[1],
        bar: chunks[2],
        total: chunks[3],
        speed: chunks[4],
    }
}

#[must_use]
pub fn hit_test(layout: &PlayerRowLayout, x: u16, y: u16) -> PlayerRowHit {
    if y < layout.row.y || y >= layout.row.y + layout.row.height {
        return PlayerRowHit::Outside;
    }
    if x >= layout.button.x && x < layout.button.x + layout.button.width {
        return PlayerRowHit::PlayPause;
    }
    if x >= layout.elapsed.x && x < layout.elapsed.x + layout.elapsed.width {
        return PlayerRowHit::Elapsed;
    }
    if x >= layout.bar.x && x < layout.bar.x + layout.bar.width {
        return PlayerRowHit::Bar {
            offset: x - layout.bar.x,
            width: layout.bar.width,
        };
    }
    if x >= layout.speed.x && x < layout.speed.x + layout.speed.width {
        return PlayerRowHit::Speed;
    }
    PlayerRowHit::Outside
}

pub fn render_row(f: &mut Frame, area: Rect, player: &Player) -> PlayerRowLayout {
    let palette = current_palette();
    let layout = layout(area);

    let glyph_style = if player.is_playing() {
        Style::default()
            .fg(palette.base_0b)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.base_05)
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", player.glyph()),
            glyph_style,
        ))),
        layout.button,
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            player.elapsed_label(),
            Style::default()
                .fg(palette.base_0d)
                .add_modifier(Modifier::UNDERLINED),
        ))),
        layout.elapsed,
    );

    let bar_width = layout.bar.width.saturating_sub(2);
    let filled = (f64::from(bar_width) * player.progress_percent() / 100.0).round() as u16;
    let filled = filled.min(bar_width);
    let mut bar = String::with_capacity(usize::from(bar_width) * 3);
    for i in 0..bar_width {
        bar.push(if i < filled { '█' } else { '░' });
    }
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(bar, Style::default().fg(palette.base_0d)),
        ])),
        layout.bar,
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", player.total_label()),
            Style::default().fg(palette.base_04),
        ))),
        layout.total,
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {:.2}x", player.rate()),
            Style::default().fg(palette.base_09),
        ))),
        layout.speed,
    );

    layout
}

/// Speed preset strip rendered under the active player row
pub fn render_speed_menu(f: &mut Frame, area: Rect, player: &Player) {
    let palette = current_palette();
    let active = player.active_preset();

    let mut spans = vec![
        Span::raw("   "),
        Span::styled("[−]", Style::default().fg(palette.base_05)),
        Span::raw(" "),
    ];

    for (idx, preset) in RATE_PRESETS.iter().enumerate() {
        let style = if active == Some(idx) {
            Style::default()
                .fg(palette.base_07)
                .bg(palette.base_02)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.base_04)
        };
        spans.push(Span::styled(format!(" {preset:.2}x "), style));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled("[+]", Style::default().fg(palette.base_05)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_maps_zones() {
        let layout = layout(Rect::new(0, 10, 60, 1));

        assert_eq!(hit_test(&layout, 1, 10), PlayerRowHit::PlayPause);
        assert_eq!(hit_test(&layout, 4, 10), PlayerRowHit::Elapsed);

        let bar_x = layout.bar.x + 5;
        match hit_test(&layout, bar_x, 10) {
            PlayerRowHit::Bar { offset, width } => {
                assert_eq!(offset, 5);
                assert_eq!(width, layout.bar.width);
            }
            other => panic!("expected bar hit, got {other:?}"),
        }

        assert_eq!(hit_test(&layout, 59, 10), PlayerRowHit::Speed);
        assert_eq!(hit_test(&layout, 5, 11), PlayerRowHit::Outside);
    }
}
