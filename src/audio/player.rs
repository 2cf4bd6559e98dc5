//! Player state mirrored from a media element
//!
//! The element is the authority for position, duration, and rate; the
//! player re-reads them from the drained event stream so displayed values
//! always equal the last observed element values.

use super::media::{MediaElement, MediaEvent};

pub const RATE_MIN: f64 = 0.25;
pub const RATE_MAX: f64 = 3.00;
pub const RATE_STEP: f64 = 0.25;

/// Preset rates offered in the speed menu
pub const RATE_PRESETS: [f64; 3] = [1.00, 1.25, 1.50];

/// A preset is "active" when the rate matches within this tolerance
const PRESET_EPSILON: f64 = 0.01;

pub struct Player {
    pub title: String,
    element: Box<dyn MediaElement>,

    playing: bool,
    position: f64,
    duration: f64,
    rate: f64,
}

impl Player {
    #[must_use]
    pub fn new(title: impl Into<String>, element: Box<dyn MediaElement>) -> Self {
        // Duration may already be known before the first metadata event
        let duration = element.duration();
        let duration = if duration.is_finite() { duration } else { 0.0 };
        let rate = element.rate();

        Self {
            title: title.into(),
            element,
            playing: false,
            position: 0.0,
            duration,
            rate,
        }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Play if paused, pause if playing
    pub fn toggle_playback(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.element.play();
            self.playing = true;
        }
    }

    pub fn pause(&mut self) {
        self.element.pause();
        self.playing = false;
    }

    /// Glyph for the play/pause control
    #[must_use]
    pub fn glyph(&self) -> &'static str {
        if self.playing { "⏸" } else { "▶" }
    }

    /// Progress-bar fill percentage, guarded against unknown duration
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            (self.position / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Seek from a click at `click_x` on a bar of `bar_width` cells
    pub fn seek_fraction(&mut self, click_x: u16, bar_width: u16) {
        if bar_width == 0 || self.duration <= 0.0 {
            return;
        }
        let fraction = f64::from(click_x) / f64::from(bar_width);
        self.jump_to(fraction * self.duration);
    }

    /// Seek to an absolute position in seconds
    pub fn jump_to(&mut self, position: f64) {
        self.element.seek(position);
        self.position = self.element.position();
    }

    /// Set the playback rate, clamped to [0.25, 3.00]
    pub fn set_rate(&mut self, rate: f64) {
        let clamped = rate.clamp(RATE_MIN, RATE_MAX);
        self.element.set_rate(clamped);
        self.rate = clamped;
    }

    /// Step the rate by ±0.25, saturating at the bounds
    pub fn step_rate(&mut self, delta: f64) {
        self.set_rate(self.rate + delta);
    }

    /// Index of the preset matching the current rate, if any
    #[must_use]
    pub fn active_preset(&self) -> Option<usize> {
        RATE_PRESETS
            .iter()
            .position(|preset| (preset - self.rate).abs() < PRESET_EPSILON)
    }

    #[must_use]
    pub fn elapsed_label(&self) -> String {
        format_time(self.position)
    }

    #[must_use]
    pub fn total_label(&self) -> String {
        format_time(self.duration)
    }

    /// Advance the element and mirror its notifications.
    /// Returns the drained events so callers can observe `Started` for
    /// cross-instance exclusion.
    pub fn drain(&mut self) -> Vec<MediaEvent> {
        self.element.tick();
        let events = self.element.drain_events();

        for event in &events {
            match *event {
                MediaEvent::Started => self.playing = true,
                MediaEvent::PositionChanged { position } => self.position = position,
                MediaEvent::MetadataLoaded { duration } => {
                    self.duration = if duration.is_finite() { duration } else { 0.0 };
                }
                MediaEvent::Ended => {
                    // End of media: back to paused, displayed progress reset
                    self.playing = false;
                    self.position = 0.0;
                }
            }
        }

        events
    }
}

/// "MM:SS", zero-padded; non-finite input renders as 00:00
#[must_use]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
