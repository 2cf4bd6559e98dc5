//! Media element abstraction
//!
//! Decoding and output are external concerns; the player widgets only need
//! position/duration/rate state, transport commands, and the notification
//! stream. `ClockMedia` is the built-in element: it advances its position
//! against the wall clock while playing, scaled by the playback rate.

use std::time::Instant;

/// Notifications drained from a media element once per event-loop turn
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MediaEvent {
    /// Playback started (the element accepted a play command)
    Started,
    /// Playback position moved
    PositionChanged { position: f64 },
    /// Duration became known
    MetadataLoaded { duration: f64 },
    /// Playback reached the end of the media
    Ended,
}

/// The external media element surface
pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    /// Current position in seconds
    fn position(&self) -> f64;
    /// Jump to a position in seconds
    fn seek(&mut self, position: f64);

    /// Total duration in seconds; 0.0 while unknown
    fn duration(&self) -> f64;

    fn rate(&self) -> f64;
    fn set_rate(&mut self, rate: f64);

    /// Advance internal time; called once per event-loop turn
    fn tick(&mut self) {}

    /// Take all notifications queued since the last drain
    fn drain_events(&mut self) -> Vec<MediaEvent>;
}

/// Wall-clock driven media element
pub struct ClockMedia {
    duration: f64,
    position: f64,
    rate: f64,
    playing: bool,
    last_tick: Option<Instant>,
    events: Vec<MediaEvent>,
}

impl ClockMedia {
    #[must_use]
    pub fn new(duration: f64) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        Self {
            duration,
            position: 0.0,
            rate: 1.0,
            playing: false,
            last_tick: None,
            events: vec![MediaEvent::MetadataLoaded { duration }],
        }
    }
}

impl MediaElement for ClockMedia {
    fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.last_tick = Some(Instant::now());
            self.events.push(MediaEvent::Started);
        }
    }

    fn pause(&mut self) {
        self.playing = false;
        self.last_tick = None;
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, position: f64) {
        self.position = position.clamp(0.0, self.duration);
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
    }

    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            self.position += now.duration_since(last).as_secs_f64() * self.rate;
        }
        self.last_tick = Some(now);

        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            self.last_tick = None;
            self.events.push(MediaEvent::PositionChanged {
                position: self.position,
            });
            self.events.push(MediaEvent::Ended);
        } else {
            self.events.push(MediaEvent::PositionChanged {
                position: self.position,
            });
        }
    }

    fn drain_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Scripted element for tests: every transition is driven manually
#[cfg(test)]
pub(crate) struct ScriptedMedia {
    pub duration: f64,
    pub position: f64,
    pub rate: f64,
    pub playing: bool,
    pub events: Vec<MediaEvent>,
}

#[cfg(test)]
impl ScriptedMedia {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            position: 0.0,
            rate: 1.0,
            playing: false,
            events: vec![MediaEvent::MetadataLoaded { duration }],
        }
    }

    /// Simulate the element reporting progress
    pub fn emit_position(&mut self, position: f64) {
        self.position = position;
        self.events.push(MediaEvent::PositionChanged { position });
    }

    /// Simulate playback reaching the end
    pub fn finish(&mut self) {
        self.position = self.duration;
        self.playing = false;
        self.events.push(MediaEvent::Ended);
    }
}

#[cfg(test)]
impl MediaElement for ScriptedMedia {
    fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.events.push(MediaEvent::Started);
        }
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, position: f64) {
        self.position = position.clamp(0.0, self.duration);
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn drain_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn reports_metadata_on_creation() {
        let mut media = ClockMedia::new(120.0);
        assert_eq!(
            media.drain_events(),
            vec![MediaEvent::MetadataLoaded { duration: 120.0 }]
        );
        assert_eq!(media.duration(), 120.0);
    }

    #[test]
    fn invalid_duration_degrades_to_zero() {
        let media = ClockMedia::new(f64::NAN);
        assert_eq!(media.duration(), 0.0);
        let media = ClockMedia::new(-5.0);
        assert_eq!(media.duration(), 0.0);
    }

    #[test]
    fn play_emits_started_once() {
        let mut media = ClockMedia::new(60.0);
        let _ = media.drain_events();

        media.play();
        media.play();
        assert_eq!(media.drain_events(), vec![MediaEvent::Started]);
        assert!(!media.is_paused());
    }

    #[test]
    fn position_advances_while_playing() {
        let mut media = ClockMedia::new(60.0);
        media.play();
        thread::sleep(Duration::from_millis(30));
        media.tick();

        assert!(media.position() > 0.0);
        assert!(media.position() < 1.0);
    }

    #[test]
    fn reaching_the_end_pauses_and_emits_ended() {
        let mut media = ClockMedia::new(0.01);
        media.play();
        let _ = media.drain_events();

        thread::sleep(Duration::from_millis(30));
        media.tick();

        let events = media.drain_events();
        assert!(events.contains(&MediaEvent::Ended));
        assert!(media.is_paused());
        assert_eq!(media.position(), media.duration());
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut media = ClockMedia::new(100.0);
        media.seek(250.0);
        assert_eq!(media.position(), 100.0);
        media.seek(-5.0);
        assert_eq!(media.position(), 0.0);
    }
}
