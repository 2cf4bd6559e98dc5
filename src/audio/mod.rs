//! Audio playback widgets

mod media;
mod player;
mod registry;
mod time_jump;

pub use media::{ClockMedia, MediaElement, MediaEvent};
pub use player::{
    Player, RATE_MAX, RATE_MIN, RATE_PRESETS, RATE_STEP, format_time,
};
pub use registry::PlayerRegistry;
pub use time_jump::{JumpField, TimeJumpAction, TimeJumpDialog};
