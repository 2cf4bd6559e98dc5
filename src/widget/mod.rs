//! UI widgets: popups and views

pub mod intro_popup;
pub mod pdf_view;
pub mod player_row;
pub mod settings_popup;

pub use intro_popup::{IntroAction, IntroPopup};
pub use player_row::{PlayerRowHit, PlayerRowLayout};
pub use settings_popup::{FONT_STEP, SettingsAction, SettingsPopup};
