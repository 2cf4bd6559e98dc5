use ratatui::style::Color;
use std::sync::atomic::{AtomicBool, Ordering};

// Color palette structure
#[derive(Clone)]
pub struct Base16Palette {
    pub base_00: Color, // Background
    pub base_01: Color, // Lighter background
    pub base_02: Color, // Selection background
    pub base_03: Color, // Comments, muted text
    pub base_04: Color, // Dark foreground
    pub base_05: Color, // Default foreground
    pub base_06: Color, // Light foreground
    pub base_07: Color, // Brightest text
    pub base_08: Color, // Red
    pub base_09: Color, // Orange
    pub base_0a: Color, // Yellow
    pub base_0b: Color, // Green
    pub base_0c: Color, // Cyan
    pub base_0d: Color, // Blue
    pub base_0e: Color, // Purple
    pub base_0f: Color, // Brown
}

static DARK_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_dark_mode(enabled: bool) {
    DARK_MODE.store(enabled, Ordering::Relaxed);
}

#[must_use]
pub fn is_dark_mode() -> bool {
    DARK_MODE.load(Ordering::Relaxed)
}

#[must_use]
pub fn current_palette() -> &'static Base16Palette {
    if is_dark_mode() {
        &LECTERN_DARK
    } else {
        &LECTERN_LIGHT
    }
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >> 8) & 0xFF) as u8,
        (hex & 0xFF) as u8,
    )
}

// Paper-like light palette (default)
static LECTERN_LIGHT: Base16Palette = Base16Palette {
    base_00: rgb(0xF7F3EB),
    base_01: rgb(0xEEE8DC),
    base_02: rgb(0xDDD4C2),
    base_03: rgb(0x9C937E),
    base_04: rgb(0x6B655A),
    base_05: rgb(0x433F38),
    base_06: rgb(0x2E2B26),
    base_07: rgb(0x1C1A16),
    base_08: rgb(0xC03D2F),
    base_09: rgb(0xC2662B),
    base_0a: rgb(0xA87B15),
    base_0b: rgb(0x4E7A27),
    base_0c: rgb(0x2B8077),
    base_0d: rgb(0x2D6BA3),
    base_0e: rgb(0x7A4FA0),
    base_0f: rgb(0x8A5A3C),
};

// Oceanic-style dark palette
static LECTERN_DARK: Base16Palette = Base16Palette {
    base_00: rgb(0x1B2B34),
    base_01: rgb(0x343D46),
    base_02: rgb(0x4F5B66),
    base_03: rgb(0x65737E),
    base_04: rgb(0xA7ADBA),
    base_05: rgb(0xC0C5CE),
    base_06: rgb(0xCDD3DE),
    base_07: rgb(0xF0F4F8),
    base_08: rgb(0xEC5F67),
    base_09: rgb(0xF99157),
    base_0a: rgb(0xFAC863),
    base_0b: rgb(0x99C794),
    base_0c: rgb(0x5FB3B3),
    base_0d: rgb(0x6699CC),
    base_0e: rgb(0xC594C5),
    base_0f: rgb(0xAB7967),
};

impl Base16Palette {
    // Get colors for focused/unfocused panels
    pub fn get_panel_colors(&self, is_focused: bool) -> (Color, Color, Color) {
        if is_focused {
            (self.base_07, self.base_04, self.base_00)
        } else {
            (self.base_03, self.base_03, self.base_00)
        }
    }

    // Get selection colors for focused/unfocused states
    pub fn get_selection_colors(&self, is_focused: bool) -> (Color, Color) {
        if is_focused {
            (self.base_02, self.base_06)
        } else {
            (self.base_02, self.base_03)
        }
    }

    pub fn popup_border_color(&self) -> Color {
        self.base_0c
    }
}
