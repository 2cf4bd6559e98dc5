use log::{debug, error, info, warn};
use notify::{RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{LazyLock, RwLock};

use crate::signals::Signal;

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "lectern";

pub const FONT_SIZE_MIN: u16 = 14;
pub const FONT_SIZE_MAX: u16 = 32;
pub const FONT_SIZE_DEFAULT: u16 = 18;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default = "default_font_size")]
    pub font_size: u16,

    /// True once the first-run intro has been dismissed
    #[serde(default)]
    pub intro_seen: bool,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_font_size() -> u16 {
    FONT_SIZE_DEFAULT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            dark_mode: false,
            font_size: FONT_SIZE_DEFAULT,
            intro_seen: false,
        }
    }
}

impl Settings {
    /// Apply a font-size delta, clamping to the allowed range.
    /// Out-of-range results are clamped, not rejected.
    pub fn apply_font_delta(&mut self, delta: i32) -> u16 {
        let next = i32::from(self.font_size) + delta;
        self.font_size = next.clamp(i32::from(FONT_SIZE_MIN), i32::from(FONT_SIZE_MAX)) as u16;
        self.font_size
    }
}

static SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Path of the settings file, whether or not it exists yet
#[must_use]
pub fn settings_file_path() -> Option<PathBuf> {
    preferred_config_path()
}

pub fn load_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return;
    };

    if path.exists() {
        load_settings_from_path(&path);
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        if let Ok(settings) = SETTINGS.read() {
            save_settings_to_file(&settings, &path);
        }
    }
}

/// Re-read the settings file after an external change.
/// Last writer wins; there is no merge.
pub fn reload_settings() {
    if let Some(path) = preferred_config_path() {
        if path.exists() {
            load_settings_from_path(&path);
        }
    }
}

fn load_settings_from_path(path: &PathBuf) {
    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");

                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }

                // Stored values may predate the clamp
                settings.font_size = settings.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);

                if let Ok(mut global) = SETTINGS.write() {
                    *global = settings;
                }
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );

    // Future migrations go here

    settings.version = CURRENT_VERSION;
}

pub fn save_settings() {
    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, cannot save settings");
        return;
    };

    if let Ok(settings) = SETTINGS.read() {
        save_settings_to_file(&settings, &path);
    }
}

fn save_settings_to_file(settings: &Settings, path: &PathBuf) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    match serde_yaml::to_string(settings) {
        Ok(content) => match fs::write(path, content) {
            Ok(()) => debug!("Saved settings to {path:?}"),
            Err(e) => error!("Failed to save settings to {path:?}: {e}"),
        },
        Err(e) => error!("Failed to serialize settings: {e}"),
    }
}

/// Watch the settings file for changes made by another process.
///
/// Change notifications arrive on the signal bus as
/// `Signal::PreferencesChanged`. The returned watcher must be kept alive
/// for the subscription to stay active. Watches the parent directory:
/// editors and other instances replace the file rather than write in place.
pub fn spawn_settings_watcher(signals: flume::Sender<Signal>) -> Option<notify::RecommendedWatcher> {
    let path = preferred_config_path()?;
    let dir = path.parent()?.to_path_buf();
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("Cannot create config directory for watching: {e}");
            return None;
        }
    }

    let file_name = path.file_name()?.to_os_string();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let Ok(event) = res else { return };
        let is_change = matches!(
            event.kind,
            notify::EventKind::Create(_) | notify::EventKind::Modify(_)
        );
        if is_change
            && event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()))
        {
            let _ = signals.send(Signal::PreferencesChanged);
        }
    })
    .map_err(|e| warn!("Settings watcher unavailable: {e}"))
    .ok()?;

    match watcher.watch(&dir, RecursiveMode::NonRecursive) {
        Ok(()) => {
            debug!("Watching {dir:?} for settings changes");
            Some(watcher)
        }
        Err(e) => {
            warn!("Failed to watch settings directory {dir:?}: {e}");
            None
        }
    }
}

// Public API for accessing/modifying settings

#[must_use]
pub fn is_dark_mode() -> bool {
    SETTINGS.read().map(|s| s.dark_mode).unwrap_or(false)
}

/// Flip dark mode; returns the new value
pub fn toggle_dark_mode() -> bool {
    let mut new_value = false;
    if let Ok(mut settings) = SETTINGS.write() {
        settings.dark_mode = !settings.dark_mode;
        new_value = settings.dark_mode;
    }
    save_settings();
    new_value
}

#[must_use]
pub fn font_size() -> u16 {
    SETTINGS
        .read()
        .map(|s| s.font_size)
        .unwrap_or(FONT_SIZE_DEFAULT)
}

/// Adjust the font size by `delta`, clamped to [14, 32].
/// Returns the applied value.
pub fn change_font_size(delta: i32) -> u16 {
    let mut applied = FONT_SIZE_DEFAULT;
    if let Ok(mut settings) = SETTINGS.write() {
        applied = settings.apply_font_delta(delta);
    }
    save_settings();
    applied
}

/// Reset the font size to the default; returns it
pub fn reset_font_size() -> u16 {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.font_size = FONT_SIZE_DEFAULT;
    }
    save_settings();
    FONT_SIZE_DEFAULT
}

/// Content scale derived from the font-size preference (1.0 at the default)
#[must_use]
pub fn content_scale() -> f32 {
    f32::from(font_size()) / f32::from(FONT_SIZE_DEFAULT)
}

#[must_use]
pub fn is_intro_seen() -> bool {
    SETTINGS.read().map(|s| s.intro_seen).unwrap_or(false)
}

pub fn mark_intro_seen() {
    if let Ok(mut settings) = SETTINGS.write() {
        settings.intro_seen = true;
    }
    save_settings();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn global_font_size_clamps_and_resets() {
        let applied = change_font_size(1000);
        assert_eq!(applied, FONT_SIZE_MAX);
        assert_eq!(font_size(), FONT_SIZE_MAX);

        assert_eq!(reset_font_size(), FONT_SIZE_DEFAULT);
        assert_eq!(font_size(), FONT_SIZE_DEFAULT);
        assert!((content_scale() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    #[serial]
    fn global_dark_mode_toggles() {
        let first = toggle_dark_mode();
        assert_eq!(is_dark_mode(), first);
        let second = toggle_dark_mode();
        assert_eq!(second, !first);
    }

    #[test]
    fn font_delta_clamps_both_directions() {
        let mut settings = Settings::default();

        for _ in 0..40 {
            settings.apply_font_delta(2);
        }
        assert_eq!(settings.font_size, FONT_SIZE_MAX);

        for _ in 0..40 {
            settings.apply_font_delta(-2);
        }
        assert_eq!(settings.font_size, FONT_SIZE_MIN);
    }

    #[test]
    fn font_delta_sequence_stays_in_range() {
        let mut settings = Settings::default();
        let deltas = [4, -10, 30, -1, -100, 50, 2, -3];

        for delta in deltas {
            let applied = settings.apply_font_delta(delta);
            assert!((FONT_SIZE_MIN..=FONT_SIZE_MAX).contains(&applied));
            assert_eq!(applied, settings.font_size);
        }
    }

    #[test]
    fn oversized_delta_clamps_silently() {
        let mut settings = Settings::default();
        assert_eq!(settings.apply_font_delta(1000), FONT_SIZE_MAX);
        assert_eq!(settings.apply_font_delta(-1000), FONT_SIZE_MIN);
    }

    #[test]
    fn settings_yaml_round_trip() {
        let settings = Settings {
            version: CURRENT_VERSION,
            dark_mode: true,
            font_size: 24,
            intro_seen: true,
        };

        let yaml = serde_yaml::to_string(&settings).unwrap();
        let back: Settings = serde_yaml::from_str(&yaml).unwrap();

        assert!(back.dark_mode);
        assert_eq!(back.font_size, 24);
        assert!(back.intro_seen);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let back: Settings = serde_yaml::from_str("version: 1\n").unwrap();
        assert!(!back.dark_mode);
        assert_eq!(back.font_size, FONT_SIZE_DEFAULT);
        assert!(!back.intro_seen);
    }
}
