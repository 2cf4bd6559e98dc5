//! Process-wide signal bus
//!
//! The only inter-widget contract surface: navbar-style broadcasts
//! (expand/collapse, font changes, theme toggle) and the external
//! preferences-changed notification from the settings watcher.

use flume::{Receiver, Sender};

/// Broadcast signals consumed by widgets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Open every accordion section
    ExpandAll,
    /// Close every accordion section
    CollapseAll,
    /// Adjust the content font size by a delta
    FontChange(i32),
    /// Reset the content font size to its default
    FontReset,
    /// Flip dark mode
    ThemeToggle,
    /// The settings file was changed by another process
    PreferencesChanged,
}

/// Unbounded fan-in bus drained once per event-loop turn
pub struct SignalBus {
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    /// Clone a sender for producers living on other threads (e.g. the
    /// settings watcher)
    #[must_use]
    pub fn sender(&self) -> Sender<Signal> {
        self.tx.clone()
    }

    pub fn broadcast(&self, signal: Signal) {
        let _ = self.tx.send(signal);
    }

    /// Drain all queued signals in arrival order
    pub fn drain(&self) -> Vec<Signal> {
        self.rx.try_iter().collect()
    }
}
