//! Collapsible section state
//!
//! Each lesson section owns one `AccordionItem`. Local toggles are
//! per-instance; `ExpandAll`/`CollapseAll` broadcasts force every instance
//! uniformly regardless of prior state.

use crate::signals::Signal;

pub const INDICATOR_OPEN: &str = "−";
pub const INDICATOR_CLOSED: &str = "+";

#[derive(Debug, Clone, Copy)]
pub struct AccordionItem {
    open: bool,
}

impl AccordionItem {
    #[must_use]
    pub fn new(default_open: bool) -> Self {
        Self { open: default_open }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Textual state indicator shown next to the section title
    #[must_use]
    pub fn indicator(&self) -> &'static str {
        if self.open {
            INDICATOR_OPEN
        } else {
            INDICATOR_CLOSED
        }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn expand(&mut self) {
        self.open = true;
    }

    pub fn collapse(&mut self) {
        self.open = false;
    }

    /// React to a process-wide broadcast; other signals are ignored
    pub fn apply_signal(&mut self, signal: Signal) {
        match signal {
            Signal::ExpandAll => self.expand(),
            Signal::CollapseAll => self.collapse(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_state_and_indicator() {
        let mut item = AccordionItem::new(false);
        assert_eq!(item.indicator(), INDICATOR_CLOSED);

        item.toggle();
        assert!(item.is_open());
        assert_eq!(item.indicator(), INDICATOR_OPEN);

        item.toggle();
        assert!(!item.is_open());
        assert_eq!(item.indicator(), INDICATOR_CLOSED);
    }

    #[test]
    fn expand_all_forces_every_instance_open() {
        let mut items = vec![
            AccordionItem::new(false),
            AccordionItem::new(true),
            AccordionItem::new(false),
        ];

        for item in &mut items {
            item.apply_signal(Signal::ExpandAll);
        }

        for item in &items {
            assert!(item.is_open());
            assert_eq!(item.indicator(), INDICATOR_OPEN);
        }
    }

    #[test]
    fn collapse_all_forces_every_instance_closed() {
        let mut items = vec![
            AccordionItem::new(true),
            AccordionItem::new(false),
            AccordionItem::new(true),
        ];

        for item in &mut items {
            item.apply_signal(Signal::CollapseAll);
        }

        for item in &items {
            assert!(!item.is_open());
            assert_eq!(item.indicator(), INDICATOR_CLOSED);
        }
    }

    #[test]
    fn unrelated_signals_leave_state_alone() {
        let mut item = AccordionItem::new(true);
        item.apply_signal(Signal::FontChange(2));
        item.apply_signal(Signal::ThemeToggle);
        assert!(item.is_open());
    }
}
