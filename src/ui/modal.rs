use serde::Serialize;
use std::{collections::BTreeSet, time::Duration};

/// Delay between starting the close animation and closing the dialog.
pub const MODAL_CLOSE_ANIMATION: Duration = Duration::from_millis(500);

/// Open dialogs and the page scroll lock that goes with them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Modals {
    open: BTreeSet<String>,
    closing: BTreeSet<String>,
    scrolling_disabled: bool,
}

impl Modals {
    pub fn open(&mut self, id: &str) {
        self.scrolling_disabled = true;
        self.closing.remove(id);
        self.open.insert(id.to_string());
    }

    /// Start the close animation of `id`; [`Modals::finish_close`] removes it.
    pub fn close(&mut self, id: &str) {
        self.scrolling_disabled = false;
        if self.open.contains(id) {
            self.closing.insert(id.to_string());
        }
    }

    pub fn finish_close(&mut self, id: &str) {
        if self.closing.remove(id) {
            self.open.remove(id);
        }
    }

    /// Escape closes native dialogs without our handlers; only the scroll lock is released.
    pub fn escape_pressed(&mut self) {
        self.scrolling_disabled = false;
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id) && !self.closing.contains(id)
    }

    pub fn scrolling_disabled(&self) -> bool {
        self.scrolling_disabled
    }
}
