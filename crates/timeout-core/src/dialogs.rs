//! Dialog exclusivity

use timeout_api::DialogKind;

/// The dialogs of one tab. Holding a single slot makes "at most one open"
/// hold by construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DialogSet {
    open: Option<DialogKind>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently open dialog
    pub fn current(&self) -> Option<DialogKind> {
        self.open
    }

    pub fn is_open(&self, dialog: DialogKind) -> bool {
        self.open == Some(dialog)
    }

    /// Open `dialog`, returning the other dialog it displaced, if any.
    /// Opening the dialog that is already open changes nothing.
    pub fn open(&mut self, dialog: DialogKind) -> Option<DialogKind> {
        let displaced = self.open.filter(|open| *open != dialog);
        self.open = Some(dialog);
        displaced
    }

    /// Close `dialog` if it is the open one
    pub fn close(&mut self, dialog: DialogKind) -> bool {
        if self.is_open(dialog) {
            self.open = None;
            true
        } else {
            false
        }
    }

    /// Close whichever dialog is open
    pub fn close_any(&mut self) -> Option<DialogKind> {
        self.open.take()
    }
}
