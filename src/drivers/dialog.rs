use std::cell::RefCell;
use std::rc::Rc;

use crate::collaborators::ConfirmDialog;

#[derive(Debug, Default)]
struct DialogState {
    title: String,
    body: String,
    open: bool,
    opened: usize,
}

/// Confirmation dialog whose state a host can read to draw it.
#[derive(Debug, Clone, Default)]
pub struct MemoryDialog {
    state: Rc<RefCell<DialogState>>,
}

impl MemoryDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    pub fn body(&self) -> String {
        self.state.borrow().body.clone()
    }

    /// How many times the dialog has been opened.
    pub fn opened(&self) -> usize {
        self.state.borrow().opened
    }
}

impl ConfirmDialog for MemoryDialog {
    fn configure(&mut self, title: &str, body: &str) {
        let mut state = self.state.borrow_mut();
        state.title = title.to_string();
        state.body = body.to_string();
    }

    fn open(&mut self) {
        let mut state = self.state.borrow_mut();
        state.open = true;
        state.opened += 1;
    }

    fn close(&mut self) {
        self.state.borrow_mut().open = false;
    }

    fn is_open(&self) -> bool {
        self.state.borrow().open
    }
}
