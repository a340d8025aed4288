use crate::ports::DialogVisibilityController;
use std::sync::atomic::{AtomicBool, Ordering};

/// A dialog open flag held by the host.
///
/// `on_close` only ever flips the flag to closed; reopening is the host's job.
#[derive(Debug)]
pub struct DialogHandle {
    open: AtomicBool,
}

impl DialogHandle {
    pub fn open() -> Self {
        Self {
            open: AtomicBool::new(true),
        }
    }

    pub fn reopen(&self) {
        self.open.store(true, Ordering::SeqCst);
    }
}

impl DialogVisibilityController for DialogHandle {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn on_close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}
