//! Re-entrancy guard
//!
//! A shared boolean raised while programmatic writes hit the scene graph, so
//! listeners watching for user edits can tell the two apart. This is a plain
//! flag, not a lock: it is only correct because every call runs synchronously
//! on one thread.

use std::cell::Cell;
use std::rc::Rc;

/// Shared "programmatic update in progress" flag.
#[derive(Debug, Clone, Default)]
pub struct SyncGuard(Rc<Cell<bool>>);

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.0.get()
    }

    /// Raise the flag until the returned token is dropped. Nested holds
    /// restore the outer state.
    pub fn hold(&self) -> GuardToken {
        let previous = self.0.replace(true);
        GuardToken {
            flag: Rc::clone(&self.0),
            previous,
        }
    }
}

/// Scope of a [`SyncGuard::hold`].
#[derive(Debug)]
pub struct GuardToken {
    flag: Rc<Cell<bool>>,
    previous: bool,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
