use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::process::canonical_name;
use crate::window::WindowHandle;

/// The windows hidden on behalf of one process name, in hide order.
#[derive(Debug, Default)]
pub struct HiddenSet {
    handles: Vec<WindowHandle>,
}

impl HiddenSet {
    /// Records a hidden window.
    ///
    /// Returns `false` if the window was already recorded.
    pub fn add(&mut self, window: WindowHandle) -> bool {
        if self.handles.contains(&window) {
            return false;
        }
        self.handles.push(window);
        true
    }

    /// Returns whether the window is recorded.
    pub fn contains(&self, window: WindowHandle) -> bool {
        self.handles.contains(&window)
    }

    /// Returns the recorded windows in hide order.
    pub fn handles(&self) -> &[WindowHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Remembers which windows `hide` removed so `show`/`unhide` can bring
/// exactly those back.
///
/// Keys are process names compared case-insensitively (with an optional
/// `.exe`). Each key has its own lock: callers hold it across a whole
/// hide pass so concurrent hides of the same process cannot interleave,
/// while hides of different processes proceed in parallel. Entries are
/// never pruned; a handle whose window has since closed stays recorded
/// and restoring it is a no-op at the OS level.
#[derive(Debug, Default)]
pub struct HiddenWindowRegistry {
    entries: Mutex<HashMap<String, Arc<Mutex<HiddenSet>>>>,
}

impl HiddenWindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `name`, creating an empty one if needed.
    pub fn entry(&self, name: &str) -> Arc<Mutex<HiddenSet>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.entry(canonical_name(name)).or_default().clone()
    }

    /// Returns a copy of the windows recorded for `name`.
    pub fn handles(&self, name: &str) -> Vec<WindowHandle> {
        let entry = {
            let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.get(&canonical_name(name)).cloned()
        };
        entry.map_or_else(Vec::new, |set| lock(&set).handles().to_vec())
    }
}

/// Locks a hidden set, recovering it if a previous holder panicked.
pub(crate) fn lock(set: &Mutex<HiddenSet>) -> MutexGuard<'_, HiddenSet> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_insertion_order_and_rejects_duplicates() {
        let mut set = HiddenSet::default();

        assert!(set.add(WindowHandle(3)));
        assert!(set.add(WindowHandle(1)));
        assert!(!set.add(WindowHandle(3)));

        assert_eq!(set.handles(), &[WindowHandle(3), WindowHandle(1)]);
        assert!(set.contains(WindowHandle(1)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn keys_are_case_insensitive() {
        // Arrange
        let registry = HiddenWindowRegistry::new();
        lock(&registry.entry("Notepad.exe")).add(WindowHandle(7));

        // Act
        let handles = registry.handles("NOTEPAD");

        // Assert
        assert_eq!(handles, vec![WindowHandle(7)]);
        assert!(registry.handles("calc").is_empty());
    }

    #[test]
    fn entry_returns_the_same_set_for_equivalent_names() {
        let registry = HiddenWindowRegistry::new();

        let a = registry.entry("game");
        let b = registry.entry("GAME.EXE");

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn concurrent_adds_under_one_key_are_not_lost() {
        // Arrange
        let registry = Arc::new(HiddenWindowRegistry::new());

        // Act
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let entry = registry.entry("app");
                        lock(&entry).add(WindowHandle((t + 1) * 1000 + i));
                        lock(&entry).add(WindowHandle(i));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        // Assert: 8 * 50 per-thread handles plus the 50 shared ones.
        assert_eq!(registry.handles("app").len(), 8 * 50 + 50);
    }
}
