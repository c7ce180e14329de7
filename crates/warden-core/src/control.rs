use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::Result;
use crate::process::ProcessDirectory;
use crate::registry::{self, HiddenWindowRegistry};
use crate::style::WS_VISIBLE;
use crate::window::{ShowCommand, StyleKind, WindowHandle};

/// Number of striped locks guarding style read-modify-write cycles.
const STYLE_LOCK_STRIPES: usize = 16;

/// Process and window manipulation by process name.
///
/// Every operation re-resolves its targets from the live OS state. A name
/// that matches nothing is a silent no-op; only OS call failures surface
/// as errors, and only after every target has been attempted.
pub struct WindowControl {
    directory: Arc<ProcessDirectory>,
    hidden: HiddenWindowRegistry,
    style_locks: [Mutex<()>; STYLE_LOCK_STRIPES],
}

impl WindowControl {
    pub fn new(directory: Arc<ProcessDirectory>) -> Self {
        Self {
            directory,
            hidden: HiddenWindowRegistry::new(),
            style_locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    pub fn directory(&self) -> &ProcessDirectory {
        &self.directory
    }

    /// The windows this instance has hidden, per process name.
    pub fn hidden(&self) -> &HiddenWindowRegistry {
        &self.hidden
    }

    /// Terminates every process named `name`. Returns how many were killed.
    pub fn kill(&self, name: &str) -> Result<usize> {
        let pids = self.directory.enumerate(name)?;
        let processes = self.directory.processes();
        let killed = attempt_all(pids, |pid| processes.terminate(pid))?;
        info!(name, killed, "killed processes");
        Ok(killed)
    }

    /// Hides every visible window of `name` and records it for restoring.
    ///
    /// Windows that are already hidden are neither touched nor recorded.
    /// Returns how many windows were hidden by this call.
    pub fn hide(&self, name: &str) -> Result<usize> {
        let entry = self.hidden.entry(name);
        let mut hidden = registry::lock(&entry);

        let windows = self.directory.windows();
        let mut count = 0;
        attempt_all(self.directory.list_window_handles(name)?, |w| {
            if windows.style(w, StyleKind::Basic)? & WS_VISIBLE == 0 {
                return Ok(());
            }
            windows.show(w, ShowCommand::Hide)?;
            if hidden.add(w) {
                count += 1;
            }
            Ok(())
        })?;

        info!(name, count, "hid windows");
        Ok(count)
    }

    /// Restores the windows `hide` recorded for `name` with `SW_SHOWMINNOACTIVE`.
    pub fn unhide(&self, name: &str) -> Result<usize> {
        self.restore(name, ShowCommand::ShowMinNoActivate)
    }

    /// Restores the windows `hide` recorded for `name` with `SW_SHOWNA`.
    pub fn show(&self, name: &str) -> Result<usize> {
        self.restore(name, ShowCommand::ShowNoActivate)
    }

    /// Minimizes every window of `name`, hidden registry aside.
    pub fn minimize(&self, name: &str) -> Result<usize> {
        let windows = self.directory.windows();
        attempt_all(self.directory.list_window_handles(name)?, |w| {
            windows.show(w, ShowCommand::Minimize)
        })
    }

    /// Returns the style of the first window resolved for `name`, or 0.
    ///
    /// "First" is OS enumeration order, not the process's main window.
    pub fn style(&self, name: &str, kind: StyleKind) -> Result<u32> {
        match self.directory.list_window_handles(name)?.first() {
            Some(&w) => self.directory.windows().style(w, kind),
            None => Ok(0),
        }
    }

    /// ORs `bits` into the style of every window of `name`.
    pub fn add_style(&self, name: &str, kind: StyleKind, bits: u32) -> Result<usize> {
        self.modify_style(name, kind, |style| style | bits)
    }

    /// Clears `bits` from the style of every window of `name`.
    pub fn remove_style(&self, name: &str, kind: StyleKind, bits: u32) -> Result<usize> {
        self.modify_style(name, kind, |style| style & !bits)
    }

    /// Returns the PIDs of every process named `name`.
    pub fn enumerate(&self, name: &str) -> Result<Vec<u32>> {
        self.directory.enumerate(name)
    }

    /// Returns every window of `name` with its owning PID.
    pub fn enumerate_windows(&self, name: &str) -> Result<Vec<(WindowHandle, Option<u32>)>> {
        Ok(self
            .directory
            .list_window_handles(name)?
            .into_iter()
            .map(|w| (w, self.directory.window_owner(w)))
            .collect())
    }

    fn restore(&self, name: &str, command: ShowCommand) -> Result<usize> {
        let windows = self.directory.windows();
        let restored = attempt_all(self.hidden.handles(name), |w| windows.show(w, command))?;
        debug!(name, restored, ?command, "restored windows");
        Ok(restored)
    }

    fn modify_style(&self, name: &str, kind: StyleKind, f: impl Fn(u32) -> u32) -> Result<usize> {
        let windows = self.directory.windows();
        attempt_all(self.directory.list_window_handles(name)?, |w| {
            // Serializes our own read-modify-write cycles on this window;
            // other programs writing the same style can still interleave.
            let _guard = self.style_lock(w);
            let current = windows.style(w, kind)?;
            windows.set_style(w, kind, f(current))
        })
    }

    fn style_lock(&self, window: WindowHandle) -> std::sync::MutexGuard<'_, ()> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        window.hash(&mut hasher);
        let stripe = (hasher.finish() % STYLE_LOCK_STRIPES as u64) as usize;
        self.style_locks[stripe]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Applies `f` to every target, continuing past failures.
///
/// Returns the number of successes, or the first error once all targets
/// have been attempted.
fn attempt_all<T>(targets: Vec<T>, mut f: impl FnMut(T) -> Result<()>) -> Result<usize> {
    let mut done = 0;
    let mut first_error = None;
    for target in targets {
        match f(target) {
            Ok(()) => done += 1,
            Err(e) => {
                debug!("operation failed: {e}");
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(done),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakePlatform;

    const VISIBLE: u32 = WS_VISIBLE | 0x00C0_0000;
    const HIDDEN: u32 = 0x00C0_0000;

    fn control(fake: &FakePlatform) -> WindowControl {
        WindowControl::new(Arc::new(fake.directory()))
    }

    fn app_with_windows(fake: &FakePlatform) {
        fake.add_process(10, "app.exe", 0);
        fake.add_process(11, "app.exe", 0);
        fake.add_window(0x10, 10, VISIBLE);
        fake.add_window(0x11, 11, VISIBLE);
        fake.add_window(0x12, 10, HIDDEN);
    }

    #[test]
    fn hide_then_show_restores_exactly_the_previously_visible_windows() {
        // Arrange
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);

        // Act
        let hidden = control.hide("app").unwrap();

        // Assert
        assert_eq!(hidden, 2);
        assert!(!fake.is_visible(0x10));
        assert!(!fake.is_visible(0x11));
        assert_eq!(
            control.hidden().handles("app"),
            vec![WindowHandle(0x10), WindowHandle(0x11)]
        );

        // Act
        let restored = control.show("app").unwrap();

        // Assert
        assert_eq!(restored, 2);
        assert!(fake.is_visible(0x10));
        assert!(fake.is_visible(0x11));
        assert!(!fake.is_visible(0x12));
    }

    #[test]
    fn repeated_hide_never_records_a_window_twice() {
        // Arrange
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);
        control.hide("app").unwrap();

        // Act: an external tool re-shows a window, then we hide again.
        fake.reveal(0x10);
        let second = control.hide("APP.EXE").unwrap();
        let third = control.hide("app").unwrap();

        // Assert
        assert_eq!(second, 0);
        assert_eq!(third, 0);
        assert!(!fake.is_visible(0x10));
        assert_eq!(
            control.hidden().handles("app"),
            vec![WindowHandle(0x10), WindowHandle(0x11)]
        );
    }

    #[test]
    fn restore_keeps_registry_entries_and_is_repeatable() {
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);
        control.hide("app").unwrap();

        assert_eq!(control.unhide("app").unwrap(), 2);
        assert_eq!(control.show("app").unwrap(), 2);
        assert_eq!(control.hidden().handles("app").len(), 2);
    }

    #[test]
    fn restore_of_a_closed_window_is_a_silent_no_op() {
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);
        control.hide("app").unwrap();
        fake.close_window(0x10);

        assert_eq!(control.show("app").unwrap(), 2);
        assert!(fake.is_visible(0x11));
    }

    #[test]
    fn show_without_prior_hide_does_nothing() {
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);

        assert_eq!(control.show("app").unwrap(), 0);
        assert!(!fake.is_visible(0x12));
    }

    #[test]
    fn add_then_remove_style_restores_original_bits() {
        // Arrange
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);
        let original = fake.style_of(0x10);

        // Act
        control.add_style("app", StyleKind::Basic, 0x8000_0000).unwrap();
        let added = fake.style_of(0x10);
        control.remove_style("app", StyleKind::Basic, 0x8000_0000).unwrap();

        // Assert
        assert_eq!(added, original | 0x8000_0000);
        assert_eq!(fake.style_of(0x10), original);
    }

    #[test]
    fn concurrent_style_edits_on_one_window_are_not_lost() {
        // Arrange
        let fake = FakePlatform::new();
        fake.add_process(1, "app.exe", 0);
        fake.add_window(0x10, 1, HIDDEN);
        let control = control(&fake);
        let bits: Vec<u32> = (0..16).map(|i| 1 << i).collect();

        // Act
        std::thread::scope(|s| {
            for &bit in &bits {
                let control = &control;
                s.spawn(move || {
                    for _ in 0..50 {
                        control.add_style("app", StyleKind::Basic, bit).unwrap();
                        control.remove_style("app", StyleKind::Basic, bit).unwrap();
                    }
                    control.add_style("app", StyleKind::Basic, bit).unwrap();
                });
            }
        });
        let all_added = fake.style_of(0x10);

        std::thread::scope(|s| {
            for &bit in &bits {
                let control = &control;
                s.spawn(move || control.remove_style("app", StyleKind::Basic, bit).unwrap());
            }
        });

        // Assert
        assert_eq!(all_added, HIDDEN | 0xFFFF);
        assert_eq!(fake.style_of(0x10), HIDDEN);
    }

    #[test]
    fn extended_style_is_independent_of_basic_style() {
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);

        control.add_style("app", StyleKind::Extended, 0x80).unwrap();

        assert_eq!(control.style("app", StyleKind::Extended).unwrap(), 0x80);
        assert_eq!(control.style("app", StyleKind::Basic).unwrap(), VISIBLE);
    }

    #[test]
    fn style_reads_the_first_enumerated_window() {
        let fake = FakePlatform::new();
        fake.add_process(1, "two.exe", 0);
        fake.add_window(0x2, 1, 0x1);
        fake.add_window(0x1, 1, 0x2);
        let control = control(&fake);

        assert_eq!(control.style("two", StyleKind::Basic).unwrap(), 0x1);
    }

    #[test]
    fn style_without_windows_is_zero() {
        let fake = FakePlatform::new();
        fake.add_process(1, "console.exe", 0);
        let control = control(&fake);

        assert_eq!(control.style("console", StyleKind::Basic).unwrap(), 0);
        assert_eq!(control.style("nothing", StyleKind::Extended).unwrap(), 0);
    }

    #[test]
    fn kill_terminates_every_match() {
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        fake.add_process(99, "other.exe", 0);
        let control = control(&fake);

        assert_eq!(control.kill("app").unwrap(), 2);
        assert_eq!(fake.terminated(), vec![10, 11]);
        assert_eq!(control.enumerate("other").unwrap(), vec![99]);
    }

    #[test]
    fn minimize_touches_every_window_but_not_the_registry() {
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);

        assert_eq!(control.minimize("app").unwrap(), 3);
        assert!(control.hidden().handles("app").is_empty());
    }

    #[test]
    fn enumerate_windows_pairs_handles_with_owners() {
        let fake = FakePlatform::new();
        app_with_windows(&fake);
        let control = control(&fake);

        let windows = control.enumerate_windows("app").unwrap();

        assert_eq!(windows[0], (WindowHandle(0x10), Some(10)));
        assert_eq!(windows[1], (WindowHandle(0x11), Some(11)));
    }

    #[test]
    fn concurrent_hides_record_each_window_once() {
        // Arrange
        let fake = FakePlatform::new();
        fake.add_process(1, "busy.exe", 0);
        for h in 0..32 {
            fake.add_window(0x100 + h, 1, VISIBLE);
        }
        let control = Arc::new(control(&fake));

        // Act
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let control = control.clone();
                std::thread::spawn(move || control.hide("busy").unwrap())
            })
            .collect();
        let total: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();

        // Assert
        assert_eq!(total, 32);
        assert_eq!(control.hidden().handles("busy").len(), 32);
    }
}
