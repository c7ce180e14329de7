//! Memory watchdog: samples a process on a fixed cadence and raises
//! edge-triggered `Danger` / `Safe` transitions.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::process::{ProcessDirectory, ProcessSample};
use crate::{Error, Result};

/// Highest accepted sampling frequency; 1000 Hz is a 1 ms interval.
pub const MAX_FREQUENCY_HZ: u32 = 1000;

/// What the watchdog watches. Read at the start of every tick, so changes
/// apply from the next tick on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredTarget {
    pub process_name: String,
    pub memory_limit_kb: u64,
    frequency_hz: u32,
    sampling_interval: Duration,
}

impl MonitoredTarget {
    /// Builds a target sampled `frequency_hz` times per second.
    pub fn new(
        process_name: impl Into<String>,
        memory_limit_kb: u64,
        frequency_hz: u32,
    ) -> Result<Self> {
        Ok(Self {
            process_name: process_name.into(),
            memory_limit_kb,
            frequency_hz,
            sampling_interval: interval_for(frequency_hz)?,
        })
    }

    /// The memory limit in bytes.
    pub fn limit_bytes(&self) -> u64 {
        self.memory_limit_kb.saturating_mul(1024)
    }

    /// The sampling frequency as requested, in Hz.
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// The pause between ticks: `1000 / frequency_hz` milliseconds, rounded down.
    pub fn sampling_interval(&self) -> Duration {
        self.sampling_interval
    }

    /// Sets the frequency and with it the interval.
    pub fn set_frequency(&mut self, frequency_hz: u32) -> Result<()> {
        self.sampling_interval = interval_for(frequency_hz)?;
        self.frequency_hz = frequency_hz;
        Ok(())
    }
}

fn interval_for(frequency_hz: u32) -> Result<Duration> {
    if !(1..=MAX_FREQUENCY_HZ).contains(&frequency_hz) {
        return Err(Error::InvalidArgument {
            what: "frequency",
            value: frequency_hz.to_string(),
        });
    }
    Ok(Duration::from_millis(u64::from(1000 / frequency_hz)))
}

/// A change of the danger flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The first enumerated process at or over the limit.
    Danger(ProcessSample),
    /// No matching process is over the limit any more.
    Safe,
}

/// Receives watchdog transitions.
///
/// Called on the sampling thread; the next tick is not scheduled until
/// the call returns, so a slow observer slows sampling down.
pub trait WatchdogObserver: Send + Sync {
    fn on_transition(&self, transition: Transition);
}

impl<F> WatchdogObserver for F
where
    F: Fn(Transition) + Send + Sync,
{
    fn on_transition(&self, transition: Transition) {
        self(transition)
    }
}

/// The danger flag with edge-triggered transitions.
#[derive(Debug, Default)]
pub struct Hysteresis {
    in_danger: bool,
}

impl Hysteresis {
    pub fn in_danger(&self) -> bool {
        self.in_danger
    }

    /// Feeds one tick's verdict and returns the transition it causes, if any.
    pub fn observe(&mut self, offender: Option<ProcessSample>) -> Option<Transition> {
        match offender {
            Some(sample) if !self.in_danger => {
                self.in_danger = true;
                Some(Transition::Danger(sample))
            }
            None if self.in_danger => {
                self.in_danger = false;
                Some(Transition::Safe)
            }
            _ => None,
        }
    }
}

/// Returns the first sample at or over `limit_bytes`, in enumeration order.
pub fn first_over_limit(samples: &[ProcessSample], limit_bytes: u64) -> Option<ProcessSample> {
    samples
        .iter()
        .find(|s| s.working_set_bytes >= limit_bytes)
        .copied()
}

/// A point-in-time view of the watchdog.
#[derive(Debug, Clone)]
pub struct WatchdogStatus {
    pub running: bool,
    pub in_danger: bool,
    /// Matching processes seen by the last completed tick.
    pub detected: usize,
    pub target: MonitoredTarget,
}

#[derive(Default)]
struct TickState {
    hysteresis: Hysteresis,
    detected: usize,
}

struct Shared {
    directory: Arc<ProcessDirectory>,
    target: RwLock<MonitoredTarget>,
    observer: Arc<dyn WatchdogObserver>,
    state: Mutex<TickState>,
}

impl Shared {
    fn target(&self) -> MonitoredTarget {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn state(&self) -> MutexGuard<'_, TickState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct SamplingLoop {
    stop_tx: mpsc::Sender<()>,
    thread: thread::JoinHandle<()>,
}

/// Background memory sampler.
///
/// `Idle` until [`start`](Self::start), `Running` until
/// [`stop`](Self::stop). The danger flag is kept across restarts.
pub struct MemoryWatchdog {
    shared: Arc<Shared>,
    running: Mutex<Option<SamplingLoop>>,
}

impl MemoryWatchdog {
    pub fn new(
        directory: Arc<ProcessDirectory>,
        target: MonitoredTarget,
        observer: Arc<dyn WatchdogObserver>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                directory,
                target: RwLock::new(target),
                observer,
                state: Mutex::new(TickState::default()),
            }),
            running: Mutex::new(None),
        }
    }

    /// Returns a copy of the current target.
    pub fn target(&self) -> MonitoredTarget {
        self.shared.target()
    }

    /// Mutates the target; the loop picks the change up on its next tick.
    pub fn update_target<T>(&self, f: impl FnOnce(&mut MonitoredTarget) -> T) -> T {
        let mut target = self
            .shared
            .target
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut target)
    }

    /// Spawns the sampling loop.
    ///
    /// Fails with [`Error::AlreadyRunning`] if a loop is active.
    pub fn start(&self) -> Result<()> {
        let mut running = self.running();
        if running.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let shared = self.shared.clone();
        let thread = thread::spawn(move || sampling_loop(&shared, &stop_rx));
        *running = Some(SamplingLoop { stop_tx, thread });

        info!(process = %self.target().process_name, "watchdog started");
        Ok(())
    }

    /// Stops the sampling loop and waits for it to exit.
    ///
    /// No transition is delivered after this returns. When called from an
    /// observer (i.e. on the sampling thread itself) the loop is signalled
    /// and exits as soon as the observer returns.
    pub fn stop(&self) -> Result<()> {
        let Some(sampling) = self.running().take() else {
            return Err(Error::NotRunning);
        };

        let _ = sampling.stop_tx.send(());
        if sampling.thread.thread().id() == thread::current().id() {
            debug!("watchdog stop requested from the sampling thread");
            return Ok(());
        }
        if sampling.thread.join().is_err() {
            warn!("sampling thread panicked");
        }

        info!("watchdog stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running().is_some()
    }

    pub fn status(&self) -> WatchdogStatus {
        let state = self.shared.state();
        WatchdogStatus {
            running: self.is_running(),
            in_danger: state.hysteresis.in_danger(),
            detected: state.detected,
            target: self.shared.target(),
        }
    }

    fn running(&self) -> MutexGuard<'_, Option<SamplingLoop>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for MemoryWatchdog {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn sampling_loop(shared: &Shared, stop_rx: &mpsc::Receiver<()>) {
    loop {
        tick(shared);

        // Waking on the stop channel rather than sleeping means a stop
        // issued between ticks is honoured immediately.
        match stop_rx.recv_timeout(shared.target().sampling_interval()) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Runs one sample: query, compare, update the flag, notify.
fn tick(shared: &Shared) {
    let target = shared.target();
    let samples = match shared.directory.find_processes(&target.process_name) {
        Ok(samples) => samples,
        Err(e) => {
            warn!("sampling {} failed: {e}", target.process_name);
            return;
        }
    };

    let offender = first_over_limit(&samples, target.limit_bytes());
    let transition = {
        let mut state = shared.state();
        state.detected = samples.len();
        state.hysteresis.observe(offender)
    };

    if let Some(transition) = transition {
        info!(?transition, process = %target.process_name, "watchdog transition");
        shared.observer.on_transition(transition);
    }
}
