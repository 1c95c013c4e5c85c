//! Fixed-period tick loop.
//!
//! Paces [`Vcu::tick`] with `clock_nanosleep(TIMER_ABSTIME)` under the `rt`
//! feature and `std::thread::sleep` otherwise, measures every tick and emits
//! the periodic diagnostic snapshot.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to the given CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`: RT priority.
//!
//! An overrun is counted and logged; the tick schedule is kept, the loop
//! never aborts on it.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info, warn};

use vcu_common::config::ConfigError;

use crate::io::{FrameSource, VehicleIo};
use crate::snapshot::VehicleSnapshot;
use crate::vcu::Vcu;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum tick duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum tick duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Ticks that exceeded the period.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (time between expected and actual wake).
    pub max_latency_ns: i64,
}

impl CycleStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average tick time [ns] (returns 0 if no ticks).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors during RT setup or loop start.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),
    /// Monotonic clock unavailable.
    #[error("clock error: {0}")]
    Clock(String),
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};

    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch a stack buffer so the loop never takes a stack page fault.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

/// Pin the current thread to a specific CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Set SCHED_FIFO with the given RT priority.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup sequence; every step is a no-op without the `rt` feature.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Drives the core at its configured tick period.
///
/// Both loops keep an absolute wake schedule and record how late each wake
/// was in [`CycleStats::max_latency_ns`].
pub struct CycleRunner<IO, RX> {
    vcu: Vcu<IO, RX>,
    stats: CycleStats,
    period_ns: i64,
    diag_interval: u64,
}

impl<IO: VehicleIo, RX: FrameSource> CycleRunner<IO, RX> {
    /// Wrap a core. The period and snapshot interval come from its config.
    pub fn new(vcu: Vcu<IO, RX>) -> Result<Self, CycleError> {
        vcu.config().validate()?;
        let period_ns = i64::from(vcu.config().tick_period_us) * 1_000;
        let diag_interval = u64::from(vcu.config().diag_interval_ticks);
        Ok(Self {
            vcu,
            stats: CycleStats::new(),
            period_ns,
            diag_interval,
        })
    }

    #[inline]
    pub fn vcu(&self) -> &Vcu<IO, RX> {
        &self.vcu
    }

    #[inline]
    pub fn vcu_mut(&mut self) -> &mut Vcu<IO, RX> {
        &mut self.vcu
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Give the core back after the loop.
    pub fn into_inner(self) -> Vcu<IO, RX> {
        self.vcu
    }

    /// Run until `running` is cleared or `max_ticks` ticks have executed.
    ///
    /// `before_tick` is called ahead of every tick with the tick index and
    /// the core; the simulation plant uses it to feed the inbound queue.
    pub fn run<F>(
        &mut self,
        running: &AtomicBool,
        max_ticks: Option<u64>,
        mut before_tick: F,
    ) -> Result<(), CycleError>
    where
        F: FnMut(u64, &mut Vcu<IO, RX>),
    {
        info!(
            period_us = self.period_ns / 1_000,
            max_ticks, "entering tick loop"
        );

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop(running, max_ticks, &mut before_tick);
        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop(running, max_ticks, &mut before_tick);

        let counters = self.vcu.counters();
        info!(
            ticks = self.stats.cycle_count,
            avg_ns = self.stats.avg_cycle_ns(),
            max_ns = self.stats.max_cycle_ns,
            overruns = self.stats.overruns,
            rx_frames = counters.rx_frames,
            rx_ignored = counters.rx_ignored,
            rx_malformed = counters.rx_malformed,
            tx_dropped = counters.tx_dropped,
            "tick loop finished"
        );
        result
    }

    fn keep_going(&self, running: &AtomicBool, max_ticks: Option<u64>) -> bool {
        running.load(Ordering::SeqCst) && max_ticks.is_none_or(|limit| self.vcu.ticks() < limit)
    }

    /// RT loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop<F>(
        &mut self,
        running: &AtomicBool,
        max_ticks: Option<u64>,
        before_tick: &mut F,
    ) -> Result<(), CycleError>
    where
        F: FnMut(u64, &mut Vcu<IO, RX>),
    {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || clock_gettime(clock).map_err(|e| CycleError::Clock(format!("clock_gettime: {e}")));
        let mut next_wake = now()?;

        while self.keep_going(running, max_ticks) {
            next_wake = timespec_add_ns(next_wake, self.period_ns);

            let start = now()?;
            before_tick(self.vcu.ticks(), &mut self.vcu);
            self.vcu.tick();
            let end = now()?;

            let duration_ns = timespec_diff_ns(&end, &start);

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
            let woke = now()?;
            self.after_tick(duration_ns, timespec_diff_ns(&woke, &next_wake).abs());
        }
        Ok(())
    }

    /// Hosted loop using `std::thread::sleep`.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop<F>(
        &mut self,
        running: &AtomicBool,
        max_ticks: Option<u64>,
        before_tick: &mut F,
    ) -> Result<(), CycleError>
    where
        F: FnMut(u64, &mut Vcu<IO, RX>),
    {
        use std::time::{Duration, Instant};

        let period = Duration::from_nanos(self.period_ns as u64);
        let mut next_wake = Instant::now();
        while self.keep_going(running, max_ticks) {
            next_wake += period;

            let start = Instant::now();
            before_tick(self.vcu.ticks(), &mut self.vcu);
            self.vcu.tick();
            let elapsed = start.elapsed();

            if let Some(remaining) = next_wake.checked_duration_since(Instant::now()) {
                std::thread::sleep(remaining);
            }
            let late = Instant::now().saturating_duration_since(next_wake);
            self.after_tick(elapsed.as_nanos() as i64, late.as_nanos() as i64);
        }
        Ok(())
    }

    /// Statistics, overrun accounting and the periodic snapshot.
    fn after_tick(&mut self, duration_ns: i64, latency_ns: i64) {
        self.stats.record(duration_ns, latency_ns);
        if duration_ns > self.period_ns {
            self.stats.overruns += 1;
            debug!(duration_ns, budget_ns = self.period_ns, "tick overrun");
        }

        let tick = self.vcu.ticks();
        if self.diag_interval > 0 && tick % self.diag_interval == 0 {
            let snapshot = VehicleSnapshot::capture(tick, self.vcu.state(), self.vcu.counters());
            match snapshot.to_json() {
                Ok(json) => info!(target: "vcu::snapshot", snapshot = %json, "diagnostic snapshot"),
                Err(e) => warn!(error = %e, "snapshot encoding failed"),
            }
        }
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

/// Add nanoseconds to a TimeSpec.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;

    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    while nanos < 0 {
        secs -= 1;
        nanos += 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// Compute the difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
