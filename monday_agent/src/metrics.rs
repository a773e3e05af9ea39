//! Metrics collection for monday_agent.
//!
//! [`MetricsSource`] is the boundary to the OS facility; [`SysinfoSource`]
//! implements it with sysinfo. [`collect`] turns a raw sample into the wire
//! [`Snapshot`], logging and zero-filling whatever could not be read.

use std::fmt::Write as _;

use sysinfo::{
    Disks, MemoryRefreshKind, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::select::select_top;
use crate::types::{keys, FsStat, LoadAverage, MemStat, ProcStat, Snapshot, SwapStat};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("system metrics are not supported on this platform")]
    Unsupported,
    #[error("{0} is unavailable")]
    Unavailable(&'static str),
    #[error("process {0} could not be read")]
    Process(u32),
    #[error("usage for {0} could not be read")]
    Usage(String),
}

pub type Reading<T> = Result<T, MetricsError>;

/// Raw figures from the OS facility, one result per field.
#[derive(Debug, Clone)]
pub struct RawMetrics {
    /// Seconds since boot.
    pub uptime: Reading<u64>,
    pub load_average: Reading<LoadAverage>,
    pub memory: Reading<MemStat>,
    pub swap: Reading<SwapStat>,
    /// One entry per enumerated process.
    pub processes: Vec<Reading<ProcStat>>,
    /// One entry per mounted filesystem.
    pub filesystems: Vec<Reading<FsStat>>,
}

pub trait MetricsSource: Send + Sync {
    fn sample(&self) -> Result<RawMetrics, MetricsError>;
}

/// Queries the local host through sysinfo. Holds no state: every sample
/// builds its own handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoSource;

impl MetricsSource for SysinfoSource {
    fn sample(&self) -> Result<RawMetrics, MetricsError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(MetricsError::Unsupported);
        }

        let mut sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_memory()
                .with_cpu()
                .without_tasks(),
        );

        let processes = sys
            .processes()
            .values()
            .map(|p| {
                let pid = p.pid().as_u32();
                // Threads and zombies carry no memory of their own.
                if p.thread_kind().is_some() || p.status() == sysinfo::ProcessStatus::Zombie {
                    return Err(MetricsError::Process(pid));
                }
                Ok(ProcStat {
                    pid,
                    ppid: p.parent().map(|pp| pp.as_u32()).unwrap_or(0),
                    mem: p.memory(),
                    time_start: p.start_time().saturating_mul(1_000),
                    time_total: p.accumulated_cpu_time(),
                    command: p.name().to_string_lossy().into_owned(),
                })
            })
            .collect();

        let disks = Disks::new_with_refreshed_list();
        let filesystems = disks
            .list()
            .iter()
            .map(|d| {
                let dir = d.mount_point().to_string_lossy().into_owned();
                let total = d.total_space();
                // Pseudo filesystems report no capacity.
                if total == 0 {
                    return Err(MetricsError::Usage(dir));
                }
                let avail = d.available_space();
                Ok(FsStat {
                    dev: d.name().to_string_lossy().into_owned(),
                    dir,
                    total,
                    used: total.saturating_sub(avail),
                    avail,
                })
            })
            .collect();

        Ok(RawMetrics {
            uptime: Ok(System::uptime()),
            load_average: load_average(),
            memory: memory(&sys),
            swap: Ok(SwapStat {
                total: sys.total_swap(),
                used: sys.used_swap(),
                free: sys.free_swap(),
            }),
            processes,
            filesystems,
        })
    }
}

#[cfg(not(windows))]
fn load_average() -> Reading<LoadAverage> {
    let avg = System::load_average();
    Ok(LoadAverage {
        one: avg.one,
        five: avg.five,
        fifteen: avg.fifteen,
    })
}

#[cfg(windows)]
fn load_average() -> Reading<LoadAverage> {
    Err(MetricsError::Unavailable("load average"))
}

fn memory(sys: &System) -> Reading<MemStat> {
    mem_stat(sys.total_memory(), sys.free_memory(), sys.available_memory())
}

/// `used` counts page cache and buffers (total - free); the `actual_*`
/// pair excludes them (total - available).
fn mem_stat(total: u64, free: u64, available: u64) -> Reading<MemStat> {
    if total == 0 {
        return Err(MetricsError::Unavailable("memory"));
    }
    Ok(MemStat {
        total,
        used: total.saturating_sub(free),
        free,
        actual_used: total.saturating_sub(available),
        actual_free: available,
    })
}

/// Build one snapshot. Never fails: a failed field is logged, left at zero
/// and listed in [`Snapshot::unavailable`].
pub fn collect(source: &dyn MetricsSource, top_n: usize) -> Snapshot {
    let raw = match source.sample() {
        Ok(raw) => raw,
        Err(e) => {
            error!("system metrics unavailable: {e}");
            return Snapshot::unavailable();
        }
    };

    let mut snap = Snapshot::default();
    let missing = &mut snap.unavailable;

    snap.uptime = settle(raw.uptime.map(format_uptime), &[keys::UPTIME], missing);
    let avg = settle(raw.load_average, &keys::LOAD_AVG, missing);
    snap.memory = settle(raw.memory, &[keys::MEM], missing);
    snap.swap = settle(raw.swap, &[keys::SWAP], missing);
    snap.set_load_average(avg);

    let procs = raw
        .processes
        .into_iter()
        .filter_map(|p| p.map_err(|e| debug!("skipping process: {e}")).ok())
        .collect();
    snap.top_processes = select_top(procs, top_n);

    snap.filesystems = raw
        .filesystems
        .into_iter()
        .filter_map(|fs| fs.map_err(|e| debug!("skipping filesystem: {e}")).ok())
        .collect();

    snap
}

fn settle<T: Default>(reading: Reading<T>, fields: &[&str], missing: &mut Vec<String>) -> T {
    reading.unwrap_or_else(|e| {
        warn!(?fields, "collection failed: {e}");
        missing.extend(fields.iter().map(|k| k.to_string()));
        T::default()
    })
}

/// `"2 days,  3:04"` style uptime; the day prefix is omitted under a day.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs / 3_600) % 24;
    let minutes = (secs / 60) % 60;

    let mut out = String::new();
    if days > 0 {
        let plural = if days > 1 { "s" } else { "" };
        let _ = write!(out, "{days} day{plural}, ");
    }
    let _ = write!(out, "{hours:>2}:{minutes:02}");
    out
}
