//! Metrics-provider capability seam.
//!
//! System monitoring verbs (cpu, memory, processes, uptime, df) go through
//! the `MetricsProvider` trait; `SystemMetrics` is the sysinfo-backed
//! production implementation. The dispatcher owns all output formatting so
//! fakes only need to return raw numbers.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use sysinfo::{Disks, System};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub mem_percent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    pub used_bytes: u64,
    pub total_bytes: u64,
    pub percent: f32,
}

/// Capability interface for process and system monitoring queries.
///
/// Methods take `&mut self` because real collectors refresh internal
/// snapshots between reads.
pub trait MetricsProvider {
    fn cpu_percent(&mut self) -> f32;
    fn memory(&mut self) -> MemoryStats;
    fn processes(&mut self) -> Vec<ProcessInfo>;
    fn uptime(&self) -> Duration;
    /// Usage of the disk holding `path`, or `None` if no disk matches.
    fn disk_usage(&mut self, path: &Path) -> Option<DiskStats>;
}

/// sysinfo-backed metrics collector.
pub struct SystemMetrics {
    sys: System,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }

    /// Hostname for the prompt, if the OS exposes one.
    pub fn host_name() -> Option<String> {
        System::host_name()
    }
}

impl MetricsProvider for SystemMetrics {
    fn cpu_percent(&mut self) -> f32 {
        // Two refreshes separated by the minimum interval; a single sample
        // always reads 0.
        self.sys.refresh_cpu();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        self.sys.refresh_cpu();
        self.sys.global_cpu_info().cpu_usage()
    }

    fn memory(&mut self) -> MemoryStats {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        let used = self.sys.used_memory();
        let percent = if total == 0 {
            0.0
        } else {
            used as f32 / total as f32 * 100.0
        };
        MemoryStats {
            used_bytes: used,
            total_bytes: total,
            percent,
        }
    }

    fn processes(&mut self) -> Vec<ProcessInfo> {
        self.sys.refresh_processes();
        self.sys.refresh_memory();
        let total = self.sys.total_memory().max(1);
        self.sys
            .processes()
            .iter()
            .map(|(pid, proc_)| ProcessInfo {
                pid: pid.as_u32(),
                name: proc_.name().to_string(),
                cpu_percent: proc_.cpu_usage(),
                mem_percent: proc_.memory() as f32 / total as f32 * 100.0,
            })
            .collect()
    }

    fn uptime(&self) -> Duration {
        Duration::from_secs(System::uptime())
    }

    fn disk_usage(&mut self, path: &Path) -> Option<DiskStats> {
        let disks = Disks::new_with_refreshed_list();
        // Longest mount point that prefixes the path wins.
        let disk = disks
            .iter()
            .filter(|d| path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())?;
        let total = disk.total_space();
        let used = total.saturating_sub(disk.available_space());
        let percent = if total == 0 {
            0.0
        } else {
            used as f32 / total as f32 * 100.0
        };
        Some(DiskStats {
            used_bytes: used,
            total_bytes: total,
            percent,
        })
    }
}
