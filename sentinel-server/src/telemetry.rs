//! Host telemetry collection
//!
//! A single background task owns the sysinfo handles and publishes a fresh
//! snapshot through a watch channel once per second. Subscribers (the
//! WebSocket stream and the one-shot /stats endpoint) read from the channel,
//! so attaching or dropping a subscriber never touches the collection loop.

use std::time::Duration;

use serde::Serialize;
use sysinfo::{Disks, Networks, System};
use tokio::sync::watch;

/// Collection cadence
pub const COLLECT_INTERVAL: Duration = Duration::from_secs(1);

const GB: f64 = 1024.0 * 1024.0 * 1024.0;
const MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CpuStats {
    pub usage_percent: f64,
    pub count: usize,
    pub frequency_mhz: u64,
    pub per_cpu: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryStats {
    pub total_gb: f64,
    pub available_gb: f64,
    pub used_gb: f64,
    pub usage_percent: f64,
    pub swap_total_gb: f64,
    pub swap_used_gb: f64,
    pub swap_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiskStats {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkStats {
    pub bytes_sent_mb: f64,
    pub bytes_recv_mb: f64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HostStats {
    pub platform: String,
    pub platform_version: String,
    pub process_count: usize,
    pub boot_time: u64,
    pub uptime_hours: f64,
}

/// One point-in-time view of the host, broadcast to dashboard clients
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemSnapshot {
    pub timestamp: String,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    pub network: NetworkStats,
    pub system: HostStats,
}

/// Spawn the collector task; the returned receiver always holds the most
/// recent snapshot.
pub fn spawn_collector() -> watch::Receiver<SystemSnapshot> {
    let (tx, rx) = watch::channel(SystemSnapshot::default());

    tokio::spawn(async move {
        let mut sys = System::new_all();
        let mut networks = Networks::new_with_refreshed_list();
        let mut disks = Disks::new_with_refreshed_list();

        loop {
            sys.refresh_cpu();
            sys.refresh_memory();
            sys.refresh_processes();
            networks.refresh();
            disks.refresh();

            let snapshot = collect(&sys, &networks, &disks);
            // send_replace never fails even with zero subscribers
            tx.send_replace(snapshot);

            tokio::time::sleep(COLLECT_INTERVAL).await;
        }
    });

    rx
}

fn collect(sys: &System, networks: &Networks, disks: &Disks) -> SystemSnapshot {
    let cpu = CpuStats {
        usage_percent: round1(sys.global_cpu_info().cpu_usage() as f64),
        count: sys.cpus().len(),
        frequency_mhz: sys.cpus().first().map(|c| c.frequency()).unwrap_or(0),
        per_cpu: sys
            .cpus()
            .iter()
            .map(|c| round1(c.cpu_usage() as f64))
            .collect(),
    };

    let total_memory = sys.total_memory() as f64;
    let used_memory = sys.used_memory() as f64;
    let total_swap = sys.total_swap() as f64;
    let used_swap = sys.used_swap() as f64;
    let memory = MemoryStats {
        total_gb: round2(total_memory / GB),
        available_gb: round2(sys.available_memory() as f64 / GB),
        used_gb: round2(used_memory / GB),
        usage_percent: round1(percent(used_memory, total_memory)),
        swap_total_gb: round2(total_swap / GB),
        swap_used_gb: round2(used_swap / GB),
        swap_percent: round1(percent(used_swap, total_swap)),
    };

    let disk_total: u64 = disks.iter().map(|d| d.total_space()).sum();
    let disk_free: u64 = disks.iter().map(|d| d.available_space()).sum();
    let disk_used = disk_total.saturating_sub(disk_free);
    let disk = DiskStats {
        total_gb: round2(disk_total as f64 / GB),
        used_gb: round2(disk_used as f64 / GB),
        free_gb: round2(disk_free as f64 / GB),
        usage_percent: round1(percent(disk_used as f64, disk_total as f64)),
    };

    let mut network = NetworkStats::default();
    for (_name, data) in networks.iter() {
        network.bytes_sent_mb += data.total_transmitted() as f64 / MB;
        network.bytes_recv_mb += data.total_received() as f64 / MB;
        network.packets_sent += data.total_packets_transmitted();
        network.packets_recv += data.total_packets_received();
        network.errors_in += data.total_errors_on_received();
        network.errors_out += data.total_errors_on_transmitted();
    }
    network.bytes_sent_mb = round2(network.bytes_sent_mb);
    network.bytes_recv_mb = round2(network.bytes_recv_mb);

    let system = HostStats {
        platform: System::name().unwrap_or_else(|| "unknown".to_string()),
        platform_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
        process_count: sys.processes().len(),
        boot_time: System::boot_time(),
        uptime_hours: round1(System::uptime() as f64 / 3600.0),
    };

    SystemSnapshot {
        timestamp: chrono::Utc::now().to_rfc3339(),
        cpu,
        memory,
        disk,
        network,
        system,
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
