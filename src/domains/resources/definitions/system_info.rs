//! System information resource definition.
//!
//! Host facts are read from `/proc` where available. Anything that cannot be
//! determined is reported as unknown rather than failing the read.

use std::collections::BTreeMap;
use std::fs;

use chrono::Local;
use serde::Serialize;

use super::ResourceDefinition;
use crate::domains::resources::service::{DynamicResourceType, ResourceContent};

/// Environment variables included in the report.
const REPORTED_ENV_VARS: &[&str] = &["PATH", "LANG", "USER", "HOME", "RUST_LOG"];

/// System information resource (dynamic).
pub struct SystemInfoResource;

impl ResourceDefinition for SystemInfoResource {
    const URI: &'static str = "system://info";
    const NAME: &'static str = "system_info";
    const DESCRIPTION: &'static str = "Provides information about the system running the MCP server";
    const MIME_TYPE: &'static str = "application/json";

    fn content() -> ResourceContent {
        ResourceContent::Dynamic(DynamicResourceType::SystemInfo)
    }
}

/// Memory figures in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
    pub swap_total: u64,
    pub swap_used: u64,
    pub swap_free: u64,
    pub swap_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub platform: String,
    pub platform_version: String,
    pub architecture: String,
    pub server_version: String,
    pub cpu_count: usize,
    /// `None` when the platform does not expose memory statistics.
    pub memory_info: Option<MemoryInfo>,
    pub current_time: String,
    pub uptime: String,
    pub environment_variables: BTreeMap<String, String>,
}

impl SystemInfo {
    /// Collect a snapshot of the running system.
    pub fn collect() -> Self {
        let environment_variables = REPORTED_ENV_VARS
            .iter()
            .map(|name| (name.to_string(), std::env::var(name).unwrap_or_default()))
            .collect();

        Self {
            hostname: hostname(),
            platform: std::env::consts::OS.to_string(),
            platform_version: read_trimmed("/proc/sys/kernel/osrelease")
                .unwrap_or_else(|| "unknown".to_string()),
            architecture: std::env::consts::ARCH.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            cpu_count: std::thread::available_parallelism().map_or(0, |n| n.get()),
            memory_info: fs::read_to_string("/proc/meminfo")
                .ok()
                .and_then(|text| parse_meminfo(&text)),
            current_time: Local::now().to_rfc3339(),
            uptime: fs::read_to_string("/proc/uptime")
                .ok()
                .and_then(|text| parse_uptime(&text))
                .map(format_uptime)
                .unwrap_or_else(|| "Unknown".to_string()),
            environment_variables,
        }
    }
}

fn read_trimmed(path: &str) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn hostname() -> String {
    read_trimmed("/proc/sys/kernel/hostname")
        .or_else(|| read_trimmed("/etc/hostname"))
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Parse `/proc/meminfo`. Values there are in KiB.
pub fn parse_meminfo(text: &str) -> Option<MemoryInfo> {
    let field = |key: &str| -> Option<u64> {
        text.lines().find_map(|line| {
            let rest = line.strip_prefix(key)?.strip_prefix(':')?;
            let kib: u64 = rest.split_whitespace().next()?.parse().ok()?;
            Some(kib * 1024)
        })
    };

    let total = field("MemTotal")?;
    let available = field("MemAvailable").or_else(|| field("MemFree"))?;
    let swap_total = field("SwapTotal").unwrap_or(0);
    let swap_free = field("SwapFree").unwrap_or(0);
    let used = total.saturating_sub(available);
    let swap_used = swap_total.saturating_sub(swap_free);

    Some(MemoryInfo {
        total,
        available,
        used,
        percent: percent(used, total),
        swap_total,
        swap_used,
        swap_free,
        swap_percent: percent(swap_used, swap_total),
    })
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

/// Seconds since boot from `/proc/uptime`.
pub fn parse_uptime(text: &str) -> Option<u64> {
    let seconds: f64 = text.split_whitespace().next()?.parse().ok()?;
    Some(seconds as u64)
}

pub fn format_uptime(total: u64) -> String {
    let days = total / 86_400;
    let hours = total % 86_400 / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;
    format!(
        "{} days, {} hours, {} minutes, {} seconds",
        days, hours, minutes, seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "MemTotal:       16000000 kB
MemFree:         2000000 kB
MemAvailable:    4000000 kB
Buffers:          500000 kB
SwapTotal:       2000000 kB
SwapFree:        1500000 kB
";

    #[test]
    fn test_metadata() {
        assert_eq!(SystemInfoResource::URI, "system://info");
        assert_eq!(SystemInfoResource::NAME, "system_info");
        assert_eq!(SystemInfoResource::MIME_TYPE, "application/json");
    }

    #[test]
    fn test_parse_meminfo() {
        let info = parse_meminfo(MEMINFO).unwrap();
        assert_eq!(info.total, 16_000_000 * 1024);
        assert_eq!(info.available, 4_000_000 * 1024);
        assert_eq!(info.used, 12_000_000 * 1024);
        assert_eq!(info.percent, 75.0);
        assert_eq!(info.swap_used, 500_000 * 1024);
        assert_eq!(info.swap_percent, 25.0);
    }

    #[test]
    fn test_parse_meminfo_missing_total() {
        assert!(parse_meminfo("MemFree: 10 kB\n").is_none());
        assert!(parse_meminfo("").is_none());
    }

    #[test]
    fn test_uptime() {
        assert_eq!(parse_uptime("93784.52 350000.00\n"), Some(93784));
        assert_eq!(parse_uptime("garbage"), None);
        assert_eq!(
            format_uptime(93784),
            "1 days, 2 hours, 3 minutes, 4 seconds"
        );
    }

    #[test]
    fn test_collect() {
        let info = SystemInfo::collect();
        assert_eq!(info.server_version, env!("CARGO_PKG_VERSION"));
        assert!(!info.platform.is_empty());
        assert_eq!(info.environment_variables.len(), REPORTED_ENV_VARS.len());
        assert!(chrono::DateTime::parse_from_rfc3339(&info.current_time).is_ok());
    }
}
