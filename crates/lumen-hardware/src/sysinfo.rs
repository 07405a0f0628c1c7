//! System information probes
//!
//! Read-only snapshot of the device the kiosk runs on, for the System Info
//! screen. Every field is optional: a probe that fails just leaves its field
//! empty.

use tracing::debug;

use crate::tool::ToolRunner;

// ----------------------------------------------------------------------------
// Report
// ----------------------------------------------------------------------------

/// Root-filesystem usage as reported by `df -h /`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageReport {
    pub total: String,
    pub used: String,
    pub free: String,
}

/// Snapshot of the host system
#[derive(Debug, Clone, Default)]
pub struct SystemReport {
    pub cpu_model: Option<String>,
    pub memory_total_mb: Option<u64>,
    pub storage: Option<StorageReport>,
    pub os_name: Option<String>,
    pub uptime: Option<String>,
}

// ----------------------------------------------------------------------------
// Probes
// ----------------------------------------------------------------------------

fn first_field_value<'a>(haystack: &'a str, key: &str) -> Option<&'a str> {
    haystack.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        (name.trim() == key).then(|| value.trim())
    })
}

fn parse_meminfo_total_mb(meminfo: &str) -> Option<u64> {
    let value = first_field_value(meminfo, "MemTotal")?;
    let kb: u64 = value.split_whitespace().next()?.parse().ok()?;
    Some(kb / 1024)
}

fn parse_os_release(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let value = line.strip_prefix("PRETTY_NAME=")?;
        Some(value.trim_matches('"').to_string())
    })
}

fn format_uptime(uptime_contents: &str) -> Option<String> {
    let seconds: f64 = uptime_contents.split_whitespace().next()?.parse().ok()?;
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    Some(format!("{}h {}m", hours, minutes))
}

fn parse_df_root(df_output: &str) -> Option<StorageReport> {
    let line = df_output.lines().nth(1)?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return None;
    }
    Some(StorageReport {
        total: fields[1].to_string(),
        used: fields[2].to_string(),
        free: fields[3].to_string(),
    })
}

/// Collect a full report. Individual probe failures are absorbed.
pub async fn collect(runner: &dyn ToolRunner) -> SystemReport {
    let mut report = SystemReport::default();

    if let Ok(cpuinfo) = tokio::fs::read_to_string("/proc/cpuinfo").await {
        report.cpu_model = first_field_value(&cpuinfo, "model name")
            .or_else(|| first_field_value(&cpuinfo, "Model"))
            .map(str::to_string);
    }

    if let Ok(meminfo) = tokio::fs::read_to_string("/proc/meminfo").await {
        report.memory_total_mb = parse_meminfo_total_mb(&meminfo);
    }

    if let Ok(os_release) = tokio::fs::read_to_string("/etc/os-release").await {
        report.os_name = parse_os_release(&os_release);
    }
    if report.os_name.is_none() {
        report.os_name = Some("Linux".to_string());
    }

    if let Ok(uptime) = tokio::fs::read_to_string("/proc/uptime").await {
        report.uptime = format_uptime(&uptime);
    }

    if let Ok(output) = runner.run("df", &["-h", "/"]).await {
        if output.success {
            report.storage = parse_df_root(&output.stdout);
        }
    }

    debug!("system report collected");
    report
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meminfo_parse() {
        let meminfo = "MemTotal:        3882924 kB\nMemFree:         1234567 kB\n";
        assert_eq!(parse_meminfo_total_mb(meminfo), Some(3791));
    }

    #[test]
    fn test_os_release_parse() {
        let contents = "NAME=\"Raspbian\"\nPRETTY_NAME=\"Raspbian GNU/Linux 12\"\n";
        assert_eq!(parse_os_release(contents).as_deref(), Some("Raspbian GNU/Linux 12"));
    }

    #[test]
    fn test_uptime_format() {
        assert_eq!(format_uptime("7283.45 14000.00").as_deref(), Some("2h 1m"));
    }

    #[test]
    fn test_df_parse() {
        let df = "Filesystem      Size  Used Avail Use% Mounted on\n/dev/root        29G  4.2G   24G  16% /\n";
        let storage = parse_df_root(df).unwrap();
        assert_eq!(storage.total, "29G");
        assert_eq!(storage.used, "4.2G");
        assert_eq!(storage.free, "24G");
    }

    #[test]
    fn test_df_parse_short_line() {
        assert!(parse_df_root("Filesystem\n/dev/root 29G\n").is_none());
    }
}
