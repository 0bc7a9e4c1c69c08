use std::fmt;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Point-in-time host overview, logged next to every alert.
#[derive(Debug, Clone, Copy)]
pub struct SystemReport {
    pub cpu_percent: f32,
    pub memory_total_bytes: u64,
    pub memory_available_bytes: u64,
    pub memory_used_bytes: u64,
    pub disk_total_bytes: u64,
    pub disk_used_bytes: u64,
    pub disk_free_bytes: u64,
}

impl SystemReport {
    pub fn memory_percent(&self) -> f32 {
        percent_of(self.memory_used_bytes, self.memory_total_bytes)
    }

    pub fn disk_percent(&self) -> f32 {
        percent_of(self.disk_used_bytes, self.disk_total_bytes)
    }
}

impl fmt::Display for SystemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cpu_percent={:.1} memory_total_gb={:.2} memory_available_gb={:.2} memory_used_gb={:.2} memory_percent={:.1} disk_total_gb={:.2} disk_used_gb={:.2} disk_free_gb={:.2} disk_percent={:.1}",
            self.cpu_percent,
            gib(self.memory_total_bytes),
            gib(self.memory_available_bytes),
            gib(self.memory_used_bytes),
            self.memory_percent(),
            gib(self.disk_total_bytes),
            gib(self.disk_used_bytes),
            gib(self.disk_free_bytes),
            self.disk_percent(),
        )
    }
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

fn percent_of(part: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    ((part as f64 / total as f64) * 100.0) as f32
}

#[cfg(test)]
mod tests {
    use super::SystemReport;

    #[test]
    fn report_renders_gigabytes_and_percentages() {
        let gib = 1024 * 1024 * 1024;
        let report = SystemReport {
            cpu_percent: 81.25,
            memory_total_bytes: 16 * gib,
            memory_available_bytes: 4 * gib,
            memory_used_bytes: 12 * gib,
            disk_total_bytes: 100 * gib,
            disk_used_bytes: 90 * gib,
            disk_free_bytes: 10 * gib,
        };

        let rendered = report.to_string();
        assert!(rendered.contains("memory_total_gb=16.00"));
        assert!(rendered.contains("memory_percent=75.0"));
        assert!(rendered.contains("disk_free_gb=10.00"));
        assert!(rendered.contains("disk_percent=90.0"));
    }

    #[test]
    fn zero_totals_do_not_divide_by_zero() {
        let report = SystemReport {
            cpu_percent: 0.0,
            memory_total_bytes: 0,
            memory_available_bytes: 0,
            memory_used_bytes: 0,
            disk_total_bytes: 0,
            disk_used_bytes: 0,
            disk_free_bytes: 0,
        };

        assert_eq!(report.memory_percent(), 0.0);
        assert_eq!(report.disk_percent(), 0.0);
    }
}
