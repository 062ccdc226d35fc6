//! Simulated system figures for the shell's status bar. Nothing is measured.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemStats {
    pub cpu: u32,
    pub memory: u32,
    pub disk: u32,
}

impl SystemStats {
    /// Draws each figure from `rand`, which must yield values in `[0, 1)`.
    /// Ranges: cpu 10..50, memory 30..80, disk 10..40 (upper bounds exclusive).
    pub fn sample(mut rand: impl FnMut() -> f64) -> Self {
        let mut pick = |base: f64, span: f64| (base + rand() * span).floor() as u32;
        SystemStats {
            cpu: pick(10.0, 40.0),
            memory: pick(30.0, 50.0),
            disk: pick(10.0, 30.0),
        }
    }
}

/// Largest non-zero units only: minutes are dropped once days are shown and
/// seconds once hours or days are.
pub fn format_uptime(elapsed_ms: f64) -> String {
    let total_secs = (elapsed_ms.max(0.0) / 1000.0).floor() as u64;
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = (total_secs / 3600) % 24;
    let days = total_secs / 86_400;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 && days == 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 && days == 0 && hours == 0 {
        parts.push(format!("{}s", seconds));
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: f64 = 1000.0;
    const MIN: f64 = 60.0 * SEC;
    const HOUR: f64 = 60.0 * MIN;
    const DAY: f64 = 24.0 * HOUR;

    #[test]
    fn test_uptime_zero() {
        assert_eq!(format_uptime(0.0), "0s");
        assert_eq!(format_uptime(999.0), "0s");
        assert_eq!(format_uptime(-5.0), "0s");
    }

    #[test]
    fn test_uptime_minutes_and_seconds() {
        assert_eq!(format_uptime(42.0 * SEC), "42s");
        assert_eq!(format_uptime(3.0 * MIN + 7.0 * SEC), "3m 7s");
        assert_eq!(format_uptime(3.0 * MIN), "3m");
    }

    #[test]
    fn test_uptime_hours_hide_seconds() {
        assert_eq!(format_uptime(2.0 * HOUR + 5.0 * MIN + 9.0 * SEC), "2h 5m");
        assert_eq!(format_uptime(HOUR + 30.0 * SEC), "1h");
    }

    #[test]
    fn test_uptime_days_hide_minutes() {
        assert_eq!(format_uptime(DAY + 4.0 * HOUR + 12.0 * MIN), "1d 4h");
        assert_eq!(format_uptime(3.0 * DAY + 59.0 * MIN), "3d");
    }

    #[test]
    fn test_stats_ranges() {
        let low = SystemStats::sample(|| 0.0);
        assert_eq!(
            low,
            SystemStats {
                cpu: 10,
                memory: 30,
                disk: 10
            }
        );
        let high = SystemStats::sample(|| 0.999_999);
        assert_eq!(
            high,
            SystemStats {
                cpu: 49,
                memory: 79,
                disk: 39
            }
        );
    }

    #[test]
    fn test_stats_draw_independently() {
        let mut draws = [0.5, 0.0, 0.25].into_iter();
        let stats = SystemStats::sample(move || draws.next().unwrap_or(0.0));
        assert_eq!(stats.cpu, 30);
        assert_eq!(stats.memory, 30);
        assert_eq!(stats.disk, 17);
    }
}
