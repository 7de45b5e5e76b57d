use chrono::{DateTime, Local, TimeZone};

/// Local wall-clock time as `HH:MM:SS`.
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

pub fn local_clock() -> String {
    format_clock(&Local::now())
}

/// Human uptime from a boot timestamp, e.g. `3d 4h 12m`.
pub fn format_uptime(boot_time: u64, now_unix: u64) -> String {
    let secs = now_unix.saturating_sub(boot_time);
    let days = secs / 86_400;
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
