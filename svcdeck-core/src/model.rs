use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

pub type ServiceName = String;

/// Run status reported by the backend for one service.
///
/// The wire value is a free string; anything other than `running` or
/// `failed` (including `exited` and `unknown`) lands in `Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    Stopped,
    Failed,
}

impl ServiceStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "running" => Self::Running,
            "failed" => Self::Failed,
            _ => Self::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl<'de> Deserialize<'de> for ServiceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One backend-supervised service as listed by `GET /api/services`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: ServiceName,
    #[serde(default)]
    pub description: String,
    pub status: ServiceStatus,
}

impl Service {
    pub fn new(name: impl Into<String>, description: impl Into<String>, status: ServiceStatus) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status,
        }
    }
}

/// Host resource usage as reported by `GET /api/stats`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    /// Host boot time in unix seconds, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_time: Option<u64>,
}

impl SystemStats {
    pub fn new(cpu_percent: f64, ram_percent: f64) -> Self {
        Self {
            cpu_percent,
            ram_percent,
            boot_time: None,
        }
    }

    /// Fraction of the gauge to fill for the CPU readout
    pub fn cpu_ratio(&self) -> f64 {
        percent_ratio(self.cpu_percent)
    }

    /// Fraction of the gauge to fill for the RAM readout
    pub fn ram_ratio(&self) -> f64 {
        percent_ratio(self.ram_percent)
    }
}

fn percent_ratio(pct: f64) -> f64 {
    if pct.is_nan() {
        return 0.0;
    }
    (pct / 100.0).clamp(0.0, 1.0)
}

/// Format a percentage the way the backend sent it: `12` -> `12%`, `12.5` -> `12.5%`.
pub fn format_percent(pct: f64) -> String {
    format!("{}%", pct)
}

/// A control verb accepted by `POST /api/services/{name}/control`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Start,
    Stop,
    Restart,
}

impl ControlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "restart" => Ok(Self::Restart),
            other => Err(format!("unknown action '{}', expected start|stop|restart", other)),
        }
    }
}

/// Raw log text for one service. Never parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogBundle {
    pub service_name: ServiceName,
    pub text: String,
}

/// Aggregate counters shown above the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceCounts {
    pub total: i64,
    pub running: i64,
    pub failed: i64,
}

impl ServiceCounts {
    pub fn from_services(services: &[Service]) -> Self {
        let mut counts = Self {
            total: services.len() as i64,
            ..Self::default()
        };
        for svc in services {
            match svc.status {
                ServiceStatus::Running => counts.running += 1,
                ServiceStatus::Failed => counts.failed += 1,
                ServiceStatus::Stopped => {}
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decodes_with_stopped_fallback() {
        let raw = r#"[
            {"name":"a","description":"","status":"running"},
            {"name":"b","description":"","status":"failed"},
            {"name":"c","description":"","status":"stopped"},
            {"name":"d","description":"","status":"exited"},
            {"name":"e","description":"","status":"unknown"}
        ]"#;
        let services: Vec<Service> = serde_json::from_str(raw).unwrap();
        let statuses: Vec<ServiceStatus> = services.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                ServiceStatus::Running,
                ServiceStatus::Failed,
                ServiceStatus::Stopped,
                ServiceStatus::Stopped,
                ServiceStatus::Stopped,
            ]
        );
    }

    #[test]
    fn test_stats_boot_time_is_optional() {
        let stats: SystemStats =
            serde_json::from_str(r#"{"cpu_percent": 12, "ram_percent": 47}"#).unwrap();
        assert_eq!(stats.boot_time, None);
        assert_eq!(format_percent(stats.cpu_percent), "12%");
        assert_eq!(format_percent(stats.ram_percent), "47%");
        assert!((stats.cpu_ratio() - 0.12).abs() < f64::EPSILON);

        let stats: SystemStats = serde_json::from_str(
            r#"{"cpu_percent": 3.5, "ram_percent": 101, "boot_time": 1700000000}"#,
        )
        .unwrap();
        assert_eq!(stats.boot_time, Some(1_700_000_000));
        assert_eq!(format_percent(stats.cpu_percent), "3.5%");
        assert_eq!(stats.ram_ratio(), 1.0);
    }

    #[test]
    fn test_action_parse_and_wire_form() {
        assert_eq!("Restart".parse::<ControlAction>(), Ok(ControlAction::Restart));
        assert!("reload".parse::<ControlAction>().is_err());
        let body = serde_json::json!({ "action": ControlAction::Stop });
        assert_eq!(body.to_string(), r#"{"action":"stop"}"#);
    }

    #[test]
    fn test_counts() {
        let services = vec![
            Service::new("a", "", ServiceStatus::Running),
            Service::new("b", "", ServiceStatus::Failed),
            Service::new("c", "", ServiceStatus::Stopped),
            Service::new("d", "", ServiceStatus::Running),
        ];
        assert_eq!(
            ServiceCounts::from_services(&services),
            ServiceCounts {
                total: 4,
                running: 2,
                failed: 1
            }
        );
    }
}
