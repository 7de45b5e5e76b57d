use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::Mutex;
use tracing::debug;

use svcdeck_core::backend::{ApiError, Backend};
use svcdeck_core::model::{ControlAction, LogBundle, Service, ServiceStatus, SystemStats};

const DEMO_HOST: &str = "ubuntu-server";
const LOG_LINES: u64 = 20;
const DEMO_UPTIME_SECS: u64 = 3 * 86_400 + 4 * 3_600 + 12 * 60;

const LOG_MESSAGES: [&str; 6] = [
    "Listening on port 80",
    "Connection received from 192.168.1.105",
    "Processing request /api/v1/data",
    "Error: Connection timed out",
    "Configuration loaded successfully",
    "Worker process started",
];

fn demo_fleet() -> Vec<Service> {
    use ServiceStatus::*;
    [
        (
            "nginx.service",
            "A high performance web server and a reverse proxy server",
            Running,
        ),
        ("postgresql.service", "PostgreSQL RDBMS", Running),
        ("docker.service", "Docker Application Container Engine", Running),
        ("ssh.service", "OpenBSD Secure Shell server", Running),
        (
            "cron.service",
            "Regular background program processing daemon",
            Running,
        ),
        ("networking.service", "Raise network interfaces", Running),
        (
            "firewalld.service",
            "firewalld - dynamic firewall daemon",
            Failed,
        ),
        ("redis.service", "Redis persistent key-value database", Stopped),
    ]
    .into_iter()
    .map(|(name, description, status)| Service::new(name, description, status))
    .collect()
}

/// In-process stand-in for the service-control API.
///
/// Control actions mutate the fleet so that the forced refresh after an
/// acknowledged action shows the new status.
pub struct DemoBackend {
    fleet: Mutex<Vec<Service>>,
    boot_time: u64,
    control_latency: Duration,
    tick_counter: AtomicU64,
}

impl DemoBackend {
    pub fn new() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            fleet: Mutex::new(demo_fleet()),
            boot_time: now.saturating_sub(DEMO_UPTIME_SECS),
            control_latency: Duration::from_secs(1),
            tick_counter: 0.into(),
        }
    }

    pub fn with_control_latency(mut self, latency: Duration) -> Self {
        self.control_latency = latency;
        self
    }

    fn tick(&self) -> u64 {
        self.tick_counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn journal_lines(name: &str, tick: u64) -> String {
    let timestamp = Local::now().format("%b %d %H:%M:%S");
    let process = name.trim_end_matches(".service");
    let started = format!("Started {}", name);
    let stopping = format!("Stopping {}", name);

    (0..LOG_LINES)
        .map(|i| {
            let n = tick * LOG_LINES + i;
            let msg = match n % 9 {
                0 => started.as_str(),
                8 => stopping.as_str(),
                k => LOG_MESSAGES[(k as usize - 1) % LOG_MESSAGES.len()],
            };
            let pid = 1000 + (n * 7919) % 9000;
            format!("{} {} {}[{}]: {}", timestamp, DEMO_HOST, process, pid, msg)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Backend for DemoBackend {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn stats(&self) -> Result<SystemStats, ApiError> {
        let tick = self.tick();
        let cpu = 8.0 + ((tick * 7) % 35) as f64 + 0.5 * (tick % 2) as f64;
        let ram = 41.0 + ((tick * 3) % 20) as f64;
        Ok(SystemStats {
            boot_time: Some(self.boot_time),
            ..SystemStats::new(cpu, ram)
        })
    }

    async fn services(&self) -> Result<Vec<Service>, ApiError> {
        Ok(self.fleet.lock().await.clone())
    }

    async fn control(&self, name: &str, action: ControlAction) -> Result<String, ApiError> {
        tokio::time::sleep(self.control_latency).await;

        let mut fleet = self.fleet.lock().await;
        let Some(service) = fleet.iter_mut().find(|s| s.name == name) else {
            return Err(ApiError::Rejected {
                status: 404,
                message: "service not found".into(),
            });
        };

        service.status = match action {
            ControlAction::Start | ControlAction::Restart => ServiceStatus::Running,
            ControlAction::Stop => ServiceStatus::Stopped,
        };
        debug!(service = %name, %action, "demo fleet updated");

        Ok(format!(
            "Mock: Service {} {} successfully",
            name,
            action.past_tense()
        ))
    }

    async fn logs(&self, name: &str) -> Result<LogBundle, ApiError> {
        Ok(LogBundle {
            service_name: name.to_string(),
            text: journal_lines(name, self.tick()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> DemoBackend {
        DemoBackend::new().with_control_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_fleet_matches_mock_statuses() {
        let services = backend().services().await.unwrap();
        assert_eq!(services.len(), 8);
        let status_of = |name: &str| services.iter().find(|s| s.name == name).unwrap().status;
        assert_eq!(status_of("nginx.service"), ServiceStatus::Running);
        assert_eq!(status_of("firewalld.service"), ServiceStatus::Failed);
        assert_eq!(status_of("redis.service"), ServiceStatus::Stopped);
    }

    #[tokio::test]
    async fn test_control_updates_fleet() {
        let demo = backend();
        let msg = demo
            .control("redis.service", ControlAction::Start)
            .await
            .unwrap();
        assert_eq!(msg, "Mock: Service redis.service started successfully");

        let services = demo.services().await.unwrap();
        let redis = services.iter().find(|s| s.name == "redis.service").unwrap();
        assert!(redis.status.is_running());
    }

    #[tokio::test]
    async fn test_unknown_service_is_rejected() {
        let err = backend()
            .control("nope.service", ControlAction::Stop)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 404,
                message: "service not found".into()
            }
        );
    }

    #[tokio::test]
    async fn test_logs_look_like_journal_lines() {
        let bundle = backend().logs("nginx.service").await.unwrap();
        let lines: Vec<&str> = bundle.text.lines().collect();
        assert_eq!(lines.len(), LOG_LINES as usize);
        assert!(lines.iter().all(|l| l.contains(" ubuntu-server nginx[")));
        assert!(lines[0].ends_with("Started nginx.service"));
    }

    #[tokio::test]
    async fn test_stats_stay_in_range() {
        let demo = backend();
        for _ in 0..50 {
            let stats = demo.stats().await.unwrap();
            assert!((0.0..=100.0).contains(&stats.cpu_percent));
            assert!((0.0..=100.0).contains(&stats.ram_percent));
            assert!(stats.boot_time.is_some());
        }
    }
}
