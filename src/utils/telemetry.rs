// file: src/utils/telemetry.rs
// description: health reporting and operation timing
// reference: internal observability helpers

use crate::database::SqliteClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthCheck {
    pub fn healthy(component: &str, response_time: Duration) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Healthy,
            message: None,
            response_time_ms: response_time.as_millis() as u64,
        }
    }

    pub fn unhealthy(component: &str, message: String, response_time: Duration) -> Self {
        Self {
            component: component.to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(message),
            response_time_ms: response_time.as_millis() as u64,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

/// Pings the pool and times the round trip.
pub async fn database_check(client: &SqliteClient) -> HealthCheck {
    let start = Instant::now();
    match client.ping().await {
        Ok(_) => HealthCheck::healthy("database", start.elapsed()),
        Err(e) => HealthCheck::unhealthy("database", e.to_string(), start.elapsed()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let overall_status = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            overall_status,
            checks,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.overall_status == HealthStatus::Healthy
    }

    pub fn format(&self) -> String {
        let mut output = format!(
            "{} System Health: {:?}\nVersion: {}\nTimestamp: {}\n\n",
            self.overall_status.icon(),
            self.overall_status,
            self.version,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );

        for check in &self.checks {
            output.push_str(&format!(
                "{} {} ({:?}) - {}ms",
                check.status.icon(),
                check.component,
                check.status,
                check.response_time_ms
            ));

            if let Some(ref msg) = check.message {
                output.push_str(&format!("\n  {}", msg));
            }

            output.push('\n');
        }

        output
    }
}

pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish_with_count(self, count: usize) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} - {} items in {:.2}s",
            self.operation,
            count,
            elapsed.as_secs_f64()
        );
        elapsed
    }

    pub fn warn_if_slow(&self, threshold: Duration) {
        let elapsed = self.elapsed();
        if elapsed > threshold {
            warn!(
                "Slow operation [{}] took {:.2}s (threshold: {:.2}s)",
                self.operation,
                elapsed.as_secs_f64(),
                threshold.as_secs_f64()
            );
        }
    }
}

/// Throughput summary printed after bulk ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub operation: String,
    pub count: usize,
    pub duration_ms: u64,
    pub throughput: f64,
}

impl PerformanceMetrics {
    pub fn new(operation: &str, count: usize, duration: Duration) -> Self {
        let duration_secs = duration.as_secs_f64();
        let throughput = if duration_secs > 0.0 {
            count as f64 / duration_secs
        } else {
            0.0
        };

        Self {
            operation: operation.to_string(),
            count,
            duration_ms: duration.as_millis() as u64,
            throughput,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "{}: {} documents in {}ms ({:.2} documents/sec)",
            self.operation, self.count, self.duration_ms, self.throughput
        )
    }
}
