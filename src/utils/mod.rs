// file: src/utils/mod.rs
// description: logging, telemetry, html templating and validation helpers
// reference: internal module structure

pub mod logging;
pub mod telemetry;
pub mod template;
pub mod validation;

pub use telemetry::{HealthCheck, HealthReport, HealthStatus, OperationTimer, PerformanceMetrics};
pub use template::{HtmlTemplate, escape_html};
pub use validation::Validator;
