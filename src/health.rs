use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::model::ModelRegistry;

pub const AVAILABLE: &str = "available";
pub const UNAVAILABLE: &str = "unavailable";
// Only says the proxy route exists; the analysis service is never probed.
pub const PROXY_AVAILABLE: &str = "available (proxy)";

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub services: ServiceAvailability,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceAvailability {
    pub chatbot: &'static str,
    pub risk_assessment: &'static str,
}

impl HealthReport {
    pub fn snapshot(registry: &ModelRegistry) -> HealthReport {
        let chatbot = if registry.is_available() {
            AVAILABLE
        } else {
            UNAVAILABLE
        };

        HealthReport {
            status: "ok",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            services: ServiceAvailability {
                chatbot,
                risk_assessment: PROXY_AVAILABLE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn degraded_registry_reports_chatbot_unavailable() {
        let report = HealthReport::snapshot(&ModelRegistry::unavailable());
        assert_eq!(report.status, "ok");
        assert_eq!(report.services.chatbot, UNAVAILABLE);
        assert_eq!(report.services.risk_assessment, "available (proxy)");
        assert!(DateTime::parse_from_rfc3339(&report.timestamp).is_ok());
    }
}
