use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MODEL_ID: &str = "amazon.titan-text-express-v1";
pub const DEFAULT_ASSESSMENT_URL: &str = "http://127.0.0.1:8000/assess_batch/";
pub const DEFAULT_ASSESSMENT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub region: String,
    pub model_id: String,
    pub assessment_url: String,
    pub assessment_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            assessment_url: DEFAULT_ASSESSMENT_URL.to_string(),
            assessment_timeout: DEFAULT_ASSESSMENT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("SERVER_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.listen_addr);

        let region = env::var("AWS_REGION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.region);
        let model_id = env::var("BEDROCK_MODEL_ID").unwrap_or(defaults.model_id);

        let assessment_url = env::var("ASSESSMENT_SERVICE_URL").unwrap_or(defaults.assessment_url);
        let assessment_timeout = env::var("ASSESSMENT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.assessment_timeout);

        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        Ok(Self {
            listen_addr,
            region,
            model_id,
            assessment_url,
            assessment_timeout,
            max_body_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gateway_contract() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.assessment_url, "http://127.0.0.1:8000/assess_batch/");
        assert_eq!(config.assessment_timeout, Duration::from_secs(120));
        assert_eq!(config.max_body_bytes, 52_428_800);
        assert_eq!(config.region, "us-east-1");
    }
}
