use std::time::Duration;

use crate::task::PollConfig;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub agent_profiles: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            request_timeout_secs: 60,
            poll_interval_ms: 5000,
            max_poll_attempts: 60,
            agent_profiles: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.to_string(),
            token,
            ..Self::default()
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            max_attempts: self.max_poll_attempts,
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
