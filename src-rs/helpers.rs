use std::env;
use std::path::Path;
use std::str::FromStr;

use crate::agent::Agent;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::profiles::AgentProfiles;
use crate::providers::{ProviderClient, ProviderKind};
use crate::task::{CancelToken, TaskPoller};

pub const ENV_BASE_URL: &str = "GEN_TASKS_BASE_URL";
pub const ENV_TOKEN: &str = "GEN_TASKS_TOKEN";
pub const ENV_POLL_INTERVAL_MS: &str = "GEN_TASKS_POLL_INTERVAL_MS";
pub const ENV_MAX_POLLS: &str = "GEN_TASKS_MAX_POLLS";
pub const ENV_TIMEOUT_SECS: &str = "GEN_TASKS_TIMEOUT_SECS";
pub const ENV_AGENT_PROFILES: &str = "GEN_TASKS_AGENT_PROFILES";

pub fn load_client_config() -> ClientResult<ClientConfig> {
    client_config_from(|key| env::var(key).ok())
}

pub fn client_config_from<F>(lookup: F) -> ClientResult<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut cfg = ClientConfig::default();
    if let Some(base) = get(ENV_BASE_URL) {
        cfg.base_url = base;
    }
    cfg.token = get(ENV_TOKEN);
    if let Some(raw) = get(ENV_POLL_INTERVAL_MS) {
        cfg.poll_interval_ms = parse_number(ENV_POLL_INTERVAL_MS, &raw)?;
    }
    if let Some(raw) = get(ENV_MAX_POLLS) {
        cfg.max_poll_attempts = parse_number(ENV_MAX_POLLS, &raw)?;
    }
    if let Some(raw) = get(ENV_TIMEOUT_SECS) {
        cfg.request_timeout_secs = parse_number(ENV_TIMEOUT_SECS, &raw)?;
    }
    cfg.agent_profiles = get(ENV_AGENT_PROFILES);
    Ok(cfg)
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> ClientResult<T> {
    raw.parse::<T>()
        .map_err(|_| ClientError::config(format!("{} must be a non-negative integer, got {:?}", key, raw)))
}

pub fn build_poller(cfg: &ClientConfig, cancel: Option<CancelToken>) -> TaskPoller {
    let poller = TaskPoller::new(cfg.poll_config());
    match cancel {
        Some(token) => poller.with_cancel(token),
        None => poller,
    }
}

pub fn build_provider(kind: ProviderKind, cfg: &ClientConfig, cancel: Option<CancelToken>) -> ClientResult<ProviderClient> {
    let api = ApiClient::from_config(cfg)?;
    Ok(ProviderClient::new(kind, api, build_poller(cfg, cancel)))
}

pub fn load_profiles(cfg: &ClientConfig) -> ClientResult<AgentProfiles> {
    match cfg.agent_profiles.as_deref() {
        Some(path) => AgentProfiles::load(Path::new(path)),
        None => Ok(AgentProfiles::builtin()),
    }
}

pub fn build_agent(cfg: &ClientConfig) -> ClientResult<Agent> {
    let api = ApiClient::from_config(cfg)?;
    Ok(Agent::new(api, load_profiles(cfg)?))
}
