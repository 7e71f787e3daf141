use std::env;

use gen_tasks_rs::config::ClientConfig;
use gen_tasks_rs::helpers::{
    ENV_AGENT_PROFILES, ENV_BASE_URL, ENV_MAX_POLLS, ENV_POLL_INTERVAL_MS, ENV_TOKEN,
};
use gen_tasks_rs::providers::ProviderKind;

use crate::models::CLIConfig;

const DEFAULT_PROVIDER: ProviderKind = ProviderKind::Midjourney;

pub fn parse_config() -> CLIConfig {
    let defaults = ClientConfig::default();
    let mut cfg = CLIConfig {
        base_url: env_or(ENV_BASE_URL, defaults.base_url),
        token: env_opt(ENV_TOKEN),
        provider: env_opt("GEN_TASKS_PROVIDER")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PROVIDER),
        poll_interval_ms: env_num(ENV_POLL_INTERVAL_MS, defaults.poll_interval_ms),
        max_polls: env_num(ENV_MAX_POLLS, defaults.max_poll_attempts),
        profiles: env_opt(ENV_AGENT_PROFILES),
        debug: env_bool("GEN_TASKS_DEBUG", false),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--token" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.token = Some(value.clone());
                    idx += 1;
                }
            }
            "--provider" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(kind) = value.parse::<ProviderKind>() {
                        cfg.provider = kind;
                    }
                    idx += 1;
                }
            }
            "--interval" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u64>() {
                        cfg.poll_interval_ms = parsed;
                    }
                    idx += 1;
                }
            }
            "--max-polls" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u32>() {
                        cfg.max_polls = parsed;
                    }
                    idx += 1;
                }
            }
            "--profiles" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.profiles = Some(value.clone());
                    idx += 1;
                }
            }
            "--debug" => cfg.debug = true,
            _ => {}
        }
        idx += 1;
    }

    cfg
}

impl CLIConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            poll_interval_ms: self.poll_interval_ms,
            max_poll_attempts: self.max_polls,
            agent_profiles: self.profiles.clone(),
            ..ClientConfig::default()
        }
    }
}

fn env_or(key: &str, fallback: String) -> String {
    env_opt(key).unwrap_or(fallback)
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_num<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
