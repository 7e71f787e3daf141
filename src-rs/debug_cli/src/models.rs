use serde::Serialize;

use gen_tasks_rs::providers::ProviderKind;

#[derive(Clone, Debug, Serialize)]
pub struct CLIConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    #[serde(serialize_with = "provider_name")]
    pub provider: ProviderKind,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub profiles: Option<String>,
    pub debug: bool,
}

fn provider_name<S: serde::Serializer>(kind: &ProviderKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.name())
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionTask {
    pub provider: String,
    pub task_id: String,
    pub status: Option<String>,
}
