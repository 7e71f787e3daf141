use serde_json::Value;
use tracing::debug;

use gen_tasks_rs::agent::Agent;
use gen_tasks_rs::error::ClientResult;
use gen_tasks_rs::helpers::{build_poller, load_profiles};
use gen_tasks_rs::http::ApiClient;
use gen_tasks_rs::llm::{list_models, ModelInfo};
use gen_tasks_rs::providers::{build_request_from_json, ProviderClient, ProviderKind};
use gen_tasks_rs::task::{CompletedTask, GenerationTask, TaskSnapshot};
use gen_tasks_rs::AgentResult;

use crate::models::CLIConfig;

pub struct Backend {
    api: ApiClient,
    provider: ProviderClient,
    agent: Agent,
}

impl Backend {
    pub fn new(cfg: &CLIConfig) -> ClientResult<Self> {
        let client_cfg = cfg.client_config();
        let api = ApiClient::from_config(&client_cfg)?;
        let provider = ProviderClient::new(cfg.provider, api.clone(), build_poller(&client_cfg, None));
        let agent = Agent::new(api.clone(), load_profiles(&client_cfg)?);
        debug!(base = %client_cfg.base_url, provider = %cfg.provider, "backend ready");
        Ok(Self {
            api,
            provider,
            agent,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    pub fn submit(&self, form: Value) -> ClientResult<GenerationTask> {
        let request = build_request_from_json(self.kind(), form)?;
        self.provider.lifecycle().submit(&request)
    }

    pub fn status(&self, task_id: &str) -> ClientResult<TaskSnapshot> {
        self.provider.lifecycle().status(task_id)
    }

    pub fn poll(&self, task_id: &str, on_update: &mut dyn FnMut(&TaskSnapshot)) -> ClientResult<CompletedTask> {
        let snapshot = self.provider.lifecycle().poll(task_id, Some(on_update))?;
        Ok(CompletedTask::new(task_id.to_string(), snapshot))
    }

    pub fn cancel(&self, task_id: &str) -> ClientResult<Value> {
        self.provider.lifecycle().delete(task_id)
    }

    pub fn tasks(&self) -> ClientResult<Vec<TaskSnapshot>> {
        self.provider.lifecycle().list_tasks()
    }

    pub fn credits(&self) -> ClientResult<Value> {
        self.provider.credits()
    }

    pub fn status_text<'a>(&self, literal: &'a str) -> &'a str {
        self.provider.status_text(literal)
    }

    pub fn models(&self) -> ClientResult<Vec<ModelInfo>> {
        list_models(&self.api)
    }

    pub fn agent(&self, app_id: &str, form: &Value) -> AgentResult {
        self.agent.execute_value(app_id, form)
    }

    pub fn agent_ids(&self) -> Vec<String> {
        self.agent.profiles().ids().map(str::to_string).collect()
    }
}
