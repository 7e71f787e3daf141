use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::http::ApiClient;
use crate::llm::{list_models, select_model, ChatCompletionAdapter, ChatConfig, CompletionRequest, LLMRouter, Message};
use crate::profiles::{AgentProfiles, DEFAULT_FALLBACK};
use crate::result::AgentResult;

pub const CHAT_PROVIDER: &str = "chat";
pub const SYSTEM_MODEL: &str = "system";

pub struct Agent {
    api: ApiClient,
    profiles: AgentProfiles,
    router: LLMRouter,
}

impl Agent {
    pub fn new(api: ApiClient, profiles: AgentProfiles) -> Self {
        let mut router = LLMRouter::new(CHAT_PROVIDER);
        let adapter = ChatCompletionAdapter::new(api.clone(), ChatConfig::default());
        router.register_provider(CHAT_PROVIDER, Arc::new(adapter));
        Self::with_router(api, profiles, router)
    }

    pub fn with_router(api: ApiClient, profiles: AgentProfiles, router: LLMRouter) -> Self {
        Self { api, profiles, router }
    }

    pub fn profiles(&self) -> &AgentProfiles {
        &self.profiles
    }

    /// Never returns an error; failures land in `AgentResult::error`.
    pub fn execute(&self, app_id: &str, form: &Map<String, Value>) -> AgentResult {
        let models = match list_models(&self.api) {
            Ok(models) => models,
            Err(err) => {
                warn!(error = %err, "failed to list models");
                Vec::new()
            }
        };

        let model = match select_model(&models) {
            Some(model) => model.id.clone(),
            None => {
                warn!(app_id, "no models available, returning fallback");
                let message = self
                    .profiles
                    .get(app_id)
                    .map(|p| p.fallback_message.as_str())
                    .unwrap_or(DEFAULT_FALLBACK);
                return AgentResult::completed(message.to_string(), SYSTEM_MODEL);
            }
        };

        let profile = match self.profiles.get(app_id) {
            Some(profile) => profile,
            None => return AgentResult::failed(format!("agent profile not found: {}", app_id)),
        };

        let user_message = profile.prompt.builder().build_prompt(form);
        let request = CompletionRequest {
            messages: vec![Message::system(&profile.system_prompt), Message::user(&user_message)],
            temperature: Some(profile.temperature),
            max_tokens: Some(profile.max_tokens),
            model: Some(model.clone()),
            provider: None,
        };
        info!(app_id, model = %model, "executing agent");

        match self.router.complete(request) {
            Ok(resp) => {
                let used = resp.model.unwrap_or(model);
                AgentResult::completed(resp.content, &used)
            }
            Err(err) => {
                warn!(app_id, error = %err, "agent execution failed");
                AgentResult::failed(err.to_string())
            }
        }
    }

    pub fn execute_value(&self, app_id: &str, form: &Value) -> AgentResult {
        match form {
            Value::Object(map) => self.execute(app_id, map),
            Value::Null => self.execute(app_id, &Map::new()),
            _ => AgentResult::failed("form must be a JSON object".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::http::client::testing::{client_with, ScriptedTransport};
    use crate::http::RequestBody;
    use serde_json::json;

    fn agent(transport: &Arc<ScriptedTransport>) -> Agent {
        Agent::new(client_with(transport.clone()), AgentProfiles::builtin())
    }

    fn chat_reply(text: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
    }

    #[test]
    fn no_models_returns_profile_fallback() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"data": []}));
        let result = agent(&transport).execute("app-3", &Map::new());
        assert!(result.success);
        assert_eq!(result.model.as_deref(), Some("system"));
        assert!(result.output.starts_with("Data analysis needs an AI model"));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn model_listing_failure_counts_as_no_models() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error(ClientError::TransportMessage("down".to_string()));
        let result = agent(&transport).execute("unknown-app", &Map::new());
        assert!(result.success);
        assert_eq!(result.output, DEFAULT_FALLBACK);
    }

    #[test]
    fn unknown_profile_with_models_fails() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"data": [{"id": "llama3"}]}));
        let result = agent(&transport).execute("app-99", &Map::new());
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("agent profile not found: app-99"));
    }

    #[test]
    fn prefers_gpt4_and_sends_profile_settings() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!({"data": [{"id": "llama3"}, {"id": "gpt-4o"}]}))
            .push_json(200, chat_reply("Lesson plan ..."));
        let form = json!({"subject": "math", "stage": "high", "topic": "Vectors", "hours": 2});
        let result = agent(&transport).execute_value("app-4", &form);
        assert!(result.success);
        assert_eq!(result.output, "Lesson plan ...");
        assert_eq!(result.model.as_deref(), Some("gpt-4o"));

        let reqs = transport.requests.lock().unwrap();
        match &reqs[1].body {
            RequestBody::Json(body) => {
                assert_eq!(body["model"], "gpt-4o");
                assert_eq!(body["temperature"], 0.3);
                assert_eq!(body["max_tokens"], 4000);
                let user = body["messages"][1]["content"].as_str().unwrap();
                assert!(user.contains("Subject: Mathematics"));
                assert!(user.contains("Stage: High school"));
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn chat_failure_is_captured() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!([{"id": "gpt-3.5-turbo"}]))
            .push_json(500, json!({"error": {"message": "upstream timeout"}}));
        let result = agent(&transport).execute("app-1", &Map::new());
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("upstream timeout"));
    }

    #[test]
    fn non_object_form_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        let result = agent(&transport).execute_value("app-1", &json!([1, 2]));
        assert!(!result.success);
        assert_eq!(transport.request_count(), 0);
    }
}
