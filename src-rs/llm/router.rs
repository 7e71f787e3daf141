use std::collections::HashMap;
use std::sync::Arc;

use super::types::{CompletionRequest, LLMResponse, ProviderAdapter};
use crate::error::{ClientError, ClientResult};

pub struct LLMRouter {
    default_provider: String,
    providers: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl LLMRouter {
    pub fn new(default_provider: &str) -> Self {
        Self {
            default_provider: default_provider.to_string(),
            providers: HashMap::new(),
        }
    }

    pub fn register_provider(&mut self, name: &str, adapter: Arc<dyn ProviderAdapter>) {
        self.providers.insert(name.to_string(), adapter);
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    pub fn complete(&self, request: CompletionRequest) -> ClientResult<LLMResponse> {
        let provider = request
            .provider
            .clone()
            .unwrap_or_else(|| self.default_provider.clone());
        let adapter = self
            .providers
            .get(&provider)
            .ok_or_else(|| ClientError::config(format!("provider not registered: {}", provider)))?;
        adapter.complete(request)
    }
}
