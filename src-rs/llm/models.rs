use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientResult;
use crate::http::ApiClient;

pub const MODELS_PATH: &str = "/api/models";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: Option<String>,
}

impl ModelInfo {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(id) if !id.is_empty() => Some(Self {
                id: id.clone(),
                name: None,
            }),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str).map(str::to_string);
                let id = map
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| name.clone())?;
                Some(Self { id, name })
            }
            _ => None,
        }
    }

    fn matches(&self, needles: &[&str]) -> bool {
        let id = self.id.to_lowercase();
        let name = self.name.as_deref().unwrap_or_default().to_lowercase();
        needles.iter().any(|n| id.contains(n) || name.contains(n))
    }
}

pub fn list_models(api: &ApiClient) -> ClientResult<Vec<ModelInfo>> {
    let body = api.get_json(MODELS_PATH)?;
    let items = match &body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map.get("data").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]),
        _ => &[],
    };
    Ok(items.iter().filter_map(ModelInfo::from_value).collect())
}

pub fn select_model(models: &[ModelInfo]) -> Option<&ModelInfo> {
    models
        .iter()
        .find(|m| m.matches(&["gpt-4"]))
        .or_else(|| models.iter().find(|m| m.matches(&["gpt-3.5", "gpt3.5"])))
        .or_else(|| models.first())
}
