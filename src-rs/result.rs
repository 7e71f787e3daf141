use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentResult {
    pub success: bool,
    pub output: String,
    pub model: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AgentResult {
    pub fn completed(output: String, model: &str) -> Self {
        Self {
            success: true,
            output,
            model: Some(model.to_string()),
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            model: None,
            error: Some(error),
            created_at: Utc::now(),
        }
    }
}
