use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::status::StatusVocabulary;
use crate::error::{ClientError, ClientResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Queued,
    Submitted,
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Cancelled)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Submitted => "submitted",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Succeeded => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskSnapshot {
    pub fields: Map<String, Value>,
    pub status_literal: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskSnapshot {
    pub fn from_value(value: Value, vocabulary: &StatusVocabulary) -> ClientResult<Self> {
        let fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(ClientError::protocol(format!(
                    "expected a JSON object from {}, got {}",
                    vocabulary.provider, other
                )))
            }
        };
        let status_literal = fields.get("status").and_then(literal_of);
        let status = status_literal.as_deref().and_then(|lit| vocabulary.map(lit));
        Ok(Self {
            fields,
            status_literal,
            status,
        })
    }

    pub fn task_id(&self) -> Option<String> {
        ["task_id", "id"]
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(literal_of))
            .filter(|id| !id.is_empty())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.map(|s| s.is_terminal()).unwrap_or(false)
    }

    pub fn message(&self) -> Option<&str> {
        self.str_field("message")
    }

    pub fn error(&self) -> Option<&str> {
        self.str_field("error")
    }

    pub fn progress(&self) -> Option<&Value> {
        self.fields.get("progress")
    }

    pub fn result(&self) -> Value {
        match self.fields.get("result") {
            Some(result) if !result.is_null() => result.clone(),
            _ => Value::Object(self.fields.clone()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
    }
}

fn literal_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Clone, Debug)]
pub struct GenerationTask {
    pub task_id: String,
    pub snapshot: TaskSnapshot,
}

#[derive(Clone, Debug)]
pub struct CompletedTask {
    pub task_id: String,
    pub snapshot: TaskSnapshot,
    pub extra: Map<String, Value>,
}

impl CompletedTask {
    pub fn new(task_id: String, snapshot: TaskSnapshot) -> Self {
        Self {
            task_id,
            snapshot,
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.snapshot.status
    }

    /// `{task_id, ...extra, ...snapshot}`; snapshot fields win on collision.
    pub fn to_json(&self) -> Value {
        let mut merged = Map::new();
        merged.insert("task_id".to_string(), Value::String(self.task_id.clone()));
        for (key, value) in &self.extra {
            merged.insert(key.clone(), value.clone());
        }
        for (key, value) in &self.snapshot.fields {
            merged.insert(key.clone(), value.clone());
        }
        Value::Object(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::status::MIDJOURNEY;
    use serde_json::json;

    #[test]
    fn snapshot_maps_status_through_vocabulary() {
        let snap = TaskSnapshot::from_value(json!({"task_id": "T1", "status": "completed"}), &MIDJOURNEY).unwrap();
        assert_eq!(snap.status, Some(TaskStatus::Succeeded));
        assert_eq!(snap.status_literal.as_deref(), Some("completed"));
        assert_eq!(snap.task_id().as_deref(), Some("T1"));
        assert!(snap.is_terminal());
    }

    #[test]
    fn unknown_literal_is_kept_but_unmapped() {
        let snap = TaskSnapshot::from_value(json!({"status": "warming_up"}), &MIDJOURNEY).unwrap();
        assert_eq!(snap.status, None);
        assert_eq!(snap.status_literal.as_deref(), Some("warming_up"));
        assert!(!snap.is_terminal());
    }

    #[test]
    fn non_object_snapshot_is_protocol_error() {
        let err = TaskSnapshot::from_value(json!(["x"]), &MIDJOURNEY).unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[test]
    fn task_id_falls_back_to_id_field() {
        let snap = TaskSnapshot::from_value(json!({"id": 42}), &MIDJOURNEY).unwrap();
        assert_eq!(snap.task_id().as_deref(), Some("42"));
    }

    #[test]
    fn result_prefers_nested_payload() {
        let snap = TaskSnapshot::from_value(json!({"status": "completed", "result": {"url": "x.png"}}), &MIDJOURNEY).unwrap();
        assert_eq!(snap.result(), json!({"url": "x.png"}));
        let flat = TaskSnapshot::from_value(json!({"status": "completed", "image_url": "y.png"}), &MIDJOURNEY).unwrap();
        assert_eq!(flat.result()["image_url"], "y.png");
    }

    #[test]
    fn completed_task_merges_with_snapshot_precedence() {
        let snap = TaskSnapshot::from_value(
            json!({"task_id": "server-side", "status": "completed", "image_url": "z.png"}),
            &MIDJOURNEY,
        )
        .unwrap();
        let done = CompletedTask::new("T9".to_string(), snap).with_extra("parent_task_id", json!("T8"));
        let merged = done.to_json();
        assert_eq!(merged["task_id"], "server-side");
        assert_eq!(merged["parent_task_id"], "T8");
        assert_eq!(done.task_id, "T9");
    }
}
