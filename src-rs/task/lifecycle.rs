use serde_json::Value;
use tracing::info;

use super::poller::{ProgressCallback, TaskPoller};
use super::status::StatusVocabulary;
use super::types::{CompletedTask, GenerationTask, TaskSnapshot};
use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

#[derive(Clone, Debug)]
pub struct TaskEndpoints {
    pub base_path: String,
}

impl TaskEndpoints {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn generate(&self) -> String {
        format!("{}/generate", self.base_path)
    }

    pub fn task(&self, task_id: &str) -> String {
        format!("{}/task/{}", self.base_path, task_id)
    }

    pub fn tasks(&self) -> String {
        format!("{}/tasks", self.base_path)
    }

    pub fn path(&self, suffix: &str) -> String {
        format!("{}/{}", self.base_path, suffix.trim_start_matches('/'))
    }
}

#[derive(Clone)]
pub struct TaskLifecycle {
    api: ApiClient,
    endpoints: TaskEndpoints,
    vocabulary: &'static StatusVocabulary,
    poller: TaskPoller,
}

impl TaskLifecycle {
    pub fn new(api: ApiClient, endpoints: TaskEndpoints, vocabulary: &'static StatusVocabulary, poller: TaskPoller) -> Self {
        Self {
            api,
            endpoints,
            vocabulary,
            poller,
        }
    }

    pub fn endpoints(&self) -> &TaskEndpoints {
        &self.endpoints
    }

    pub fn submit(&self, request: &Value) -> ClientResult<GenerationTask> {
        self.submit_to(&self.endpoints.generate(), request)
    }

    pub fn submit_to(&self, path: &str, request: &Value) -> ClientResult<GenerationTask> {
        let body = self
            .api
            .post_json(path, request)
            .map_err(ClientError::into_submission)?;
        let snapshot = TaskSnapshot::from_value(body, self.vocabulary)?;
        let task_id = snapshot
            .task_id()
            .ok_or_else(|| ClientError::protocol(format!("{} submit response has no task id", self.vocabulary.provider)))?;
        info!(
            provider = self.vocabulary.provider,
            task_id = %task_id,
            status = snapshot.status_literal.as_deref().unwrap_or("<none>"),
            "task submitted"
        );
        Ok(GenerationTask { task_id, snapshot })
    }

    pub fn status(&self, task_id: &str) -> ClientResult<TaskSnapshot> {
        let body = self.api.get_json(&self.endpoints.task(task_id))?;
        TaskSnapshot::from_value(body, self.vocabulary)
    }

    pub fn poll(&self, task_id: &str, on_update: Option<ProgressCallback<'_>>) -> ClientResult<TaskSnapshot> {
        self.poller.poll(task_id, |id| self.status(id), on_update)
    }

    pub fn submit_and_poll(&self, request: &Value, on_update: Option<ProgressCallback<'_>>) -> ClientResult<CompletedTask> {
        let submitted = self.submit(request)?;
        let snapshot = self.poll(&submitted.task_id, on_update)?;
        Ok(CompletedTask::new(submitted.task_id, snapshot))
    }

    pub fn delete(&self, task_id: &str) -> ClientResult<Value> {
        self.api.delete(&self.endpoints.task(task_id))
    }

    /// `GET <base>/tasks`. Accepts a bare array or `{tasks: [...]}`.
    pub fn list_tasks(&self) -> ClientResult<Vec<TaskSnapshot>> {
        let body = self.api.get_json(&self.endpoints.tasks())?;
        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("tasks").or_else(|| map.remove("data")) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        items
            .into_iter()
            .map(|item| TaskSnapshot::from_value(item, self.vocabulary))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::http::client::testing::{client_with, ScriptedTransport};
    use crate::task::poller::testing::RecordingClock;
    use crate::task::poller::PollConfig;
    use crate::task::status::{KLING, MIDJOURNEY};
    use crate::task::TaskStatus;
    use serde_json::json;

    fn lifecycle(transport: Arc<ScriptedTransport>, vocab: &'static StatusVocabulary, max_attempts: u32) -> TaskLifecycle {
        let poller = TaskPoller::with_clock(
            PollConfig {
                max_attempts,
                interval: Duration::from_secs(5),
            },
            Arc::new(RecordingClock::default()),
        );
        TaskLifecycle::new(client_with(transport), TaskEndpoints::new("/api/v1/midjourney"), vocab, poller)
    }

    #[test]
    fn scenario_submit_then_two_polls() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!({"task_id": "T1", "status": "submitted"}))
            .push_json(200, json!({"status": "processing"}))
            .push_json(200, json!({"status": "completed", "result": {"url": "x.mp4"}}));
        let lc = lifecycle(transport.clone(), &MIDJOURNEY, 60);

        let done = lc.submit_and_poll(&json!({"prompt": "a cat"}), None).unwrap();
        assert_eq!(done.task_id, "T1");
        assert_eq!(done.status(), Some(TaskStatus::Succeeded));
        assert_eq!(
            done.to_json(),
            json!({"task_id": "T1", "status": "completed", "result": {"url": "x.mp4"}})
        );
        assert_eq!(
            transport.urls(),
            vec![
                "http://backend.test/api/v1/midjourney/generate",
                "http://backend.test/api/v1/midjourney/task/T1",
                "http://backend.test/api/v1/midjourney/task/T1",
            ]
        );
    }

    #[test]
    fn scenario_timeout_after_sixty_polls() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"task_id": "T2"}));
        for _ in 0..60 {
            transport.push_json(200, json!({"status": "processing"}));
        }
        let lc = lifecycle(transport.clone(), &MIDJOURNEY, 60);
        let err = lc.submit_and_poll(&json!({}), None).unwrap_err();
        assert!(matches!(err, ClientError::TaskTimeout { attempts: 60, .. }));
        assert_eq!(transport.request_count(), 61);
    }

    #[test]
    fn scenario_rejected_submission_never_polls() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(400, json!({"detail": "invalid prompt"}));
        let lc = lifecycle(transport.clone(), &MIDJOURNEY, 60);
        let err = lc.submit_and_poll(&json!({"prompt": ""}), None).unwrap_err();
        assert!(matches!(err, ClientError::Submission { status: 400, .. }));
        assert_eq!(err.to_string(), "invalid prompt");
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn submit_without_task_id_is_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"status": "submitted"}));
        let lc = lifecycle(transport, &MIDJOURNEY, 60);
        assert!(matches!(lc.submit(&json!({})).unwrap_err(), ClientError::Protocol(_)));
    }

    #[test]
    fn polling_error_is_not_submission_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!({"task_id": "T3", "status": "submitted"}))
            .push_json(404, json!({"detail": "task not found"}));
        let lc = lifecycle(transport, &MIDJOURNEY, 60);
        let err = lc.submit_and_poll(&json!({}), None).unwrap_err();
        assert!(matches!(err, ClientError::Http { status: 404, .. }));
    }

    #[test]
    fn repeated_status_of_terminal_task_is_stable() {
        let transport = Arc::new(ScriptedTransport::new());
        let done = json!({"status": "succeed", "video_url": "v.mp4"});
        transport.push_json(200, done.clone()).push_json(200, done);
        let lc = lifecycle(transport, &KLING, 60);
        let first = lc.status("K1").unwrap();
        let second = lc.status("K1").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.status, Some(TaskStatus::Succeeded));
    }

    #[test]
    fn list_tasks_accepts_wrapped_and_bare_arrays() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!({"tasks": [{"id": "a", "status": "processing"}]}))
            .push_json(200, json!([{"id": "b", "status": "completed"}, {"id": "c", "status": "failed"}]));
        let lc = lifecycle(transport, &MIDJOURNEY, 60);
        assert_eq!(lc.list_tasks().unwrap().len(), 1);
        let bare = lc.list_tasks().unwrap();
        assert_eq!(bare[1].status, Some(TaskStatus::Failed));
    }

    #[test]
    fn concurrent_polls_keep_their_own_state() {
        let first = Arc::new(ScriptedTransport::new());
        first
            .push_json(200, json!({"status": "processing", "progress": 10}))
            .push_json(200, json!({"status": "processing", "progress": 60}))
            .push_json(200, json!({"status": "completed", "image_url": "a.png"}));
        let second = Arc::new(ScriptedTransport::new());
        second
            .push_json(200, json!({"status": "failed", "error": "nsfw prompt"}))
            .push_json(200, json!({"status": "completed"}));
        let lc_a = lifecycle(first.clone(), &MIDJOURNEY, 60);
        let lc_b = lifecycle(second.clone(), &MIDJOURNEY, 60);

        let (a, b) = std::thread::scope(|scope| {
            let a = scope.spawn(|| {
                let mut seen = Vec::new();
                let mut record = |snap: &TaskSnapshot| seen.push(snap.status_literal.clone());
                let out = lc_a.poll("A", Some(&mut record));
                (out, seen)
            });
            let b = scope.spawn(|| {
                let mut seen = Vec::new();
                let mut record = |snap: &TaskSnapshot| seen.push(snap.status_literal.clone());
                let out = lc_b.poll("B", Some(&mut record));
                (out, seen)
            });
            (a.join().unwrap(), b.join().unwrap())
        });

        let (out_a, seen_a) = a;
        assert_eq!(out_a.unwrap().get("image_url"), Some(&json!("a.png")));
        assert_eq!(seen_a.len(), 3);
        assert_eq!(
            first.urls(),
            vec!["http://backend.test/api/v1/midjourney/task/A"; 3]
        );

        let (out_b, seen_b) = b;
        match out_b.unwrap_err() {
            ClientError::TaskFailed { task_id, message, .. } => {
                assert_eq!(task_id, "B");
                assert_eq!(message, "nsfw prompt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(seen_b, vec![Some("failed".to_string())]);
        assert_eq!(second.request_count(), 1);
    }

    #[test]
    fn delete_hits_task_endpoint() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({"success": true}));
        let lc = lifecycle(transport.clone(), &MIDJOURNEY, 60);
        lc.delete("T4").unwrap();
        let reqs = transport.requests.lock().unwrap();
        assert_eq!(reqs[0].method, crate::http::Method::Delete);
        assert!(reqs[0].url.ends_with("/api/v1/midjourney/task/T4"));
    }
}
