pub mod jimeng;
pub mod kling;
pub mod midjourney;
pub mod ppt;
pub mod seedream;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;
use crate::task::poller::ProgressCallback;
use crate::task::status::{JIMENG, KLING, MIDJOURNEY, PPT, SEEDREAM};
use crate::task::{CompletedTask, GenerationTask, StatusVocabulary, TaskEndpoints, TaskLifecycle, TaskPoller};

pub use jimeng::JimengForm;
pub use kling::KlingForm;
pub use midjourney::MidjourneyForm;
pub use ppt::PptClient;
pub use seedream::SeedreamForm;

pub const API_PREFIX: &str = "/api/v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Kling,
    Jimeng,
    Midjourney,
    Seedream,
    Ppt,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Kling,
        ProviderKind::Jimeng,
        ProviderKind::Midjourney,
        ProviderKind::Seedream,
        ProviderKind::Ppt,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Kling => "kling",
            ProviderKind::Jimeng => "jimeng",
            ProviderKind::Midjourney => "midjourney",
            ProviderKind::Seedream => "seedream",
            ProviderKind::Ppt => "ppt",
        }
    }

    pub fn base_path(&self) -> String {
        format!("{}/{}", API_PREFIX, self.name())
    }

    pub fn vocabulary(&self) -> &'static StatusVocabulary {
        match self {
            ProviderKind::Kling => &KLING,
            ProviderKind::Jimeng => &JIMENG,
            ProviderKind::Midjourney => &MIDJOURNEY,
            ProviderKind::Seedream => &SEEDREAM,
            ProviderKind::Ppt => &PPT,
        }
    }

    pub fn has_task_endpoints(&self) -> bool {
        !matches!(self, ProviderKind::Ppt)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = ClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lowered = raw.trim().to_lowercase();
        ProviderKind::ALL
            .iter()
            .find(|kind| kind.name() == lowered)
            .copied()
            .ok_or_else(|| ClientError::validation(format!("unknown provider: {}", raw)))
    }
}

pub trait GenerateForm {
    fn provider(&self) -> ProviderKind;
    fn build_request(&self) -> ClientResult<Value>;
}

#[derive(Clone)]
pub struct ProviderClient {
    kind: ProviderKind,
    api: ApiClient,
    lifecycle: TaskLifecycle,
}

impl ProviderClient {
    pub fn new(kind: ProviderKind, api: ApiClient, poller: TaskPoller) -> Self {
        let lifecycle = TaskLifecycle::new(
            api.clone(),
            TaskEndpoints::new(&kind.base_path()),
            kind.vocabulary(),
            poller,
        );
        Self { kind, api, lifecycle }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn lifecycle(&self) -> &TaskLifecycle {
        &self.lifecycle
    }

    fn path(&self, suffix: &str) -> String {
        self.lifecycle.endpoints().path(suffix)
    }

    pub fn get_config(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("config"))
    }

    pub fn update_config(&self, config: &Value) -> ClientResult<Value> {
        self.api.post_json(&self.path("config"), config)
    }

    pub fn verify(&self) -> ClientResult<Value> {
        self.api.post_empty(&self.path("verify"))
    }

    pub fn credits(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("credits"))
    }

    pub fn submit_form<F: GenerateForm>(&self, form: &F) -> ClientResult<GenerationTask> {
        let request = self.checked_request(form)?;
        self.lifecycle.submit(&request)
    }

    pub fn generate<F: GenerateForm>(&self, form: &F, on_update: Option<ProgressCallback<'_>>) -> ClientResult<CompletedTask> {
        let request = self.checked_request(form)?;
        self.lifecycle.submit_and_poll(&request, on_update)
    }

    pub fn status_text<'a>(&self, literal: &'a str) -> &'a str {
        self.kind.vocabulary().display_text(literal)
    }

    pub fn download_result(&self, url: &str, dest: &Path) -> ClientResult<usize> {
        let bytes = self.api.get_bytes(url, &[])?;
        fs::write(dest, &bytes)?;
        info!(provider = self.kind.name(), path = %dest.display(), bytes = bytes.len(), "result downloaded");
        Ok(bytes.len())
    }

    fn checked_request<F: GenerateForm>(&self, form: &F) -> ClientResult<Value> {
        if form.provider() != self.kind {
            return Err(ClientError::validation(format!(
                "{} form sent to {} client",
                form.provider(),
                self.kind
            )));
        }
        form.build_request()
    }
}

pub fn build_request_from_json(kind: ProviderKind, form: Value) -> ClientResult<Value> {
    fn parse<F: serde::de::DeserializeOwned + GenerateForm>(form: Value) -> ClientResult<Value> {
        let form: F = serde_json::from_value(form).map_err(|err| ClientError::validation(format!("invalid form: {}", err)))?;
        form.build_request()
    }
    match kind {
        ProviderKind::Kling => parse::<KlingForm>(form),
        ProviderKind::Jimeng => parse::<JimengForm>(form),
        ProviderKind::Midjourney => parse::<MidjourneyForm>(form),
        ProviderKind::Seedream => parse::<SeedreamForm>(form),
        ProviderKind::Ppt => Err(ClientError::validation("ppt has no generate endpoint; use the ppt workflow")),
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::client::testing::{client_with, ScriptedTransport};
    use crate::task::poller::testing::RecordingClock;
    use crate::task::PollConfig;
    use serde_json::json;

    fn client(kind: ProviderKind, transport: Arc<ScriptedTransport>) -> ProviderClient {
        let poller = TaskPoller::with_clock(PollConfig::default(), Arc::new(RecordingClock::default()));
        ProviderClient::new(kind, client_with(transport), poller)
    }

    #[test]
    fn provider_names_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.name().parse::<ProviderKind>().unwrap(), kind);
        }
        assert_eq!(" Kling ".parse::<ProviderKind>().unwrap(), ProviderKind::Kling);
        assert!("dalle".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn collaborator_endpoints() {
        let transport = Arc::new(ScriptedTransport::new());
        for _ in 0..4 {
            transport.push_json(200, json!({}));
        }
        let c = client(ProviderKind::Jimeng, transport.clone());
        c.get_config().unwrap();
        c.update_config(&json!({"enabled": true})).unwrap();
        c.verify().unwrap();
        c.credits().unwrap();
        let urls = transport.urls();
        assert!(urls[0].ends_with("/api/v1/jimeng/config"));
        assert!(urls[1].ends_with("/api/v1/jimeng/config"));
        assert!(urls[2].ends_with("/api/v1/jimeng/verify"));
        assert!(urls[3].ends_with("/api/v1/jimeng/credits"));
    }

    #[test]
    fn form_for_wrong_provider_is_rejected_locally() {
        let transport = Arc::new(ScriptedTransport::new());
        let c = client(ProviderKind::Kling, transport.clone());
        let form = JimengForm {
            prompt: "waves".to_string(),
            ..Default::default()
        };
        assert!(matches!(c.submit_form(&form).unwrap_err(), ClientError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn generate_runs_the_full_lifecycle() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .push_json(200, json!({"task_id": "K1", "status": "submitted", "credits_used": 5}))
            .push_json(200, json!({"status": "processing"}))
            .push_json(200, json!({"status": "succeed", "video_url": "https://cdn/k1.mp4"}));
        let c = client(ProviderKind::Kling, transport);
        let form = KlingForm {
            prompt: "a fox running".to_string(),
            ..Default::default()
        };
        let done = c.generate(&form, None).unwrap();
        assert_eq!(done.task_id, "K1");
        assert_eq!(done.to_json()["video_url"], "https://cdn/k1.mp4");
    }

    #[test]
    fn download_result_writes_bytes_to_dest() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_bytes(200, b"\x00\x00\x00\x18ftypmp42");
        let c = client(ProviderKind::Kling, transport.clone());
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("k1.mp4");
        let written = c.download_result("https://cdn.test/k1.mp4", &dest).unwrap();
        assert_eq!(written, 12);
        assert_eq!(fs::read(&dest).unwrap(), b"\x00\x00\x00\x18ftypmp42");
        assert_eq!(transport.urls(), vec!["https://cdn.test/k1.mp4"]);
    }

    #[test]
    fn failed_download_writes_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(404, json!({"detail": "video expired"}));
        let c = client(ProviderKind::Jimeng, transport);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("j1.mp4");
        let err = c.download_result("https://cdn.test/j1.mp4", &dest).unwrap_err();
        assert_eq!(err.to_string(), "video expired");
        assert!(!dest.exists());
    }

    #[test]
    fn raw_json_forms_build_per_provider() {
        let body = build_request_from_json(ProviderKind::Jimeng, json!({"prompt": "rain"})).unwrap();
        assert_eq!(body["duration"], 5);
        assert!(build_request_from_json(ProviderKind::Ppt, json!({})).is_err());
        assert!(build_request_from_json(ProviderKind::Seedream, json!({"prompt": 3})).is_err());
    }
}
