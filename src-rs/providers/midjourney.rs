use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{GenerateForm, ProviderClient, ProviderKind};
use crate::error::{ClientError, ClientResult};
use crate::task::poller::ProgressCallback;
use crate::task::{CompletedTask, GenerationTask};

pub const MODES: [&str; 3] = ["fast", "relax", "turbo"];
pub const ASPECT_RATIOS: [&str; 7] = ["1:1", "16:9", "9:16", "3:2", "2:3", "4:3", "3:4"];
pub const VERSIONS: [&str; 6] = ["5.2", "6", "6.1", "7", "niji 5", "niji 6"];
pub const MAX_REFERENCE_IMAGES: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceImage {
    pub base64: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(rename = "type", default = "default_reference_type")]
    pub kind: String,
}

fn default_weight() -> f64 {
    1.0
}

fn default_reference_type() -> String {
    "reference".to_string()
}

impl ReferenceImage {
    pub fn from_bytes(bytes: &[u8], weight: f64, kind: &str) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
            weight,
            kind: kind.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chaos: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylize: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weird: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile: Option<bool>,
}

impl AdvancedParams {
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut check = |value: Option<f64>, lo: f64, hi: f64, message: &str| {
            if let Some(v) = value {
                if v < lo || v > hi {
                    errors.push(message.to_string());
                }
            }
        };
        check(self.chaos, 0.0, 100.0, "chaos must be between 0 and 100");
        check(self.stylize, 0.0, 1000.0, "stylize must be between 0 and 1000");
        check(self.seed.map(|s| s as f64), 0.0, 4_294_967_295.0, "seed must be between 0 and 4294967295");
        check(self.quality, 0.25, 2.0, "quality must be between 0.25 and 2.0");
        check(self.weird, 0.0, 3000.0, "weird must be between 0 and 3000");
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            if !VERSIONS.contains(&version) {
                errors.push(format!("unsupported version: {}", version));
            }
        }
        errors
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MidjourneyForm {
    pub prompt: String,
    pub mode: String,
    pub aspect_ratio: String,
    pub negative_prompt: Option<String>,
    pub reference_images: Vec<ReferenceImage>,
    pub advanced_params: Option<AdvancedParams>,
}

impl Default for MidjourneyForm {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            mode: "fast".to_string(),
            aspect_ratio: "1:1".to_string(),
            negative_prompt: None,
            reference_images: Vec::new(),
            advanced_params: None,
        }
    }
}

impl GenerateForm for MidjourneyForm {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Midjourney
    }

    fn build_request(&self) -> ClientResult<Value> {
        let prompt = self.prompt.trim();
        if prompt.chars().count() < 3 {
            return Err(ClientError::validation("prompt must be at least 3 characters"));
        }
        if self.prompt.chars().count() > 2000 {
            return Err(ClientError::validation("prompt must be at most 2000 characters"));
        }
        if !MODES.contains(&self.mode.as_str()) {
            return Err(ClientError::validation(format!("unsupported mode: {}", self.mode)));
        }
        if self.reference_images.len() > MAX_REFERENCE_IMAGES {
            return Err(ClientError::validation("at most 5 reference images are allowed"));
        }
        if let Some(params) = &self.advanced_params {
            let errors = params.errors();
            if !errors.is_empty() {
                return Err(ClientError::validation(errors.join(", ")));
            }
        }
        Ok(json!({
            "prompt": prompt,
            "mode": self.mode,
            "aspect_ratio": self.aspect_ratio,
            "negative_prompt": super::non_blank(&self.negative_prompt),
            "reference_images": self.reference_images,
            "advanced_params": self.advanced_params,
        }))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionButton {
    pub label: String,
    pub custom_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action_type: String,
    pub button_index: Option<u32>,
    pub custom_id: String,
}

/// Upscale and variation buttons carry a one-based grid index in their label.
pub fn parse_action_button(button: &ActionButton) -> ActionRequest {
    let button_index = match button.kind.as_str() {
        "upscale" | "variation" => grid_index(&button.label),
        _ => None,
    };
    ActionRequest {
        action_type: button.kind.clone(),
        button_index,
        custom_id: button.custom_id.clone(),
    }
}

fn grid_index(label: &str) -> Option<u32> {
    for (pos, ch) in label.char_indices() {
        if ch != 'U' && ch != 'V' {
            continue;
        }
        let digits: String = label[pos + 1..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            return digits.parse::<u32>().ok().and_then(|n| n.checked_sub(1));
        }
    }
    None
}

#[derive(Clone)]
pub struct MidjourneyClient {
    inner: ProviderClient,
}

impl MidjourneyClient {
    pub fn new(inner: ProviderClient) -> ClientResult<Self> {
        if inner.kind() != ProviderKind::Midjourney {
            return Err(ClientError::config(format!("expected a midjourney client, got {}", inner.kind())));
        }
        Ok(Self { inner })
    }

    pub fn provider(&self) -> &ProviderClient {
        &self.inner
    }

    pub fn execute_action(&self, task_id: &str, action: &ActionRequest) -> ClientResult<GenerationTask> {
        let body = serde_json::to_value(action).map_err(|e| ClientError::validation(e.to_string()))?;
        let path = self.inner.lifecycle().endpoints().path(&format!("action/{}", task_id));
        self.inner.lifecycle().submit_to(&path, &body)
    }

    pub fn execute_action_with_polling(
        &self,
        parent_task_id: &str,
        button: &ActionButton,
        on_update: Option<ProgressCallback<'_>>,
    ) -> ClientResult<CompletedTask> {
        let action = parse_action_button(button);
        let submitted = self.execute_action(parent_task_id, &action)?;
        info!(parent = parent_task_id, task_id = %submitted.task_id, action = %action.action_type, "midjourney action started");
        let snapshot = self.inner.lifecycle().poll(&submitted.task_id, on_update)?;
        Ok(CompletedTask::new(submitted.task_id, snapshot)
            .with_extra("parent_task_id", json!(parent_task_id))
            .with_extra("action_type", json!(action.action_type)))
    }
}
