use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{non_blank, GenerateForm, ProviderKind};
use crate::error::{ClientError, ClientResult};

pub const DEFAULT_MODEL: &str = "kling-v1";
pub const MODELS: [&str; 4] = ["kling-v1", "kling-v1-6", "kling-v2-master", "kling-v2-1-master"];
pub const CAMERA_TYPES: [&str; 5] = ["simple", "down_back", "forward_up", "right_turn_forward", "left_turn_forward"];
const MAX_PROMPT_CHARS: usize = 2500;

/// Six camera axes, each in -10..=10. Kling accepts at most one moving axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub horizontal: f64,
    pub vertical: f64,
    pub pan: f64,
    pub tilt: f64,
    pub roll: f64,
    pub zoom: f64,
}

impl CameraConfig {
    fn axes(&self) -> [(&'static str, f64); 6] {
        [
            ("horizontal", self.horizontal),
            ("vertical", self.vertical),
            ("pan", self.pan),
            ("tilt", self.tilt),
            ("roll", self.roll),
            ("zoom", self.zoom),
        ]
    }

    pub fn validate(&self) -> ClientResult<()> {
        if let Some((axis, _)) = self.axes().iter().find(|(_, v)| !(-10.0..=10.0).contains(v)) {
            return Err(ClientError::validation(format!("camera {} must be between -10 and 10", axis)));
        }
        let moving = self.axes().iter().filter(|(_, v)| *v != 0.0).count();
        if moving > 1 {
            return Err(ClientError::validation("camera config allows only one non-zero axis"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraControl {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub config: Option<CameraConfig>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KlingForm {
    pub prompt: String,
    pub model_name: Option<String>,
    pub negative_prompt: Option<String>,
    pub cfg_scale: Option<f64>,
    pub mode: Option<String>,
    pub aspect_ratio: Option<String>,
    pub duration: Option<String>,
    pub camera_control: Option<CameraControl>,
    pub external_task_id: Option<String>,
}

impl GenerateForm for KlingForm {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Kling
    }

    fn build_request(&self) -> ClientResult<Value> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(ClientError::validation("prompt is required"));
        }
        if prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(ClientError::validation("prompt must be at most 2500 characters"));
        }
        let cfg_scale = self.cfg_scale.filter(|v| *v != 0.0).unwrap_or(0.5);
        if !(0.0..=1.0).contains(&cfg_scale) {
            return Err(ClientError::validation("cfg_scale must be between 0 and 1"));
        }

        let mut request = json!({
            "model_name": non_blank(&self.model_name).unwrap_or(DEFAULT_MODEL),
            "prompt": self.prompt,
            "cfg_scale": cfg_scale,
            "mode": non_blank(&self.mode).unwrap_or("std"),
            "aspect_ratio": non_blank(&self.aspect_ratio).unwrap_or("16:9"),
            "duration": non_blank(&self.duration).unwrap_or("5"),
        });

        if let Some(negative) = non_blank(&self.negative_prompt) {
            if negative.chars().count() > MAX_PROMPT_CHARS {
                return Err(ClientError::validation("negative_prompt must be at most 2500 characters"));
            }
            request["negative_prompt"] = json!(self.negative_prompt);
        }
        if let Some(control) = &self.camera_control {
            if non_blank(&control.kind).is_some() {
                if let Some(config) = &control.config {
                    config.validate()?;
                }
                request["camera_control"] = serde_json::to_value(control).map_err(|e| ClientError::validation(e.to_string()))?;
            }
        }
        if non_blank(&self.external_task_id).is_some() {
            request["external_task_id"] = json!(self.external_task_id);
        }
        Ok(request)
    }
}

pub fn mode_label(mode: &str, config: Option<&Value>) -> String {
    let credits = |key: &str, default: u64| {
        config
            .and_then(|c| c.get(key))
            .and_then(Value::as_u64)
            .filter(|v| *v > 0)
            .unwrap_or(default)
    };
    match mode {
        "std" => format!("standard mode ({} credits)", credits("std_credits", 5)),
        "pro" => format!("pro mode ({} credits)", credits("pro_credits", 10)),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(prompt: &str) -> KlingForm {
        KlingForm {
            prompt: prompt.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let body = form("a red kite").build_request().unwrap();
        assert_eq!(
            body,
            json!({
                "model_name": "kling-v1",
                "prompt": "a red kite",
                "cfg_scale": 0.5,
                "mode": "std",
                "aspect_ratio": "16:9",
                "duration": "5"
            })
        );
    }

    #[test]
    fn blank_optionals_are_omitted() {
        let mut f = form("city at night");
        f.negative_prompt = Some("   ".to_string());
        f.external_task_id = Some(String::new());
        f.camera_control = Some(CameraControl::default());
        let body = f.build_request().unwrap();
        assert!(body.get("negative_prompt").is_none());
        assert!(body.get("external_task_id").is_none());
        assert!(body.get("camera_control").is_none());
    }

    #[test]
    fn camera_control_needs_type_and_single_axis() {
        let mut f = form("orbiting shot");
        f.camera_control = Some(CameraControl {
            kind: Some("simple".to_string()),
            config: Some(CameraConfig {
                zoom: 5.0,
                ..Default::default()
            }),
        });
        let body = f.build_request().unwrap();
        assert_eq!(body["camera_control"]["type"], "simple");
        assert_eq!(body["camera_control"]["config"]["zoom"], 5.0);

        f.camera_control = Some(CameraControl {
            kind: Some("simple".to_string()),
            config: Some(CameraConfig {
                zoom: 5.0,
                pan: 1.0,
                ..Default::default()
            }),
        });
        assert!(matches!(f.build_request().unwrap_err(), ClientError::Validation(_)));
    }

    #[test]
    fn empty_prompt_is_rejected() {
        assert_eq!(form("  ").build_request().unwrap_err().to_string(), "prompt is required");
        assert!(form(&"x".repeat(2501)).build_request().is_err());
    }

    #[test]
    fn mode_label_uses_configured_credits() {
        assert_eq!(mode_label("std", None), "standard mode (5 credits)");
        let cfg = json!({"pro_credits": 12});
        assert_eq!(mode_label("pro", Some(&cfg)), "pro mode (12 credits)");
        assert_eq!(mode_label("turbo", None), "turbo");
    }
}
