use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{non_blank, GenerateForm, ProviderKind};
use crate::error::{ClientError, ClientResult};

pub const DURATIONS: [u32; 2] = [5, 10];
pub const ASPECT_RATIOS: [&str; 6] = ["1:1", "21:9", "16:9", "9:16", "4:3", "3:4"];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JimengForm {
    pub prompt: String,
    pub duration: Option<u32>,
    pub aspect_ratio: Option<String>,
    pub cfg_scale: Option<f64>,
    pub image_url: Option<String>,
}

impl GenerateForm for JimengForm {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Jimeng
    }

    fn build_request(&self) -> ClientResult<Value> {
        if self.prompt.trim().is_empty() {
            return Err(ClientError::validation("prompt is required"));
        }
        let duration = self.duration.filter(|d| *d != 0).unwrap_or(5);
        if !DURATIONS.contains(&duration) {
            return Err(ClientError::validation("duration must be 5 or 10 seconds"));
        }
        let mut request = json!({
            "prompt": self.prompt,
            "duration": duration,
            "aspect_ratio": non_blank(&self.aspect_ratio).unwrap_or("16:9"),
            "cfg_scale": self.cfg_scale.filter(|v| *v != 0.0).unwrap_or(0.5),
        });
        if non_blank(&self.image_url).is_some() {
            request["image_url"] = json!(self.image_url);
        }
        Ok(request)
    }
}

pub fn duration_label(duration: u32, config: Option<&Value>) -> String {
    let credits = |key: &str, default: u64| {
        config
            .and_then(|c| c.get(key))
            .and_then(Value::as_u64)
            .filter(|v| *v > 0)
            .unwrap_or(default)
    };
    match duration {
        5 => format!("5s ({} credits)", credits("credits_5s", 5)),
        10 => format!("10s ({} credits)", credits("credits_10s", 10)),
        other => format!("{}s", other),
    }
}
