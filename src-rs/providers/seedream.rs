use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerateForm, ProviderKind};
use crate::error::{ClientError, ClientResult};

pub const RECOMMENDED_SIZES: [(&str, u32, u32); 8] = [
    ("1:1 square", 1328, 1328),
    ("4:3 landscape", 1472, 1104),
    ("3:2 landscape", 1584, 1056),
    ("16:9 widescreen", 1664, 936),
    ("21:9 ultrawide", 2016, 864),
    ("3:4 portrait", 1104, 1472),
    ("2:3 portrait", 1056, 1584),
    ("9:16 vertical", 936, 1664),
];

/// Watermark settings. `position`: 0 bottom-right, 1 bottom-left, 2 top-left, 3 top-right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoInfo {
    pub add_logo: bool,
    pub position: u8,
    pub language: u8,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_text_content: Option<String>,
}

impl Default for LogoInfo {
    fn default() -> Self {
        Self {
            add_logo: false,
            position: 0,
            language: 0,
            opacity: 0.3,
            logo_text_content: None,
        }
    }
}

impl LogoInfo {
    fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.position > 3 {
            errors.push("logo position must be between 0 and 3".to_string());
        }
        if self.language > 1 {
            errors.push("logo language must be 0 or 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            errors.push("logo opacity must be between 0 and 1".to_string());
        }
        errors
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedreamForm {
    pub prompt: String,
    pub use_pre_llm: bool,
    pub seed: i64,
    pub scale: f64,
    pub width: u32,
    pub height: u32,
    pub return_url: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_info: Option<LogoInfo>,
}

impl Default for SeedreamForm {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            use_pre_llm: false,
            seed: -1,
            scale: 2.5,
            width: 1328,
            height: 1328,
            return_url: true,
            logo_info: None,
        }
    }
}

impl SeedreamForm {
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.prompt.trim().chars().count() < 3 {
            errors.push("prompt must be at least 3 characters".to_string());
        }
        if self.prompt.chars().count() > 2000 {
            errors.push("prompt must be at most 2000 characters".to_string());
        }
        if !(512..=2048).contains(&self.width) {
            errors.push("width must be between 512 and 2048".to_string());
        }
        if !(512..=2048).contains(&self.height) {
            errors.push("height must be between 512 and 2048".to_string());
        }
        if !(1.0..=10.0).contains(&self.scale) {
            errors.push("scale must be between 1.0 and 10.0".to_string());
        }
        if self.seed != -1 && !(0..=2_147_483_647).contains(&self.seed) {
            errors.push("seed must be between 0 and 2147483647, or -1 for random".to_string());
        }
        if let Some(logo) = &self.logo_info {
            errors.extend(logo.errors());
        }
        errors
    }
}

impl GenerateForm for SeedreamForm {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Seedream
    }

    fn build_request(&self) -> ClientResult<Value> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(ClientError::validation(errors.join(", ")));
        }
        let trimmed = SeedreamForm {
            prompt: self.prompt.trim().to_string(),
            ..self.clone()
        };
        serde_json::to_value(&trimmed).map_err(|e| ClientError::validation(e.to_string()))
    }
}

pub fn size_label(width: u32, height: u32) -> String {
    RECOMMENDED_SIZES
        .iter()
        .find(|(_, w, h)| *w == width && *h == height)
        .map(|(label, _, _)| label.to_string())
        .unwrap_or_else(|| format!("{}×{}", width, height))
}

pub fn aspect_ratio(width: u32, height: u32) -> String {
    fn gcd(a: u32, b: u32) -> u32 {
        if b == 0 {
            a
        } else {
            gcd(b, a % b)
        }
    }
    let divisor = gcd(width, height).max(1);
    format!("{}:{}", width / divisor, height / divisor)
}

pub fn format_time_elapsed(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return "-".to_string(),
    };
    match leading_seconds(raw) {
        Some(secs) if secs >= 1.0 => format!("{:.1}s", secs),
        Some(secs) => format!("{:.0}ms", secs * 1000.0),
        None => raw.to_string(),
    }
}

fn leading_seconds(raw: &str) -> Option<f64> {
    let bytes = raw.as_bytes();
    let mut start = None;
    for (i, b) in bytes.iter().enumerate() {
        let numeric = b.is_ascii_digit() || *b == b'.';
        match (numeric, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) if *b == b's' => {
                if let Ok(v) = raw[s..i].parse::<f64>() {
                    return Some(v);
                }
                start = None;
            }
            (false, Some(_)) => start = None,
            _ => {}
        }
    }
    None
}
