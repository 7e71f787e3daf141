use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::prompt::{LessonPlanLabels, PromptStyle};
use crate::error::{ClientError, ClientResult};

pub const DEFAULT_FALLBACK: &str =
    "No AI model is configured yet. Ask an administrator to configure one and try again.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub app_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub system_prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_fallback")]
    pub fallback_message: String,
    #[serde(default)]
    pub prompt: PromptStyle,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK.to_string()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentProfiles {
    profiles: Vec<AgentProfile>,
}

impl AgentProfiles {
    pub fn new(profiles: Vec<AgentProfile>) -> Self {
        Self { profiles }
    }

    pub fn load(path: &Path) -> ClientResult<Self> {
        let raw = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| ClientError::config(format!("{}: {}", path.display(), e)))?;
        let list = match value {
            Value::Object(mut map) => map.remove("profiles").unwrap_or(Value::Null),
            other => other,
        };
        let profiles: Vec<AgentProfile> = serde_json::from_value(list)
            .map_err(|e| ClientError::config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), count = profiles.len(), "agent profiles loaded");
        Ok(Self::new(profiles))
    }

    pub fn get(&self, app_id: &str) -> Option<&AgentProfile> {
        self.profiles.iter().find(|p| p.app_id == app_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.app_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn builtin() -> Self {
        let profile = |app_id: &str, name: &str, system_prompt: &str, temperature: f64, max_tokens: u32, fallback: &str| {
            AgentProfile {
                app_id: app_id.to_string(),
                name: Some(name.to_string()),
                system_prompt: system_prompt.to_string(),
                temperature,
                max_tokens,
                fallback_message: fallback.to_string(),
                prompt: PromptStyle::Generic,
            }
        };
        let mut lesson_plan = profile(
            "app-4",
            "Lesson plan generator",
            LESSON_PLAN_SYSTEM_PROMPT,
            0.3,
            4000,
            "Lesson plan generation needs an AI model. Ask an administrator to configure one.\n\n\
             A strong model such as GPT-4 or Claude gives the best lesson plans.",
        );
        lesson_plan.prompt = PromptStyle::LessonPlan {
            labels: LessonPlanLabels::standard(),
        };

        Self::new(vec![
            profile(
                "app-1",
                "Document summary",
                "You are a document summarization assistant who extracts the key points of a document quickly. \
                 Give an accurate, concise summary of the content the user provides.",
                0.7,
                2000,
                "No AI model is configured yet. Ask an administrator to configure OpenAI or another model \
                 provider in the admin settings, confirm the model is available, then try again.",
            ),
            profile(
                "app-2",
                "Creative writing",
                "You are a creative writing assistant who writes stories, poems and other literary work \
                 on request. Use your imagination and write vivid, polished prose.",
                0.8,
                3000,
                "Creative writing needs an AI model. Ask an administrator to configure one.\n\n\
                 GPT-4 or another large language model is recommended for the best results.",
            ),
            profile(
                "app-3",
                "Data analysis",
                "You are a professional data analyst who identifies trends and writes in-depth analysis \
                 reports. Provide accurate, professional analysis.",
                0.3,
                4000,
                "Data analysis needs an AI model. Ask an administrator to configure one.",
            ),
            lesson_plan,
        ])
    }
}

const LESSON_PLAN_SYSTEM_PROMPT: &str = "You are a senior education expert and lesson plan designer.

Responsibilities:
1. Write a professional lesson plan from the subject, stage, textbook, volume, topic and hours given.
2. Design activities that fit how students at that stage learn.
3. State clear objectives, key and difficult points, the teaching process and a reflection.

Structure:
I. Teaching objectives (knowledge and skills; process and methods; attitudes and values)
II. Key points and difficult points
III. Preparation (teacher materials; student materials)
IV. Teaching process (introduction 5-10 min; new content 20-30 min; practice 10-15 min; summary and homework 5 min)
V. Board design
VI. Reflection (likely problems and improvements)

If the user uploaded a template or reference material, analyse it and build on it.";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_has_four_apps() {
        let profiles = AgentProfiles::builtin();
        assert_eq!(profiles.ids().collect::<Vec<_>>(), vec!["app-1", "app-2", "app-3", "app-4"]);
        let lesson = profiles.get("app-4").unwrap();
        assert!(matches!(lesson.prompt, PromptStyle::LessonPlan { .. }));
        assert_eq!(lesson.max_tokens, 4000);
        assert!(profiles.get("app-9").is_none());
    }

    #[test]
    fn loads_from_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"profiles": [{{"app_id": "faq", "system_prompt": "Answer FAQs."}},
                {{"app_id": "plan", "system_prompt": "Plan.", "temperature": 0.2, "prompt": {{"kind": "lesson_plan"}}}}]}}"#
        )
        .unwrap();
        let profiles = AgentProfiles::load(file.path()).unwrap();
        assert_eq!(profiles.len(), 2);
        let faq = profiles.get("faq").unwrap();
        assert_eq!(faq.temperature, 0.7);
        assert_eq!(faq.max_tokens, 2000);
        assert_eq!(faq.fallback_message, DEFAULT_FALLBACK);
        assert_eq!(faq.prompt, PromptStyle::Generic);
        assert_eq!(profiles.get("plan").unwrap().temperature, 0.2);
    }

    #[test]
    fn bare_array_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(&path, r#"[{"app_id": "x", "system_prompt": "s"}]"#).unwrap();
        assert_eq!(AgentProfiles::load(&path).unwrap().len(), 1);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(AgentProfiles::load(&path).unwrap_err(), ClientError::Config(_)));
        let missing = dir.path().join("missing.json");
        assert!(matches!(AgentProfiles::load(&missing).unwrap_err(), ClientError::Io(_)));
    }
}
