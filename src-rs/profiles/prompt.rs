use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub trait PromptBuilder: Send + Sync {
    fn build_prompt(&self, form: &Map<String, Value>) -> String;
}

const HEADER: &str = "Please generate content based on the following information:\n\n";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptStyle {
    #[default]
    Generic,
    LessonPlan {
        #[serde(default)]
        labels: LessonPlanLabels,
    },
}

impl PromptStyle {
    pub fn builder(&self) -> Box<dyn PromptBuilder> {
        match self {
            PromptStyle::Generic => Box::new(GenericPrompt),
            PromptStyle::LessonPlan { labels } => Box::new(LessonPlanPrompt {
                labels: labels.clone(),
            }),
        }
    }
}

pub struct GenericPrompt;

impl PromptBuilder for GenericPrompt {
    fn build_prompt(&self, form: &Map<String, Value>) -> String {
        let mut out = HEADER.to_string();
        for (key, value) in form {
            if let Some(text) = render(value) {
                out.push_str(&format!("{}: {}\n", key, text));
            }
        }
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonPlanLabels {
    pub subject: BTreeMap<String, String>,
    pub stage: BTreeMap<String, String>,
    pub textbook: BTreeMap<String, String>,
}

impl LessonPlanLabels {
    pub fn standard() -> Self {
        let table = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            subject: table(&[("chinese", "Chinese"), ("math", "Mathematics"), ("english", "English")]),
            stage: table(&[("primary", "Primary school"), ("middle", "Middle school"), ("high", "High school")]),
            textbook: table(&[
                ("renjiao", "People's Education Press"),
                ("sujiao", "Jiangsu Education Press"),
                ("beijing_normal", "Beijing Normal University Press"),
                ("xishi", "Southwest Normal University Press"),
            ]),
        }
    }
}

pub struct LessonPlanPrompt {
    pub labels: LessonPlanLabels,
}

impl PromptBuilder for LessonPlanPrompt {
    fn build_prompt(&self, form: &Map<String, Value>) -> String {
        let field = |key: &str| form.get(key).and_then(render).unwrap_or_default();
        let labelled = |key: &str, table: &BTreeMap<String, String>| {
            let raw = field(key);
            table.get(&raw).cloned().unwrap_or(raw)
        };

        let mut out = HEADER.to_string();
        out.push_str(&format!("Subject: {}\n", labelled("subject", &self.labels.subject)));
        out.push_str(&format!("Stage: {}\n", labelled("stage", &self.labels.stage)));
        out.push_str(&format!("Textbook: {}\n", labelled("textbook", &self.labels.textbook)));
        out.push_str(&format!("Volume: {}\n", field("volume")));
        out.push_str(&format!("Topic: {}\n", field("topic")));
        out.push_str(&format!("Total hours: {}\n", field("hours")));
        if is_set(form.get("template")) {
            out.push_str("\nA lesson plan template was uploaded; follow its structure.\n");
        }
        if is_set(form.get("references")) {
            out.push_str("Reference material was uploaded; draw on it when designing the plan.\n");
        }
        out
    }
}

fn is_set(value: Option<&Value>) -> bool {
    value.and_then(render).is_some()
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}
