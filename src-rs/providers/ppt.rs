use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::ProviderKind;
use crate::error::{ClientError, ClientResult};
use crate::http::{ApiClient, HttpRequest, Method, MultipartFile};

pub const GENERATION_TYPES: [(u8, &str); 7] = [
    (1, "topic"),
    (2, "file"),
    (3, "mind map"),
    (4, "word document"),
    (5, "web page"),
    (6, "pasted text"),
    (7, "markdown outline"),
];

pub const LENGTHS: [&str; 3] = ["short", "medium", "long"];

pub fn generation_type_label(kind: u8) -> &'static str {
    GENERATION_TYPES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, label)| *label)
        .unwrap_or("unknown type")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentOptions {
    pub stream: bool,
    pub length: String,
    pub scene: Option<String>,
    pub audience: Option<String>,
    pub lang: Option<String>,
    pub prompt: Option<String>,
}

// Responses are read whole, so streaming is off unless asked for.
impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            stream: false,
            length: "medium".to_string(),
            scene: None,
            audience: None,
            lang: None,
            prompt: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateFilters {
    #[serde(rename = "type")]
    pub kind: u8,
    pub category: Option<String>,
    pub style: Option<String>,
    #[serde(rename = "themeColor")]
    pub theme_color: Option<String>,
}

impl Default for TemplateFilters {
    fn default() -> Self {
        Self {
            kind: 1,
            category: None,
            style: None,
            theme_color: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateQuery {
    pub page: u32,
    pub size: u32,
    pub filters: TemplateFilters,
}

impl Default for TemplateQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            filters: TemplateFilters::default(),
        }
    }
}

#[derive(Clone)]
pub struct PptClient {
    api: ApiClient,
    base_path: String,
}

impl PptClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            base_path: ProviderKind::Ppt.base_path(),
        }
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}/{}", self.base_path, suffix)
    }

    pub fn get_config(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("config"))
    }

    pub fn update_config(&self, config: &Value) -> ClientResult<Value> {
        self.api.post_json(&self.path("config"), config)
    }

    pub fn create_task(&self, kind: u8, content: &str, files: Vec<MultipartFile>) -> ClientResult<Value> {
        if !(1..=7).contains(&kind) {
            return Err(ClientError::validation(format!("unknown generation type: {}", kind)));
        }
        let mut fields = vec![("type".to_string(), kind.to_string())];
        if !content.is_empty() {
            fields.push(("content".to_string(), content.to_string()));
        }
        let files = files
            .into_iter()
            .map(|f| MultipartFile { field: "file".to_string(), ..f })
            .collect();
        let body = self
            .api
            .post_multipart(&self.path("v2/createTask"), fields, files)
            .map_err(ClientError::into_submission)?;
        info!(kind = generation_type_label(kind), "ppt task created");
        Ok(body)
    }

    pub fn generate_content(&self, task_id: &str, options: &ContentOptions) -> ClientResult<Value> {
        let mut body = json!({ "id": task_id });
        merge_into(&mut body, options)?;
        self.post_lenient(&self.path("v2/generateContent"), body)
    }

    pub fn update_content(&self, task_id: &str, markdown: &str, question: Option<&str>, stream: bool) -> ClientResult<Value> {
        let body = json!({
            "id": task_id,
            "stream": stream,
            "markdown": markdown,
            "question": question,
        });
        self.post_lenient(&self.path("v2/updateContent"), body)
    }

    pub fn generate_pptx(&self, task_id: &str, template_id: &str, markdown: &str) -> ClientResult<Value> {
        let body = json!({ "id": task_id, "templateId": template_id, "markdown": markdown });
        self.api.post_json(&self.path("v2/generatePptx"), &body)
    }

    pub fn list_pptx(&self, page: u32, size: u32) -> ClientResult<Value> {
        self.api.post_json(&self.path("listPptx"), &json!({ "page": page, "size": size }))
    }

    pub fn load_pptx(&self, id: &str) -> ClientResult<Value> {
        self.api.get_json_query(&self.path("loadPptx"), &[("id".to_string(), id.to_string())])
    }

    pub fn load_markdown(&self, id: &str, format: &str) -> ClientResult<Value> {
        self.api
            .post_json(&self.path("loadPptxMarkdown"), &json!({ "id": id, "format": format }))
    }

    pub fn download_pptx(&self, id: &str, refresh: bool) -> ClientResult<Value> {
        self.api
            .post_json(&self.path("downloadPptx"), &json!({ "id": id, "refresh": refresh }))
    }

    pub fn download_with_animation(&self, id: &str, animation_type: u8, dest: &Path) -> ClientResult<usize> {
        let query = [
            ("type".to_string(), animation_type.to_string()),
            ("id".to_string(), id.to_string()),
        ];
        let bytes = self.api.get_bytes(&self.path("downloadWithAnimation"), &query)?;
        fs::write(dest, &bytes)?;
        info!(id, path = %dest.display(), bytes = bytes.len(), "ppt downloaded");
        Ok(bytes.len())
    }

    pub fn template_options(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("template/options"))
    }

    pub fn templates(&self, query: &TemplateQuery) -> ClientResult<Value> {
        let body = serde_json::to_value(query).map_err(|e| ClientError::validation(e.to_string()))?;
        self.api.post_json(&self.path("templates"), &body)
    }

    pub fn generation_options(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("v2/options"))
    }

    pub fn service_status(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("status"))
    }

    pub fn status_text<'a>(&self, literal: &'a str) -> &'a str {
        ProviderKind::Ppt.vocabulary().display_text(literal)
    }

    /// Streamed answers are not JSON; those come back as a string value.
    fn post_lenient(&self, path: &str, body: Value) -> ClientResult<Value> {
        let resp = self.api.send(self.api.request(Method::Post, path).json(body))?;
        match resp.json_value() {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(resp.text())),
        }
    }
}

pub fn verify_connection(api: &ApiClient, api_url: &str, api_key: &str) -> ClientResult<Value> {
    let url = format!("{}/api/ppt/v2/options", api_url.trim_end_matches('/'));
    let request = HttpRequest::new(Method::Get, &url).header("Api-Key", api_key);
    api.send_json(request)
}

fn merge_into<T: Serialize>(target: &mut Value, extra: &T) -> ClientResult<()> {
    let extra = serde_json::to_value(extra).map_err(|e| ClientError::validation(e.to_string()))?;
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        target.extend(extra);
    }
    Ok(())
}
