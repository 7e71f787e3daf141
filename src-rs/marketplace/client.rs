use serde_json::{json, Value};
use tracing::info;

use super::types::{
    query_pairs, AdminAppQuery, AppQuery, HistoryQuery, PageQuery, PopularQuery, RecommendQuery, SearchFilters,
    SubmissionQuery, TemplateQuery,
};
use crate::error::{ClientError, ClientResult};
use crate::http::{ApiClient, Method, MultipartFile};

pub const AGENTS_PATH: &str = "/api/v1/agents";
pub const FILES_PATH: &str = "/api/v1/files";
const DEFAULT_FILE_CATEGORY: &str = "agent_files";

#[derive(Clone)]
pub struct MarketplaceClient {
    api: ApiClient,
}

impl MarketplaceClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn path(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            AGENTS_PATH.to_string()
        } else {
            format!("{}/{}", AGENTS_PATH, suffix)
        }
    }

    fn get_with<T: serde::Serialize>(&self, suffix: &str, query: &T) -> ClientResult<Value> {
        self.api.get_json_query(&self.path(suffix), &query_pairs(query)?)
    }

    // apps

    pub fn list_apps(&self, query: &AppQuery) -> ClientResult<Value> {
        self.get_with("", query)
    }

    pub fn get_app(&self, app_id: &str) -> ClientResult<Value> {
        self.api.get_json(&self.path(app_id))
    }

    pub fn create_app(&self, app: &Value) -> ClientResult<Value> {
        self.api.post_json(&self.path(""), app)
    }

    pub fn update_app(&self, app_id: &str, app: &Value) -> ClientResult<Value> {
        self.api.put_json(&self.path(app_id), app)
    }

    pub fn delete_app(&self, app_id: &str) -> ClientResult<Value> {
        self.api.delete(&self.path(app_id))
    }

    pub fn submit_form(&self, app_id: &str, form: &Value, files: Vec<MultipartFile>) -> ClientResult<Value> {
        let fields = vec![("form_data".to_string(), form.to_string())];
        let body = self
            .api
            .post_multipart(&self.path(&format!("{}/submit", app_id)), fields, rename_files(files, "files"))?;
        info!(app_id, "agent form submitted");
        Ok(body)
    }

    pub fn preview(&self, app_id: &str, form: &Value, files: Vec<MultipartFile>) -> ClientResult<Value> {
        let fields = vec![
            ("form_data".to_string(), form.to_string()),
            ("preview_mode".to_string(), "true".to_string()),
        ];
        self.api
            .post_multipart(&self.path(&format!("{}/preview", app_id)), fields, rename_files(files, "files"))
    }

    pub fn validate_form(&self, app_id: &str, form: &Value) -> ClientResult<Value> {
        self.api
            .post_json(&self.path(&format!("{}/validate", app_id)), &json!({ "form_data": form }))
    }

    pub fn app_stats(&self, app_id: &str) -> ClientResult<Value> {
        self.api.get_json(&self.path(&format!("{}/stats", app_id)))
    }

    pub fn toggle_favorite(&self, app_id: &str) -> ClientResult<Value> {
        self.api.post_empty(&self.path(&format!("{}/favorite", app_id)))
    }

    pub fn favorites(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("favorites"))
    }

    // categories

    pub fn categories(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("categories"))
    }

    pub fn create_category(&self, category: &Value) -> ClientResult<Value> {
        self.api.post_json(&self.path("categories"), category)
    }

    pub fn update_category(&self, category_id: &str, category: &Value) -> ClientResult<Value> {
        self.api.put_json(&self.path(&format!("categories/{}", category_id)), category)
    }

    pub fn delete_category(&self, category_id: &str) -> ClientResult<Value> {
        self.api.delete(&self.path(&format!("categories/{}", category_id)))
    }

    // submissions

    pub fn submissions(&self, query: &SubmissionQuery) -> ClientResult<Value> {
        self.get_with("submissions", query)
    }

    pub fn get_submission(&self, submission_id: &str) -> ClientResult<Value> {
        self.api.get_json(&self.path(&format!("submissions/{}", submission_id)))
    }

    pub fn delete_submission(&self, submission_id: &str) -> ClientResult<Value> {
        self.api.delete(&self.path(&format!("submissions/{}", submission_id)))
    }

    // templates

    pub fn templates(&self, query: &TemplateQuery) -> ClientResult<Value> {
        self.get_with("templates", query)
    }

    pub fn get_template(&self, template_id: &str) -> ClientResult<Value> {
        self.api.get_json(&self.path(&format!("templates/{}", template_id)))
    }

    pub fn create_template(&self, template: &Value) -> ClientResult<Value> {
        self.api.post_json(&self.path("templates"), template)
    }

    pub fn create_app_from_template(&self, template_id: &str, app: &Value) -> ClientResult<Value> {
        self.api.post_json(&self.path(&format!("templates/{}/use", template_id)), app)
    }

    // discovery

    pub fn search(&self, query: &str, filters: &SearchFilters) -> ClientResult<Value> {
        let mut pairs = vec![("q".to_string(), query.to_string())];
        pairs.extend(query_pairs(filters)?);
        self.api.get_json_query(&self.path("search"), &pairs)
    }

    pub fn recommended(&self, query: &RecommendQuery) -> ClientResult<Value> {
        self.get_with("recommendations", query)
    }

    pub fn popular(&self, query: &PopularQuery) -> ClientResult<Value> {
        self.get_with("popular", query)
    }

    pub fn history(&self, query: &HistoryQuery) -> ClientResult<Value> {
        self.get_with("history", query)
    }

    // config transfer

    pub fn export_config(&self, app_id: &str) -> ClientResult<Vec<u8>> {
        self.api.get_bytes(&self.path(&format!("{}/export", app_id)), &[])
    }

    pub fn import_config(&self, file: MultipartFile) -> ClientResult<Value> {
        let file = MultipartFile {
            field: "config_file".to_string(),
            ..file
        };
        self.api.post_multipart(&self.path("import"), Vec::new(), vec![file])
    }

    // ratings

    pub fn rate(&self, app_id: &str, rating: u8, comment: &str) -> ClientResult<Value> {
        if !(1..=5).contains(&rating) {
            return Err(ClientError::validation("rating must be between 1 and 5"));
        }
        self.api.post_json(
            &self.path(&format!("{}/rate", app_id)),
            &json!({ "rating": rating, "comment": comment }),
        )
    }

    pub fn ratings(&self, app_id: &str, query: &PageQuery) -> ClientResult<Value> {
        self.get_with(&format!("{}/ratings", app_id), query)
    }

    // admin

    pub fn admin_stats(&self) -> ClientResult<Value> {
        self.api.get_json(&self.path("admin/stats"))
    }

    pub fn admin_apps(&self, query: &AdminAppQuery) -> ClientResult<Value> {
        self.get_with("admin/apps", query)
    }

    pub fn batch_update_status(&self, app_ids: &[String], status: &str) -> ClientResult<Value> {
        self.api.put_json(
            &self.path("admin/batch-update"),
            &json!({ "app_ids": app_ids, "status": status }),
        )
    }

    // files

    pub fn upload_file(&self, file: MultipartFile, category: Option<&str>) -> ClientResult<Value> {
        let fields = vec![("category".to_string(), category.unwrap_or(DEFAULT_FILE_CATEGORY).to_string())];
        self.api
            .post_multipart(&format!("{}/upload", FILES_PATH), fields, rename_files(vec![file], "file"))
    }

    pub fn upload_files(&self, files: Vec<MultipartFile>, category: Option<&str>) -> ClientResult<Value> {
        if files.is_empty() {
            return Err(ClientError::validation("no files to upload"));
        }
        let fields = vec![("category".to_string(), category.unwrap_or(DEFAULT_FILE_CATEGORY).to_string())];
        self.api
            .post_multipart(&format!("{}/upload/batch", FILES_PATH), fields, rename_files(files, "files"))
    }

    pub fn delete_file(&self, file_id: &str) -> ClientResult<Value> {
        self.api
            .send_json(self.api.request(Method::Delete, &format!("{}/{}", FILES_PATH, file_id)))
    }
}

fn rename_files(files: Vec<MultipartFile>, field: &str) -> Vec<MultipartFile> {
    files
        .into_iter()
        .map(|f| MultipartFile {
            field: field.to_string(),
            ..f
        })
        .collect()
}
