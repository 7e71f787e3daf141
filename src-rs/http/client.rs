use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::errors::extract_error_message;
use super::transport::{ReqwestTransport, Transport};
use super::types::{HttpRequest, HttpResponse, Method, MultipartFile};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

#[derive(Clone)]
pub struct ApiClient {
    pub base_url: String,
    pub token: Option<String>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            transport,
        }
    }

    pub fn from_config(cfg: &ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(cfg.request_timeout())?;
        Ok(Self::new(&cfg.base_url, cfg.token.clone(), Arc::new(transport)))
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, &self.url(path)).bearer(self.token.as_deref())
    }

    pub fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let resp = self.transport.send(request)?;
        if !resp.is_success() {
            let message = extract_error_message(resp.status, &resp.status_text, &resp.body);
            debug!(method = method.as_str(), url = %url, status = resp.status, error = %message, "request failed");
            return Err(ClientError::http(resp.status, message));
        }
        Ok(resp)
    }

    pub fn send_json(&self, request: HttpRequest) -> ClientResult<Value> {
        self.send(request)?.json_value()
    }

    pub fn get_json(&self, path: &str) -> ClientResult<Value> {
        self.send_json(self.request(Method::Get, path))
    }

    pub fn get_json_query(&self, path: &str, query: &[(String, String)]) -> ClientResult<Value> {
        let mut req = self.request(Method::Get, path);
        req.query.extend(query.iter().cloned());
        self.send_json(req)
    }

    pub fn post_json(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.send_json(self.request(Method::Post, path).json(body.clone()))
    }

    pub fn post_empty(&self, path: &str) -> ClientResult<Value> {
        self.send_json(self.request(Method::Post, path))
    }

    pub fn put_json(&self, path: &str, body: &Value) -> ClientResult<Value> {
        self.send_json(self.request(Method::Put, path).json(body.clone()))
    }

    pub fn delete(&self, path: &str) -> ClientResult<Value> {
        self.send_json(self.request(Method::Delete, path))
    }

    pub fn post_multipart(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
        files: Vec<MultipartFile>,
    ) -> ClientResult<Value> {
        self.send_json(self.request(Method::Post, path).multipart(fields, files))
    }

    pub fn get_bytes(&self, path: &str, query: &[(String, String)]) -> ClientResult<Vec<u8>> {
        let mut req = self.request(Method::Get, path);
        req.query.extend(query.iter().cloned());
        Ok(self.send(req)?.body)
    }
}
