use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::trace;

use super::types::{HttpRequest, HttpResponse, Method, RequestBody};
use crate::error::{ClientError, ClientResult};

pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            query,
            headers,
            bearer,
            body,
        } = request;

        trace!(method = method.as_str(), url = %url, "sending request");

        let mut builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (key, value) in &headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(token) = bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::config("token contains invalid header characters"))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .json(&value),
            RequestBody::Multipart { fields, files } => {
                let mut form = Form::new();
                for (key, value) in fields {
                    form = form.text(key, value);
                }
                for file in files {
                    let mut part = Part::bytes(file.bytes).file_name(file.filename);
                    if let Some(content_type) = file.content_type {
                        part = part.mime_str(&content_type)?;
                    }
                    form = form.part(file.field, part);
                }
                builder.multipart(form)
            }
        };

        let resp = builder.send()?;
        let status = resp.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let bytes = resp.bytes()?;
        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            body: bytes.to_vec(),
        })
    }
}
