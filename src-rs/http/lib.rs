pub mod client;
pub mod errors;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use errors::extract_error_message;
pub use transport::{ReqwestTransport, Transport};
pub use types::{HttpRequest, HttpResponse, Method, MultipartFile, RequestBody};
