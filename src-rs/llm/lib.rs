pub mod chat_adapter;
pub mod models;
pub mod router;
pub mod types;

pub use chat_adapter::{ChatCompletionAdapter, ChatConfig, CHAT_COMPLETIONS_PATH};
pub use models::{list_models, select_model, ModelInfo, MODELS_PATH};
pub use router::LLMRouter;
pub use types::{CompletionRequest, LLMResponse, Message, ProviderAdapter};
