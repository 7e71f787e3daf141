pub mod agent;
pub mod config;
pub mod error;
pub mod helpers;
pub mod logging;
pub mod result;

#[path = "http/lib.rs"]
pub mod http;
#[path = "llm/lib.rs"]
pub mod llm;
#[path = "marketplace/lib.rs"]
pub mod marketplace;
#[path = "profiles/lib.rs"]
pub mod profiles;
#[path = "providers/lib.rs"]
pub mod providers;
#[path = "task/lib.rs"]
pub mod task;

pub use agent::Agent;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use result::AgentResult;
