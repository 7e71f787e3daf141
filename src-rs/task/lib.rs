pub mod lifecycle;
pub mod poller;
pub mod status;
pub mod types;

pub use lifecycle::{TaskEndpoints, TaskLifecycle};
pub use poller::{CancelToken, Clock, PollConfig, TaskPoller, ThreadClock};
pub use status::StatusVocabulary;
pub use types::{CompletedTask, GenerationTask, TaskSnapshot, TaskStatus};
