use thiserror::Error;

use crate::task::TaskStatus;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    TransportMessage(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{message}")]
    Submission { status: u16, message: String },

    #[error("{message}")]
    TaskFailed {
        task_id: String,
        status: TaskStatus,
        message: String,
    },

    #[error("task {task_id} did not finish after {attempts} status checks")]
    TaskTimeout { task_id: String, attempts: u32 },

    #[error("polling cancelled for task {task_id}")]
    Cancelled { task_id: String },

    #[error("{0}")]
    Validation(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ClientError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        ClientError::Protocol(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        ClientError::Config(message.into())
    }

    pub fn into_submission(self) -> Self {
        match self {
            ClientError::Http { status, message } => ClientError::Submission { status, message },
            other => other,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } | ClientError::Submission { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::TransportMessage(_))
    }

    pub fn is_task_outcome(&self) -> bool {
        matches!(
            self,
            ClientError::TaskFailed { .. } | ClientError::TaskTimeout { .. } | ClientError::Cancelled { .. }
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
