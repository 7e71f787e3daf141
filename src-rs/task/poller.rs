use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::types::{TaskSnapshot, TaskStatus};
use crate::error::{ClientError, ClientResult};

#[derive(Clone, Debug, PartialEq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(5),
        }
    }
}

pub trait Clock: Send + Sync {
    fn sleep(&self, duration: Duration, cancel: &CancelToken);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadClock;

impl Clock for ThreadClock {
    fn sleep(&self, duration: Duration, cancel: &CancelToken) {
        cancel.wait_timeout(duration);
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        if let Ok(mut cancelled) = lock.lock() {
            *cancelled = true;
        }
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        lock.lock().map(|c| *c).unwrap_or(true)
    }

    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = match lock.lock() {
            Ok(guard) => guard,
            Err(_) => return true,
        };
        match cvar.wait_timeout_while(guard, timeout, |cancelled| !*cancelled) {
            Ok((cancelled, _)) => *cancelled,
            Err(_) => true,
        }
    }
}

pub type ProgressCallback<'a> = &'a mut dyn FnMut(&TaskSnapshot);

#[derive(Clone)]
pub struct TaskPoller {
    pub config: PollConfig,
    clock: Arc<dyn Clock>,
    cancel: CancelToken,
}

impl TaskPoller {
    pub fn new(config: PollConfig) -> Self {
        Self::with_clock(config, Arc::new(ThreadClock))
    }

    pub fn with_clock(config: PollConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drives `task_id` to a terminal state.
    ///
    /// `fetch` performs one status request. `on_update` sees every snapshot,
    /// the terminal one included. Errors from `fetch` end the loop as-is.
    pub fn poll<F>(&self, task_id: &str, mut fetch: F, mut on_update: Option<ProgressCallback<'_>>) -> ClientResult<TaskSnapshot>
    where
        F: FnMut(&str) -> ClientResult<TaskSnapshot>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                info!(task_id, attempts, "polling cancelled");
                return Err(ClientError::Cancelled {
                    task_id: task_id.to_string(),
                });
            }

            attempts += 1;
            let snapshot = fetch(task_id)?;
            debug!(
                task_id,
                attempt = attempts,
                status = snapshot.status_literal.as_deref().unwrap_or("<none>"),
                "polled task status"
            );

            if let Some(callback) = on_update.as_mut() {
                callback(&snapshot);
            }

            match snapshot.status {
                Some(TaskStatus::Succeeded) => {
                    info!(task_id, attempts, "task succeeded");
                    return Ok(snapshot);
                }
                Some(status @ (TaskStatus::Failed | TaskStatus::Cancelled)) => {
                    let fallback = if status == TaskStatus::Cancelled {
                        "task cancelled"
                    } else {
                        "task failed"
                    };
                    let message = snapshot
                        .error()
                        .or_else(|| snapshot.message())
                        .unwrap_or(fallback)
                        .to_string();
                    info!(task_id, attempts, %status, %message, "task ended without result");
                    return Err(ClientError::TaskFailed {
                        task_id: task_id.to_string(),
                        status,
                        message,
                    });
                }
                Some(_) => {}
                None => warn!(
                    task_id,
                    status = snapshot.status_literal.as_deref().unwrap_or("<none>"),
                    "unrecognized task status, treating as running"
                ),
            }

            if attempts >= max_attempts {
                warn!(task_id, attempts, "poll budget exhausted");
                return Err(ClientError::TaskTimeout {
                    task_id: task_id.to_string(),
                    attempts,
                });
            }

            self.clock.sleep(self.config.interval, &self.cancel);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingClock;
    use super::*;
    use crate::task::status::MIDJOURNEY;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::time::Instant;

    fn snap(status: &str) -> TaskSnapshot {
        TaskSnapshot::from_value(json!({"status": status}), &MIDJOURNEY).unwrap()
    }

    fn poller(max_attempts: u32, clock: Arc<RecordingClock>) -> TaskPoller {
        TaskPoller::with_clock(
            PollConfig {
                max_attempts,
                interval: Duration::from_millis(250),
            },
            clock,
        )
    }

    fn scripted(statuses: &[&str]) -> (impl FnMut(&str) -> ClientResult<TaskSnapshot>, Arc<Mutex<u32>>) {
        let queue: Mutex<VecDeque<TaskSnapshot>> = Mutex::new(statuses.iter().map(|s| snap(s)).collect());
        let calls = Arc::new(Mutex::new(0u32));
        let counter = calls.clone();
        let fetch = move |_: &str| {
            *counter.lock().unwrap() += 1;
            queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ClientError::TransportMessage("polled past terminal".to_string()))
        };
        (fetch, calls)
    }

    #[test]
    fn stops_at_first_success() {
        let clock = Arc::new(RecordingClock::default());
        let (fetch, calls) = scripted(&["submitted", "processing", "completed", "processing"]);
        let result = poller(10, clock.clone()).poll("T1", fetch, None).unwrap();
        assert_eq!(result.status, Some(TaskStatus::Succeeded));
        assert_eq!(*calls.lock().unwrap(), 3);
        assert_eq!(clock.total(), 2);
    }

    #[test]
    fn sleeps_exactly_the_configured_interval() {
        let clock = Arc::new(RecordingClock::default());
        let (fetch, _) = scripted(&["processing", "processing", "completed"]);
        poller(10, clock.clone()).poll("T1", fetch, None).unwrap();
        let sleeps = clock.sleeps.lock().unwrap();
        assert!(sleeps.iter().all(|d| *d == Duration::from_millis(250)));
    }

    #[test]
    fn callback_runs_once_per_observation_including_terminal() {
        let clock = Arc::new(RecordingClock::default());
        let (fetch, _) = scripted(&["submitted", "processing", "completed"]);
        let mut seen = Vec::new();
        let mut on_update = |s: &TaskSnapshot| seen.push(s.status_literal.clone().unwrap());
        poller(10, clock).poll("T1", fetch, Some(&mut on_update)).unwrap();
        assert_eq!(seen, vec!["submitted", "processing", "completed"]);
    }

    #[test]
    fn failure_carries_provider_message() {
        let clock = Arc::new(RecordingClock::default());
        let fetch = |_: &str| TaskSnapshot::from_value(json!({"status": "failed", "message": "banned prompt"}), &MIDJOURNEY);
        let err = poller(10, clock.clone()).poll("T3", fetch, None).unwrap_err();
        match err {
            ClientError::TaskFailed { task_id, status, message } => {
                assert_eq!(task_id, "T3");
                assert_eq!(status, TaskStatus::Failed);
                assert_eq!(message, "banned prompt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(clock.total(), 0);
    }

    #[test]
    fn cancelled_task_uses_fallback_message() {
        let clock = Arc::new(RecordingClock::default());
        let (fetch, calls) = scripted(&["processing", "cancelled"]);
        let err = poller(10, clock).poll("T4", fetch, None).unwrap_err();
        match err {
            ClientError::TaskFailed { status, message, .. } => {
                assert_eq!(status, TaskStatus::Cancelled);
                assert_eq!(message, "task cancelled");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn times_out_after_exactly_max_attempts() {
        let clock = Arc::new(RecordingClock::default());
        let calls = Arc::new(Mutex::new(0u32));
        let counter = calls.clone();
        let fetch = move |_: &str| {
            *counter.lock().unwrap() += 1;
            Ok(snap("processing"))
        };
        let err = poller(60, clock.clone()).poll("T2", fetch, None).unwrap_err();
        assert!(matches!(err, ClientError::TaskTimeout { attempts: 60, .. }));
        assert_eq!(*calls.lock().unwrap(), 60);
        assert_eq!(clock.total(), 59);
    }

    #[test]
    fn unknown_status_keeps_polling() {
        let clock = Arc::new(RecordingClock::default());
        let (fetch, calls) = scripted(&["warming_up", "completed"]);
        poller(5, clock).poll("T5", fetch, None).unwrap();
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn fetch_errors_abort_without_retry() {
        let clock = Arc::new(RecordingClock::default());
        let mut calls = 0;
        let fetch = |_: &str| {
            calls += 1;
            Err(ClientError::http(500, "HTTP 500: Internal Server Error"))
        };
        let err = poller(10, clock.clone()).poll("T6", fetch, None).unwrap_err();
        assert_eq!(err.http_status(), Some(500));
        assert_eq!(calls, 1);
        assert_eq!(clock.total(), 0);
    }

    #[test]
    fn cancelled_token_stops_before_next_request() {
        let clock = Arc::new(RecordingClock::default());
        let token = CancelToken::new();
        let poller = poller(10, clock).with_cancel(token.clone());
        let mut calls = 0;
        let fetch = |_: &str| {
            calls += 1;
            token.cancel();
            Ok(snap("processing"))
        };
        let err = poller.poll("T7", fetch, None).unwrap_err();
        assert!(matches!(err, ClientError::Cancelled { .. }));
        assert_eq!(calls, 1);
    }

    #[test]
    fn cancel_wakes_a_sleeping_thread_clock() {
        let token = CancelToken::new();
        let waker = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            waker.cancel();
        });
        let started = Instant::now();
        ThreadClock.sleep(Duration::from_secs(30), &token);
        handle.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(token.is_cancelled());
    }

    #[test]
    fn zero_budget_still_checks_once() {
        let clock = Arc::new(RecordingClock::default());
        let (fetch, calls) = scripted(&["processing"]);
        let err = poller(0, clock).poll("T8", fetch, None).unwrap_err();
        assert!(matches!(err, ClientError::TaskTimeout { attempts: 1, .. }));
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
