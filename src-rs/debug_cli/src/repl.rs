use std::fs;
use std::io;

use serde_json::Value;

use gen_tasks_rs::providers::ProviderKind;
use gen_tasks_rs::task::TaskSnapshot;

use crate::client::Backend;
use crate::models::{CLIConfig, SessionTask};
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub backend: Backend,
    pub history: Vec<SessionTask>,
}

impl REPL {
    pub fn new(config: CLIConfig, backend: Backend) -> Self {
        Self {
            config,
            backend,
            history: Vec::new(),
        }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt(&self.config);
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with('/') {
                render::info("commands start with '/', type /help");
                continue;
            }
            if self.handle_command(&line) {
                break;
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "provider" => {
                if rest.is_empty() {
                    render::info(&format!("provider: {}", self.config.provider));
                } else {
                    match rest.parse::<ProviderKind>() {
                        Ok(kind) if kind.has_task_endpoints() => {
                            self.config.provider = kind;
                            self.rebuild("provider updated");
                        }
                        Ok(kind) => render::error(&format!("{} has no generate/poll lifecycle", kind)),
                        Err(err) => render::error(&err.to_string()),
                    }
                }
            }
            "submit" => self.submit(rest),
            "status" => {
                if let Some(id) = self.task_arg(rest) {
                    match self.backend.status(&id) {
                        Ok(snap) => {
                            self.remember_status(&id, &snap);
                            self.show(&snap);
                        }
                        Err(err) => render::error(&err.to_string()),
                    }
                }
            }
            "poll" => {
                if let Some(id) = self.task_arg(rest) {
                    self.poll(&id);
                }
            }
            "cancel" => {
                if rest.is_empty() {
                    render::error("usage: /cancel <task_id>");
                } else {
                    match self.backend.cancel(rest) {
                        Ok(resp) => render::json(&resp),
                        Err(err) => render::error(&err.to_string()),
                    }
                }
            }
            "tasks" => match self.backend.tasks() {
                Ok(tasks) => render::tasks(&tasks),
                Err(err) => render::error(&err.to_string()),
            },
            "history" => render::history(&self.history),
            "credits" => match self.backend.credits() {
                Ok(credits) => render::json(&credits),
                Err(err) => render::error(&err.to_string()),
            },
            "models" => match self.backend.models() {
                Ok(models) => render::models(&models),
                Err(err) => render::error(&err.to_string()),
            },
            "agent" => self.agent(rest),
            "config" => render::config(&self.config),
            "debug" => {
                if rest.is_empty() {
                    self.config.debug = !self.config.debug;
                } else if let Some(flag) = parse_on_off(rest) {
                    self.config.debug = flag;
                } else {
                    render::error("invalid debug flag");
                    return false;
                }
                render::info(&format!("debug: {}", self.config.debug));
            }
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    self.config.base_url = rest.to_string();
                    self.rebuild("base url updated");
                }
            }
            "token" => {
                self.config.token = if rest.is_empty() { None } else { Some(rest.to_string()) };
                self.rebuild("token updated");
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn rebuild(&mut self, done: &str) {
        match Backend::new(&self.config) {
            Ok(backend) => {
                self.backend = backend;
                render::info(done);
            }
            Err(err) => render::error(&err.to_string()),
        }
    }

    fn submit(&mut self, rest: &str) {
        let form = match read_json_arg(rest) {
            Ok(form) => form,
            Err(err) => return render::error(&err),
        };
        match self.backend.submit(form) {
            Ok(task) => {
                self.history.push(SessionTask {
                    provider: self.backend.kind().to_string(),
                    task_id: task.task_id.clone(),
                    status: task.snapshot.status_literal.clone(),
                });
                render::info(&format!("submitted {}", task.task_id));
                self.show(&task.snapshot);
            }
            Err(err) => render::error(&err.to_string()),
        }
    }

    fn poll(&mut self, id: &str) {
        let debug = self.config.debug;
        let backend = &self.backend;
        let mut last: Option<String> = None;
        let mut on_update = |snap: &TaskSnapshot| {
            if snap.status_literal != last || snap.progress().is_some() {
                let literal = snap.status_literal.as_deref().unwrap_or("");
                render::snapshot(snap, backend.status_text(literal), false);
                last = snap.status_literal.clone();
            }
        };
        match backend.poll(id, &mut on_update) {
            Ok(done) => {
                self.remember_status(id, &done.snapshot);
                if debug {
                    render::json(&done.to_json());
                } else {
                    render::json(&done.snapshot.result());
                }
            }
            Err(err) => render::error(&err.to_string()),
        }
    }

    fn agent(&self, rest: &str) {
        let mut parts = rest.splitn(2, ' ');
        let app_id = parts.next().unwrap_or("").trim();
        if app_id.is_empty() {
            render::error("usage: /agent <app_id> <json | @file>");
            render::info(&format!("apps: {}", self.backend.agent_ids().join(", ")));
            return;
        }
        let raw = parts.next().unwrap_or("").trim();
        let form = if raw.is_empty() {
            Value::Null
        } else {
            match read_json_arg(raw) {
                Ok(form) => form,
                Err(err) => return render::error(&err),
            }
        };
        render::agent(&self.backend.agent(app_id, &form));
    }

    fn show(&self, snap: &TaskSnapshot) {
        let literal = snap.status_literal.as_deref().unwrap_or("");
        render::snapshot(snap, self.backend.status_text(literal), self.config.debug);
    }

    fn task_arg(&self, rest: &str) -> Option<String> {
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
        match self.history.last() {
            Some(task) => Some(task.task_id.clone()),
            None => {
                render::error("no task id given and nothing submitted yet");
                None
            }
        }
    }

    fn remember_status(&mut self, id: &str, snap: &TaskSnapshot) {
        if let Some(task) = self.history.iter_mut().find(|t| t.task_id == id) {
            task.status = snap.status_literal.clone();
        }
    }
}

fn read_json_arg(raw: &str) -> Result<Value, String> {
    let text = match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).map_err(|err| format!("{}: {}", path, err))?,
        None => raw.to_string(),
    };
    if text.trim().is_empty() {
        return Err("expected a JSON form".to_string());
    }
    serde_json::from_str(&text).map_err(|err| format!("invalid json: {}", err))
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
