use std::io::{self, Write};

use serde_json::Value;

use gen_tasks_rs::llm::ModelInfo;
use gen_tasks_rs::task::TaskSnapshot;
use gen_tasks_rs::AgentResult;

use crate::models::{CLIConfig, SessionTask};

pub fn banner(cfg: &CLIConfig) {
    println!("Generation Tasks Debug CLI");
    println!("API: {}", cfg.base_url);
    println!(
        "Provider: {}  Poll: every {} ms, at most {} times",
        cfg.provider, cfg.poll_interval_ms, cfg.max_polls
    );
    println!("Type /help for commands.");
}

pub fn prompt(cfg: &CLIConfig) {
    print!("{}> ", cfg.provider);
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                      Show commands");
    println!("  /exit | /quit              Exit");
    println!("  /provider <name>           Switch provider (kling, jimeng, midjourney, seedream)");
    println!("  /submit <json | @file>     Submit a generate form");
    println!("  /status [task_id]          Fetch task status once");
    println!("  /poll [task_id]            Poll until the task finishes");
    println!("  /cancel <task_id>          Cancel or delete a task");
    println!("  /tasks                     List provider tasks");
    println!("  /history                   Tasks submitted in this session");
    println!("  /credits                   Show credit balance");
    println!("  /models                    List chat models");
    println!("  /agent <app_id> <json>     Run a marketplace agent");
    println!("  /config                    Show current config");
    println!("  /debug [on|off]            Toggle raw JSON output");
    println!("  /base <url>                Update base URL");
    println!("  /token <token>             Update bearer token");
}

pub fn snapshot(snap: &TaskSnapshot, status_text: &str, debug: bool) {
    let id = snap.task_id().unwrap_or_else(|| "-".to_string());
    let literal = snap.status_literal.as_deref().unwrap_or("-");
    let mut line = format!("[{}] {} ({})", literal, id, status_text);
    if let Some(progress) = snap.progress() {
        line.push_str(&format!(" progress={}", progress));
    }
    if let Some(message) = snap.error().or_else(|| snap.message()) {
        line.push_str(&format!(" - {}", message));
    }
    println!("{}", line);
    if debug {
        json(&Value::Object(snap.fields.clone()));
    }
}

pub fn tasks(tasks: &[TaskSnapshot]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for task in tasks {
        println!(
            "[{}] {}",
            task.status_literal.as_deref().unwrap_or("-"),
            task.task_id().unwrap_or_else(|| "-".to_string())
        );
    }
}

pub fn history(items: &[SessionTask]) {
    if items.is_empty() {
        println!("no tasks submitted yet");
        return;
    }
    for item in items {
        println!(
            "{} {} [{}]",
            item.provider,
            item.task_id,
            item.status.as_deref().unwrap_or("-")
        );
    }
}

pub fn models(models: &[ModelInfo]) {
    if models.is_empty() {
        println!("no models");
        return;
    }
    for model in models {
        match &model.name {
            Some(name) if name != &model.id => println!("{} ({})", model.id, name),
            _ => println!("{}", model.id),
        }
    }
}

pub fn agent(result: &AgentResult) {
    if let Some(err) = &result.error {
        println!("error: {}", err);
        return;
    }
    println!("[{}]", result.model.as_deref().unwrap_or("-"));
    println!("{}", result.output);
}

pub fn config(cfg: &CLIConfig) {
    match serde_json::to_string_pretty(cfg) {
        Ok(text) => println!("{}", text),
        Err(err) => error(&err.to_string()),
    }
    println!("  token: {}", if cfg.token.is_some() { "set" } else { "unset" });
}

pub fn json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
