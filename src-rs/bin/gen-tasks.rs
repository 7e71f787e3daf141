use std::env;
use std::fs;
use std::process::ExitCode;

use serde_json::{json, Value};
use tracing::{error, info, warn};

use gen_tasks_rs::error::{ClientError, ClientResult};
use gen_tasks_rs::helpers::{build_provider, load_client_config};
use gen_tasks_rs::logging::init_logging;
use gen_tasks_rs::providers::{build_request_from_json, ProviderKind};
use gen_tasks_rs::task::{CancelToken, TaskSnapshot};

const USAGE: &str = "usage: gen-tasks <kling|jimeng|midjourney|seedream> <request.json>...";

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 || args.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }
    let kind = match args[0].parse::<ProviderKind>() {
        Ok(kind) if kind.has_task_endpoints() => kind,
        Ok(kind) => {
            eprintln!("{} has no generate/poll lifecycle", kind);
            return ExitCode::from(2);
        }
        Err(err) => {
            eprintln!("{}\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };
    let cfg = match load_client_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(2);
        }
    };

    let mut tokens = Vec::new();
    let mut handles = Vec::new();
    for path in args[1..].iter().cloned() {
        let cancel = CancelToken::new();
        tokens.push(cancel.clone());
        let cfg = cfg.clone();
        handles.push((
            path.clone(),
            tokio::task::spawn_blocking(move || run_one(kind, &cfg, &path, cancel)),
        ));
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling {} task(s)", tokens.len());
            for token in &tokens {
                token.cancel();
            }
        }
    });

    let mut failures = Vec::new();
    for (path, handle) in handles {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(err) => Err(ClientError::TransportMessage(format!("worker panicked: {}", err))),
        };
        match outcome {
            Ok(done) => println!("{}", json!({ "file": path, "ok": true, "task": done })),
            Err(err) => {
                if err.is_task_outcome() {
                    warn!(file = %path, error = %err, "task did not succeed");
                } else {
                    error!(file = %path, error = %err, "generation failed");
                }
                println!("{}", json!({ "file": path, "ok": false, "error": err.to_string() }));
                failures.push(err);
            }
        }
    }

    ExitCode::from(exit_status(&failures))
}

// 1 when only the tasks themselves failed, 3 once any request or config error shows up.
fn exit_status(failures: &[ClientError]) -> u8 {
    if failures.is_empty() {
        0
    } else if failures.iter().all(ClientError::is_task_outcome) {
        1
    } else {
        3
    }
}

fn run_one(kind: ProviderKind, cfg: &gen_tasks_rs::ClientConfig, path: &str, cancel: CancelToken) -> ClientResult<Value> {
    let raw = fs::read_to_string(path)?;
    let form: Value =
        serde_json::from_str(&raw).map_err(|e| ClientError::validation(format!("{}: {}", path, e)))?;
    let request = build_request_from_json(kind, form)?;
    let client = build_provider(kind, cfg, Some(cancel))?;

    let mut last_status: Option<String> = None;
    let mut on_update = |snap: &TaskSnapshot| {
        if snap.status_literal != last_status {
            info!(
                file = path,
                status = snap.status_literal.as_deref().unwrap_or("<none>"),
                progress = ?snap.progress(),
                "status changed"
            );
            last_status = snap.status_literal.clone();
        }
    };
    let done = client.lifecycle().submit_and_poll(&request, Some(&mut on_update))?;
    Ok(done.to_json())
}
