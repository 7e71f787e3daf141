mod cli;
mod client;
mod models;
mod repl;
mod render;

use client::Backend;
use repl::REPL;

fn main() {
    gen_tasks_rs::logging::init_logging_with_default("warn");
    let config = cli::parse_config();
    let backend = match Backend::new(&config) {
        Ok(backend) => backend,
        Err(err) => {
            render::error(&err.to_string());
            std::process::exit(2);
        }
    };
    let mut repl = REPL::new(config, backend);
    repl.run();
}
