//! Standalone agent entry point.

use std::env;

use monday_agent::args::{parse_serve_options, usage, wants_help};
use monday_agent::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = env::args();
    let prog = args.next().unwrap_or_else(|| "monday_agent".into());
    let rest: Vec<String> = args.collect();
    if wants_help(rest.iter().cloned()) {
        println!("{}", usage(&prog));
        return Ok(());
    }

    let opts = parse_serve_options(rest)?;
    logging::init();
    server::run(opts.port).await
}
