//! Entry point: `monday server [--port N]` runs the agent, anything else
//! prints a report for every configured server.

use std::env;
use std::io;

use monday::config;
use monday::fetch::Fetcher;
use monday::report::report_all;
use monday_agent::args::{parse_serve_options, wants_help, ArgError, ServeOptions};
use monday_agent::{logging, server, DEFAULT_PORT};
use tracing::{error, warn};

#[derive(Debug, PartialEq, Eq)]
enum Mode {
    Help(String),
    Server(ServeOptions),
    Client,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Mode, ArgError> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "monday".into());
    let rest: Vec<String> = it.collect();
    if wants_help(rest.iter().cloned()) {
        return Ok(Mode::Help(format!(
            "Usage: {prog} [server [--port PORT|-p PORT]]\n  server  serve this host's vitals (default port {DEFAULT_PORT})\n  (none)  report on the servers listed in the config file"
        )));
    }
    match rest.split_first() {
        Some((cmd, opts)) if cmd == "server" => {
            parse_serve_options(opts.iter().cloned()).map(Mode::Server)
        }
        _ => Ok(Mode::Client),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args(env::args())? {
        Mode::Help(usage) => {
            println!("{usage}");
            Ok(())
        }
        Mode::Server(opts) => {
            logging::init();
            server::run(opts.port).await
        }
        Mode::Client => {
            logging::init();
            run_client().await
        }
    }
}

async fn run_client() -> anyhow::Result<()> {
    let servers = config::discover();
    let fetcher = Fetcher::new(servers.fetch_timeout())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    tokio::select! {
        res = report_all(&fetcher, &servers.servers, &mut out) => {
            if let Err(e) = res {
                error!("writing report failed: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; remaining servers skipped");
        }
    }
    Ok(())
}
