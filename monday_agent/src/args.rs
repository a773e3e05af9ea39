//! Options for serving: shared by `monday_agent` and `monday server`.

use thiserror::Error;

use crate::DEFAULT_PORT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("{0} needs a port number")]
    MissingPort(String),
    #[error("invalid port {0:?}; expected 0-65535")]
    InvalidPort(String),
    #[error("unexpected argument {0:?}")]
    Unexpected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeOptions {
    /// 0 binds an ephemeral port.
    pub port: u16,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Parse the options that follow the program name (or the `server`
/// keyword): `--port N`, `-p N` or `--port=N`, last one wins.
pub fn parse_serve_options<I>(args: I) -> Result<ServeOptions, ArgError>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = ServeOptions::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let value = match arg.as_str() {
            "--port" | "-p" => it.next().ok_or_else(|| ArgError::MissingPort(arg.clone()))?,
            _ => match arg.strip_prefix("--port=") {
                Some(v) => v.to_string(),
                None => return Err(ArgError::Unexpected(arg)),
            },
        };
        opts.port = value.parse().map_err(|_| ArgError::InvalidPort(value))?;
    }
    Ok(opts)
}

pub fn wants_help<I: IntoIterator<Item = String>>(args: I) -> bool {
    args.into_iter().any(|a| a == "-h" || a == "--help")
}

pub fn usage(prog: &str) -> String {
    format!("Usage: {prog} [--port PORT|-p PORT] (default {DEFAULT_PORT})")
}
