//! Fetch-and-render cycle over the configured servers, one at a time.

use std::io::{self, Write};

use monday_agent::types::Snapshot;
use tracing::warn;

use crate::config::ServerEntry;
use crate::fetch::Fetcher;
use crate::render::{render_header, render_snapshot};

/// Print one server's block. A failed fetch is logged and rendered as
/// zeros; only write errors are returned.
pub async fn report_server<W: Write>(
    fetcher: &Fetcher,
    entry: &ServerEntry,
    out: &mut W,
) -> io::Result<()> {
    render_header(entry, out)?;
    out.flush()?;

    let snapshot = match fetcher.fetch(entry).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(server = %entry.name, host = %entry.host, "{e}");
            Snapshot::default()
        }
    };
    if !snapshot.unavailable.is_empty() {
        warn!(
            server = %entry.name,
            fields = ?snapshot.unavailable,
            "agent could not collect some fields; shown as zero"
        );
    }

    render_snapshot(&snapshot, out)?;
    out.flush()
}

pub async fn report_all<W: Write>(
    fetcher: &Fetcher,
    servers: &[ServerEntry],
    out: &mut W,
) -> io::Result<()> {
    for entry in servers {
        report_server(fetcher, entry, out).await?;
    }
    Ok(())
}
