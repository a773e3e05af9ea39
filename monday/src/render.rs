//! Plain-text report layout. Byte counts are shown in GiB.

use std::io::{self, Write};

use monday_agent::types::Snapshot;

use crate::config::ServerEntry;

/// Divisor used for every GiB figure in the report.
pub const BYTES_PER_GIB: f64 = 1.074e9;

pub fn bytes_to_gib(b: u64) -> f64 {
    b as f64 / BYTES_PER_GIB
}

pub fn render_header<W: Write>(entry: &ServerEntry, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}\t{}", entry.name, entry.host)
}

pub fn render_snapshot<W: Write>(s: &Snapshot, out: &mut W) -> io::Result<()> {
    writeln!(out, "Uptime\t{}\n", s.uptime)?;

    writeln!(out, "{:>8} {:>8} {:>8} {:>8}", "", "1 Min", "5 Min", "15 Min")?;
    writeln!(
        out,
        "{:<8} {:>8.2} {:>8.2} {:>8.2}\n",
        "Load", s.load_avg_one, s.load_avg_five, s.load_avg_fifteen
    )?;

    writeln!(out, "{:>8} {:>8} {:>8} {:>8}", "", "Total", "Used", "Free")?;
    let (mem, swap) = (&s.memory, &s.swap);
    gib_row(out, "Memory", mem.total, mem.used, mem.free)?;
    gib_row(out, "Swap", swap.total, swap.used, swap.free)?;
    writeln!(out)?;

    for fs in &s.filesystems {
        writeln!(out, "{}", fs.dir)?;
        writeln!(out, "{:<8} {:<8} {:<8}", "Total", "Used", "Avail")?;
        writeln!(
            out,
            "{:<8.2} {:<8.2} {:<8.2}\n",
            bytes_to_gib(fs.total),
            bytes_to_gib(fs.used),
            bytes_to_gib(fs.avail)
        )?;
    }

    for p in &s.top_processes {
        writeln!(out, "pid: {}", p.pid)?;
        writeln!(out, "mem: {:.2}", bytes_to_gib(p.mem))?;
        writeln!(out, "cmd: {}\n", p.command)?;
    }
    Ok(())
}

fn gib_row<W: Write>(out: &mut W, label: &str, total: u64, used: u64, free: u64) -> io::Result<()> {
    writeln!(
        out,
        "{:<8} {:>8.2} {:>8.2} {:>8.2}",
        label,
        bytes_to_gib(total),
        bytes_to_gib(used),
        bytes_to_gib(free)
    )
}
