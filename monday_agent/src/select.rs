//! Top-N process selection by resident memory.

use std::cmp::Ordering;

use crate::types::ProcStat;

/// Processes reported per snapshot.
pub const TOP_PROCESSES: usize = 5;

fn by_mem_desc(a: &ProcStat, b: &ProcStat) -> Ordering {
    b.mem.cmp(&a.mem)
}

/// Keep the `n` processes with the most resident memory, largest first.
/// Returns fewer than `n` when fewer were observed; tie order is unspecified.
pub fn select_top(mut procs: Vec<ProcStat>, n: usize) -> Vec<ProcStat> {
    if n == 0 {
        return Vec::new();
    }
    if procs.len() > n {
        // Partition so the n largest sit in front, then drop the tail.
        procs.select_nth_unstable_by(n - 1, by_mem_desc);
        procs.truncate(n);
    }
    procs.sort_unstable_by(by_mem_desc);
    procs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: u32, mem: u64) -> ProcStat {
        ProcStat {
            pid,
            mem,
            command: format!("p{pid}"),
            ..ProcStat::default()
        }
    }

    fn mems(procs: &[ProcStat]) -> Vec<u64> {
        procs.iter().map(|p| p.mem).collect()
    }

    #[test]
    fn keeps_five_largest_in_descending_order() {
        let procs = vec![
            proc(1, 30),
            proc(2, 700),
            proc(3, 10),
            proc(4, 500),
            proc(5, 90),
            proc(6, 1_000),
            proc(7, 40),
            proc(8, 600),
        ];
        let top = select_top(procs, TOP_PROCESSES);
        assert_eq!(mems(&top), vec![1_000, 700, 600, 500, 90]);
    }

    #[test]
    fn fewer_than_n_reports_all_sorted() {
        let top = select_top(vec![proc(1, 5), proc(2, 50), proc(3, 20)], TOP_PROCESSES);
        assert_eq!(mems(&top), vec![50, 20, 5]);
    }

    #[test]
    fn empty_and_zero_are_empty() {
        assert!(select_top(Vec::new(), TOP_PROCESSES).is_empty());
        assert!(select_top(vec![proc(1, 5)], 0).is_empty());
    }

    #[test]
    fn ties_still_fill_the_quota() {
        let procs = (1..=9).map(|pid| proc(pid, 100)).collect();
        let top = select_top(procs, TOP_PROCESSES);
        assert_eq!(top.len(), TOP_PROCESSES);
        assert!(top.iter().all(|p| p.mem == 100));
    }
}
