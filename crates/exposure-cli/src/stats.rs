//! Batch-run counters, mirroring `phase4_exposure_nodes_1.py`'s `reason_ctr`
//! and the final tally `pipstyle/run.py` prints after a batch.

use exposure_types::FailReason;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub num_resolved: u64,
    pub num_resolved_reached: u64,
    pub num_resolved_not_reached: u64,
    pub num_not_resolved: u64,
    pub reason_ctr: HashMap<FailReason, u64>,
}

impl RunStats {
    pub fn record(&mut self, ok: bool, depth: i32) {
        if ok {
            self.num_resolved += 1;
            if depth >= 0 {
                self.num_resolved_reached += 1;
            } else {
                self.num_resolved_not_reached += 1;
            }
        } else {
            self.num_not_resolved += 1;
        }
    }

    pub fn record_fail_reason(&mut self, reason: FailReason) {
        *self.reason_ctr.entry(reason).or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.num_resolved + self.num_not_resolved
    }

    pub fn print_summary(&self) {
        println!();
        println!("--- Final stats ---");
        println!("  Total nodes processed:     {}", self.total());
        println!("  Resolved:                  {}", self.num_resolved);
        println!("  Resolved + reached in dep tree (depth >= 0): {}", self.num_resolved_reached);
        println!("  Resolved + not reached in dep tree (depth -1): {}", self.num_resolved_not_reached);
        println!("  Not resolved:              {}", self.num_not_resolved);

        if !self.reason_ctr.is_empty() {
            let mut reasons: Vec<(&FailReason, &u64)> = self.reason_ctr.iter().collect();
            reasons.sort_by(|a, b| b.1.cmp(a.1));
            println!("  Top fail reasons:");
            for (reason, count) in reasons.into_iter().take(10) {
                println!("    {reason}: {count}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_resolved_and_unresolved() {
        let mut stats = RunStats::default();
        stats.record(true, 2);
        stats.record(true, -1);
        stats.record(false, -1);
        assert_eq!(stats.num_resolved, 2);
        assert_eq!(stats.num_resolved_reached, 1);
        assert_eq!(stats.num_resolved_not_reached, 1);
        assert_eq!(stats.num_not_resolved, 1);
        assert_eq!(stats.total(), 3);
    }
}
