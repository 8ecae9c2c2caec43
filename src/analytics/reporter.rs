//! Analytics reporter: per-operation aggregation of the event log for
//! `primedash history`.

use std::collections::HashMap;

use crate::analytics::logger::{self, CallLogEntry};

/// Per-operation aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStat {
    pub operation: String,
    pub count: usize,
    pub failures: usize,
    pub avg_latency_ms: u64,
    /// Outcome of the most recent call.
    pub last_outcome: String,
}

impl OperationStat {
    /// Success rate as a percentage.
    pub fn success_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.count - self.failures) as f64 / self.count as f64 * 100.0
        }
    }
}

/// History summary across all operations.
#[derive(Debug, Default)]
pub struct History {
    pub total_calls: usize,
    pub total_failures: usize,
    pub operations: Vec<OperationStat>,
}

/// Summarize the log, optionally limited to the last `days` days.
pub fn compute_history(days: Option<u32>) -> History {
    build_history(&logger::read_entries_since_days(days))
}

fn build_history(entries: &[CallLogEntry]) -> History {
    let mut grouped: HashMap<&str, Vec<&CallLogEntry>> = HashMap::new();
    for entry in entries {
        grouped.entry(entry.operation.as_str()).or_default().push(entry);
    }

    let mut operations: Vec<OperationStat> = grouped
        .into_iter()
        .map(|(operation, calls)| {
            let count = calls.len();
            let failures = calls.iter().filter(|c| !c.is_ok()).count();
            let total_latency: u64 = calls.iter().map(|c| c.latency_ms).sum();
            let last_outcome = calls
                .iter()
                .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
                .map(|c| c.outcome.clone())
                .unwrap_or_default();
            OperationStat {
                operation: operation.to_string(),
                count,
                failures,
                avg_latency_ms: total_latency / count as u64,
                last_outcome,
            }
        })
        .collect();

    // Busiest first; name breaks ties so output is stable.
    operations.sort_by(|a, b| b.count.cmp(&a.count).then(a.operation.cmp(&b.operation)));

    History {
        total_calls: entries.len(),
        total_failures: entries.iter().filter(|e| !e.is_ok()).count(),
        operations,
    }
}
