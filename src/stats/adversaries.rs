use super::{AdversaryKey, MetricError};
use crate::{AdversaryEvent, AdversarySelection, RunId, Scenario};

use serde::Serialize;
use std::collections::BTreeMap;

/// Summed adversary exposure of one (amount, scenario, strategy,
/// percentage) group
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdversaryTotals {
    pub total_payments: usize,
    pub total_successful: usize,
    pub hits: usize,
    pub successful_hits: usize,
    pub targeted_success: usize,
    pub targeted_failed: usize,
}

/// The attacked-path histogram keeps per-run granularity
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct AttackedPathsKey {
    pub run: RunId,
    pub scenario: Scenario,
    pub amount: usize,
    pub strategy: AdversarySelection,
    pub percentage: usize,
    /// Number of paths of one payment that contained an adversary
    pub num_attacked: usize,
}

pub fn aggregate_adversary_hits(
    events: &[AdversaryEvent],
) -> BTreeMap<AdversaryKey, AdversaryTotals> {
    let mut table: BTreeMap<AdversaryKey, AdversaryTotals> = BTreeMap::new();
    for event in events {
        let entry = table
            .entry((event.amount, event.scenario, event.strategy, event.percentage))
            .or_default();
        entry.total_payments += event.total_payments;
        entry.total_successful += event.total_successful;
        entry.hits += event.hits;
        entry.successful_hits += event.successful_hits;
        entry.targeted_success += event.targeted_success.unwrap_or_default();
        entry.targeted_failed += event.targeted_failed.unwrap_or_default();
    }
    table
}

/// The "attacked_all" multisets of all runs merged by key-wise addition
pub fn attacked_paths_histogram(events: &[AdversaryEvent]) -> BTreeMap<AttackedPathsKey, usize> {
    let mut table: BTreeMap<AttackedPathsKey, usize> = BTreeMap::new();
    for event in events {
        for (num_attacked, num_payments) in &event.attacked_all {
            let key = AttackedPathsKey {
                run: event.run,
                scenario: event.scenario,
                amount: event.amount,
                strategy: event.strategy,
                percentage: event.percentage,
                num_attacked: *num_attacked,
            };
            *table.entry(key).or_default() += num_payments;
        }
    }
    table
}

/// Share of payments whose path contained an adversary. `absolute`
/// divides all hits by all payments; otherwise only successful payments
/// and their hits count.
pub fn adversary_hit_rate(totals: &AdversaryTotals, absolute: bool) -> Result<f64, MetricError> {
    let (hits, total) = if absolute {
        (totals.hits, totals.total_payments)
    } else {
        (totals.successful_hits, totals.total_successful)
    };
    if total == 0 {
        return Err(MetricError::DivisionUndefined);
    }
    Ok(hits as f64 / total as f64)
}
