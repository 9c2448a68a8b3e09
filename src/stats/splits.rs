use super::{AmountKey, Distribution};
use crate::SplitEvent;

use std::collections::BTreeMap;

/// Part counts of successful multi-part payments per (amount, scenario)
pub fn aggregate_splits(events: &[SplitEvent]) -> BTreeMap<AmountKey, Distribution> {
    let mut table: BTreeMap<AmountKey, Distribution> = BTreeMap::new();
    for event in events {
        table
            .entry((event.amount, event.scenario))
            .or_default()
            .push(event.num_parts as f64);
    }
    table
}
